use crate::domain::fine::FineState;
use crate::domain::ids::FineId;
use std::fmt;
use thiserror::Error;

/// The kind of record a lookup or insert was aimed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Fine,
    Driver,
    CourtCase,
    LawEnforcer,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::Fine => "Fine",
            RecordKind::Driver => "Driver",
            RecordKind::CourtCase => "Court case",
            RecordKind::LawEnforcer => "Law enforcer",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug)]
pub enum FineError {
    #[error("{kind} {id} not found")]
    NotFound { kind: RecordKind, id: String },
    #[error("Fine {fine} is {state}, only PENDING fines can be resolved")]
    InvalidState { fine: FineId, state: FineState },
    #[error("{kind} {id} already exists")]
    AlreadyExists { kind: RecordKind, id: String },
    #[error("Store failure: {0}")]
    StoreFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
    #[error("Fine {fine} could not be restored after {cause}")]
    RollbackFailed {
        fine: FineId,
        cause: Box<FineError>,
        #[source]
        rollback: Box<FineError>,
    },
    #[error("Validation error: {0}")]
    ValidationError(String),
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl FineError {
    pub fn not_found(kind: RecordKind, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    pub fn already_exists(kind: RecordKind, id: impl ToString) -> Self {
        Self::AlreadyExists {
            kind,
            id: id.to_string(),
        }
    }

    pub fn store_failure(message: impl Into<String>) -> Self {
        Self::StoreFailure(Box::new(std::io::Error::other(message.into())))
    }
}

#[cfg(feature = "storage-rocksdb")]
impl From<rocksdb::Error> for FineError {
    fn from(e: rocksdb::Error) -> Self {
        Self::StoreFailure(Box::new(e))
    }
}

impl From<serde_json::Error> for FineError {
    fn from(e: serde_json::Error) -> Self {
        Self::StoreFailure(Box::new(e))
    }
}

pub type Result<T> = std::result::Result<T, FineError>;
