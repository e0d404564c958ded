use crate::domain::command::{FineCommand, IssueFine};
use crate::domain::driver::{Driver, LawEnforcer, LawEnforcerType};
use crate::domain::fine::PenaltyPoints;
use crate::domain::ids::{DriverId, FineId, LawEnforcerId};
use crate::error::{FineError, Result};
use serde::Deserialize;
use std::io::Read;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum InstructionType {
    Driver,
    Enforcer,
    Issue,
    Accept,
    Reject,
}

/// One raw CSV row: `type, fine, driver, issuer, points, first_name, last_name`.
///
/// Which columns are required depends on `type`; see [`Instruction`].
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct InstructionRecord {
    pub r#type: InstructionType,
    #[serde(default)]
    pub fine: Option<String>,
    #[serde(default)]
    pub driver: Option<String>,
    #[serde(default)]
    pub issuer: Option<String>,
    #[serde(default)]
    pub points: Option<u32>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// A validated instruction ready for the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    RegisterDriver(Driver),
    RegisterLawEnforcer(LawEnforcer),
    Issue(IssueFine),
    Resolve(FineCommand),
}

fn required(value: Option<String>, column: &str, kind: InstructionType) -> Result<String> {
    value.ok_or_else(|| {
        FineError::ValidationError(format!("{kind:?} instruction requires a `{column}` value"))
    })
}

impl TryFrom<InstructionRecord> for Instruction {
    type Error = FineError;

    fn try_from(record: InstructionRecord) -> Result<Self> {
        let kind = record.r#type;
        let instruction = match kind {
            InstructionType::Driver => Instruction::RegisterDriver(Driver::new(
                DriverId::from(required(record.driver, "driver", kind)?),
                record.first_name.unwrap_or_default(),
                record.last_name.unwrap_or_default(),
            )),
            InstructionType::Enforcer => Instruction::RegisterLawEnforcer(LawEnforcer::new(
                LawEnforcerId::from(required(record.issuer, "issuer", kind)?),
                LawEnforcerType::Police,
            )),
            InstructionType::Issue => {
                let points = record.points.ok_or_else(|| {
                    FineError::ValidationError(
                        "Issue instruction requires a `points` value".to_string(),
                    )
                })?;
                let mut request = IssueFine::new(
                    PenaltyPoints::new(points),
                    DriverId::from(required(record.driver, "driver", kind)?),
                    LawEnforcerId::from(required(record.issuer, "issuer", kind)?),
                );
                request.id = record.fine.map(FineId::from);
                Instruction::Issue(request)
            }
            InstructionType::Accept => Instruction::Resolve(FineCommand::Accept {
                fine: FineId::from(required(record.fine, "fine", kind)?),
            }),
            InstructionType::Reject => Instruction::Resolve(FineCommand::Reject {
                fine: FineId::from(required(record.fine, "fine", kind)?),
            }),
        };
        Ok(instruction)
    }
}

/// Reads instructions from a CSV source.
///
/// Wraps `csv::Reader`, trims whitespace, and tolerates rows that omit the
/// trailing name columns.
pub struct InstructionReader<R: Read> {
    reader: csv::Reader<R>,
}

impl<R: Read> InstructionReader<R> {
    /// Creates a new `InstructionReader` from any `Read` source (e.g., File, Stdin).
    pub fn new(source: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(source);
        Self { reader }
    }

    /// Returns an iterator that lazily reads and validates instructions.
    pub fn instructions(self) -> impl Iterator<Item = Result<Instruction>> {
        self.reader
            .into_deserialize::<InstructionRecord>()
            .map(|result| result.map_err(FineError::from).and_then(Instruction::try_from))
    }
}
