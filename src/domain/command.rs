use super::fine::PenaltyPoints;
use super::ids::{DriverId, FineId, LawEnforcerId};
use chrono::{DateTime, Utc};

/// The two driver decisions the engine resolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FineCommand {
    Accept { fine: FineId },
    Reject { fine: FineId },
}

impl FineCommand {
    pub fn fine(&self) -> &FineId {
        match self {
            FineCommand::Accept { fine } | FineCommand::Reject { fine } => fine,
        }
    }
}

/// Request from a law enforcer to issue a new fine.
#[derive(Debug, Clone, PartialEq)]
pub struct IssueFine {
    /// Generated when absent.
    pub id: Option<FineId>,
    pub penalty_points: PenaltyPoints,
    pub driver: DriverId,
    pub issuer: LawEnforcerId,
    /// Defaults to the time of issuance.
    pub date: Option<DateTime<Utc>>,
}

impl IssueFine {
    pub fn new(penalty_points: PenaltyPoints, driver: DriverId, issuer: LawEnforcerId) -> Self {
        Self {
            id: None,
            penalty_points,
            driver,
            issuer,
            date: None,
        }
    }

    pub fn with_id(mut self, id: FineId) -> Self {
        self.id = Some(id);
        self
    }
}
