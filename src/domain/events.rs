use super::fine::PenaltyPoints;
use super::ids::{CaseId, DriverId, FineId, LawEnforcerId};
use serde::Serialize;

/// Domain events produced by the engine. Emitting them is up to the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum FineEvent {
    FineIssued {
        fine: FineId,
        driver: DriverId,
        issuer: LawEnforcerId,
        penalty_points: PenaltyPoints,
    },
    FineAccepted {
        fine: FineId,
        driver: DriverId,
        accrued_points: PenaltyPoints,
    },
    LicenseInvalidated {
        driver: DriverId,
        accrued_points: PenaltyPoints,
    },
    FineRejected {
        fine: FineId,
        case: CaseId,
    },
}
