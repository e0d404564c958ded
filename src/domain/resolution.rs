//! Pure decision rules for resolving fines.
//!
//! Nothing in here touches a store: callers hand in the records they loaded
//! and persist whatever comes back.

use super::driver::Driver;
use super::fine::{CourtCase, Fine, FineState, PenaltyPoints};
use super::ids::CaseId;
use crate::error::FineError;
use chrono::Utc;

/// Accepted points above this limit invalidate a license.
pub const LICENSE_POINT_LIMIT: PenaltyPoints = PenaltyPoints::new(21);

pub fn is_license_valid(accrued: PenaltyPoints) -> bool {
    accrued <= LICENSE_POINT_LIMIT
}

/// Sums the points of the driver's accepted fines.
///
/// Fines of other drivers or in other states are ignored, so the input does
/// not need to be pre-filtered.
pub fn accrued_points(driver: &Driver, fines: &[Fine]) -> PenaltyPoints {
    fines
        .iter()
        .filter(|fine| fine.driver == driver.id && fine.state == FineState::Accepted)
        .map(|fine| fine.penalty_points)
        .sum()
}

/// Outcome of re-deriving a driver's license from their accepted fines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LicenseAssessment {
    pub accrued_points: PenaltyPoints,
    pub license_valid: bool,
    pub was_valid: bool,
}

impl LicenseAssessment {
    pub fn invalidated(&self) -> bool {
        self.was_valid && !self.license_valid
    }
}

/// Recomputes `driver`'s license validity from scratch.
pub fn assess_license(driver: &mut Driver, fines: &[Fine]) -> LicenseAssessment {
    let accrued = accrued_points(driver, fines);
    let was_valid = driver.license_valid();
    let license_valid = is_license_valid(accrued);
    driver.set_license_valid(license_valid);

    LicenseAssessment {
        accrued_points: accrued,
        license_valid,
        was_valid,
    }
}

/// Opens the dispute record for a fine that has just been rejected.
pub fn open_court_case(fine: &Fine) -> Result<CourtCase, FineError> {
    if fine.state != FineState::Rejected {
        return Err(FineError::InvalidState {
            fine: fine.id.clone(),
            state: fine.state,
        });
    }

    Ok(CourtCase {
        id: CaseId::generate(),
        fine: fine.id.clone(),
        opened_at: Utc::now(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ids::{DriverId, FineId, LawEnforcerId};

    fn fine(id: &str, driver: &str, points: u32, state: FineState) -> Fine {
        let mut fine = Fine::issue(
            FineId::from(id),
            PenaltyPoints::new(points),
            DriverId::from(driver),
            LawEnforcerId::from("police1"),
            Utc::now(),
        );
        fine.state = state;
        fine
    }

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(is_license_valid(PenaltyPoints::new(0)));
        assert!(is_license_valid(PenaltyPoints::new(21)));
        assert!(!is_license_valid(PenaltyPoints::new(22)));
    }

    #[test]
    fn test_accrued_points_only_counts_accepted_fines_of_driver() {
        let driver = Driver::new(DriverId::from("driver1"), "Alice", "A");
        let fines = vec![
            fine("f1", "driver1", 10, FineState::Accepted),
            fine("f2", "driver1", 7, FineState::Pending),
            fine("f3", "driver1", 5, FineState::Rejected),
            fine("f4", "driver2", 30, FineState::Accepted),
        ];

        assert_eq!(accrued_points(&driver, &fines), PenaltyPoints::new(10));
    }

    #[test]
    fn test_assess_license_invalidates_above_limit() {
        let mut driver = Driver::new(DriverId::from("driver1"), "Alice", "A");
        let fines = vec![
            fine("f1", "driver1", 10, FineState::Accepted),
            fine("f2", "driver1", 7, FineState::Accepted),
            fine("f3", "driver1", 5, FineState::Accepted),
        ];

        let assessment = assess_license(&mut driver, &fines);

        assert_eq!(assessment.accrued_points, PenaltyPoints::new(22));
        assert!(!assessment.license_valid);
        assert!(assessment.invalidated());
        assert!(!driver.license_valid());
    }

    #[test]
    fn test_assess_license_is_idempotent() {
        let mut driver = Driver::new(DriverId::from("driver1"), "Alice", "A");
        let fines = vec![fine("f1", "driver1", 25, FineState::Accepted)];

        let first = assess_license(&mut driver, &fines);
        let second = assess_license(&mut driver, &fines);

        assert!(first.invalidated());
        assert!(!second.invalidated());
        assert_eq!(first.accrued_points, second.accrued_points);
        assert!(!driver.license_valid());
    }

    #[test]
    fn test_open_court_case_requires_rejected_fine() {
        let pending = fine("f1", "driver1", 10, FineState::Pending);
        assert!(matches!(
            open_court_case(&pending),
            Err(FineError::InvalidState { .. })
        ));

        let rejected = fine("f1", "driver1", 10, FineState::Rejected);
        let case = open_court_case(&rejected).unwrap();
        assert_eq!(case.fine, rejected.id);
    }
}
