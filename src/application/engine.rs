use super::locks::{DriverGuard, DriverLocks};
use crate::domain::command::{FineCommand, IssueFine};
use crate::domain::driver::{Driver, LawEnforcer};
use crate::domain::events::FineEvent;
use crate::domain::fine::{CourtCase, Fine, FineState, PenaltyPoints};
use crate::domain::ids::{DriverId, FineId};
use crate::domain::ports::{CourtCaseStoreBox, DriverStoreBox, FineStoreBox, LawEnforcerStoreBox};
use crate::domain::resolution::{self, LicenseAssessment};
use crate::error::{FineError, RecordKind, Result};
use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// The store collaborators the engine reads from and writes to.
pub struct Registries {
    pub fines: FineStoreBox,
    pub drivers: DriverStoreBox,
    pub court_cases: CourtCaseStoreBox,
    pub law_enforcers: LawEnforcerStoreBox,
}

/// A driver's standing as shown in reports.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DriverReport {
    pub driver: DriverId,
    pub first_name: String,
    pub last_name: String,
    pub points: PenaltyPoints,
    pub license_valid: bool,
}

/// Resolves fines: applies accept/reject decisions, re-derives license
/// validity, and opens court cases.
///
/// Every mutating operation runs under the per-driver lock of the fine's
/// driver. Stores are only trusted for single-record atomicity; when the
/// second write of an operation fails the fine is restored to its previous
/// record before the error is returned. If that restore fails as well the
/// caller gets [`FineError::RollbackFailed`].
pub struct ResolutionEngine {
    fines: FineStoreBox,
    drivers: DriverStoreBox,
    court_cases: CourtCaseStoreBox,
    law_enforcers: LawEnforcerStoreBox,
    locks: DriverLocks,
}

impl ResolutionEngine {
    /// Creates a new `ResolutionEngine` over the given stores.
    pub fn new(registries: Registries) -> Self {
        Self {
            fines: registries.fines,
            drivers: registries.drivers,
            court_cases: registries.court_cases,
            law_enforcers: registries.law_enforcers,
            locks: DriverLocks::new(),
        }
    }

    pub async fn register_driver(&self, driver: Driver) -> Result<()> {
        debug!(driver = %driver.id, "Registering driver");
        self.drivers.add(driver).await
    }

    pub async fn register_law_enforcer(&self, law_enforcer: LawEnforcer) -> Result<()> {
        debug!(law_enforcer = %law_enforcer.id, "Registering law enforcer");
        self.law_enforcers.add(law_enforcer).await
    }

    /// Issues a new pending fine against an existing driver.
    pub async fn issue_fine(&self, request: IssueFine) -> Result<Vec<FineEvent>> {
        self.load_driver(&request.driver).await?;
        if self.law_enforcers.get(&request.issuer).await?.is_none() {
            return Err(FineError::not_found(
                RecordKind::LawEnforcer,
                &request.issuer,
            ));
        }

        let fine = Fine::issue(
            request.id.unwrap_or_else(FineId::generate),
            request.penalty_points,
            request.driver,
            request.issuer,
            request.date.unwrap_or_else(Utc::now),
        );
        let event = FineEvent::FineIssued {
            fine: fine.id.clone(),
            driver: fine.driver.clone(),
            issuer: fine.issuer.clone(),
            penalty_points: fine.penalty_points,
        };

        info!(fine = %fine.id, driver = %fine.driver, points = %fine.penalty_points, "Issuing fine");
        self.fines.add(fine).await?;
        Ok(vec![event])
    }

    /// Dispatches a driver decision to [`Self::accept_fine`] or [`Self::reject_fine`].
    pub async fn handle(&self, command: FineCommand) -> Result<Vec<FineEvent>> {
        debug!(fine = %command.fine(), ?command, "Handling driver decision");
        match command {
            FineCommand::Accept { fine } => self.accept_fine(&fine).await,
            FineCommand::Reject { fine } => self.reject_fine(&fine).await,
        }
    }

    /// Accepts a pending fine and re-derives the driver's license validity
    /// from all of their accepted fines.
    pub async fn accept_fine(&self, fine_id: &FineId) -> Result<Vec<FineEvent>> {
        let (_guard, fine) = self.lock_fine(fine_id).await?;

        let mut accepted = fine.clone();
        accepted.accept()?;
        let mut driver = self.load_driver(&fine.driver).await?;

        self.fines.update(accepted).await?;
        let assessment = match self.reassess_license(&mut driver).await {
            Ok(assessment) => assessment,
            Err(e) => return Err(self.roll_back(fine, e).await),
        };

        info!(
            fine = %fine_id,
            driver = %driver.id,
            accrued_points = %assessment.accrued_points,
            license_valid = assessment.license_valid,
            "Fine accepted"
        );

        let mut events = vec![FineEvent::FineAccepted {
            fine: fine_id.clone(),
            driver: driver.id.clone(),
            accrued_points: assessment.accrued_points,
        }];
        if assessment.invalidated() {
            warn!(driver = %driver.id, accrued_points = %assessment.accrued_points, "License invalidated");
            events.push(FineEvent::LicenseInvalidated {
                driver: driver.id,
                accrued_points: assessment.accrued_points,
            });
        }
        Ok(events)
    }

    /// Rejects a pending fine and opens a court case for it.
    ///
    /// A case already stored for the fine, left behind by an earlier attempt
    /// whose fine write was rolled back, is reused instead of opening another.
    pub async fn reject_fine(&self, fine_id: &FineId) -> Result<Vec<FineEvent>> {
        let (_guard, fine) = self.lock_fine(fine_id).await?;

        let mut rejected = fine.clone();
        rejected.reject()?;
        let (case, opened) = match self.court_cases.find_by_fine(fine_id).await? {
            Some(case) => {
                warn!(fine = %fine_id, case = %case.id, "Reusing court case from an earlier attempt");
                (case, false)
            }
            None => (resolution::open_court_case(&rejected)?, true),
        };

        self.fines.update(rejected).await?;
        if opened && let Err(e) = self.court_cases.add(case.clone()).await {
            return Err(self.roll_back(fine, e).await);
        }

        info!(fine = %fine_id, case = %case.id, "Fine rejected, court case opened");
        Ok(vec![FineEvent::FineRejected {
            fine: case.fine,
            case: case.id,
        }])
    }

    pub async fn fine(&self, fine_id: &FineId) -> Result<Fine> {
        self.load_fine(fine_id).await
    }

    pub async fn driver(&self, driver_id: &DriverId) -> Result<Driver> {
        self.load_driver(driver_id).await
    }

    pub async fn court_case_for(&self, fine_id: &FineId) -> Result<Option<CourtCase>> {
        self.court_cases.find_by_fine(fine_id).await
    }

    pub async fn court_cases(&self) -> Result<Vec<CourtCase>> {
        let mut cases = self.court_cases.all_cases().await?;
        cases.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(cases)
    }

    /// Reports every driver's accepted points and license validity, sorted by driver id.
    pub async fn driver_reports(&self) -> Result<Vec<DriverReport>> {
        let mut reports = Vec::new();
        for driver in self.drivers.all_drivers().await? {
            let accepted = self
                .fines
                .list_by_driver(&driver.id, Some(FineState::Accepted))
                .await?;
            reports.push(DriverReport {
                points: resolution::accrued_points(&driver, &accepted),
                license_valid: driver.license_valid(),
                driver: driver.id,
                first_name: driver.first_name,
                last_name: driver.last_name,
            });
        }
        reports.sort_by(|a, b| a.driver.cmp(&b.driver));
        Ok(reports)
    }

    /// Takes the lock of the fine's driver and returns the fine as stored
    /// once the lock is held.
    async fn lock_fine(&self, fine_id: &FineId) -> Result<(DriverGuard, Fine)> {
        let driver = self.load_fine(fine_id).await?.driver;
        let guard = self.locks.acquire(&driver).await;
        let fine = self.load_fine(fine_id).await?;
        Ok((guard, fine))
    }

    async fn reassess_license(&self, driver: &mut Driver) -> Result<LicenseAssessment> {
        let accepted = self
            .fines
            .list_by_driver(&driver.id, Some(FineState::Accepted))
            .await?;
        let assessment = resolution::assess_license(driver, &accepted);
        self.drivers.update(driver.clone()).await?;
        Ok(assessment)
    }

    /// Restores `previous` after `cause` interrupted a resolution and returns
    /// the error to hand back to the caller.
    async fn roll_back(&self, previous: Fine, cause: FineError) -> FineError {
        let fine_id = previous.id.clone();
        match self.fines.update(previous).await {
            Ok(()) => {
                warn!(fine = %fine_id, error = %cause, "Rolled back fine after failed resolution");
                cause
            }
            Err(e) => {
                error!(fine = %fine_id, error = %cause, rollback_error = %e, "Failed to roll back fine");
                FineError::RollbackFailed {
                    fine: fine_id,
                    cause: Box::new(cause),
                    rollback: Box::new(e),
                }
            }
        }
    }

    async fn load_fine(&self, fine_id: &FineId) -> Result<Fine> {
        self.fines
            .get(fine_id)
            .await?
            .ok_or_else(|| FineError::not_found(RecordKind::Fine, fine_id))
    }

    async fn load_driver(&self, driver_id: &DriverId) -> Result<Driver> {
        self.drivers
            .get(driver_id)
            .await?
            .ok_or_else(|| FineError::not_found(RecordKind::Driver, driver_id))
    }
}
