use super::driver::{Driver, LawEnforcer};
use super::fine::{CourtCase, Fine, FineState};
use super::ids::{CaseId, DriverId, FineId, LawEnforcerId};
use crate::error::Result;
use async_trait::async_trait;

#[async_trait]
pub trait FineStore: Send + Sync {
    async fn get(&self, id: &FineId) -> Result<Option<Fine>>;
    /// Fails with `AlreadyExists` if a fine with the same id is stored.
    async fn add(&self, fine: Fine) -> Result<()>;
    /// Fails with `NotFound` if the fine was never added.
    async fn update(&self, fine: Fine) -> Result<()>;
    /// Lists the fines referencing `driver`, optionally restricted to one state.
    ///
    /// Must reflect every update that completed before the call.
    async fn list_by_driver(
        &self,
        driver: &DriverId,
        state: Option<FineState>,
    ) -> Result<Vec<Fine>>;
}

#[async_trait]
pub trait DriverStore: Send + Sync {
    async fn get(&self, id: &DriverId) -> Result<Option<Driver>>;
    async fn add(&self, driver: Driver) -> Result<()>;
    async fn update(&self, driver: Driver) -> Result<()>;
    async fn all_drivers(&self) -> Result<Vec<Driver>>;
}

#[async_trait]
pub trait CourtCaseStore: Send + Sync {
    /// Fails with `AlreadyExists` if the case id is taken.
    async fn add(&self, case: CourtCase) -> Result<()>;
    async fn get(&self, id: &CaseId) -> Result<Option<CourtCase>>;
    async fn find_by_fine(&self, fine: &FineId) -> Result<Option<CourtCase>>;
    async fn all_cases(&self) -> Result<Vec<CourtCase>>;
}

#[async_trait]
pub trait LawEnforcerStore: Send + Sync {
    async fn get(&self, id: &LawEnforcerId) -> Result<Option<LawEnforcer>>;
    async fn add(&self, law_enforcer: LawEnforcer) -> Result<()>;
}

pub type FineStoreBox = Box<dyn FineStore>;
pub type DriverStoreBox = Box<dyn DriverStore>;
pub type CourtCaseStoreBox = Box<dyn CourtCaseStore>;
pub type LawEnforcerStoreBox = Box<dyn LawEnforcerStore>;
