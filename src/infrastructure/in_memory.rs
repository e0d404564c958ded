use crate::application::engine::Registries;
use crate::domain::driver::{Driver, LawEnforcer};
use crate::domain::fine::{CourtCase, Fine, FineState};
use crate::domain::ids::{CaseId, DriverId, FineId, LawEnforcerId};
use crate::domain::ports::{CourtCaseStore, DriverStore, FineStore, LawEnforcerStore};
use crate::error::{FineError, RecordKind, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Builds a fresh set of empty in-memory stores.
pub fn in_memory_registries() -> Registries {
    Registries {
        fines: Box::new(InMemoryFineStore::new()),
        drivers: Box::new(InMemoryDriverStore::new()),
        court_cases: Box::new(InMemoryCourtCaseStore::new()),
        law_enforcers: Box::new(InMemoryLawEnforcerStore::new()),
    }
}

/// A thread-safe in-memory store for fines.
///
/// Uses `Arc<RwLock<HashMap<FineId, Fine>>>` so clones share the same map.
/// Listing by driver scans every fine, which is fine for tests and small runs.
#[derive(Default, Clone)]
pub struct InMemoryFineStore {
    fines: Arc<RwLock<HashMap<FineId, Fine>>>,
}

impl InMemoryFineStore {
    /// Creates a new, empty in-memory fine store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FineStore for InMemoryFineStore {
    async fn get(&self, id: &FineId) -> Result<Option<Fine>> {
        let fines = self.fines.read().await;
        Ok(fines.get(id).cloned())
    }

    async fn add(&self, fine: Fine) -> Result<()> {
        let mut fines = self.fines.write().await;
        match fines.entry(fine.id.clone()) {
            Entry::Occupied(_) => Err(FineError::already_exists(RecordKind::Fine, &fine.id)),
            Entry::Vacant(slot) => {
                slot.insert(fine);
                Ok(())
            }
        }
    }

    async fn update(&self, fine: Fine) -> Result<()> {
        let mut fines = self.fines.write().await;
        match fines.get_mut(&fine.id) {
            Some(stored) => {
                *stored = fine;
                Ok(())
            }
            None => Err(FineError::not_found(RecordKind::Fine, &fine.id)),
        }
    }

    async fn list_by_driver(
        &self,
        driver: &DriverId,
        state: Option<FineState>,
    ) -> Result<Vec<Fine>> {
        let fines = self.fines.read().await;
        let mut matching: Vec<Fine> = fines
            .values()
            .filter(|fine| &fine.driver == driver)
            .filter(|fine| state.is_none_or(|s| fine.state == s))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(matching)
    }
}

/// A thread-safe in-memory store for drivers.
#[derive(Default, Clone)]
pub struct InMemoryDriverStore {
    drivers: Arc<RwLock<HashMap<DriverId, Driver>>>,
}

impl InMemoryDriverStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DriverStore for InMemoryDriverStore {
    async fn get(&self, id: &DriverId) -> Result<Option<Driver>> {
        let drivers = self.drivers.read().await;
        Ok(drivers.get(id).cloned())
    }

    async fn add(&self, driver: Driver) -> Result<()> {
        let mut drivers = self.drivers.write().await;
        match drivers.entry(driver.id.clone()) {
            Entry::Occupied(_) => Err(FineError::already_exists(RecordKind::Driver, &driver.id)),
            Entry::Vacant(slot) => {
                slot.insert(driver);
                Ok(())
            }
        }
    }

    async fn update(&self, driver: Driver) -> Result<()> {
        let mut drivers = self.drivers.write().await;
        match drivers.get_mut(&driver.id) {
            Some(stored) => {
                *stored = driver;
                Ok(())
            }
            None => Err(FineError::not_found(RecordKind::Driver, &driver.id)),
        }
    }

    async fn all_drivers(&self) -> Result<Vec<Driver>> {
        let drivers = self.drivers.read().await;
        let mut all: Vec<Driver> = drivers.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

/// A thread-safe in-memory store for court cases, indexed by case and by fine.
#[derive(Default, Clone)]
pub struct InMemoryCourtCaseStore {
    cases: Arc<RwLock<HashMap<CaseId, CourtCase>>>,
}

impl InMemoryCourtCaseStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CourtCaseStore for InMemoryCourtCaseStore {
    async fn add(&self, case: CourtCase) -> Result<()> {
        let mut cases = self.cases.write().await;
        if cases.values().any(|existing| existing.fine == case.fine) {
            return Err(FineError::already_exists(
                RecordKind::CourtCase,
                format!("for fine {}", case.fine),
            ));
        }
        match cases.entry(case.id.clone()) {
            Entry::Occupied(_) => Err(FineError::already_exists(RecordKind::CourtCase, &case.id)),
            Entry::Vacant(slot) => {
                slot.insert(case);
                Ok(())
            }
        }
    }

    async fn get(&self, id: &CaseId) -> Result<Option<CourtCase>> {
        let cases = self.cases.read().await;
        Ok(cases.get(id).cloned())
    }

    async fn find_by_fine(&self, fine: &FineId) -> Result<Option<CourtCase>> {
        let cases = self.cases.read().await;
        Ok(cases.values().find(|case| &case.fine == fine).cloned())
    }

    async fn all_cases(&self) -> Result<Vec<CourtCase>> {
        let cases = self.cases.read().await;
        let mut all: Vec<CourtCase> = cases.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }
}

/// A thread-safe in-memory registry of law enforcers.
#[derive(Default, Clone)]
pub struct InMemoryLawEnforcerStore {
    law_enforcers: Arc<RwLock<HashMap<LawEnforcerId, LawEnforcer>>>,
}

impl InMemoryLawEnforcerStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LawEnforcerStore for InMemoryLawEnforcerStore {
    async fn get(&self, id: &LawEnforcerId) -> Result<Option<LawEnforcer>> {
        let law_enforcers = self.law_enforcers.read().await;
        Ok(law_enforcers.get(id).cloned())
    }

    async fn add(&self, law_enforcer: LawEnforcer) -> Result<()> {
        let mut law_enforcers = self.law_enforcers.write().await;
        match law_enforcers.entry(law_enforcer.id.clone()) {
            Entry::Occupied(_) => Err(FineError::already_exists(
                RecordKind::LawEnforcer,
                &law_enforcer.id,
            )),
            Entry::Vacant(slot) => {
                slot.insert(law_enforcer);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::driver::LawEnforcerType;
    use crate::domain::fine::PenaltyPoints;
    use chrono::Utc;

    fn fine(id: &str, driver: &str, points: u32) -> Fine {
        Fine::issue(
            FineId::from(id),
            PenaltyPoints::new(points),
            DriverId::from(driver),
            LawEnforcerId::from("police1"),
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_in_memory_fine_store() {
        let store = InMemoryFineStore::new();
        let f1 = fine("f1", "driver1", 10);

        store.add(f1.clone()).await.unwrap();
        let retrieved = store.get(&FineId::from("f1")).await.unwrap().unwrap();
        assert_eq!(retrieved, f1);

        assert!(store.get(&FineId::from("f2")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_in_memory_fine_store_rejects_duplicate_add() {
        let store = InMemoryFineStore::new();
        store.add(fine("f1", "driver1", 10)).await.unwrap();

        let result = store.add(fine("f1", "driver1", 3)).await;
        assert!(matches!(result, Err(FineError::AlreadyExists { .. })));
        let stored = store.get(&FineId::from("f1")).await.unwrap().unwrap();
        assert_eq!(stored.penalty_points, PenaltyPoints::new(10));
    }

    #[tokio::test]
    async fn test_in_memory_fine_store_update_requires_existing() {
        let store = InMemoryFineStore::new();
        let result = store.update(fine("f1", "driver1", 10)).await;
        assert!(matches!(result, Err(FineError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_in_memory_list_by_driver_filters_state() {
        let store = InMemoryFineStore::new();
        store.add(fine("f1", "driver1", 10)).await.unwrap();
        store.add(fine("f2", "driver1", 7)).await.unwrap();
        store.add(fine("f3", "driver2", 5)).await.unwrap();

        let mut accepted = fine("f1", "driver1", 10);
        accepted.accept().unwrap();
        store.update(accepted).await.unwrap();

        let driver1 = DriverId::from("driver1");
        let all = store.list_by_driver(&driver1, None).await.unwrap();
        assert_eq!(all.len(), 2);

        let only_accepted = store
            .list_by_driver(&driver1, Some(FineState::Accepted))
            .await
            .unwrap();
        assert_eq!(only_accepted.len(), 1);
        assert_eq!(only_accepted[0].id, FineId::from("f1"));
    }

    #[tokio::test]
    async fn test_in_memory_driver_store() {
        let store = InMemoryDriverStore::new();
        let driver = Driver::new(DriverId::from("driver1"), "Alice", "A");

        store.add(driver.clone()).await.unwrap();
        assert!(matches!(
            store.add(driver.clone()).await,
            Err(FineError::AlreadyExists { .. })
        ));

        let all = store.all_drivers().await.unwrap();
        assert_eq!(all, vec![driver]);

        let missing = Driver::new(DriverId::from("driver9"), "Nobody", "N");
        assert!(matches!(
            store.update(missing).await,
            Err(FineError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_in_memory_court_case_store() {
        let store = InMemoryCourtCaseStore::new();
        let case = CourtCase {
            id: CaseId::from("case1"),
            fine: FineId::from("f1"),
            opened_at: Utc::now(),
        };

        store.add(case.clone()).await.unwrap();
        assert!(matches!(
            store.add(case.clone()).await,
            Err(FineError::AlreadyExists { .. })
        ));

        let by_fine = store.find_by_fine(&FineId::from("f1")).await.unwrap();
        assert_eq!(by_fine, Some(case.clone()));
        assert!(
            store
                .find_by_fine(&FineId::from("f2"))
                .await
                .unwrap()
                .is_none()
        );
        assert_eq!(store.get(&case.id).await.unwrap(), Some(case));
    }

    #[tokio::test]
    async fn test_in_memory_one_case_per_fine() {
        let store = InMemoryCourtCaseStore::new();
        let opened_at = Utc::now();
        store
            .add(CourtCase {
                id: CaseId::from("case1"),
                fine: FineId::from("f1"),
                opened_at,
            })
            .await
            .unwrap();

        let second = store
            .add(CourtCase {
                id: CaseId::from("case2"),
                fine: FineId::from("f1"),
                opened_at,
            })
            .await;
        assert!(matches!(second, Err(FineError::AlreadyExists { .. })));
        assert_eq!(store.all_cases().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_in_memory_law_enforcer_store() {
        let store = InMemoryLawEnforcerStore::new();
        let police = LawEnforcer::new(LawEnforcerId::from("police1"), LawEnforcerType::Police);

        store.add(police.clone()).await.unwrap();
        let retrieved = store.get(&police.id).await.unwrap();
        assert_eq!(retrieved, Some(police));
    }
}
