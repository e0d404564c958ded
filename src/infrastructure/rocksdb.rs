use crate::application::engine::Registries;
use crate::domain::driver::{Driver, LawEnforcer};
use crate::domain::fine::{CourtCase, Fine, FineState};
use crate::domain::ids::{CaseId, DriverId, FineId, LawEnforcerId};
use crate::domain::ports::{CourtCaseStore, DriverStore, FineStore, LawEnforcerStore};
use crate::error::{FineError, RecordKind, Result};
use async_trait::async_trait;
use rocksdb::{
    ColumnFamily, ColumnFamilyDescriptor, DB, Direction, IteratorMode, Options, WriteBatch,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Column Family for fine records.
pub const CF_FINES: &str = "fines";
/// Column Family indexing fines by driver (`driver \0 fine` -> empty).
pub const CF_FINES_BY_DRIVER: &str = "fines_by_driver";
/// Column Family for driver records.
pub const CF_DRIVERS: &str = "drivers";
/// Column Family for court cases.
pub const CF_COURT_CASES: &str = "court_cases";
/// Column Family indexing court cases by fine (`fine` -> case id).
pub const CF_CASES_BY_FINE: &str = "cases_by_fine";
/// Column Family for law enforcers.
pub const CF_LAW_ENFORCERS: &str = "law_enforcers";

const COLUMN_FAMILIES: [&str; 6] = [
    CF_FINES,
    CF_FINES_BY_DRIVER,
    CF_DRIVERS,
    CF_COURT_CASES,
    CF_CASES_BY_FINE,
    CF_LAW_ENFORCERS,
];

/// A persistent store implementation using RocksDB.
///
/// Backs every port with its own Column Family and stores records as JSON.
/// The two index families serve `list_by_driver` and `find_by_fine` without
/// a full scan.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
/// Writes go through a shared write lock so an existence check and the
/// batch that follows it cannot interleave with another writer.
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
    writes: Arc<Mutex<()>>,
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path, creating
    /// any missing column family.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let descriptors = COLUMN_FAMILIES
            .iter()
            .map(|name| ColumnFamilyDescriptor::new(*name, Options::default()))
            .collect::<Vec<_>>();

        let db = DB::open_cf_descriptors(&opts, path, descriptors)?;

        Ok(Self {
            db: Arc::new(db),
            writes: Arc::new(Mutex::new(())),
        })
    }

    /// Hands out the same database behind every store port.
    pub fn registries(&self) -> Registries {
        Registries {
            fines: Box::new(self.clone()),
            drivers: Box::new(self.clone()),
            court_cases: Box::new(self.clone()),
            law_enforcers: Box::new(self.clone()),
        }
    }

    fn cf(&self, name: &str) -> Result<&ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| FineError::store_failure(format!("Column family {name} not found")))
    }

    fn get_json<T: DeserializeOwned>(&self, cf: &str, key: &str) -> Result<Option<T>> {
        let cf = self.cf(cf)?;
        match self.db.get_pinned_cf(cf, key.as_bytes())? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    fn put_json<T: Serialize>(&self, cf: &str, key: &str, value: &T) -> Result<()> {
        let cf = self.cf(cf)?;
        let bytes = serde_json::to_vec(value)?;
        self.db.put_cf(cf, key.as_bytes(), bytes)?;
        Ok(())
    }

    /// Stages a JSON record in `batch` without writing it.
    fn batch_json<T: Serialize>(
        &self,
        batch: &mut WriteBatch,
        cf: &str,
        key: &[u8],
        value: &T,
    ) -> Result<()> {
        batch.put_cf(self.cf(cf)?, key, serde_json::to_vec(value)?);
        Ok(())
    }

    fn contains(&self, cf: &str, key: &str) -> Result<bool> {
        let cf = self.cf(cf)?;
        Ok(self.db.get_pinned_cf(cf, key.as_bytes())?.is_some())
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn all_json<T: DeserializeOwned>(&self, cf: &str) -> Result<Vec<T>> {
        let cf = self.cf(cf)?;
        let mut records = Vec::new();
        for item in self.db.iterator_cf(cf, IteratorMode::Start) {
            let (_key, value) = item?;
            records.push(serde_json::from_slice(&value)?);
        }
        Ok(records)
    }

    fn driver_index_key(driver: &DriverId, fine: &FineId) -> Vec<u8> {
        let mut key = driver_index_prefix(driver);
        key.extend_from_slice(fine.as_str().as_bytes());
        key
    }
}

fn driver_index_prefix(driver: &DriverId) -> Vec<u8> {
    let mut prefix = driver.as_str().as_bytes().to_vec();
    prefix.push(0);
    prefix
}

#[async_trait]
impl FineStore for RocksDBStore {
    async fn get(&self, id: &FineId) -> Result<Option<Fine>> {
        self.get_json(CF_FINES, id.as_str())
    }

    async fn add(&self, fine: Fine) -> Result<()> {
        let _writes = self.lock_writes();
        if self.contains(CF_FINES, fine.id.as_str())? {
            return Err(FineError::already_exists(RecordKind::Fine, &fine.id));
        }

        let mut batch = WriteBatch::default();
        batch.put_cf(
            self.cf(CF_FINES_BY_DRIVER)?,
            Self::driver_index_key(&fine.driver, &fine.id),
            b"",
        );
        self.batch_json(&mut batch, CF_FINES, fine.id.as_str().as_bytes(), &fine)?;
        self.db.write(batch)?;
        Ok(())
    }

    async fn update(&self, fine: Fine) -> Result<()> {
        let _writes = self.lock_writes();
        if !self.contains(CF_FINES, fine.id.as_str())? {
            return Err(FineError::not_found(RecordKind::Fine, &fine.id));
        }
        self.put_json(CF_FINES, fine.id.as_str(), &fine)
    }

    async fn list_by_driver(
        &self,
        driver: &DriverId,
        state: Option<FineState>,
    ) -> Result<Vec<Fine>> {
        let index = self.cf(CF_FINES_BY_DRIVER)?;
        let prefix = driver_index_prefix(driver);

        let mut fine_ids = Vec::new();
        for item in self
            .db
            .iterator_cf(index, IteratorMode::From(prefix.as_slice(), Direction::Forward))
        {
            let (key, _value) = item?;
            let Some(fine_id) = key.strip_prefix(prefix.as_slice()) else {
                break;
            };
            let fine_id = String::from_utf8(fine_id.to_vec()).map_err(|e| {
                FineError::store_failure(format!("Corrupt fine index key: {e}"))
            })?;
            fine_ids.push(FineId::from(fine_id));
        }

        let mut fines = Vec::with_capacity(fine_ids.len());
        for fine_id in fine_ids {
            if let Some(fine) = self.get_json::<Fine>(CF_FINES, fine_id.as_str())?
                && state.is_none_or(|s| fine.state == s)
            {
                fines.push(fine);
            }
        }
        Ok(fines)
    }
}

#[async_trait]
impl DriverStore for RocksDBStore {
    async fn get(&self, id: &DriverId) -> Result<Option<Driver>> {
        self.get_json(CF_DRIVERS, id.as_str())
    }

    async fn add(&self, driver: Driver) -> Result<()> {
        let _writes = self.lock_writes();
        if self.contains(CF_DRIVERS, driver.id.as_str())? {
            return Err(FineError::already_exists(RecordKind::Driver, &driver.id));
        }
        self.put_json(CF_DRIVERS, driver.id.as_str(), &driver)
    }

    async fn update(&self, driver: Driver) -> Result<()> {
        let _writes = self.lock_writes();
        if !self.contains(CF_DRIVERS, driver.id.as_str())? {
            return Err(FineError::not_found(RecordKind::Driver, &driver.id));
        }
        self.put_json(CF_DRIVERS, driver.id.as_str(), &driver)
    }

    async fn all_drivers(&self) -> Result<Vec<Driver>> {
        self.all_json(CF_DRIVERS)
    }
}

#[async_trait]
impl CourtCaseStore for RocksDBStore {
    async fn add(&self, case: CourtCase) -> Result<()> {
        let _writes = self.lock_writes();
        if self.contains(CF_COURT_CASES, case.id.as_str())? {
            return Err(FineError::already_exists(RecordKind::CourtCase, &case.id));
        }
        if self.contains(CF_CASES_BY_FINE, case.fine.as_str())? {
            return Err(FineError::already_exists(
                RecordKind::CourtCase,
                format!("for fine {}", case.fine),
            ));
        }

        let mut batch = WriteBatch::default();
        self.batch_json(&mut batch, CF_COURT_CASES, case.id.as_str().as_bytes(), &case)?;
        self.batch_json(&mut batch, CF_CASES_BY_FINE, case.fine.as_str().as_bytes(), &case.id)?;
        self.db.write(batch)?;
        Ok(())
    }

    async fn get(&self, id: &CaseId) -> Result<Option<CourtCase>> {
        self.get_json(CF_COURT_CASES, id.as_str())
    }

    async fn find_by_fine(&self, fine: &FineId) -> Result<Option<CourtCase>> {
        match self.get_json::<CaseId>(CF_CASES_BY_FINE, fine.as_str())? {
            Some(case_id) => CourtCaseStore::get(self, &case_id).await,
            None => Ok(None),
        }
    }

    async fn all_cases(&self) -> Result<Vec<CourtCase>> {
        self.all_json(CF_COURT_CASES)
    }
}

#[async_trait]
impl LawEnforcerStore for RocksDBStore {
    async fn get(&self, id: &LawEnforcerId) -> Result<Option<LawEnforcer>> {
        self.get_json(CF_LAW_ENFORCERS, id.as_str())
    }

    async fn add(&self, law_enforcer: LawEnforcer) -> Result<()> {
        let _writes = self.lock_writes();
        if self.contains(CF_LAW_ENFORCERS, law_enforcer.id.as_str())? {
            return Err(FineError::already_exists(
                RecordKind::LawEnforcer,
                &law_enforcer.id,
            ));
        }
        self.put_json(CF_LAW_ENFORCERS, law_enforcer.id.as_str(), &law_enforcer)
    }
}
