use crate::domain::ids::DriverId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = Arc<Mutex<HashMap<DriverId, Arc<AsyncMutex<()>>>>>;

/// One async mutex per driver.
///
/// Held across the whole read-modify-write of a command so two acceptances
/// for the same driver cannot both recompute from a stale aggregate. A
/// driver's entry is dropped once nobody holds or waits on its lock.
#[derive(Default)]
pub struct DriverLocks {
    locks: LockMap,
}

/// Holds a driver's lock until dropped.
pub struct DriverGuard {
    guard: Option<OwnedMutexGuard<()>>,
    driver: DriverId,
    locks: LockMap,
}

impl DriverLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, driver: &DriverId) -> DriverGuard {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(driver.clone()).or_default())
        };
        DriverGuard {
            guard: Some(lock.lock_owned().await),
            driver: driver.clone(),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of drivers with a live lock entry.
    pub fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl Drop for DriverGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Waiters and holders each keep a clone; only the map's copy left means idle.
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.driver)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.driver);
        }
    }
}
