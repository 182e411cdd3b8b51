//! Per-farmer mutation locks.
//!
//! Every farmer has at most one active lifecycle, so keying the lock by farmer
//! email serializes all load, mutate and save sequences on that instance while
//! leaving other farmers fully parallel. An entry lives only while someone
//! holds or waits for it.
//!
//! ```
//! # tokio_test::block_on(async {
//! use cropmind_core::services::InstanceLocks;
//!
//! let locks = InstanceLocks::new();
//! let guard = locks.acquire("farmer@example.in").await;
//! assert_eq!(locks.len(), 1);
//! drop(guard);
//! assert!(locks.is_empty());
//! # });
//! ```

use dashmap::DashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<String, Arc<Mutex<()>>>;

#[derive(Debug, Default)]
pub struct InstanceLocks {
    locks: Arc<LockTable>,
}

impl InstanceLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to the farmer's lifecycle
    pub async fn acquire(&self, farmer_email: &str) -> FarmerLockGuard {
        let lock = self
            .locks
            .entry(farmer_email.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        FarmerLockGuard {
            guard: Some(lock.lock_owned().await),
            farmer_email: farmer_email.to_string(),
            locks: Arc::clone(&self.locks),
        }
    }

    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }
}

/// Held lock on one farmer; the table entry is dropped with the last holder
#[derive(Debug)]
pub struct FarmerLockGuard {
    guard: Option<OwnedMutexGuard<()>>,
    farmer_email: String,
    locks: Arc<LockTable>,
}

impl Drop for FarmerLockGuard {
    fn drop(&mut self) {
        // Release first so our own handle no longer counts
        drop(self.guard.take());
        // Waiters hold a clone of the Arc, so only an idle entry has count 1
        self.locks
            .remove_if(&self.farmer_email, |_, lock| Arc::strong_count(lock) == 1);
    }
}
