//! Non-reentrant scope guard for balance-mutating entrypoints.
//!
//! The lock is a shared flag rather than a borrow of the ledger so a host, or
//! a transfer callback holding a clone, can observe that a call is in flight.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::error::{LedgerError, Result};

#[derive(Debug, Clone, Default)]
pub struct ReentrancyLock(Arc<AtomicBool>);

impl ReentrancyLock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for the lifetime of the returned guard.
    pub fn enter(&self) -> Result<ReentrancyGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| LedgerError::ReentrantCall)?;
        Ok(ReentrancyGuard { flag: Arc::clone(&self.0) })
    }

    pub fn is_locked(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases the lock on drop, on every exit path.
#[derive(Debug)]
pub struct ReentrancyGuard {
    flag: Arc<AtomicBool>,
}

impl Drop for ReentrancyGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_enter_is_rejected_until_release() {
        let lock = ReentrancyLock::new();
        let guard = lock.enter().unwrap();
        assert!(lock.is_locked());
        assert_eq!(lock.clone().enter().unwrap_err(), LedgerError::ReentrantCall);

        drop(guard);
        assert!(!lock.is_locked());
        assert!(lock.enter().is_ok());
    }

    #[test]
    fn guard_releases_on_error_path() {
        fn failing(lock: &ReentrancyLock) -> Result<()> {
            let _guard = lock.enter()?;
            Err(LedgerError::ZeroAmount)
        }

        let lock = ReentrancyLock::new();
        assert!(failing(&lock).is_err());
        assert!(!lock.is_locked());
    }
}
