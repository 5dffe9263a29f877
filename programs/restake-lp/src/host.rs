//! Services the host injects into the ledger: time and the admin capability.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use solana_sdk::pubkey::Pubkey;

/// Source of unix timestamps for positions, allocations and strategies.
pub trait Clock: Send + Sync {
    fn unix_timestamp(&self) -> i64;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs() as i64)
            .unwrap_or_default()
    }
}

/// Settable clock. Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock(Arc<AtomicI64>);

impl ManualClock {
    pub fn new(now: i64) -> Self {
        Self(Arc::new(AtomicI64::new(now)))
    }

    pub fn set(&self, now: i64) {
        self.0.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, secs: i64) {
        self.0.fetch_add(secs, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn unix_timestamp(&self) -> i64 {
        self.0.load(Ordering::SeqCst)
    }
}

/// Admin capability check for admin-only operations.
pub trait AccessControl: Send + Sync {
    fn is_admin(&self, caller: &Pubkey) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct AdminSet {
    admins: HashSet<Pubkey>,
}

impl AdminSet {
    pub fn new(admins: impl IntoIterator<Item = Pubkey>) -> Self {
        Self { admins: admins.into_iter().collect() }
    }

    pub fn single(admin: Pubkey) -> Self {
        Self::new([admin])
    }
}

impl AccessControl for AdminSet {
    fn is_admin(&self, caller: &Pubkey) -> bool {
        self.admins.contains(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new(100);
        let view = clock.clone();
        clock.advance(20);
        assert_eq!(view.unix_timestamp(), 120);
    }

    #[test]
    fn admin_set_membership() {
        let admin = Pubkey::new_unique();
        let other = Pubkey::new_unique();
        let set = AdminSet::new([admin, other]);
        assert!(set.is_admin(&admin));
        assert!(set.is_admin(&other));
        assert!(!set.is_admin(&Pubkey::new_unique()));
        assert!(!AdminSet::default().is_admin(&admin));
    }
}
