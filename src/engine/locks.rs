use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Mutex, MutexGuard};

use super::account::AccountNumber;
use super::error::StoreError;

/// Per-account mutual exclusion for the engine's atomic unit.
///
/// A transfer holds the locks of every account it touches from the debit until the ledger
/// append. Locks are always taken in ascending account-number order, so two transfers between
/// the same pair of accounts in opposite directions cannot deadlock.
#[derive(Debug, Default)]
pub(crate) struct AccountLocks {
    locks: Mutex<HashMap<AccountNumber, Arc<Mutex<()>>>>,
}

/// Lock handles for a set of accounts, sorted and deduplicated.
pub(crate) struct LockSet {
    handles: Vec<(AccountNumber, Arc<Mutex<()>>)>,
}

impl AccountLocks {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn handles(&self, accounts: &[&str]) -> LockSet {
        let mut numbers: Vec<&str> = accounts.to_vec();
        numbers.sort_unstable();
        numbers.dedup();

        let mut locks = self.locks.lock();
        let handles = numbers
            .into_iter()
            .map(|number| {
                let lock = locks.entry(number.to_string()).or_default();
                (number.to_string(), Arc::clone(lock))
            })
            .collect();
        LockSet { handles }
    }
}

impl LockSet {
    /// Acquire every lock in order, giving up with `Timeout` on the first one that stays busy.
    pub(crate) fn acquire(&self, timeout: Duration) -> Result<Vec<MutexGuard<'_, ()>>, StoreError> {
        self.handles
            .iter()
            .map(|(number, lock)| {
                lock.try_lock_for(timeout).ok_or_else(|| {
                    log::warn!("[locks] Timed out after {timeout:?} waiting for account {number}");
                    StoreError::Timeout {
                        account: number.clone(),
                    }
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn test_handles_are_sorted_and_deduplicated() {
        let locks = AccountLocks::new();
        let set = locks.handles(&["b", "a", "b"]);

        let numbers: Vec<_> = set.handles.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(numbers, ["a", "b"]);
    }

    #[test]
    fn test_same_account_shares_one_lock() {
        let locks = AccountLocks::new();
        let first = locks.handles(&["a"]);
        let second = locks.handles(&["a"]);

        assert!(Arc::ptr_eq(&first.handles[0].1, &second.handles[0].1));
    }

    #[test]
    fn test_busy_account_times_out() {
        let locks = Arc::new(AccountLocks::new());
        let set = locks.handles(&["a", "b"]);
        let _guards = set.acquire(Duration::from_millis(10)).unwrap();

        let (tx, rx) = mpsc::channel();
        let contender = Arc::clone(&locks);
        thread::spawn(move || {
            let set = contender.handles(&["b"]);
            tx.send(set.acquire(Duration::from_millis(20)).map(|g| g.len()))
                .unwrap();
        });

        assert_eq!(
            rx.recv().unwrap(),
            Err(StoreError::Timeout {
                account: "b".into()
            })
        );
    }

    #[test]
    fn test_released_account_can_be_reacquired() {
        let locks = AccountLocks::new();
        let set = locks.handles(&["a"]);
        {
            let guards = set.acquire(Duration::from_millis(10)).unwrap();
            assert_eq!(guards.len(), 1);
        }
        assert!(set.acquire(Duration::from_millis(10)).is_ok());
    }
}
