use std::collections::HashMap;
use std::time::Duration;

use parking_lot::{Mutex, RwLock};

use super::account::{Account, AccountNumber, UserId};
use super::amount::checked_apply;
use super::error::StoreError;
use super::Decimal;

/// Holds per-user account state.
///
/// Every balance mutation goes through [`AccountStore::adjust_balance`], which reads,
/// checks and writes as one atomic step so concurrent callers cannot lose updates.
pub trait AccountStore: Send + Sync {
    /// Create a zero-balance account for `owner`. One account per user, numbers are unique.
    fn provision(&self, owner: &str, number: &str) -> Result<Account, StoreError>;

    /// Resolve the account number owned by `owner`.
    fn account_of(&self, owner: &str) -> Result<AccountNumber, StoreError>;

    /// Copy of the account's current state.
    fn snapshot(&self, number: &str) -> Result<Account, StoreError>;

    fn exists(&self, number: &str) -> Result<bool, StoreError>;

    fn get_balance(&self, number: &str) -> Result<Decimal, StoreError> {
        self.snapshot(number).map(|account| account.balance())
    }

    /// Atomically add `delta` to the balance, failing with `InsufficientFunds` if the result
    /// would drop below `min_balance_after`. Returns the new balance.
    fn adjust_balance(
        &self,
        number: &str,
        delta: Decimal,
        min_balance_after: Decimal,
    ) -> Result<Decimal, StoreError>;

    /// Every account, ordered by account number.
    fn all(&self) -> Result<Vec<Account>, StoreError>;
}

#[derive(Debug, Default)]
struct Accounts {
    by_number: HashMap<AccountNumber, Mutex<Account>>,
    by_owner: HashMap<UserId, AccountNumber>,
}

/// In-memory [`AccountStore`]: a map guarded by a read/write lock, each account behind its own
/// mutex so adjustments on different accounts never contend.
#[derive(Debug)]
pub struct InMemoryAccountStore {
    accounts: RwLock<Accounts>,
    lock_timeout: Duration,
}

impl Default for InMemoryAccountStore {
    fn default() -> Self {
        Self::new(Duration::from_secs(5))
    }
}

impl InMemoryAccountStore {
    pub fn new(lock_timeout: Duration) -> Self {
        log::trace!("InMemoryAccountStore initialized");
        Self {
            accounts: RwLock::new(Accounts::default()),
            lock_timeout,
        }
    }

    fn with_account<T>(
        &self,
        number: &str,
        f: impl FnOnce(&mut Account) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let accounts = self.accounts.read();
        let slot = accounts
            .by_number
            .get(number)
            .ok_or_else(|| StoreError::NotFound {
                account: number.to_string(),
            })?;
        let mut account = slot
            .try_lock_for(self.lock_timeout)
            .ok_or_else(|| StoreError::Timeout {
                account: number.to_string(),
            })?;
        f(&mut account)
    }
}

impl AccountStore for InMemoryAccountStore {
    fn provision(&self, owner: &str, number: &str) -> Result<Account, StoreError> {
        let mut accounts = self.accounts.write();

        if accounts.by_number.contains_key(number) {
            return Err(StoreError::DuplicateAccount {
                account: number.to_string(),
            });
        }
        if accounts.by_owner.contains_key(owner) {
            return Err(StoreError::DuplicateOwner {
                user: owner.to_string(),
            });
        }

        let account = Account::new(number.to_string(), owner.to_string());
        accounts
            .by_number
            .insert(number.to_string(), Mutex::new(account.clone()));
        accounts
            .by_owner
            .insert(owner.to_string(), number.to_string());

        log::debug!("[provision] Created account {number} for user {owner}");
        Ok(account)
    }

    fn account_of(&self, owner: &str) -> Result<AccountNumber, StoreError> {
        self.accounts
            .read()
            .by_owner
            .get(owner)
            .cloned()
            .ok_or_else(|| StoreError::NoAccountForUser {
                user: owner.to_string(),
            })
    }

    fn snapshot(&self, number: &str) -> Result<Account, StoreError> {
        self.with_account(number, |account| Ok(account.clone()))
    }

    fn exists(&self, number: &str) -> Result<bool, StoreError> {
        Ok(self.accounts.read().by_number.contains_key(number))
    }

    fn adjust_balance(
        &self,
        number: &str,
        delta: Decimal,
        min_balance_after: Decimal,
    ) -> Result<Decimal, StoreError> {
        self.with_account(number, |account| {
            let new_balance =
                checked_apply(account.balance(), delta).ok_or_else(|| StoreError::AmountOverflow {
                    account: number.to_string(),
                })?;

            if new_balance < min_balance_after {
                return Err(StoreError::InsufficientFunds {
                    account: number.to_string(),
                    available: account.balance(),
                    requested: -delta,
                });
            }

            account.apply(delta, new_balance);
            log::trace!("[adjust] account={number} delta={delta} -> new_balance={new_balance}");
            Ok(new_balance)
        })
    }

    fn all(&self) -> Result<Vec<Account>, StoreError> {
        let accounts = self.accounts.read();
        let mut all = Vec::with_capacity(accounts.by_number.len());
        for (number, slot) in &accounts.by_number {
            let account = slot
                .try_lock_for(self.lock_timeout)
                .ok_or_else(|| StoreError::Timeout {
                    account: number.clone(),
                })?;
            all.push(account.clone());
        }
        all.sort_by(|a, b| a.number().cmp(b.number()));
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Barrier};
    use std::thread;

    fn store_with(balance: Decimal) -> InMemoryAccountStore {
        let store = InMemoryAccountStore::default();
        store.provision("alice", "1000000001").unwrap();
        if balance > Decimal::ZERO {
            store
                .adjust_balance("1000000001", balance, Decimal::ZERO)
                .unwrap();
        }
        store
    }

    #[test]
    fn test_provision_starts_at_zero() {
        let store = InMemoryAccountStore::default();
        let account = store.provision("alice", "1000000001").unwrap();

        assert_eq!(account.balance(), Decimal::ZERO);
        assert_eq!(store.account_of("alice").unwrap(), "1000000001");
        assert!(store.exists("1000000001").unwrap());
        assert!(!store.exists("1000000002").unwrap());
    }

    #[test]
    fn test_provision_rejects_duplicates() {
        let store = InMemoryAccountStore::default();
        store.provision("alice", "1000000001").unwrap();

        assert!(matches!(
            store.provision("bob", "1000000001"),
            Err(StoreError::DuplicateAccount { .. })
        ));
        assert!(matches!(
            store.provision("alice", "1000000002"),
            Err(StoreError::DuplicateOwner { .. })
        ));
    }

    #[test]
    fn test_adjust_balance_debits_and_credits() {
        let store = store_with(dec!(500.00));

        assert_eq!(
            store
                .adjust_balance("1000000001", dec!(-200.00), Decimal::ZERO)
                .unwrap(),
            dec!(300.00)
        );
        assert_eq!(store.get_balance("1000000001").unwrap(), dec!(300.00));

        let account = store.snapshot("1000000001").unwrap();
        assert_eq!(account.total_deposit(), dec!(500.00));
        assert_eq!(account.total_withdrawal(), dec!(200.00));
    }

    #[test]
    fn test_adjust_balance_refuses_to_go_below_minimum() {
        let store = store_with(dec!(50.00));

        let err = store
            .adjust_balance("1000000001", dec!(-100.00), Decimal::ZERO)
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::InsufficientFunds {
                account: "1000000001".into(),
                available: dec!(50.00),
                requested: dec!(100.00),
            }
        );
        assert_eq!(store.get_balance("1000000001").unwrap(), dec!(50.00));
    }

    #[test]
    fn test_adjust_balance_overflow() {
        let store = store_with(crate::engine::amount::MAX_AMOUNT);

        assert!(matches!(
            store.adjust_balance("1000000001", dec!(0.01), Decimal::ZERO),
            Err(StoreError::AmountOverflow { .. })
        ));
    }

    #[test]
    fn test_unknown_account_is_not_found() {
        let store = InMemoryAccountStore::default();
        assert!(matches!(
            store.adjust_balance("nope", dec!(1), Decimal::ZERO),
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.account_of("nobody"),
            Err(StoreError::NoAccountForUser { .. })
        ));
    }

    #[test]
    fn test_concurrent_debits_never_overdraw() {
        let store = Arc::new(store_with(dec!(100.00)));
        let barrier = Arc::new(Barrier::new(8));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                let barrier = Arc::clone(&barrier);
                thread::spawn(move || {
                    barrier.wait();
                    store
                        .adjust_balance("1000000001", dec!(-30.00), Decimal::ZERO)
                        .is_ok()
                })
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 3);
        assert_eq!(store.get_balance("1000000001").unwrap(), dec!(10.00));
    }

    #[test]
    fn test_all_is_ordered_by_number() {
        let store = InMemoryAccountStore::default();
        store.provision("bob", "2").unwrap();
        store.provision("alice", "1").unwrap();

        let numbers: Vec<_> = store
            .all()
            .unwrap()
            .iter()
            .map(|a| a.number().to_string())
            .collect();
        assert_eq!(numbers, ["1", "2"]);
    }
}
