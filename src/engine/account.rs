use super::amount::serialize_amount;
use super::Decimal;
use serde::{Deserialize, Serialize};

/// Opaque, unique account number.
pub type AccountNumber = String;

/// Reference to the owning user, assigned by the user-lifecycle collaborator.
pub type UserId = String;

/// A user's account: balance plus informational deposit/withdrawal counters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Account {
    #[serde(rename = "account")]
    number: AccountNumber,
    owner: UserId,
    #[serde(serialize_with = "serialize_amount")]
    balance: Decimal,
    #[serde(serialize_with = "serialize_amount")]
    total_deposit: Decimal,
    #[serde(serialize_with = "serialize_amount")]
    total_withdrawal: Decimal,
}

impl Account {
    pub(super) fn new(number: AccountNumber, owner: UserId) -> Self {
        Self {
            number,
            owner,
            balance: Decimal::ZERO,
            total_deposit: Decimal::ZERO,
            total_withdrawal: Decimal::ZERO,
        }
    }

    /// Returns the account number
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Returns the owning user
    pub fn owner(&self) -> &str {
        &self.owner
    }

    /// Returns the current balance
    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Returns the sum of every credit ever applied
    pub fn total_deposit(&self) -> Decimal {
        self.total_deposit
    }

    /// Returns the sum of every debit ever applied
    pub fn total_withdrawal(&self) -> Decimal {
        self.total_withdrawal
    }

    /// Apply a signed delta to the balance.
    /// Positive deltas count towards `total_deposit`, negative ones towards `total_withdrawal`.
    /// Caller must have checked that the new balance is in range and non-negative.
    ///
    /// # Panics (debug only)
    /// Panics if the resulting balance is negative.
    pub(super) fn apply(&mut self, delta: Decimal, new_balance: Decimal) {
        debug_assert_eq!(self.balance + delta, new_balance, "delta mismatch");
        self.balance = new_balance;
        if delta.is_sign_negative() {
            self.total_withdrawal += delta.abs();
        } else {
            self.total_deposit += delta;
        }
        #[cfg(debug_assertions)]
        self.assert_invariant();
    }

    /// Balance never goes negative, counters never shrink below zero.
    #[cfg(debug_assertions)]
    fn assert_invariant(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: balance of {} is negative ({})",
            self.number,
            self.balance
        );
        debug_assert!(self.total_deposit >= Decimal::ZERO);
        debug_assert!(self.total_withdrawal >= Decimal::ZERO);
    }
}
