use serde::Deserialize;

use crate::engine::{credentials::Credential, transfer::missing};

/// Cash withdrawal from the caller's own account.
///
/// Debits the account and bumps its withdrawal counter; gated by the same credential step-up
/// as transfers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WithdrawalRequest {
    pub amount: Option<String>,
    pub description: Option<String>,
    pub password: Option<Credential>,
}

impl WithdrawalRequest {
    pub(super) fn missing_fields(&self) -> Vec<&'static str> {
        missing([("amount", self.amount.as_deref())], self.password.as_ref())
    }
}
