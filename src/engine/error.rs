use crate::engine::account::{AccountNumber, UserId};
use crate::engine::Decimal;

/// Top-level error type for batch replay and export.
#[derive(Debug, thiserror::Error)]
#[allow(clippy::enum_variant_names)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Soft errors while replaying one batch operation. Logged and skipped, batch continues.
#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error(transparent)]
    Transfer(#[from] TransferError),

    #[error(transparent)]
    Credential(#[from] CredentialError),

    #[error("No account number given for user {user}")]
    MissingAccount { user: UserId },
}

/// Malformed or missing request data. Never changes state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    #[error("Invalid amount format: {0:?}")]
    InvalidAmount(String),

    #[error("Amount must be greater than 0")]
    NonPositiveAmount,

    #[error("Amount has more than 2 decimal places")]
    TooManyDecimals,

    #[error("Amount exceeds the maximum representable value")]
    AmountOverflow,

    #[error("Source and beneficiary account cannot be the same")]
    SelfTransfer,
}

/// The caller failed the step-up identity check.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthorizationError {
    #[error("Invalid password")]
    InvalidCredential,

    #[error("User {user} may not move funds from account {account}")]
    NotAccountOwner { user: UserId, account: AccountNumber },
}

/// Failures reported by the account and ledger stores.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Account {account} not found")]
    NotFound { account: AccountNumber },

    #[error("No account provisioned for user {user}")]
    NoAccountForUser { user: UserId },

    #[error("Insufficient funds: account {account} has {available}, requested {requested}")]
    InsufficientFunds {
        account: AccountNumber,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Balance of account {account} would leave the representable range")]
    AmountOverflow { account: AccountNumber },

    #[error("Account number {account} is already taken")]
    DuplicateAccount { account: AccountNumber },

    #[error("User {user} already owns an account")]
    DuplicateOwner { user: UserId },

    #[error("Timed out waiting for exclusive access to account {account}")]
    Timeout { account: AccountNumber },

    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised while registering credentials.
#[derive(Debug, thiserror::Error)]
pub enum CredentialError {
    #[error("Credential hashing failed: {0}")]
    Hashing(String),

    #[error("Invalid hashing parameters: {0}")]
    Params(String),
}

/// Every way a money-moving or reading operation can fail.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransferError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("Authorization failed: {0}")]
    Authorization(#[from] AuthorizationError),

    #[error("Insufficient funds: account {account} has {available}, requested {requested}")]
    InsufficientFunds {
        account: AccountNumber,
        available: Decimal,
        requested: Decimal,
    },

    #[error("Beneficiary account {account} does not exist in our system")]
    BeneficiaryNotFound { account: AccountNumber },

    #[error("Store failure: {0}")]
    Store(#[from] StoreError),

    #[error(
        "Reversal of {amount} to account {account} failed ({reversal}) after {cause}; manual intervention required"
    )]
    ReversalFailed {
        account: AccountNumber,
        amount: Decimal,
        cause: StoreError,
        reversal: StoreError,
    },
}

/// Coarse failure taxonomy surfaced to callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Authorization,
    InsufficientFunds,
    NotFound,
    StoreFailure,
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::Validation(_) => ErrorKind::Validation,
            TransferError::Authorization(_) => ErrorKind::Authorization,
            TransferError::InsufficientFunds { .. } => ErrorKind::InsufficientFunds,
            TransferError::BeneficiaryNotFound { .. } => ErrorKind::NotFound,
            TransferError::Store(_) | TransferError::ReversalFailed { .. } => {
                ErrorKind::StoreFailure
            }
        }
    }

    /// Store-level insufficient funds (lost the race at the debit) surfaces the same way as
    /// the validator's check; everything else stays a store failure.
    pub(crate) fn from_debit(error: StoreError) -> Self {
        match error {
            StoreError::InsufficientFunds {
                account,
                available,
                requested,
            } => TransferError::InsufficientFunds {
                account,
                available,
                requested,
            },
            other => TransferError::Store(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_missing_fields_message_lists_every_field() {
        let err = ValidationError::MissingFields(vec!["iban", "amount"]);
        assert_eq!(err.to_string(), "Missing fields: iban, amount");
    }

    #[test]
    fn test_kind_maps_taxonomy() {
        assert_eq!(
            TransferError::from(ValidationError::NonPositiveAmount).kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            TransferError::from(AuthorizationError::InvalidCredential).kind(),
            ErrorKind::Authorization
        );
        assert_eq!(
            TransferError::BeneficiaryNotFound {
                account: "0000000000".into()
            }
            .kind(),
            ErrorKind::NotFound
        );
        assert_eq!(
            TransferError::from(StoreError::Unavailable("disk".into())).kind(),
            ErrorKind::StoreFailure
        );
    }

    #[test]
    fn test_debit_race_maps_to_insufficient_funds() {
        let err = TransferError::from_debit(StoreError::InsufficientFunds {
            account: "1".into(),
            available: dec!(40),
            requested: dec!(60),
        });
        assert_eq!(err.kind(), ErrorKind::InsufficientFunds);

        let err = TransferError::from_debit(StoreError::Timeout {
            account: "1".into(),
        });
        assert_eq!(err.kind(), ErrorKind::StoreFailure);
    }
}
