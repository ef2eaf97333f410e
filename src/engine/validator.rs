use super::account_store::AccountStore;
use super::amount::parse_amount;
use super::credentials::CredentialVerifier;
use super::error::{AuthorizationError, StoreError, TransferError, ValidationError};
use super::transfer::{Transfer, TransferRequest};

/// Checks a request against the current account state before any store write.
///
/// Precedence, first failure wins:
/// 1. required fields per kind
/// 2. credential re-confirmation and source ownership
/// 3. amount parses, is positive and fits 2dp
/// 4. source balance covers the amount
/// 5. kind-specific references (domestic beneficiary exists and differs from the source)
pub struct TransferValidator<'a> {
    accounts: &'a dyn AccountStore,
    credentials: &'a dyn CredentialVerifier,
}

impl<'a> TransferValidator<'a> {
    pub fn new(accounts: &'a dyn AccountStore, credentials: &'a dyn CredentialVerifier) -> Self {
        Self {
            accounts,
            credentials,
        }
    }

    pub fn validate(
        &self,
        user: &str,
        source: &str,
        request: &TransferRequest,
    ) -> Result<Transfer, TransferError> {
        let missing = request.missing_fields();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing).into());
        }

        let credential = request
            .credential()
            .ok_or(ValidationError::MissingFields(vec!["password"]))?;
        if !self.credentials.verify(user, credential) {
            return Err(AuthorizationError::InvalidCredential.into());
        }

        let account = match self.accounts.snapshot(source) {
            Ok(account) if account.owner() == user => account,
            Ok(_) | Err(StoreError::NotFound { .. }) => {
                return Err(AuthorizationError::NotAccountOwner {
                    user: user.to_string(),
                    account: source.to_string(),
                }
                .into())
            }
            Err(e) => return Err(e.into()),
        };

        let raw_amount = request
            .amount()
            .ok_or(ValidationError::MissingFields(vec!["amount"]))?;
        let amount = parse_amount(raw_amount)?;

        if account.balance() < amount {
            return Err(TransferError::InsufficientFunds {
                account: source.to_string(),
                available: account.balance(),
                requested: amount,
            });
        }

        let transfer = Transfer {
            amount,
            description: request.description(),
            details: request.details(),
        };

        if let Some(beneficiary) = transfer.beneficiary() {
            if beneficiary == source {
                return Err(ValidationError::SelfTransfer.into());
            }
            if !self.accounts.exists(beneficiary)? {
                return Err(TransferError::BeneficiaryNotFound {
                    account: beneficiary.to_string(),
                });
            }
        }

        log::trace!(
            "[validate] user={user} source={source} kind={} amount={amount} -> ok",
            transfer.kind()
        );
        Ok(transfer)
    }
}
