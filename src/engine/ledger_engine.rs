use std::io::Write;

use chrono::Utc;

use super::account::Account;
use super::account_store::{AccountStore, InMemoryAccountStore};
use super::amount::parse_amount;
use super::config::EngineConfig;
use super::credentials::{CredentialVerifier, PasswordVault};
use super::error::{AuthorizationError, Error, StoreError, TransferError, ValidationError};
use super::ledger::{
    InMemoryLedger, LedgerStore, NewTransferRecord, RecordId, TransferDetails, TransferStatus,
};
use super::locks::AccountLocks;
use super::statement::Statement;
use super::transfer::{
    DomesticRequest, InterBankRequest, Transfer, TransferRequest, WireRequest, WithdrawalRequest,
};
use super::validator::TransferValidator;
use super::Decimal;

/// Outcome of a completed money movement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferReceipt {
    record_id: RecordId,
    amount: Decimal,
    new_balance: Decimal,
}

impl TransferReceipt {
    /// Returns the id of the ledger record written for this movement
    pub fn record_id(&self) -> RecordId {
        self.record_id
    }

    /// Returns the amount moved
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Returns the caller's account balance right after the movement
    pub fn new_balance(&self) -> Decimal {
        self.new_balance
    }
}

/// The core balance-mutation and transfer-recording engine.
///
/// Validates money-moving requests, mutates balances under per-account exclusive access and
/// appends one ledger record per completed movement. Every method takes `&self`; share the
/// engine across threads behind an `Arc`.
#[derive(Debug)]
pub struct LedgerEngine<A = InMemoryAccountStore, L = InMemoryLedger, C = PasswordVault> {
    accounts: A,
    ledger: L,
    credentials: C,
    locks: AccountLocks,
    config: EngineConfig,
}

impl Default for LedgerEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerEngine {
    /// Create a `LedgerEngine` with in-memory stores and default settings
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_stores(
            InMemoryAccountStore::new(config.lock_timeout),
            InMemoryLedger::new(),
            PasswordVault::new(),
            config,
        )
    }
}

impl<A: AccountStore, L: LedgerStore, C: CredentialVerifier> LedgerEngine<A, L, C> {
    pub fn with_stores(accounts: A, ledger: L, credentials: C, config: EngineConfig) -> Self {
        log::trace!("LedgerEngine initialized with {config:?}");
        Self {
            accounts,
            ledger,
            credentials,
            locks: AccountLocks::new(),
            config,
        }
    }

    pub fn accounts(&self) -> &A {
        &self.accounts
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn credentials(&self) -> &C {
        &self.credentials
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Create the zero-balance account of a newly created user.
    pub fn provision_account(&self, user: &str, number: &str) -> Result<Account, TransferError> {
        Ok(self.accounts.provision(user, number)?)
    }

    /// Credit cash into `account`. Operator-initiated, so no credential step-up.
    pub fn deposit(
        &self,
        user: &str,
        account: &str,
        amount: &str,
        description: Option<&str>,
    ) -> Result<TransferReceipt, TransferError> {
        let amount = parse_amount(amount)?;
        self.ensure_owner(user, account)?;

        let lock_set = self.locks.handles(&[account]);
        let _guards = lock_set.acquire(self.config.lock_timeout)?;

        let new_balance = self
            .accounts
            .adjust_balance(account, amount, Decimal::ZERO)
            .map_err(|e| match e {
                StoreError::AmountOverflow { .. } => {
                    TransferError::Validation(ValidationError::AmountOverflow)
                }
                other => TransferError::Store(other),
            })?;

        let transfer = Transfer {
            amount,
            description: description.unwrap_or_default().trim().to_string(),
            details: TransferDetails::Deposit,
        };
        match self
            .ledger
            .append(self.new_record(user, account, &transfer, TransferStatus::Completed))
        {
            Ok(record_id) => {
                log::trace!(
                    "[deposit] account={account} amount={amount} -> new_balance={new_balance}"
                );
                Ok(TransferReceipt {
                    record_id,
                    amount,
                    new_balance,
                })
            }
            Err(cause) => {
                log::error!("[deposit] Ledger append failed for account {account}: {cause}");
                Err(self.reverse(account, -amount, cause))
            }
        }
    }

    /// Debit cash out of `account`.
    pub fn withdraw(
        &self,
        user: &str,
        account: &str,
        request: WithdrawalRequest,
    ) -> Result<TransferReceipt, TransferError> {
        self.submit(user, account, TransferRequest::Withdrawal(request))
    }

    /// Move funds to another account held in this system.
    pub fn transfer_domestic(
        &self,
        user: &str,
        source: &str,
        request: DomesticRequest,
    ) -> Result<TransferReceipt, TransferError> {
        self.submit(user, source, TransferRequest::Domestic(request))
    }

    /// Release funds to an account at another bank.
    pub fn transfer_inter_bank(
        &self,
        user: &str,
        source: &str,
        request: InterBankRequest,
    ) -> Result<TransferReceipt, TransferError> {
        self.submit(user, source, TransferRequest::InterBank(request))
    }

    /// Release funds as a wire transfer.
    pub fn transfer_wire(
        &self,
        user: &str,
        source: &str,
        request: WireRequest,
    ) -> Result<TransferReceipt, TransferError> {
        self.submit(user, source, TransferRequest::Wire(request))
    }

    /// Validate and execute any money-moving request.
    pub fn submit(
        &self,
        user: &str,
        source: &str,
        request: TransferRequest,
    ) -> Result<TransferReceipt, TransferError> {
        log::trace!("[{}] user={user} source={source} received", request.kind());
        let validator = TransferValidator::new(&self.accounts, &self.credentials);
        let transfer = validator.validate(user, source, &request)?;
        self.execute(user, source, &transfer)
    }

    /// Current balance of the user's account, read under its exclusive lock.
    pub fn balance(&self, user: &str) -> Result<Decimal, TransferError> {
        let number = self.accounts.account_of(user)?;
        let lock_set = self.locks.handles(&[number.as_str()]);
        let _guards = lock_set.acquire(self.config.lock_timeout)?;
        Ok(self.accounts.get_balance(&number)?)
    }

    /// Account number, balance and every record of `user`, newest first.
    pub fn statement(&self, user: &str) -> Result<Statement, TransferError> {
        let number = self.accounts.account_of(user)?;
        let lock_set = self.locks.handles(&[number.as_str()]);
        let _guards = lock_set.acquire(self.config.lock_timeout)?;

        let account = self.accounts.snapshot(&number)?;
        let records = self.ledger.list_by_user(user)?;
        log::trace!(
            "[statement] user={user} account={number} records={}",
            records.len()
        );
        Ok(Statement::assemble(&account, records))
    }

    /// Write every account as CSV to any sink.
    pub fn export_accounts<W: Write>(&self, writer: W) -> Result<(), Error> {
        let accounts = self.accounts.all()?;
        log::info!("Exporting {} accounts", accounts.len());

        let mut csv_writer = csv::Writer::from_writer(writer);
        for account in &accounts {
            csv_writer.serialize(account)?;
        }
        csv_writer.flush()?;

        log::trace!("Export complete");
        Ok(())
    }

    /// Returns the number of accounts in the engine
    pub fn account_count(&self) -> Result<usize, StoreError> {
        Ok(self.accounts.all()?.len())
    }

    fn ensure_owner(&self, user: &str, account: &str) -> Result<(), TransferError> {
        match self.accounts.snapshot(account) {
            Ok(snapshot) if snapshot.owner() == user => Ok(()),
            Ok(_) | Err(StoreError::NotFound { .. }) => Err(AuthorizationError::NotAccountOwner {
                user: user.to_string(),
                account: account.to_string(),
            }
            .into()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Atomic unit: lock -> debit -> credit -> record -> unlock
// =============================================================================

impl<A: AccountStore, L: LedgerStore, C: CredentialVerifier> LedgerEngine<A, L, C> {
    fn execute(
        &self,
        user: &str,
        source: &str,
        transfer: &Transfer,
    ) -> Result<TransferReceipt, TransferError> {
        let kind = transfer.kind();
        let amount = transfer.amount();
        let beneficiary = transfer.beneficiary();

        let mut touched = vec![source];
        touched.extend(beneficiary);
        let lock_set = self.locks.handles(&touched);
        let _guards = match lock_set.acquire(self.config.lock_timeout) {
            Ok(guards) => guards,
            Err(cause) => {
                log::error!("[{kind}] Could not lock accounts {touched:?}: {cause}");
                self.record_failure(user, source, transfer);
                return Err(cause.into());
            }
        };

        // Re-checked under the lock: validation only saw a snapshot.
        let new_balance = match self.accounts.adjust_balance(source, -amount, Decimal::ZERO) {
            Ok(balance) => balance,
            Err(e) => {
                let err = TransferError::from_debit(e);
                if let TransferError::Store(cause) = &err {
                    log::error!("[{kind}] Debit of {amount} from {source} failed: {cause}");
                    self.record_failure(user, source, transfer);
                } else {
                    log::debug!("[{kind}] Lost the race for funds on {source}: {err}");
                }
                return Err(err);
            }
        };
        log::trace!(
            "[{kind}] debited source={source} amount={amount} -> new_balance={new_balance}"
        );

        if let Some(beneficiary) = beneficiary {
            if let Err(cause) = self.accounts.adjust_balance(beneficiary, amount, Decimal::ZERO) {
                log::error!("[{kind}] Credit of {amount} to {beneficiary} failed: {cause}");
                let err = self.reverse(source, amount, cause);
                // A failed record claims no balance change; only true once the source is restored.
                if matches!(err, TransferError::Store(_)) {
                    self.record_failure(user, source, transfer);
                }
                return Err(err);
            }
            log::trace!("[{kind}] credited beneficiary={beneficiary} amount={amount}");
        }

        let record = self.new_record(user, source, transfer, TransferStatus::Completed);
        match self.ledger.append(record) {
            Ok(record_id) => {
                log::trace!("[{kind}] completed record={record_id} source={source}");
                Ok(TransferReceipt {
                    record_id,
                    amount,
                    new_balance,
                })
            }
            Err(cause) => {
                log::error!("[{kind}] Ledger append failed for source {source}: {cause}");
                match beneficiary {
                    Some(beneficiary) => {
                        if let Err(reversal) =
                            self.accounts.adjust_balance(beneficiary, -amount, Decimal::ZERO)
                        {
                            log::error!(
                                "[{kind}] Could not take back {amount} from {beneficiary}: {reversal}"
                            );
                            return Err(TransferError::ReversalFailed {
                                account: beneficiary.to_string(),
                                amount,
                                cause,
                                reversal,
                            });
                        }
                        Err(self.reverse(source, amount, cause))
                    }
                    None => {
                        // Funds have left the system of record; settlement is external.
                        log::error!(
                            "[{kind}] {amount} released from {source} without a ledger record"
                        );
                        Err(TransferError::Store(cause))
                    }
                }
            }
        }
    }

    /// Compensating adjustment of `delta` on `account` after `cause` aborted the unit.
    fn reverse(&self, account: &str, delta: Decimal, cause: StoreError) -> TransferError {
        match self.accounts.adjust_balance(account, delta, Decimal::ZERO) {
            Ok(restored) => {
                log::warn!(
                    "[reversal] account={account} delta={delta} -> restored_balance={restored}"
                );
                TransferError::Store(cause)
            }
            Err(reversal) => {
                log::error!(
                    "[reversal] FAILED account={account} delta={delta}: {reversal}; manual intervention required"
                );
                TransferError::ReversalFailed {
                    account: account.to_string(),
                    amount: delta.abs(),
                    cause,
                    reversal,
                }
            }
        }
    }

    fn record_failure(&self, user: &str, source: &str, transfer: &Transfer) {
        if !self.config.record_failed_attempts {
            return;
        }
        let record = self.new_record(user, source, transfer, TransferStatus::Failed);
        if let Err(e) = self.ledger.append(record) {
            log::error!("[{}] Could not record failed attempt: {e}", transfer.kind());
        }
    }

    fn new_record(
        &self,
        user: &str,
        account: &str,
        transfer: &Transfer,
        status: TransferStatus,
    ) -> NewTransferRecord {
        NewTransferRecord {
            user: user.to_string(),
            account: account.to_string(),
            amount: transfer.amount,
            description: transfer.description.clone(),
            status,
            timestamp: Utc::now(),
            details: transfer.details.clone(),
        }
    }
}
