use std::fmt;
use std::io::Read;

use serde::Deserialize;

use super::account_store::AccountStore;
use super::credentials::{Credential, PasswordVault};
use super::error::{Error, ProcessingError, TransferError, ValidationError};
use super::ledger::LedgerStore;
use super::ledger_engine::LedgerEngine;
use super::transfer::{DomesticRequest, InterBankRequest, WireRequest, WithdrawalRequest};

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum OperationType {
    Register,
    Deposit,
    Withdrawal,
    Domestic,
    InterBank,
    Wire,
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperationType::Register => write!(f, "register"),
            OperationType::Deposit => write!(f, "deposit"),
            OperationType::Withdrawal => write!(f, "withdrawal"),
            OperationType::Domestic => write!(f, "domestic"),
            OperationType::InterBank => write!(f, "inter_bank"),
            OperationType::Wire => write!(f, "wire"),
        }
    }
}

/// One row of a batch file. Which columns matter depends on `op`; the rest stay empty.
#[derive(Debug, Deserialize, Clone)]
pub struct OperationRecord {
    pub op: OperationType,
    pub user: String,
    #[serde(default)]
    pub account: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub password: Option<Credential>,
    #[serde(default)]
    pub beneficiary_name: Option<String>,
    #[serde(default)]
    pub beneficiary_account: Option<String>,
    #[serde(default)]
    pub bank_name: Option<String>,
    #[serde(default)]
    pub iban: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub routing_number: Option<String>,
    #[serde(default)]
    pub swift_code: Option<String>,
    #[serde(default)]
    pub account_type: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl fmt::Display for OperationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] user={}", self.op, self.user)?;
        if let Some(account) = &self.account {
            write!(f, " account={account}")?;
        }
        if let Some(amount) = &self.amount {
            write!(f, " amount={amount}")?;
        }
        Ok(())
    }
}

/// Counts from one batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub processed: u64,
    pub skipped: u64,
}

impl<A: AccountStore, L: LedgerStore> LedgerEngine<A, L, PasswordVault> {
    /// Provision a user's account and register the password used for step-up checks.
    pub fn register_user(
        &self,
        user: &str,
        account: &str,
        password: &Credential,
    ) -> Result<(), ProcessingError> {
        if password.is_blank() {
            let missing = ValidationError::MissingFields(vec!["password"]);
            return Err(TransferError::from(missing).into());
        }
        self.provision_account(user, account)?;
        self.credentials().register(user, password)?;
        Ok(())
    }

    /// Replay operations from any source (File, `TcpStream`, etc.).
    /// Malformed rows abort the batch; operations that fail are logged and skipped.
    /// The CSV reader is buffered automatically, so don't wrap `reader` in a `BufReader`.
    pub fn process_operations<R: Read>(&self, reader: R) -> Result<BatchSummary, Error> {
        log::info!("Starting batch processing");

        let mut csv_reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(reader);

        let mut summary = BatchSummary::default();

        for result in csv_reader.deserialize() {
            let record: OperationRecord = result?;

            let row_num = summary.processed + summary.skipped + 1;
            log::trace!("[row {row_num}] Parsing: {record}");

            if let Err(e) = self.process_operation(record) {
                log::warn!("[row {row_num}] - Skipped: {e}");
                summary.skipped += 1;
            } else {
                summary.processed += 1;
            }
        }

        log::info!(
            "Processing complete: {} processed, {} skipped, {} accounts",
            summary.processed,
            summary.skipped,
            self.account_count()?
        );
        Ok(summary)
    }

    fn process_operation(&self, record: OperationRecord) -> Result<(), ProcessingError> {
        let user = record.user.as_str();
        let account = match (&record.op, &record.account) {
            (_, Some(account)) => account.clone(),
            (OperationType::Register, None) => {
                return Err(ProcessingError::MissingAccount {
                    user: user.to_string(),
                })
            }
            (_, None) => self
                .accounts()
                .account_of(user)
                .map_err(|e| ProcessingError::Transfer(e.into()))?,
        };

        match record.op {
            OperationType::Register => {
                let password = record.password.clone().unwrap_or_default();
                self.register_user(user, &account, &password)?;
            }
            OperationType::Deposit => {
                self.deposit(
                    user,
                    &account,
                    record.amount.as_deref().unwrap_or_default(),
                    record.description.as_deref(),
                )?;
            }
            OperationType::Withdrawal => {
                self.withdraw(
                    user,
                    &account,
                    WithdrawalRequest {
                        amount: record.amount,
                        description: record.description,
                        password: record.password,
                    },
                )?;
            }
            OperationType::Domestic => {
                self.transfer_domestic(
                    user,
                    &account,
                    DomesticRequest {
                        beneficiary_name: record.beneficiary_name,
                        beneficiary_account_number: record.beneficiary_account,
                        bank_name: record.bank_name,
                        account_type: record.account_type,
                        amount: record.amount,
                        description: record.description,
                        password: record.password,
                    },
                )?;
            }
            OperationType::InterBank => {
                self.transfer_inter_bank(
                    user,
                    &account,
                    InterBankRequest {
                        beneficiary_name: record.beneficiary_name,
                        iban: record.iban,
                        bank_name: record.bank_name,
                        country: record.country,
                        account_type: record.account_type,
                        amount: record.amount,
                        description: record.description,
                        password: record.password,
                    },
                )?;
            }
            OperationType::Wire => {
                self.transfer_wire(
                    user,
                    &account,
                    WireRequest {
                        beneficiary_name: record.beneficiary_name,
                        routing_number: record.routing_number,
                        iban: record.iban,
                        bank_name: record.bank_name,
                        swift_code: record.swift_code,
                        country: record.country,
                        account_type: record.account_type,
                        amount: record.amount,
                        description: record.description,
                        password: record.password,
                    },
                )?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::account_store::InMemoryAccountStore;
    use crate::engine::config::EngineConfig;
    use crate::engine::ledger::InMemoryLedger;
    use rust_decimal_macros::dec;
    use std::io::Cursor;

    fn engine() -> LedgerEngine {
        LedgerEngine::with_stores(
            InMemoryAccountStore::default(),
            InMemoryLedger::new(),
            PasswordVault::with_params(8, 1, 1).unwrap(),
            EngineConfig::default(),
        )
    }

    const HEADER: &str = "op,user,account,amount,password,beneficiary_name,beneficiary_account,bank_name,iban,country,routing_number,swift_code,account_type,description";

    #[test]
    fn test_register_deposit_and_domestic_transfer() {
        let engine = engine();
        let input = format!(
            "{HEADER}
register,alice,1000000001,,s3cret,,,,,,,,,
register,bob,2000000002,,hunter2,,,,,,,,,
deposit,alice,,500.00,,,,,,,,,,salary
domestic,alice,,200.00,s3cret,Bob,2000000002,Ledger Bank,,,,,,dinner"
        );

        let summary = engine.process_operations(Cursor::new(input)).unwrap();

        assert_eq!(
            summary,
            BatchSummary {
                processed: 4,
                skipped: 0
            }
        );
        assert_eq!(engine.balance("alice").unwrap(), dec!(300.00));
        assert_eq!(engine.balance("bob").unwrap(), dec!(200.00));
        assert_eq!(engine.account_count().unwrap(), 2);
    }

    #[test]
    fn test_failing_operations_are_skipped() {
        let engine = engine();
        let input = format!(
            "{HEADER}
register,alice,1000000001,,s3cret,,,,,,,,,
deposit,alice,,50.00,,,,,,,,,,
wire,alice,,100.00,s3cret,Dave,,Deutsche Bank,DE89370400440532013000,DE,021000021,DEUTDEFF,,
withdrawal,alice,,10.00,wrong,,,,,,,,,
register,carol,,,pw,,,,,,,,,
deposit,nobody,,5.00,,,,,,,,,,"
        );

        let summary = engine.process_operations(Cursor::new(input)).unwrap();

        assert_eq!(summary.processed, 2);
        assert_eq!(summary.skipped, 4);
        assert_eq!(engine.balance("alice").unwrap(), dec!(50.00));
    }

    #[test]
    fn test_short_rows_are_accepted() {
        let engine = engine();
        let input = format!(
            "{HEADER}
register,alice,1000000001,,s3cret
deposit,alice,,25"
        );

        let summary = engine.process_operations(Cursor::new(input)).unwrap();
        assert_eq!(summary.processed, 2);
        assert_eq!(engine.balance("alice").unwrap(), dec!(25.00));
    }

    #[test]
    fn test_unknown_operation_is_a_hard_error() {
        let engine = engine();
        let input = format!("{HEADER}\nrefund,alice,1,5,,,,,,,,,,");

        assert!(matches!(
            engine.process_operations(Cursor::new(input)),
            Err(Error::Csv(_))
        ));
    }
}
