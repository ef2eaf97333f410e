//! Ledger engine module.
//!
//! This module contains the core balance-mutation and transfer-recording logic including:
//! - `LedgerEngine` - Validates, executes and records money movements
//! - `AccountStore` / `LedgerStore` - Storage contracts with in-memory implementations
//! - `TransferValidator` - Ordered request checks shared by every transfer kind
//! - `Statement` - Time-ordered view of a user's records
//! - `Error` types - Validation, authorization, funds and store failures

mod account;
mod account_store;
mod amount;
mod batch;
mod config;
mod credentials;
mod error;
mod ledger;
mod ledger_engine;
mod locks;
mod statement;
mod transfer;
mod validator;

pub use rust_decimal::Decimal;

pub use account::{Account, AccountNumber, UserId};
pub use account_store::{AccountStore, InMemoryAccountStore};
pub use amount::{parse_amount, MAX_AMOUNT, SCALE};
pub use batch::{BatchSummary, OperationRecord, OperationType};
pub use config::EngineConfig;
pub use credentials::{Credential, CredentialVerifier, PasswordVault};
pub use error::{
    AuthorizationError, CredentialError, Error, ErrorKind, ProcessingError, StoreError,
    TransferError, ValidationError,
};
pub use ledger::{
    InMemoryLedger, LedgerStore, NewTransferRecord, RecordId, TransferDetails, TransferKind,
    TransferRecord, TransferStatus,
};
pub use ledger_engine::{LedgerEngine, TransferReceipt};
pub use statement::Statement;
pub use transfer::{
    DomesticRequest, InterBankRequest, Transfer, TransferRequest, WireRequest, WithdrawalRequest,
};
pub use validator::TransferValidator;
