use std::fmt;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;

use super::account::{AccountNumber, UserId};
use super::amount::serialize_amount;
use super::error::StoreError;
use super::Decimal;

pub type RecordId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Completed,
    Failed,
    Unknown,
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferStatus::Pending => write!(f, "pending"),
            TransferStatus::Completed => write!(f, "completed"),
            TransferStatus::Failed => write!(f, "failed"),
            TransferStatus::Unknown => write!(f, "unknown"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    #[serde(rename = "domestic_transfer")]
    Domestic,
    InterBank,
    Wire,
    Deposit,
    Withdrawal,
}

impl fmt::Display for TransferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransferKind::Domestic => write!(f, "domestic_transfer"),
            TransferKind::InterBank => write!(f, "inter_bank"),
            TransferKind::Wire => write!(f, "wire"),
            TransferKind::Deposit => write!(f, "deposit"),
            TransferKind::Withdrawal => write!(f, "withdrawal"),
        }
    }
}

/// Kind-specific beneficiary data. The variant fixes the record's kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransferDetails {
    #[serde(rename = "domestic_transfer")]
    Domestic {
        beneficiary_name: String,
        beneficiary_account_number: AccountNumber,
        bank_name: String,
        account_type: String,
    },
    InterBank {
        beneficiary_name: String,
        iban: String,
        bank_name: String,
        country: String,
        account_type: String,
    },
    Wire {
        beneficiary_name: String,
        routing_number: String,
        iban: String,
        bank_name: String,
        swift_code: String,
        country: String,
        account_type: String,
    },
    Deposit,
    Withdrawal,
}

impl TransferDetails {
    pub fn kind(&self) -> TransferKind {
        match self {
            TransferDetails::Domestic { .. } => TransferKind::Domestic,
            TransferDetails::InterBank { .. } => TransferKind::InterBank,
            TransferDetails::Wire { .. } => TransferKind::Wire,
            TransferDetails::Deposit => TransferKind::Deposit,
            TransferDetails::Withdrawal => TransferKind::Withdrawal,
        }
    }

    /// The in-system account that receives the funds, if any.
    pub fn beneficiary_account(&self) -> Option<&str> {
        match self {
            TransferDetails::Domestic {
                beneficiary_account_number,
                ..
            } => Some(beneficiary_account_number),
            _ => None,
        }
    }
}

/// A record about to be appended; the store assigns its id.
#[derive(Debug, Clone)]
pub struct NewTransferRecord {
    pub user: UserId,
    pub account: AccountNumber,
    pub amount: Decimal,
    pub description: String,
    pub status: TransferStatus,
    pub timestamp: DateTime<Utc>,
    pub details: TransferDetails,
}

/// Immutable record of one transfer attempt and its outcome.
///
/// The amount is always positive; direction follows from the kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransferRecord {
    id: RecordId,
    user: UserId,
    account: AccountNumber,
    #[serde(serialize_with = "serialize_amount")]
    amount: Decimal,
    description: String,
    status: TransferStatus,
    timestamp: DateTime<Utc>,
    #[serde(flatten)]
    details: TransferDetails,
}

impl TransferRecord {
    fn new(id: RecordId, record: NewTransferRecord) -> Self {
        Self {
            id,
            user: record.user,
            account: record.account,
            amount: record.amount,
            description: record.description,
            status: record.status,
            timestamp: record.timestamp,
            details: record.details,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    pub fn account(&self) -> &str {
        &self.account
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> TransferStatus {
        self.status
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn kind(&self) -> TransferKind {
        self.details.kind()
    }

    pub fn details(&self) -> &TransferDetails {
        &self.details
    }
}

impl fmt::Display for TransferRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] id={} user={} account={} amount={} status={}",
            self.kind(),
            self.id,
            self.user,
            self.account,
            self.amount,
            self.status
        )
    }
}

/// Append-only store of transfer records.
pub trait LedgerStore: Send + Sync {
    fn append(&self, record: NewTransferRecord) -> Result<RecordId, StoreError>;

    /// Every record owned by `user`, in insertion order.
    fn list_by_user(&self, user: &str) -> Result<Vec<TransferRecord>, StoreError>;
}

/// In-memory [`LedgerStore`] backed by a vector; ids are positions plus one.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    records: RwLock<Vec<TransferRecord>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl LedgerStore for InMemoryLedger {
    fn append(&self, record: NewTransferRecord) -> Result<RecordId, StoreError> {
        let mut records = self.records.write();
        let id = records.len() as RecordId + 1;
        let record = TransferRecord::new(id, record);
        log::trace!("[ledger] append {record}");
        records.push(record);
        Ok(id)
    }

    fn list_by_user(&self, user: &str) -> Result<Vec<TransferRecord>, StoreError> {
        Ok(self
            .records
            .read()
            .iter()
            .filter(|record| record.user() == user)
            .cloned()
            .collect())
    }
}
