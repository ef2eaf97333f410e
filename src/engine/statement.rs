use std::io::Write;

use serde::Serialize;

use super::account::{Account, AccountNumber};
use super::amount::serialize_amount;
use super::error::Error;
use super::ledger::{TransferDetails, TransferKind, TransferRecord, TransferStatus};
use super::Decimal;

/// A user's account number, balance and records, newest first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statement {
    account_number: AccountNumber,
    #[serde(serialize_with = "serialize_amount")]
    balance: Decimal,
    transactions: Vec<TransferRecord>,
}

impl Statement {
    /// Sort by timestamp descending. The sort is stable, so records sharing a timestamp keep the
    /// store's insertion order.
    pub(crate) fn assemble(account: &Account, mut records: Vec<TransferRecord>) -> Self {
        records.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        Self {
            account_number: account.number().to_string(),
            balance: account.balance(),
            transactions: records,
        }
    }

    pub fn account_number(&self) -> &str {
        &self.account_number
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    pub fn transactions(&self) -> &[TransferRecord] {
        &self.transactions
    }

    /// Write one CSV row per record. Columns that don't apply to a kind are left empty.
    pub fn write_csv<W: Write>(&self, writer: W) -> Result<(), Error> {
        let mut csv_writer = csv::Writer::from_writer(writer);
        for record in &self.transactions {
            csv_writer.serialize(StatementRow::from(record))?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[derive(Debug, Default, Serialize)]
struct Beneficiary<'a> {
    beneficiary_name: Option<&'a str>,
    beneficiary_account: Option<&'a str>,
    routing_number: Option<&'a str>,
    iban: Option<&'a str>,
    bank_name: Option<&'a str>,
    swift_code: Option<&'a str>,
    country: Option<&'a str>,
    account_type: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct StatementRow<'a> {
    id: u64,
    #[serde(rename = "type")]
    kind: TransferKind,
    #[serde(serialize_with = "serialize_amount")]
    amount: Decimal,
    status: TransferStatus,
    date: String,
    description: &'a str,
    beneficiary_name: Option<&'a str>,
    beneficiary_account: Option<&'a str>,
    routing_number: Option<&'a str>,
    iban: Option<&'a str>,
    bank_name: Option<&'a str>,
    swift_code: Option<&'a str>,
    country: Option<&'a str>,
    account_type: Option<&'a str>,
}

impl<'a> From<&'a TransferRecord> for StatementRow<'a> {
    fn from(record: &'a TransferRecord) -> Self {
        let beneficiary = match record.details() {
            TransferDetails::Domestic {
                beneficiary_name,
                beneficiary_account_number,
                bank_name,
                account_type,
            } => Beneficiary {
                beneficiary_name: Some(beneficiary_name),
                beneficiary_account: Some(beneficiary_account_number),
                bank_name: Some(bank_name),
                account_type: Some(account_type),
                ..Beneficiary::default()
            },
            TransferDetails::InterBank {
                beneficiary_name,
                iban,
                bank_name,
                country,
                account_type,
            } => Beneficiary {
                beneficiary_name: Some(beneficiary_name),
                iban: Some(iban),
                bank_name: Some(bank_name),
                country: Some(country),
                account_type: Some(account_type),
                ..Beneficiary::default()
            },
            TransferDetails::Wire {
                beneficiary_name,
                routing_number,
                iban,
                bank_name,
                swift_code,
                country,
                account_type,
            } => Beneficiary {
                beneficiary_name: Some(beneficiary_name),
                routing_number: Some(routing_number),
                iban: Some(iban),
                bank_name: Some(bank_name),
                swift_code: Some(swift_code),
                country: Some(country),
                account_type: Some(account_type),
                ..Beneficiary::default()
            },
            TransferDetails::Deposit | TransferDetails::Withdrawal => Beneficiary::default(),
        };

        Self {
            id: record.id(),
            kind: record.kind(),
            amount: record.amount(),
            status: record.status(),
            date: record.timestamp().format("%Y-%m-%d %H:%M:%S").to_string(),
            description: record.description(),
            beneficiary_name: beneficiary.beneficiary_name,
            beneficiary_account: beneficiary.beneficiary_account,
            routing_number: beneficiary.routing_number,
            iban: beneficiary.iban,
            bank_name: beneficiary.bank_name,
            swift_code: beneficiary.swift_code,
            country: beneficiary.country,
            account_type: beneficiary.account_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ledger::{InMemoryLedger, LedgerStore, NewTransferRecord};
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal_macros::dec;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    fn record(timestamp: DateTime<Utc>, details: TransferDetails) -> NewTransferRecord {
        NewTransferRecord {
            user: "alice".into(),
            account: "1000000001".into(),
            amount: dec!(10.00),
            description: String::new(),
            status: TransferStatus::Completed,
            timestamp,
            details,
        }
    }

    fn account() -> Account {
        let mut account = Account::new("1000000001".into(), "alice".into());
        account.apply(dec!(90.00), dec!(90.00));
        account
    }

    #[test]
    fn test_sorted_newest_first_stable_on_ties() {
        let ledger = InMemoryLedger::new();
        ledger.append(record(at(0), TransferDetails::Deposit)).unwrap();
        ledger.append(record(at(5), TransferDetails::Withdrawal)).unwrap();
        ledger.append(record(at(5), TransferDetails::Deposit)).unwrap();
        ledger.append(record(at(2), TransferDetails::Withdrawal)).unwrap();

        let statement = Statement::assemble(&account(), ledger.list_by_user("alice").unwrap());

        let ids: Vec<_> = statement
            .transactions()
            .iter()
            .map(TransferRecord::id)
            .collect();
        assert_eq!(ids, [2, 3, 4, 1]);
        assert_eq!(statement.account_number(), "1000000001");
        assert_eq!(statement.balance(), dec!(90.00));
    }

    #[test]
    fn test_write_csv_flattens_kind_specific_fields() {
        let ledger = InMemoryLedger::new();
        ledger
            .append(record(
                at(0),
                TransferDetails::InterBank {
                    beneficiary_name: "Carol".into(),
                    iban: "GB29NWBK60161331926819".into(),
                    bank_name: "Other Bank".into(),
                    country: "GB".into(),
                    account_type: "savings".into(),
                },
            ))
            .unwrap();

        let statement = Statement::assemble(&account(), ledger.list_by_user("alice").unwrap());
        let mut out = Vec::new();
        statement.write_csv(&mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        let mut lines = out.lines();
        assert_eq!(
            lines.next().unwrap(),
            "id,type,amount,status,date,description,beneficiary_name,beneficiary_account,routing_number,iban,bank_name,swift_code,country,account_type"
        );
        assert_eq!(
            lines.next().unwrap(),
            "1,inter_bank,10.00,completed,2023-11-14 22:13:20,,Carol,,,GB29NWBK60161331926819,Other Bank,,GB,savings"
        );
    }
}
