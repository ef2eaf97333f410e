mod domestic;
mod inter_bank;
mod wire;
mod withdrawal;

pub use domestic::DomesticRequest;
pub use inter_bank::InterBankRequest;
pub use wire::WireRequest;
pub use withdrawal::WithdrawalRequest;

use super::credentials::Credential;
use super::ledger::{TransferDetails, TransferKind};
use super::Decimal;

pub(crate) const DEFAULT_ACCOUNT_TYPE: &str = "savings";

/// An unvalidated money-moving request as supplied by the caller.
#[derive(Debug, Clone)]
pub enum TransferRequest {
    Domestic(DomesticRequest),
    InterBank(InterBankRequest),
    Wire(WireRequest),
    Withdrawal(WithdrawalRequest),
}

impl TransferRequest {
    pub fn kind(&self) -> TransferKind {
        match self {
            TransferRequest::Domestic(_) => TransferKind::Domestic,
            TransferRequest::InterBank(_) => TransferKind::InterBank,
            TransferRequest::Wire(_) => TransferKind::Wire,
            TransferRequest::Withdrawal(_) => TransferKind::Withdrawal,
        }
    }

    /// Required fields that are absent or blank, in declaration order.
    pub(crate) fn missing_fields(&self) -> Vec<&'static str> {
        match self {
            TransferRequest::Domestic(r) => r.missing_fields(),
            TransferRequest::InterBank(r) => r.missing_fields(),
            TransferRequest::Wire(r) => r.missing_fields(),
            TransferRequest::Withdrawal(r) => r.missing_fields(),
        }
    }

    pub(crate) fn credential(&self) -> Option<&Credential> {
        match self {
            TransferRequest::Domestic(r) => r.password.as_ref(),
            TransferRequest::InterBank(r) => r.password.as_ref(),
            TransferRequest::Wire(r) => r.password.as_ref(),
            TransferRequest::Withdrawal(r) => r.password.as_ref(),
        }
    }

    pub(crate) fn amount(&self) -> Option<&str> {
        match self {
            TransferRequest::Domestic(r) => r.amount.as_deref(),
            TransferRequest::InterBank(r) => r.amount.as_deref(),
            TransferRequest::Wire(r) => r.amount.as_deref(),
            TransferRequest::Withdrawal(r) => r.amount.as_deref(),
        }
    }

    pub(crate) fn description(&self) -> String {
        let description = match self {
            TransferRequest::Domestic(r) => &r.description,
            TransferRequest::InterBank(r) => &r.description,
            TransferRequest::Wire(r) => &r.description,
            TransferRequest::Withdrawal(r) => &r.description,
        };
        field(description)
    }

    /// Beneficiary fields for the record. Only meaningful once required fields are present.
    pub(crate) fn details(&self) -> TransferDetails {
        match self {
            TransferRequest::Domestic(r) => r.details(),
            TransferRequest::InterBank(r) => r.details(),
            TransferRequest::Wire(r) => r.details(),
            TransferRequest::Withdrawal(_) => TransferDetails::Withdrawal,
        }
    }
}

/// A request that passed every validation step.
#[derive(Debug, Clone)]
pub struct Transfer {
    pub(crate) amount: Decimal,
    pub(crate) description: String,
    pub(crate) details: TransferDetails,
}

impl Transfer {
    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn kind(&self) -> TransferKind {
        self.details.kind()
    }

    /// The in-system account to credit, for domestic transfers.
    pub fn beneficiary(&self) -> Option<&str> {
        self.details.beneficiary_account()
    }
}

fn is_blank(value: Option<&str>) -> bool {
    value.is_none_or(|v| v.trim().is_empty())
}

/// Collect the names of blank fields, preserving order.
fn missing<'a>(
    fields: impl IntoIterator<Item = (&'static str, Option<&'a str>)>,
    password: Option<&Credential>,
) -> Vec<&'static str> {
    let mut missing: Vec<_> = fields
        .into_iter()
        .filter(|(_, value)| is_blank(*value))
        .map(|(name, _)| name)
        .collect();
    if password.is_none_or(Credential::is_blank) {
        missing.push("password");
    }
    missing
}

fn field(value: &Option<String>) -> String {
    value.as_deref().map(str::trim).unwrap_or_default().to_string()
}

fn account_type(value: &Option<String>) -> String {
    match field(value) {
        ty if ty.is_empty() => DEFAULT_ACCOUNT_TYPE.to_string(),
        ty => ty,
    }
}
