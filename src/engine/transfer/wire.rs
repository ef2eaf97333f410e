use serde::Deserialize;

use crate::engine::{
    credentials::Credential,
    ledger::TransferDetails,
    transfer::{account_type, field, missing},
};

/// Wire transfer out of the system, routed by routing number and SWIFT code.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct WireRequest {
    pub beneficiary_name: Option<String>,
    pub routing_number: Option<String>,
    pub iban: Option<String>,
    pub bank_name: Option<String>,
    pub swift_code: Option<String>,
    pub country: Option<String>,
    pub account_type: Option<String>,
    pub amount: Option<String>,
    pub description: Option<String>,
    pub password: Option<Credential>,
}

impl WireRequest {
    pub(super) fn missing_fields(&self) -> Vec<&'static str> {
        missing(
            [
                ("beneficiary_name", self.beneficiary_name.as_deref()),
                ("routing_number", self.routing_number.as_deref()),
                ("iban", self.iban.as_deref()),
                ("bank_name", self.bank_name.as_deref()),
                ("swift_code", self.swift_code.as_deref()),
                ("country", self.country.as_deref()),
                ("amount", self.amount.as_deref()),
            ],
            self.password.as_ref(),
        )
    }

    pub(super) fn details(&self) -> TransferDetails {
        TransferDetails::Wire {
            beneficiary_name: field(&self.beneficiary_name),
            routing_number: field(&self.routing_number),
            iban: field(&self.iban),
            bank_name: field(&self.bank_name),
            swift_code: field(&self.swift_code),
            country: field(&self.country),
            account_type: account_type(&self.account_type),
        }
    }
}
