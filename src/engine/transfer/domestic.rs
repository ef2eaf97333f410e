use serde::Deserialize;

use crate::engine::{
    credentials::Credential,
    ledger::TransferDetails,
    transfer::{account_type, field, missing},
};

/// Transfer to another account held in this system.
///
/// The beneficiary account must resolve to an existing account; funds are debited from the
/// source and credited to the beneficiary as one unit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DomesticRequest {
    pub beneficiary_name: Option<String>,
    pub beneficiary_account_number: Option<String>,
    pub bank_name: Option<String>,
    pub account_type: Option<String>,
    pub amount: Option<String>,
    pub description: Option<String>,
    pub password: Option<Credential>,
}

impl DomesticRequest {
    pub(super) fn missing_fields(&self) -> Vec<&'static str> {
        missing(
            [
                ("beneficiary_name", self.beneficiary_name.as_deref()),
                (
                    "beneficiary_account_number",
                    self.beneficiary_account_number.as_deref(),
                ),
                ("bank_name", self.bank_name.as_deref()),
                ("amount", self.amount.as_deref()),
            ],
            self.password.as_ref(),
        )
    }

    pub(super) fn details(&self) -> TransferDetails {
        TransferDetails::Domestic {
            beneficiary_name: field(&self.beneficiary_name),
            beneficiary_account_number: field(&self.beneficiary_account_number),
            bank_name: field(&self.bank_name),
            account_type: account_type(&self.account_type),
        }
    }
}
