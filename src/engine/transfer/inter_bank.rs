use serde::Deserialize;

use crate::engine::{
    credentials::Credential,
    ledger::TransferDetails,
    transfer::{account_type, field, missing},
};

/// Transfer to an account at another bank, identified by IBAN.
///
/// Funds leave the system of record at the debit; no in-system account is credited.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct InterBankRequest {
    pub beneficiary_name: Option<String>,
    pub iban: Option<String>,
    pub bank_name: Option<String>,
    pub country: Option<String>,
    pub account_type: Option<String>,
    pub amount: Option<String>,
    pub description: Option<String>,
    pub password: Option<Credential>,
}

impl InterBankRequest {
    pub(super) fn missing_fields(&self) -> Vec<&'static str> {
        missing(
            [
                ("beneficiary_name", self.beneficiary_name.as_deref()),
                ("iban", self.iban.as_deref()),
                ("bank_name", self.bank_name.as_deref()),
                ("country", self.country.as_deref()),
                ("amount", self.amount.as_deref()),
            ],
            self.password.as_ref(),
        )
    }

    pub(super) fn details(&self) -> TransferDetails {
        TransferDetails::InterBank {
            beneficiary_name: field(&self.beneficiary_name),
            iban: field(&self.iban),
            bank_name: field(&self.bank_name),
            country: field(&self.country),
            account_type: account_type(&self.account_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_iban_and_country() {
        let request = InterBankRequest {
            beneficiary_name: Some("Carol".into()),
            bank_name: Some("Other Bank".into()),
            amount: Some("10".into()),
            password: Some("pw".into()),
            ..InterBankRequest::default()
        };
        assert_eq!(request.missing_fields(), ["iban", "country"]);
    }

    #[test]
    fn test_blank_password_is_missing() {
        let request = InterBankRequest {
            beneficiary_name: Some("Carol".into()),
            iban: Some("GB29NWBK60161331926819".into()),
            bank_name: Some("Other Bank".into()),
            country: Some("GB".into()),
            amount: Some("10".into()),
            password: Some(" ".into()),
            ..InterBankRequest::default()
        };
        assert_eq!(request.missing_fields(), ["password"]);
    }

    #[test]
    fn test_details_keep_explicit_account_type() {
        let request = InterBankRequest {
            beneficiary_name: Some("Carol".into()),
            iban: Some("GB29NWBK60161331926819".into()),
            bank_name: Some("Other Bank".into()),
            country: Some("GB".into()),
            account_type: Some("current".into()),
            ..InterBankRequest::default()
        };
        assert!(matches!(
            request.details(),
            TransferDetails::InterBank { account_type, .. } if account_type == "current"
        ));
    }
}
