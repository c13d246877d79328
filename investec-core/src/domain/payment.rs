//! Beneficiary payment models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::de;
use super::result::{Error, Result};
use super::transfer::validate_amount;

/// One payment in a beneficiary payment batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryPaymentItem {
    pub beneficiary_id: String,
    #[serde(deserialize_with = "de::decimal")]
    pub amount: Decimal,
    pub my_reference: String,
    pub their_reference: String,
    #[serde(default, rename = "authoriserAId", skip_serializing_if = "Option::is_none")]
    pub authoriser_a_id: Option<String>,
    #[serde(default, rename = "authoriserBId", skip_serializing_if = "Option::is_none")]
    pub authoriser_b_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth_period_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faster_payment: Option<bool>,
}

impl BeneficiaryPaymentItem {
    pub fn new(
        beneficiary_id: impl Into<String>,
        amount: Decimal,
        my_reference: impl Into<String>,
        their_reference: impl Into<String>,
    ) -> Self {
        Self {
            beneficiary_id: beneficiary_id.into(),
            amount,
            my_reference: my_reference.into(),
            their_reference: their_reference.into(),
            authoriser_a_id: None,
            authoriser_b_id: None,
            auth_period_id: None,
            faster_payment: None,
        }
    }

    /// Request an instant (faster) payment where the beneficiary allows it
    pub fn with_faster_payment(mut self, faster: bool) -> Self {
        self.faster_payment = Some(faster);
        self
    }

    /// Set the authorisers for accounts that need dual authorisation
    pub fn with_authorisers(
        mut self,
        authoriser_a: impl Into<String>,
        authoriser_b: Option<String>,
        period: Option<String>,
    ) -> Self {
        self.authoriser_a_id = Some(authoriser_a.into());
        self.authoriser_b_id = authoriser_b;
        self.auth_period_id = period;
        self
    }

    pub(crate) fn validate(&self, index: usize) -> Result<()> {
        if self.beneficiary_id.trim().is_empty() {
            return Err(Error::validation(format!(
                "payment {}: beneficiary id is required",
                index + 1
            )));
        }
        validate_amount(self.amount, "payment", index)
    }
}

/// Request body for `POST /accounts/{id}/paymultiple`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryPaymentRequest<'a> {
    pub payment_list: &'a [BeneficiaryPaymentItem],
}
