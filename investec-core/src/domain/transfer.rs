//! Inter-account transfer models and the shared transfer/payment result

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::de;
use super::result::{Error, Result};

/// One leg of an inter-account transfer batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferItem {
    pub beneficiary_account_id: String,
    /// Sent as a decimal string, e.g. `"100.00"`
    #[serde(deserialize_with = "de::decimal")]
    pub amount: Decimal,
    pub my_reference: String,
    pub their_reference: String,
}

impl TransferItem {
    pub fn new(
        beneficiary_account_id: impl Into<String>,
        amount: Decimal,
        my_reference: impl Into<String>,
        their_reference: impl Into<String>,
    ) -> Self {
        Self {
            beneficiary_account_id: beneficiary_account_id.into(),
            amount,
            my_reference: my_reference.into(),
            their_reference: their_reference.into(),
        }
    }

    pub(crate) fn validate(&self, index: usize) -> Result<()> {
        if self.beneficiary_account_id.trim().is_empty() {
            return Err(Error::validation(format!(
                "transfer {}: beneficiary account id is required",
                index + 1
            )));
        }
        validate_amount(self.amount, "transfer", index)
    }
}

/// Shared check for transfer and payment amounts
pub(crate) fn validate_amount(amount: Decimal, what: &str, index: usize) -> Result<()> {
    if amount <= Decimal::ZERO {
        return Err(Error::validation(format!(
            "{} {}: amount must be greater than zero, got {}",
            what,
            index + 1,
            amount
        )));
    }
    Ok(())
}

/// Request body for `POST /accounts/{id}/transfermultiple`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferRequest<'a> {
    pub transfer_list: &'a [TransferItem],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<&'a str>,
}

/// Outcome of one leg of a transfer or payment batch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all(serialize = "camelCase", deserialize = "PascalCase"))]
pub struct TransferResponseItem {
    #[serde(default)]
    pub payment_reference_number: Option<String>,
    #[serde(default)]
    pub payment_date: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub beneficiary_name: Option<String>,
    #[serde(default)]
    pub beneficiary_account_id: Option<String>,
    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub authorisation_required: bool,
}

/// Result of a transfer or beneficiary payment batch, in request order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResult {
    pub transfer_responses: Vec<TransferResponseItem>,
    pub error_message: Option<String>,
}

/// Wire shape of a batch result. Newer API versions nest the list under
/// `transferResponse`, older ones return it at the top level.
#[derive(Debug, Deserialize)]
struct RawTransferResult {
    #[serde(rename = "TransferResponses", default)]
    transfer_responses: Option<Vec<TransferResponseItem>>,
    #[serde(rename = "ErrorMessage", default)]
    error_message: Option<String>,
    #[serde(rename = "transferResponse", default)]
    nested: Option<Box<RawTransferResult>>,
}

impl RawTransferResult {
    fn flatten(self) -> TransferResult {
        let (nested_responses, nested_error) = match self.nested {
            Some(inner) => {
                let inner = inner.flatten();
                (Some(inner.transfer_responses), inner.error_message)
            }
            None => (None, None),
        };
        TransferResult {
            transfer_responses: nested_responses
                .or(self.transfer_responses)
                .unwrap_or_default(),
            error_message: nested_error.or(self.error_message),
        }
    }
}

impl<'de> Deserialize<'de> for TransferResult {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        RawTransferResult::deserialize(deserializer).map(RawTransferResult::flatten)
    }
}

impl TransferResult {
    /// True when at least one leg needs a second authoriser
    pub fn requires_authorisation(&self) -> bool {
        self.transfer_responses
            .iter()
            .any(|r| r.authorisation_required)
    }
}
