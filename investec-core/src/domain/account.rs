//! Account and balance domain models

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::de;

/// An Investec bank account visible to the authenticated client
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    #[serde(deserialize_with = "de::id")]
    pub account_id: String,
    #[serde(default)]
    pub account_number: String,
    #[serde(default)]
    pub account_name: String,
    #[serde(default)]
    pub reference_name: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub kyc_compliant: bool,
    #[serde(default)]
    pub profile_id: String,
    #[serde(default)]
    pub profile_name: String,
}

impl Account {
    /// Name to show a person: the reference name if set, else the account name
    pub fn display_name(&self) -> &str {
        if self.reference_name.is_empty() {
            &self.account_name
        } else {
            &self.reference_name
        }
    }
}

fn default_currency() -> String {
    "ZAR".to_string()
}

/// Balances for a single account
///
/// All amounts are exact decimals; the API reports them as JSON numbers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountBalance {
    #[serde(deserialize_with = "de::id")]
    pub account_id: String,
    #[serde(deserialize_with = "de::decimal")]
    pub current_balance: Decimal,
    #[serde(deserialize_with = "de::decimal")]
    pub available_balance: Decimal,
    #[serde(default, deserialize_with = "de::optional_decimal")]
    pub budget_balance: Option<Decimal>,
    #[serde(default, deserialize_with = "de::optional_decimal")]
    pub straight_balance: Option<Decimal>,
    #[serde(default, deserialize_with = "de::optional_decimal")]
    pub cash_balance: Option<Decimal>,
    #[serde(default = "default_currency")]
    pub currency: String,
}
