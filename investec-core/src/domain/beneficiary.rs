//! Beneficiary domain models

use serde::{Deserialize, Serialize};

use super::de;

/// A saved payee on the authenticated client's profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beneficiary {
    #[serde(deserialize_with = "de::id")]
    pub beneficiary_id: String,
    #[serde(default)]
    pub account_number: Option<String>,
    /// Branch code
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub bank: Option<String>,
    #[serde(default)]
    pub beneficiary_name: Option<String>,
    #[serde(default)]
    pub last_payment_amount: Option<String>,
    #[serde(default)]
    pub last_payment_date: Option<String>,
    #[serde(default)]
    pub cell_no: Option<String>,
    #[serde(default)]
    pub email_address: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub reference_account_number: Option<String>,
    #[serde(default)]
    pub reference_name: Option<String>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub profile_id: Option<String>,
    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub faster_payment_allowed: bool,
    #[serde(default)]
    pub beneficiary_type: Option<String>,
    #[serde(default)]
    pub approved_beneficiary_category: Option<String>,
}

impl Beneficiary {
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .or(self.beneficiary_name.as_deref())
            .unwrap_or(&self.beneficiary_id)
    }
}

/// Grouping used to organise beneficiaries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BeneficiaryCategory {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default, deserialize_with = "de::flexible_bool")]
    pub is_default: bool,
    #[serde(default)]
    pub name: String,
}
