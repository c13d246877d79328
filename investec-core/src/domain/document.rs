//! Statement and tax document listings

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::de;

/// A downloadable document (statement, tax certificate, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub document_type: String,
    #[serde(deserialize_with = "de::date")]
    pub document_date: NaiveDate,
}
