//! Transaction domain models

use std::fmt;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::de;

/// Direction of money movement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionType {
    Debit,
    Credit,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Debit => write!(f, "DEBIT"),
            Self::Credit => write!(f, "CREDIT"),
        }
    }
}

/// Posting state of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionStatus {
    Posted,
    Pending,
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Posted => write!(f, "POSTED"),
            Self::Pending => write!(f, "PENDING"),
        }
    }
}

fn default_status() -> TransactionStatus {
    TransactionStatus::Posted
}

/// A transaction on an Investec account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    #[serde(deserialize_with = "de::id")]
    pub account_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    /// Bank-specific category, e.g. "CardPurchases"
    #[serde(default)]
    pub transaction_type: Option<String>,
    #[serde(default = "default_status")]
    pub status: TransactionStatus,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub card_number: Option<String>,
    #[serde(default)]
    pub posted_order: Option<i64>,
    #[serde(default, deserialize_with = "de::optional_date")]
    pub posting_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::optional_date")]
    pub value_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::optional_date")]
    pub action_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::optional_date")]
    pub transaction_date: Option<NaiveDate>,
    #[serde(deserialize_with = "de::decimal")]
    pub amount: Decimal,
    #[serde(default, deserialize_with = "de::optional_decimal")]
    pub running_balance: Option<Decimal>,
    #[serde(default)]
    pub uuid: Option<String>,
}

impl Transaction {
    pub fn is_pending(&self) -> bool {
        self.status == TransactionStatus::Pending
    }

    /// Amount with sign applied: debits negative, credits positive
    pub fn signed_amount(&self) -> Decimal {
        match self.kind {
            TransactionType::Debit => -self.amount,
            TransactionType::Credit => self.amount,
        }
    }
}

/// A card authorisation that has not yet posted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingTransaction {
    #[serde(deserialize_with = "de::id")]
    pub account_id: String,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    #[serde(default)]
    pub description: String,
    #[serde(default, deserialize_with = "de::optional_date")]
    pub transaction_date: Option<NaiveDate>,
    #[serde(deserialize_with = "de::decimal")]
    pub amount: Decimal,
}

/// Filters for listing transactions
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionQuery {
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    pub transaction_type: Option<String>,
    pub include_pending: bool,
    /// Keep only pending transactions (implies `include_pending`)
    pub pending_only: bool,
}

impl TransactionQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn since(mut self, date: NaiveDate) -> Self {
        self.from_date = Some(date);
        self
    }

    pub fn until(mut self, date: NaiveDate) -> Self {
        self.to_date = Some(date);
        self
    }

    pub fn transaction_type(mut self, kind: impl Into<String>) -> Self {
        self.transaction_type = Some(kind.into());
        self
    }

    pub fn include_pending(mut self, include: bool) -> Self {
        self.include_pending = include;
        self
    }

    pub fn pending_only(mut self, only: bool) -> Self {
        self.pending_only = only;
        self
    }

    /// Query-string parameters understood by the transactions endpoint
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(from) = self.from_date {
            params.push(("fromDate", from.format("%Y-%m-%d").to_string()));
        }
        if let Some(to) = self.to_date {
            params.push(("toDate", to.format("%Y-%m-%d").to_string()));
        }
        if let Some(kind) = &self.transaction_type {
            params.push(("transactionType", kind.clone()));
        }
        if self.include_pending || self.pending_only {
            params.push(("includePending", "true".to_string()));
        }
        params
    }
}
