//! Tool service - banking operations as named, schema-described tools
//!
//! Each tool takes a JSON object of arguments, calls exactly one
//! [`BankingProvider`] method and returns the result as JSON. Agent hosts
//! list the tools with [`ToolService::definitions`] and invoke them with
//! [`ToolService::call_json`], which never fails and instead reports errors
//! inside the [`OperationResult`] envelope.

use std::sync::Arc;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use tracing::debug;

use crate::domain::de;
use crate::domain::result::{Error, OperationResult, Result};
use crate::domain::{BeneficiaryPaymentItem, TransactionQuery, TransferItem};
use crate::ports::BankingProvider;

/// Transactions returned when the caller gives no `limit`
pub const DEFAULT_TRANSACTION_LIMIT: usize = 10;

/// Name, description and JSON-schema input of one tool
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: JsonValue,
}

// =============================================================================
// Arguments
// =============================================================================

#[derive(Debug, Deserialize)]
struct AccountArgs {
    account_id: String,
}

#[derive(Debug, Deserialize)]
struct ProfileArgs {
    profile_id: String,
}

#[derive(Debug, Deserialize)]
struct TransactionArgs {
    account_id: String,
    #[serde(default, deserialize_with = "de::optional_date")]
    from_date: Option<NaiveDate>,
    #[serde(default, deserialize_with = "de::optional_date")]
    to_date: Option<NaiveDate>,
    #[serde(default)]
    transaction_type: Option<String>,
    #[serde(default)]
    include_pending: bool,
    #[serde(default)]
    pending_only: bool,
    #[serde(default)]
    limit: Option<usize>,
}

/// A batch given either as a JSON array or as a string holding one
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Batch<T> {
    Items(Vec<T>),
    Encoded(String),
}

impl<T: DeserializeOwned> Batch<T> {
    fn into_items(self, what: &str) -> Result<Vec<T>> {
        match self {
            Self::Items(items) => Ok(items),
            Self::Encoded(text) => serde_json::from_str(&text)
                .map_err(|e| Error::validation(format!("invalid {} JSON: {}", what, e))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TransferArgs {
    account_id: String,
    transfers: Batch<TransferArg>,
    #[serde(default)]
    profile_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransferArg {
    beneficiary_account_id: String,
    #[serde(deserialize_with = "de::decimal")]
    amount: Decimal,
    #[serde(default)]
    my_reference: String,
    #[serde(default)]
    their_reference: String,
}

#[derive(Debug, Deserialize)]
struct PaymentArgs {
    account_id: String,
    payments: Batch<PaymentArg>,
}

#[derive(Debug, Deserialize)]
struct PaymentArg {
    beneficiary_id: String,
    #[serde(deserialize_with = "de::decimal")]
    amount: Decimal,
    #[serde(default)]
    my_reference: String,
    #[serde(default)]
    their_reference: String,
    #[serde(default)]
    faster_payment: Option<bool>,
}

fn parse_args<T: DeserializeOwned>(tool: &str, args: &JsonValue) -> Result<T> {
    // Tools without parameters may be called with `null`
    let args = if args.is_null() { json!({}) } else { args.clone() };
    serde_json::from_value(args)
        .map_err(|e| Error::validation(format!("invalid arguments for {}: {}", tool, e)))
}

fn to_json<T: Serialize>(value: &T) -> Result<JsonValue> {
    serde_json::to_value(value)
        .map_err(|e| Error::validation(format!("failed to encode result: {}", e)))
}

// =============================================================================
// Service
// =============================================================================

/// Dispatches tool calls to a [`BankingProvider`]
pub struct ToolService {
    provider: Arc<dyn BankingProvider>,
}

impl ToolService {
    pub fn new(provider: Arc<dyn BankingProvider>) -> Self {
        Self { provider }
    }

    /// Every tool this service answers, in a stable order
    pub fn definitions() -> Vec<ToolDefinition> {
        let account_id = json!({"type": "string", "description": "The ID of the account"});
        let no_args = json!({"type": "object", "properties": {}});

        vec![
            ToolDefinition {
                name: "get_accounts",
                description: "Get all accounts for the authenticated user.",
                input_schema: no_args.clone(),
            },
            ToolDefinition {
                name: "get_account_balance",
                description: "Get the balance for a specific account.",
                input_schema: json!({
                    "type": "object",
                    "properties": {"account_id": account_id},
                    "required": ["account_id"]
                }),
            },
            ToolDefinition {
                name: "get_account_transactions",
                description: "Get transactions for a specific account.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "account_id": account_id,
                        "from_date": {"type": "string", "description": "Start date (YYYY-MM-DD)"},
                        "to_date": {"type": "string", "description": "End date (YYYY-MM-DD)"},
                        "transaction_type": {"type": "string", "description": "Filter transactions by type"},
                        "include_pending": {"type": "boolean", "description": "Include pending transactions"},
                        "pending_only": {"type": "boolean", "description": "Only return pending transactions"},
                        "limit": {
                            "type": "integer",
                            "minimum": 1,
                            "description": format!("Maximum transactions to return (default {})", DEFAULT_TRANSACTION_LIMIT)
                        }
                    },
                    "required": ["account_id"]
                }),
            },
            ToolDefinition {
                name: "get_pending_transactions",
                description: "Get pending transactions for a specific account.",
                input_schema: json!({
                    "type": "object",
                    "properties": {"account_id": account_id},
                    "required": ["account_id"]
                }),
            },
            ToolDefinition {
                name: "get_beneficiaries",
                description: "Get all beneficiaries for the authenticated user.",
                input_schema: no_args.clone(),
            },
            ToolDefinition {
                name: "get_beneficiary_categories",
                description: "Get beneficiary categories available to the authenticated user.",
                input_schema: no_args.clone(),
            },
            ToolDefinition {
                name: "transfer_multiple",
                description: "Transfer funds to one or multiple accounts.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "account_id": {"type": "string", "description": "The source account ID"},
                        "transfers": {
                            "description": "List of transfers, or a JSON string holding one",
                            "type": ["array", "string"],
                            "items": {
                                "type": "object",
                                "properties": {
                                    "beneficiary_account_id": {"type": "string"},
                                    "amount": {"type": "string", "description": "Decimal amount, e.g. \"10.00\""},
                                    "my_reference": {"type": "string"},
                                    "their_reference": {"type": "string"}
                                },
                                "required": ["beneficiary_account_id", "amount"]
                            }
                        },
                        "profile_id": {"type": "string", "description": "Optional profile ID"}
                    },
                    "required": ["account_id", "transfers"]
                }),
            },
            ToolDefinition {
                name: "pay_beneficiaries",
                description: "Pay one or multiple beneficiaries.",
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "account_id": {"type": "string", "description": "The source account ID"},
                        "payments": {
                            "description": "List of payments, or a JSON string holding one",
                            "type": ["array", "string"],
                            "items": {
                                "type": "object",
                                "properties": {
                                    "beneficiary_id": {"type": "string"},
                                    "amount": {"type": "string", "description": "Decimal amount, e.g. \"10.00\""},
                                    "my_reference": {"type": "string"},
                                    "their_reference": {"type": "string"},
                                    "faster_payment": {"type": "boolean"}
                                },
                                "required": ["beneficiary_id", "amount"]
                            }
                        }
                    },
                    "required": ["account_id", "payments"]
                }),
            },
            ToolDefinition {
                name: "get_profiles",
                description: "Get all profiles for the authenticated user.",
                input_schema: no_args,
            },
            ToolDefinition {
                name: "get_profile_accounts",
                description: "Get all accounts for a specific profile.",
                input_schema: json!({
                    "type": "object",
                    "properties": {"profile_id": {"type": "string", "description": "The ID of the profile"}},
                    "required": ["profile_id"]
                }),
            },
        ]
    }

    /// Run one tool; unknown names and bad arguments are validation errors
    pub fn call(&self, name: &str, args: &JsonValue) -> Result<JsonValue> {
        debug!(tool = name, provider = self.provider.name(), "calling tool");

        match name {
            "get_accounts" => to_json(&self.provider.get_accounts()?),
            "get_account_balance" => {
                let args: AccountArgs = parse_args(name, args)?;
                to_json(&self.provider.get_account_balance(&args.account_id)?)
            }
            "get_account_transactions" => self.transactions(name, args),
            "get_pending_transactions" => {
                let args: AccountArgs = parse_args(name, args)?;
                to_json(&self.provider.get_account_pending_transactions(&args.account_id)?)
            }
            "get_beneficiaries" => to_json(&self.provider.get_beneficiaries()?),
            "get_beneficiary_categories" => to_json(&self.provider.get_beneficiary_categories()?),
            "transfer_multiple" => self.transfer(name, args),
            "pay_beneficiaries" => self.pay(name, args),
            "get_profiles" => to_json(&self.provider.get_profiles()?),
            "get_profile_accounts" => {
                let args: ProfileArgs = parse_args(name, args)?;
                to_json(&self.provider.get_profile_accounts(&args.profile_id)?)
            }
            other => Err(Error::validation(format!("unknown tool: {}", other))),
        }
    }

    /// Run one tool and wrap the outcome for the caller
    pub fn call_json(&self, name: &str, args: &JsonValue) -> OperationResult<JsonValue> {
        self.call(name, args).into()
    }

    fn transactions(&self, name: &str, args: &JsonValue) -> Result<JsonValue> {
        let args: TransactionArgs = parse_args(name, args)?;
        let limit = args.limit.unwrap_or(DEFAULT_TRANSACTION_LIMIT);
        if limit == 0 {
            return Err(Error::validation("limit must be at least 1"));
        }

        let mut query = TransactionQuery::new()
            .include_pending(args.include_pending)
            .pending_only(args.pending_only);
        query.from_date = args.from_date;
        query.to_date = args.to_date;
        query.transaction_type = args.transaction_type;

        let mut transactions = self
            .provider
            .get_account_transactions(&args.account_id, &query)?;
        let total = transactions.len();
        transactions.truncate(limit);

        Ok(json!({
            "transactions": to_json(&transactions)?,
            "shown": transactions.len(),
            "total": total,
        }))
    }

    fn transfer(&self, name: &str, args: &JsonValue) -> Result<JsonValue> {
        let args: TransferArgs = parse_args(name, args)?;
        let items: Vec<TransferItem> = args
            .transfers
            .into_items("transfers")?
            .into_iter()
            .map(|t| {
                TransferItem::new(
                    t.beneficiary_account_id,
                    t.amount,
                    t.my_reference,
                    t.their_reference,
                )
            })
            .collect();

        let result = self.provider.transfer_multiple(
            &args.account_id,
            &items,
            args.profile_id.as_deref(),
        )?;
        to_json(&result)
    }

    fn pay(&self, name: &str, args: &JsonValue) -> Result<JsonValue> {
        let args: PaymentArgs = parse_args(name, args)?;
        let items: Vec<BeneficiaryPaymentItem> = args
            .payments
            .into_items("payments")?
            .into_iter()
            .map(|p| {
                let item = BeneficiaryPaymentItem::new(
                    p.beneficiary_id,
                    p.amount,
                    p.my_reference,
                    p.their_reference,
                );
                match p.faster_payment {
                    Some(faster) => item.with_faster_payment(faster),
                    None => item,
                }
            })
            .collect();

        to_json(&self.provider.pay_beneficiaries(&args.account_id, &items)?)
    }
}
