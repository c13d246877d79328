//! Investec Programmable Banking client
//!
//! One typed method per API operation. Each method checks its parameters
//! before touching the network, dispatches through [`HttpDispatcher`] and
//! decodes the `data` envelope into domain models.
//!
//! API Documentation: https://developer.investec.com/za/api-products

use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use super::http::HttpDispatcher;
use crate::config::Config;
use crate::domain::result::{Error, Result};
use crate::domain::{
    Account, AccountBalance, AuthorisationSetup, Beneficiary, BeneficiaryCategory,
    BeneficiaryPaymentItem, BeneficiaryPaymentRequest, Document, PendingTransaction, Profile,
    Transaction, TransactionQuery, TransferItem, TransferRequest, TransferResult,
};
use crate::ports::BankingProvider;

// =============================================================================
// API Response Wrappers
// =============================================================================

#[derive(Debug, Deserialize)]
struct AccountsData {
    accounts: Vec<Account>,
}

#[derive(Debug, Deserialize)]
struct TransactionsData {
    transactions: Vec<Transaction>,
}

#[derive(Debug, Deserialize)]
struct PendingTransactionsData {
    #[serde(rename = "PendingTransaction")]
    pending: Vec<PendingTransaction>,
}

/// Some endpoints return a single object where a list is expected
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Self::Many(items) => items,
            Self::One(item) => vec![item],
        }
    }
}

// =============================================================================
// Client
// =============================================================================

/// Typed client for the Investec `za/pb/v1` API
///
/// Owns its access token; share one instance behind an `Arc` rather than
/// creating a client per call.
pub struct InvestecClient {
    http: HttpDispatcher,
}

impl InvestecClient {
    /// Create a client, rejecting incomplete config before any network activity
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        info!(config = %config.redacted(), "creating Investec client");
        Ok(Self {
            http: HttpDispatcher::new(Arc::new(config))?,
        })
    }

    /// Create a client from `INVESTEC_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(Config::from_env()?)
    }

    pub fn config(&self) -> &Config {
        self.http.config()
    }

    /// True while a usable access token is cached
    pub fn has_valid_token(&self) -> bool {
        self.http.tokens().has_valid_token()
    }

    // -------------------------------------------------------------------------
    // Accounts
    // -------------------------------------------------------------------------

    pub fn get_accounts(&self) -> Result<Vec<Account>> {
        let data: AccountsData = self.get("/accounts", &[], "accounts")?;
        Ok(data.accounts)
    }

    pub fn get_account_balance(&self, account_id: &str) -> Result<AccountBalance> {
        let account_id = path_segment("account id", account_id)?;
        self.get(&format!("/accounts/{}/balance", account_id), &[], "balance")
    }

    /// List transactions, optionally filtered by date, type and pending state
    pub fn get_account_transactions(
        &self,
        account_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>> {
        let account_id = path_segment("account id", account_id)?;
        check_date_range(query.from_date, query.to_date)?;

        let data: TransactionsData = self.get(
            &format!("/accounts/{}/transactions", account_id),
            &query.to_params(),
            "transactions",
        )?;

        let mut transactions = data.transactions;
        if query.pending_only {
            transactions.retain(Transaction::is_pending);
        }
        debug!(count = transactions.len(), "fetched transactions");
        Ok(transactions)
    }

    pub fn get_account_pending_transactions(
        &self,
        account_id: &str,
    ) -> Result<Vec<PendingTransaction>> {
        let account_id = path_segment("account id", account_id)?;
        let data: PendingTransactionsData = self.get(
            &format!("/accounts/{}/pending-transactions", account_id),
            &[],
            "pending transactions",
        )?;
        Ok(data.pending)
    }

    // -------------------------------------------------------------------------
    // Beneficiaries
    // -------------------------------------------------------------------------

    pub fn get_beneficiaries(&self) -> Result<Vec<Beneficiary>> {
        self.get("/accounts/beneficiaries", &[], "beneficiaries")
    }

    pub fn get_beneficiary_categories(&self) -> Result<Vec<BeneficiaryCategory>> {
        let categories: OneOrMany<BeneficiaryCategory> =
            self.get("/accounts/beneficiarycategories", &[], "beneficiary categories")?;
        Ok(categories.into_vec())
    }

    // -------------------------------------------------------------------------
    // Profiles
    // -------------------------------------------------------------------------

    pub fn get_profiles(&self) -> Result<Vec<Profile>> {
        self.get("/profiles", &[], "profiles")
    }

    pub fn get_profile_accounts(&self, profile_id: &str) -> Result<Vec<Account>> {
        let profile_id = path_segment("profile id", profile_id)?;
        self.get(
            &format!("/profiles/{}/accounts", profile_id),
            &[],
            "profile accounts",
        )
    }

    pub fn get_profile_beneficiaries(
        &self,
        profile_id: &str,
        account_id: &str,
    ) -> Result<Vec<Beneficiary>> {
        let profile_id = path_segment("profile id", profile_id)?;
        let account_id = path_segment("account id", account_id)?;
        self.get(
            &format!("/profiles/{}/accounts/{}/beneficiaries", profile_id, account_id),
            &[],
            "profile beneficiaries",
        )
    }

    pub fn get_authorisation_setup(
        &self,
        profile_id: &str,
        account_id: &str,
    ) -> Result<AuthorisationSetup> {
        let profile_id = path_segment("profile id", profile_id)?;
        let account_id = path_segment("account id", account_id)?;
        self.get(
            &format!(
                "/profiles/{}/accounts/{}/authorisationsetupdetails",
                profile_id, account_id
            ),
            &[],
            "authorisation setup",
        )
    }

    // -------------------------------------------------------------------------
    // Documents
    // -------------------------------------------------------------------------

    /// Statements and tax documents issued between `from` and `to`
    pub fn get_documents(
        &self,
        account_id: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<Document>> {
        let account_id = path_segment("account id", account_id)?;
        check_date_range(Some(from), Some(to))?;
        self.get(
            &format!("/accounts/{}/documents", account_id),
            &[("fromDate", format_date(from)), ("toDate", format_date(to))],
            "documents",
        )
    }

    /// Download one document; the body is usually a PDF
    pub fn get_document(
        &self,
        account_id: &str,
        document_type: &str,
        document_date: NaiveDate,
    ) -> Result<Vec<u8>> {
        let account_id = path_segment("account id", account_id)?;
        let document_type = path_segment("document type", document_type)?;
        self.http.request_bytes(
            Method::GET,
            &format!(
                "/accounts/{}/document/{}/{}",
                account_id,
                document_type,
                format_date(document_date)
            ),
            &[],
        )
    }

    // -------------------------------------------------------------------------
    // Money movement
    // -------------------------------------------------------------------------

    /// Transfer to one or more of the client's own accounts in one batch
    pub fn transfer_multiple(
        &self,
        account_id: &str,
        transfers: &[TransferItem],
        profile_id: Option<&str>,
    ) -> Result<TransferResult> {
        let account_id = path_segment("account id", account_id)?;
        if transfers.is_empty() {
            return Err(Error::validation("transfer batch cannot be empty"));
        }
        for (index, item) in transfers.iter().enumerate() {
            item.validate(index)?;
        }
        if let Some(profile_id) = profile_id {
            path_segment("profile id", profile_id)?;
        }

        let body = encode(&TransferRequest {
            transfer_list: transfers,
            profile_id,
        })?;
        info!(count = transfers.len(), "submitting transfer batch");
        self.post(
            &format!("/accounts/{}/transfermultiple", account_id),
            &body,
            "transfer result",
        )
    }

    /// Pay one or more saved beneficiaries in one batch
    pub fn pay_beneficiaries(
        &self,
        account_id: &str,
        payments: &[BeneficiaryPaymentItem],
    ) -> Result<TransferResult> {
        let account_id = path_segment("account id", account_id)?;
        if payments.is_empty() {
            return Err(Error::validation("payment batch cannot be empty"));
        }
        for (index, item) in payments.iter().enumerate() {
            item.validate(index)?;
        }

        let body = encode(&BeneficiaryPaymentRequest {
            payment_list: payments,
        })?;
        info!(count = payments.len(), "submitting payment batch");
        self.post(
            &format!("/accounts/{}/paymultiple", account_id),
            &body,
            "payment result",
        )
    }

    // -------------------------------------------------------------------------
    // Helpers
    // -------------------------------------------------------------------------

    fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T> {
        let value = self.http.request(Method::GET, path, query, None)?;
        decode(value, what)
    }

    fn post<T: DeserializeOwned>(&self, path: &str, body: &JsonValue, what: &str) -> Result<T> {
        let value = self.http.request(Method::POST, path, &[], Some(body))?;
        decode(value, what)
    }
}

impl BankingProvider for InvestecClient {
    fn name(&self) -> &str {
        "investec"
    }

    fn get_accounts(&self) -> Result<Vec<Account>> {
        InvestecClient::get_accounts(self)
    }

    fn get_account_balance(&self, account_id: &str) -> Result<AccountBalance> {
        InvestecClient::get_account_balance(self, account_id)
    }

    fn get_account_transactions(
        &self,
        account_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>> {
        InvestecClient::get_account_transactions(self, account_id, query)
    }

    fn get_account_pending_transactions(&self, account_id: &str) -> Result<Vec<PendingTransaction>> {
        InvestecClient::get_account_pending_transactions(self, account_id)
    }

    fn get_beneficiaries(&self) -> Result<Vec<Beneficiary>> {
        InvestecClient::get_beneficiaries(self)
    }

    fn get_beneficiary_categories(&self) -> Result<Vec<BeneficiaryCategory>> {
        InvestecClient::get_beneficiary_categories(self)
    }

    fn get_profiles(&self) -> Result<Vec<Profile>> {
        InvestecClient::get_profiles(self)
    }

    fn get_profile_accounts(&self, profile_id: &str) -> Result<Vec<Account>> {
        InvestecClient::get_profile_accounts(self, profile_id)
    }

    fn transfer_multiple(
        &self,
        account_id: &str,
        transfers: &[TransferItem],
        profile_id: Option<&str>,
    ) -> Result<TransferResult> {
        InvestecClient::transfer_multiple(self, account_id, transfers, profile_id)
    }

    fn pay_beneficiaries(
        &self,
        account_id: &str,
        payments: &[BeneficiaryPaymentItem],
    ) -> Result<TransferResult> {
        InvestecClient::pay_beneficiaries(self, account_id, payments)
    }
}

/// Unwrap the `{"data": ...}` envelope and decode its contents
fn decode<T: DeserializeOwned>(mut value: JsonValue, what: &str) -> Result<T> {
    let data = if value.get("data").is_some() {
        value["data"].take()
    } else {
        value
    };
    serde_json::from_value(data)
        .map_err(|e| Error::validation(format!("unexpected {} response: {}", what, e)))
}

fn encode<T: Serialize>(body: &T) -> Result<JsonValue> {
    serde_json::to_value(body)
        .map_err(|e| Error::validation(format!("failed to encode request: {}", e)))
}

/// Ids are interpolated into the URL path
fn path_segment<'a>(what: &str, value: &'a str) -> Result<&'a str> {
    let value = value.trim();
    if value.is_empty() {
        return Err(Error::validation(format!("{} cannot be empty", what)));
    }
    if value.contains(['/', '?', '#']) {
        return Err(Error::validation(format!(
            "{} contains invalid characters: {:?}",
            what, value
        )));
    }
    if value == "." || value == ".." {
        return Err(Error::validation(format!("{} cannot be {:?}", what, value)));
    }
    Ok(value)
}

fn check_date_range(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<()> {
    match (from, to) {
        (Some(from), Some(to)) if from > to => Err(Error::validation(format!(
            "from date {} is after to date {}",
            from, to
        ))),
        _ => Ok(()),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}
