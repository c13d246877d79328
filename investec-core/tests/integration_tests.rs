//! Integration tests for investec-core
//!
//! These exercise the public API the way the CLI and agent hosts use it:
//! configuration loading, client construction, and the tool service over a
//! canned bank. HTTP behaviour is covered by the unit tests next to the
//! adapters, which run against an in-process mock server.
//!
//! Run with: cargo test --test integration_tests -- --nocapture

use std::collections::HashMap;
use std::net::TcpListener;
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use rust_decimal::Decimal;
use serde_json::{json, Value as JsonValue};

use investec_core::{
    Account, AccountBalance, BankingProvider, Beneficiary, BeneficiaryCategory,
    BeneficiaryPaymentItem, Config, Error, InvestecClient, PendingTransaction, Profile, Result,
    ToolService, Transaction, TransactionQuery, TransferItem, TransferResult,
};

// ============================================================================
// Test Helpers
// ============================================================================

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key: &str| map.get(key).cloned()
}

/// A port nothing is listening on
fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    format!("http://127.0.0.1:{}", port)
}

fn account(id: &str, profile: &str) -> Account {
    serde_json::from_value(json!({
        "accountId": id,
        "accountNumber": format!("1000{}", id),
        "accountName": "Mr J Doe",
        "referenceName": format!("Savings {}", id),
        "productName": "Private Bank Account",
        "kycCompliant": true,
        "profileId": profile,
        "profileName": "J Doe"
    }))
    .unwrap()
}

/// Canned bank that counts every call
#[derive(Default)]
struct CannedBank {
    calls: AtomicUsize,
}

impl CannedBank {
    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

impl BankingProvider for CannedBank {
    fn name(&self) -> &str {
        "canned"
    }

    fn get_accounts(&self) -> Result<Vec<Account>> {
        self.hit();
        Ok(vec![account("1", "p-1"), account("2", "p-1")])
    }

    fn get_account_balance(&self, account_id: &str) -> Result<AccountBalance> {
        self.hit();
        serde_json::from_value(json!({
            "accountId": account_id,
            "currentBalance": "1234.56",
            "availableBalance": 1000
        }))
        .map_err(|e| Error::validation(e.to_string()))
    }

    fn get_account_transactions(
        &self,
        account_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>> {
        self.hit();
        let transactions: Vec<Transaction> = serde_json::from_value(json!([
            {"accountId": account_id, "type": "DEBIT", "status": "POSTED", "amount": "10.00"},
            {"accountId": account_id, "type": "CREDIT", "status": "PENDING", "amount": 20}
        ]))
        .map_err(|e| Error::validation(e.to_string()))?;
        Ok(transactions
            .into_iter()
            .filter(|t| !query.pending_only || t.is_pending())
            .collect())
    }

    fn get_account_pending_transactions(&self, _account_id: &str) -> Result<Vec<PendingTransaction>> {
        self.hit();
        Ok(vec![])
    }

    fn get_beneficiaries(&self) -> Result<Vec<Beneficiary>> {
        self.hit();
        Ok(vec![])
    }

    fn get_beneficiary_categories(&self) -> Result<Vec<BeneficiaryCategory>> {
        self.hit();
        Ok(vec![])
    }

    fn get_profiles(&self) -> Result<Vec<Profile>> {
        self.hit();
        Ok(vec![])
    }

    fn get_profile_accounts(&self, profile_id: &str) -> Result<Vec<Account>> {
        self.hit();
        Ok(vec![account("9", profile_id)])
    }

    fn transfer_multiple(
        &self,
        _account_id: &str,
        transfers: &[TransferItem],
        _profile_id: Option<&str>,
    ) -> Result<TransferResult> {
        self.hit();
        if transfers.is_empty() {
            return Err(Error::validation("transfer batch cannot be empty"));
        }
        Ok(TransferResult::default())
    }

    fn pay_beneficiaries(
        &self,
        _account_id: &str,
        _payments: &[BeneficiaryPaymentItem],
    ) -> Result<TransferResult> {
        self.hit();
        Err(Error::Authentication {
            status: Some(403),
            message: "forbidden".to_string(),
        })
    }
}

// ============================================================================
// Configuration
// ============================================================================

#[test]
fn test_client_from_prefixed_environment() {
    let config = Config::from_lookup(lookup(&[
        ("INVESTEC_CLIENT_ID", "client"),
        ("INVESTEC_CLIENT_SECRET", "secret"),
        ("INVESTEC_API_KEY", "key"),
        ("INVESTEC_USE_SANDBOX", "yes"),
        ("INVESTEC_SANDBOX_URL", "http://127.0.0.1:9"),
        ("INVESTEC_RETRY_ON_UNAUTHORIZED", "false"),
    ]))
    .unwrap();

    assert_eq!(config.base_url(), "http://127.0.0.1:9");
    assert!(!config.retry_on_unauthorized);

    let client = InvestecClient::new(config).unwrap();
    assert!(!client.has_valid_token());
    assert!(client.config().use_sandbox);
}

#[test]
fn test_missing_credentials_fail_before_any_request() {
    let err = Config::from_lookup(lookup(&[("INVESTEC_CLIENT_ID", "client")])).unwrap_err();
    assert!(matches!(err, Error::Config(_)));

    let config = Config::new("client", "secret", "   ");
    assert!(matches!(InvestecClient::new(config), Err(Error::Config(_))));
}

#[test]
fn test_sandbox_client_builds_offline() {
    let client = InvestecClient::new(Config::sandbox()).unwrap();
    assert_eq!(client.config().base_url(), "https://openapisandbox.investec.com");
    assert!(!format!("{:?}", client.config()).contains(&*Config::sandbox().client_id));
}

#[test]
fn test_unreachable_token_endpoint_is_authentication_error() {
    let config = Config::new("client", "secret", "key")
        .with_base_url(closed_port_url())
        .with_timeout(Duration::from_secs(2));
    let client = InvestecClient::new(config).unwrap();

    match client.get_accounts() {
        Err(Error::Authentication { status, .. }) => assert_eq!(status, None),
        other => panic!("expected authentication error, got {:?}", other),
    }
    assert!(!client.has_valid_token());
}

// ============================================================================
// Tool Service
// ============================================================================

#[test]
fn test_tool_round_trip_through_provider() {
    let bank = Arc::new(CannedBank::default());
    let tools = ToolService::new(bank.clone());

    let accounts = tools.call("get_accounts", &JsonValue::Null).unwrap();
    assert_eq!(accounts.as_array().unwrap().len(), 2);
    assert_eq!(accounts[0]["accountId"], "1");

    let balance = tools
        .call("get_account_balance", &json!({"account_id": "1"}))
        .unwrap();
    assert_eq!(balance["currentBalance"], "1234.56");
    assert_eq!(balance["currency"], "ZAR");

    let profile_accounts = tools
        .call("get_profile_accounts", &json!({"profile_id": "p-7"}))
        .unwrap();
    assert_eq!(profile_accounts[0]["profileId"], "p-7");

    assert_eq!(bank.calls.load(Ordering::SeqCst), 3);
}

#[test]
fn test_pending_only_tool_filter() {
    let tools = ToolService::new(Arc::new(CannedBank::default()));

    let value = tools
        .call(
            "get_account_transactions",
            &json!({"account_id": "1", "pending_only": true}),
        )
        .unwrap();
    assert_eq!(value["total"], 1);
    assert_eq!(value["transactions"][0]["status"], "PENDING");
}

#[test]
fn test_tool_errors_are_reported_in_envelope() {
    let bank = Arc::new(CannedBank::default());
    let tools = ToolService::new(bank.clone());

    let result = tools.call_json(
        "pay_beneficiaries",
        &json!({"account_id": "1", "payments": [{"beneficiary_id": "b", "amount": "1.00"}]}),
    );
    assert!(!result.success);
    let context = result.context.unwrap();
    assert_eq!(context["kind"], "authentication");
    assert_eq!(context["statusCode"], 403);

    // Bad amounts never reach the provider
    let before = bank.calls.load(Ordering::SeqCst);
    let result = tools.call_json(
        "transfer_multiple",
        &json!({"account_id": "1", "transfers": [{"beneficiary_account_id": "2", "amount": "ten"}]}),
    );
    assert!(!result.success);
    assert_eq!(context_kind(&result.context), "validation");
    assert_eq!(bank.calls.load(Ordering::SeqCst), before);
}

fn context_kind(context: &Option<HashMap<String, JsonValue>>) -> String {
    context
        .as_ref()
        .and_then(|c| c.get("kind"))
        .and_then(|k| k.as_str())
        .unwrap_or_default()
        .to_string()
}

#[test]
fn test_envelope_serializes_for_agent_hosts() {
    let tools = ToolService::new(Arc::new(CannedBank::default()));
    let result = tools.call_json("get_beneficiaries", &json!({}));

    let wire = serde_json::to_value(&result).unwrap();
    assert_eq!(wire["success"], true);
    assert_eq!(wire["data"], json!([]));
    assert!(wire["error"].is_null());
}

#[test]
fn test_tool_service_shared_across_threads() {
    const THREADS: usize = 6;

    let bank = Arc::new(CannedBank::default());
    let tools = Arc::new(ToolService::new(bank.clone()));
    let barrier = Arc::new(Barrier::new(THREADS));

    let handles: Vec<_> = (0..THREADS)
        .map(|i| {
            let tools = Arc::clone(&tools);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                let amount = Decimal::from_str("10.00").unwrap() + Decimal::from(i as u32);
                tools.call(
                    "transfer_multiple",
                    &json!({
                        "account_id": "1",
                        "transfers": [{"beneficiary_account_id": "2", "amount": amount.to_string()}]
                    }),
                )
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap().unwrap();
    }
    assert_eq!(bank.calls.load(Ordering::SeqCst), THREADS);
}
