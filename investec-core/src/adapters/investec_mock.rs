//! Mock Investec API server for testing
//!
//! Serves the token endpoint and the `za/pb/v1` routes the client uses, with
//! the same envelope shape as the real API (`{ "data": ... }`). Every request
//! is counted so tests can assert exactly how many token fetches and API calls
//! were made.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use serde_json::{json, Value as JsonValue};

/// Mock server behaviour switches
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// `expires_in` reported by the token endpoint
    pub expires_in: u64,
    /// Delay before answering a token request
    pub token_delay_ms: u64,
    /// Token endpoint answers 401 `invalid_client`
    pub fail_token: bool,
    /// Token endpoint answers 200 without an `access_token`
    pub token_without_value: bool,
    /// Number of API calls answered with 401 before succeeding
    pub unauthorized_responses: usize,
    /// API calls answer 429 with `Retry-After: 7`
    pub rate_limit: bool,
    /// API calls answer 500
    pub server_error: bool,
    /// API calls close the connection without answering
    pub drop_connections: bool,
    /// Accounts listing omits the required `accountId`
    pub malformed_accounts: bool,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            expires_in: 1799,
            token_delay_ms: 0,
            fail_token: false,
            token_without_value: false,
            unauthorized_responses: 0,
            rate_limit: false,
            server_error: false,
            drop_connections: false,
            malformed_accounts: false,
        }
    }
}

#[derive(Default)]
struct MockState {
    token_requests: AtomicUsize,
    api_requests: AtomicUsize,
    last_token_request: Mutex<Option<String>>,
    last_api_body: Mutex<Option<String>>,
    last_api_target: Mutex<Option<String>>,
}

/// Mock Investec server running on a background thread
pub struct MockInvestecServer {
    port: u16,
    running: Arc<AtomicBool>,
    state: Arc<MockState>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

impl MockInvestecServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let state = Arc::new(MockState::default());

        // Non-blocking so the accept loop notices shutdown
        listener.set_nonblocking(true)?;

        let running_clone = Arc::clone(&running);
        let state_clone = Arc::clone(&state);
        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        let state = Arc::clone(&state_clone);
                        thread::spawn(move || handle_connection(stream, &cfg, &state));
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(Duration::from_millis(5));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            state,
            thread_handle: Some(thread_handle),
        })
    }

    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    pub fn token_requests(&self) -> usize {
        self.state.token_requests.load(Ordering::SeqCst)
    }

    pub fn api_requests(&self) -> usize {
        self.state.api_requests.load(Ordering::SeqCst)
    }

    /// Raw text of the most recent token request
    pub fn last_token_request(&self) -> Option<String> {
        self.state.last_token_request.lock().unwrap().clone()
    }

    /// Body of the most recent API request
    pub fn last_api_body(&self) -> Option<String> {
        self.state.last_api_body.lock().unwrap().clone()
    }

    /// Path and query of the most recent API request
    pub fn last_api_target(&self) -> Option<String> {
        self.state.last_api_target.lock().unwrap().clone()
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockInvestecServer {
    fn drop(&mut self) {
        self.stop();
    }
}

struct MockRequest {
    method: String,
    target: String,
    head: String,
    body: String,
}

impl MockRequest {
    fn path(&self) -> &str {
        self.target.split('?').next().unwrap_or("")
    }

    fn query(&self) -> &str {
        self.target.split_once('?').map(|(_, q)| q).unwrap_or("")
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.head.lines().skip(1).find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case(name)
                .then(|| value.trim())
        })
    }
}

fn read_request(stream: &mut TcpStream) -> Option<MockRequest> {
    stream.set_nonblocking(false).ok()?;
    stream.set_read_timeout(Some(Duration::from_secs(5))).ok()?;

    let mut data = Vec::new();
    let mut buffer = [0; 4096];
    let header_end = loop {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            return None;
        }
        data.extend_from_slice(&buffer[..n]);
        if let Some(pos) = data.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos;
        }
    };

    let head = String::from_utf8_lossy(&data[..header_end]).to_string();
    let content_length = head
        .lines()
        .find_map(|line| {
            let (key, value) = line.split_once(':')?;
            key.trim()
                .eq_ignore_ascii_case("content-length")
                .then(|| value.trim().parse::<usize>().ok())
                .flatten()
        })
        .unwrap_or(0);

    let body_start = header_end + 4;
    while data.len() < body_start + content_length {
        let n = stream.read(&mut buffer).ok()?;
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buffer[..n]);
    }
    let body_end = data.len().min(body_start + content_length);
    let body = String::from_utf8_lossy(&data[body_start..body_end]).to_string();

    let mut parts = head.lines().next()?.split_whitespace();
    let method = parts.next()?.to_string();
    let target = parts.next()?.to_string();

    Some(MockRequest {
        method,
        target,
        head,
        body,
    })
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig, state: &MockState) {
    let Some(request) = read_request(&mut stream) else {
        return;
    };

    if request.path() == "/identity/v2/oauth2/token" {
        handle_token(&mut stream, &request, config, state);
        return;
    }

    let call_number = state.api_requests.fetch_add(1, Ordering::SeqCst);
    *state.last_api_target.lock().unwrap() = Some(request.target.clone());
    if !request.body.is_empty() {
        *state.last_api_body.lock().unwrap() = Some(request.body.clone());
    }

    if config.drop_connections {
        return;
    }

    let bearer_ok = request
        .header("authorization")
        .is_some_and(|v| v.starts_with("Bearer mock-token-"));
    let api_key_ok = request.header("x-api-key").is_some_and(|v| !v.is_empty());
    if !bearer_ok || !api_key_ok || call_number < config.unauthorized_responses {
        send_json(&mut stream, 401, "Unauthorized", &json!({"error": "invalid_token"}), &[]);
        return;
    }

    if config.rate_limit {
        send_json(
            &mut stream,
            429,
            "Too Many Requests",
            &json!({"message": "rate limit exceeded"}),
            &[("Retry-After", "7")],
        );
        return;
    }

    if config.server_error {
        send_json(&mut stream, 500, "Internal Server Error", &json!({"message": "boom"}), &[]);
        return;
    }

    route(&mut stream, &request, config);
}

fn handle_token(stream: &mut TcpStream, request: &MockRequest, config: &MockConfig, state: &MockState) {
    let number = state.token_requests.fetch_add(1, Ordering::SeqCst) + 1;
    *state.last_token_request.lock().unwrap() =
        Some(format!("{}\r\n\r\n{}", request.head, request.body));

    if config.token_delay_ms > 0 {
        thread::sleep(Duration::from_millis(config.token_delay_ms));
    }

    let has_basic = request
        .header("authorization")
        .is_some_and(|v| v.starts_with("Basic "));
    if config.fail_token || !has_basic || request.method != "POST" {
        send_json(stream, 401, "Unauthorized", &json!({"error": "invalid_client"}), &[]);
        return;
    }

    let body = if config.token_without_value {
        json!({"token_type": "Bearer", "expires_in": config.expires_in})
    } else {
        json!({
            "access_token": format!("mock-token-{}", number),
            "token_type": "Bearer",
            "expires_in": config.expires_in,
            "scope": "accounts"
        })
    };
    send_json(stream, 200, "OK", &body, &[]);
}

fn route(stream: &mut TcpStream, request: &MockRequest, config: &MockConfig) {
    let path = request.path().trim_start_matches("/za/pb/v1");
    let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

    let data = match (request.method.as_str(), segments.as_slice()) {
        ("GET", ["accounts"]) => {
            if config.malformed_accounts {
                json!({"accounts": [{"accountName": "No id"}]})
            } else {
                json!({"accounts": [account("1001"), account("1002")]})
            }
        }
        ("GET", ["accounts", "beneficiaries"]) => json!([beneficiary("b-1"), beneficiary("b-2")]),
        ("GET", ["accounts", "beneficiarycategories"]) => {
            json!([{"id": "1", "isDefault": "true", "name": "General"}])
        }
        ("GET", ["accounts", id, "balance"]) => json!({
            "accountId": id,
            "currentBalance": 28857.76,
            "availableBalance": 98857.76,
            "budgetBalance": 0,
            "straightBalance": 0,
            "cashBalance": 28857.76,
            "currency": "ZAR"
        }),
        ("GET", ["accounts", id, "transactions"]) => {
            let mut transactions = vec![
                transaction(id, "DEBIT", "POSTED", "120.50", "2024-03-01"),
                transaction(id, "CREDIT", "POSTED", "5000.00", "2024-03-02"),
            ];
            if request.query().contains("includePending=true") {
                transactions.push(transaction(id, "DEBIT", "PENDING", "35.00", "2024-03-03"));
            }
            json!({"transactions": transactions})
        }
        ("GET", ["accounts", id, "pending-transactions"]) => json!({
            "PendingTransaction": [{
                "accountId": id,
                "type": "DEBIT",
                "status": "PENDING",
                "description": "FUEL STATION",
                "transactionDate": "2024-03-03",
                "amount": 650.0
            }]
        }),
        ("POST", ["accounts", _, "transfermultiple"]) => {
            let body: JsonValue = serde_json::from_str(&request.body).unwrap_or(JsonValue::Null);
            let responses = echo_batch(&body["transferList"], "beneficiaryAccountId");
            json!({"transferResponse": {"TransferResponses": responses, "ErrorMessage": null}})
        }
        ("POST", ["accounts", _, "paymultiple"]) => {
            let body: JsonValue = serde_json::from_str(&request.body).unwrap_or(JsonValue::Null);
            let responses = echo_batch(&body["paymentList"], "beneficiaryId");
            json!({"TransferResponses": responses, "ErrorMessage": null})
        }
        ("GET", ["accounts", _, "documents"]) => json!([
            {"documentType": "Statement", "documentDate": "2024-01-31"},
            {"documentType": "TaxCertificate", "documentDate": "2024-02-28"}
        ]),
        ("GET", ["accounts", _, "document", _, _]) => {
            send_raw(stream, 200, "OK", "application/pdf", b"%PDF-1.4 mock", &[]);
            return;
        }
        ("GET", ["profiles"]) => json!([
            {"profileId": "p-1", "profileName": "John Doe", "defaultProfile": true},
            {"profileId": "p-2", "profileName": "Doe Holdings", "defaultProfile": false}
        ]),
        ("GET", ["profiles", _, "accounts"]) => json!([account("2001")]),
        ("GET", ["profiles", _, "accounts", _, "beneficiaries"]) => json!([beneficiary("b-9")]),
        ("GET", ["profiles", _, "accounts", _, "authorisationsetupdetails"]) => json!({
            "numberOfAuthorisationRequired": "1",
            "period": [{"id": "1", "description": "Same day"}],
            "authorisersListA": [{"authoriserId": "a-1", "name": "John Doe"}],
            "authorisersListB": []
        }),
        _ => {
            send_json(stream, 404, "Not Found", &json!({"message": "not found"}), &[]);
            return;
        }
    };

    let envelope = json!({"data": data, "links": {"self": request.target}, "meta": {"totalPages": 1}});
    send_json(stream, 200, "OK", &envelope, &[]);
}

fn account(id: &str) -> JsonValue {
    json!({
        "accountId": id,
        "accountNumber": format!("1001{}", id),
        "accountName": "Mr John Doe",
        "referenceName": format!("Account {}", id),
        "productName": "Private Bank Account",
        "kycCompliant": true,
        "profileId": "p-1",
        "profileName": "John Doe"
    })
}

fn beneficiary(id: &str) -> JsonValue {
    json!({
        "beneficiaryId": id,
        "accountNumber": "10012345678",
        "code": "580105",
        "bank": "INVESTEC BANK LIMITED",
        "beneficiaryName": format!("Payee {}", id),
        "referenceName": "Rent",
        "fasterPaymentAllowed": true,
        "beneficiaryType": "PRIVATE"
    })
}

fn transaction(account_id: &str, kind: &str, status: &str, amount: &str, date: &str) -> JsonValue {
    json!({
        "accountId": account_id,
        "type": kind,
        "transactionType": "CardPurchases",
        "status": status,
        "description": format!("{} {}", kind, amount),
        "postingDate": date,
        "valueDate": date,
        "actionDate": date,
        "transactionDate": date,
        "amount": amount.parse::<f64>().unwrap_or(0.0),
        "runningBalance": 1000.0
    })
}

fn echo_batch(list: &JsonValue, id_field: &str) -> Vec<JsonValue> {
    list.as_array()
        .map(|items| {
            items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    json!({
                        "PaymentReferenceNumber": format!("REF{}-{}", i + 1, item[id_field].as_str().unwrap_or("")),
                        "PaymentDate": "2024-03-15",
                        "Status": format!("- No authorisation necessary (amount {})", item["amount"].as_str().unwrap_or("?")),
                        "BeneficiaryName": "Payee",
                        "BeneficiaryAccountId": item[id_field],
                        "AuthorisationRequired": false
                    })
                })
                .collect()
        })
        .unwrap_or_default()
}

fn send_json(
    stream: &mut TcpStream,
    status: u16,
    reason: &str,
    body: &JsonValue,
    headers: &[(&str, &str)],
) {
    let body = body.to_string();
    send_raw(stream, status, reason, "application/json", body.as_bytes(), headers);
}

fn send_raw(
    stream: &mut TcpStream,
    status: u16,
    reason: &str,
    content_type: &str,
    body: &[u8],
    headers: &[(&str, &str)],
) {
    let mut head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n",
        status,
        reason,
        content_type,
        body.len()
    );
    for (name, value) in headers {
        head.push_str(&format!("{}: {}\r\n", name, value));
    }
    head.push_str("\r\n");

    let _ = stream.write_all(head.as_bytes());
    let _ = stream.write_all(body);
    let _ = stream.flush();
}
