//! Authenticated request dispatch for the `za/pb/v1` API
//!
//! Every call goes through [`HttpDispatcher::request`] or
//! [`HttpDispatcher::request_bytes`], which attach the bearer token and API
//! key and turn non-2xx answers into typed [`Error`]s.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use reqwest::blocking::{Client, Response};
use reqwest::header::{ACCEPT, RETRY_AFTER};
use reqwest::{Method, StatusCode};
use secrecy::ExposeSecret;
use serde_json::Value as JsonValue;
use tracing::{debug, warn};

use super::auth::{describe_transport, truncate, AccessToken, TokenManager};
use crate::config::Config;
use crate::domain::result::{Error, Result};

/// Path prefix of the Private Banking API
pub const API_PREFIX: &str = "/za/pb/v1";

/// Sends authenticated requests and maps HTTP failures to [`Error`]
pub struct HttpDispatcher {
    client: Client,
    config: Arc<Config>,
    tokens: TokenManager,
}

impl HttpDispatcher {
    /// Build the HTTP client with the configured timeout
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::config(format!("failed to create HTTP client: {}", e)))?;
        let tokens = TokenManager::new(Arc::clone(&config), client.clone());

        Ok(Self {
            client,
            config,
            tokens,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn tokens(&self) -> &TokenManager {
        &self.tokens
    }

    /// Send a request and decode the JSON body; an empty body decodes as `{}`
    pub fn request(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&JsonValue>,
    ) -> Result<JsonValue> {
        let response = self.dispatch(method, path, query, body)?;
        let text = response
            .text()
            .map_err(|e| Error::transport(format!("failed to read response: {}", describe_transport(&e))))?;
        parse_json_body(&text)
    }

    /// Send a request and return the raw body, for binary downloads
    pub fn request_bytes(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Vec<u8>> {
        let response = self.dispatch(method, path, query, None)?;
        let bytes = response
            .bytes()
            .map_err(|e| Error::transport(format!("failed to read response: {}", describe_transport(&e))))?;
        Ok(bytes.to_vec())
    }

    fn dispatch(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&JsonValue>,
    ) -> Result<Response> {
        let url = format!(
            "{}{}{}",
            self.config.base_url().trim_end_matches('/'),
            API_PREFIX,
            path
        );

        let token = self.tokens.get_valid_token()?;
        let response = self.send(&token, &method, &url, query, body)?;

        if response.status() == StatusCode::UNAUTHORIZED && self.config.retry_on_unauthorized {
            warn!(%method, path, "access token rejected, refreshing and retrying once");
            self.tokens.invalidate(&token);
            let token = self.tokens.get_valid_token()?;
            let retried = self.send(&token, &method, &url, query, body)?;
            return check_response_status(retried);
        }

        check_response_status(response)
    }

    fn send(
        &self,
        token: &AccessToken,
        method: &Method,
        url: &str,
        query: &[(&str, String)],
        body: Option<&JsonValue>,
    ) -> Result<Response> {
        debug!(%method, url, "sending request");

        let mut request = self
            .client
            .request(method.clone(), url)
            .bearer_auth(token.secret())
            .header("x-api-key", self.config.api_key.expose_secret())
            .header(ACCEPT, "application/json");
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request
            .send()
            .map_err(|e| Error::transport(describe_transport(&e)))?;
        debug!(%method, url, status = response.status().as_u16(), "received response");
        Ok(response)
    }
}

/// Pass 2xx responses through, turn everything else into a typed error
fn check_response_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let retry_after = response
        .headers()
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_retry_after);
    // Best effort: the status is what matters if the body cannot be read
    let body = response.text().unwrap_or_default();
    let body = truncate(&body).to_string();
    let code = status.as_u16();

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(Error::authentication(
            Some(code),
            format!("Investec API returned HTTP {}: {}", code, body),
        )),
        StatusCode::TOO_MANY_REQUESTS => {
            warn!(retry_after_secs = retry_after.map(|d| d.as_secs()), "rate limited");
            Err(Error::RateLimit {
                status_code: code,
                retry_after,
                body: non_empty(body),
            })
        }
        _ => Err(Error::Request {
            status: Some(code),
            message: format!(
                "Investec API error: HTTP {} {}",
                code,
                status.canonical_reason().unwrap_or("")
            )
            .trim_end()
            .to_string(),
            body: non_empty(body),
        }),
    }
}

fn non_empty(body: String) -> Option<String> {
    if body.trim().is_empty() {
        None
    } else {
        Some(body)
    }
}

/// `Retry-After` is either delta-seconds or an HTTP date
fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }
    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    let wait = (at - Utc::now()).to_std().unwrap_or(Duration::ZERO);
    Some(wait)
}

fn parse_json_body(text: &str) -> Result<JsonValue> {
    if text.trim().is_empty() {
        return Ok(JsonValue::Object(serde_json::Map::new()));
    }
    serde_json::from_str(text)
        .map_err(|e| Error::validation(format!("response is not valid JSON: {}", e)))
}
