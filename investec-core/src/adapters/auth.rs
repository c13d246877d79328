//! OAuth2 client-credentials token management
//!
//! One [`TokenManager`] lives inside each client. The cached token sits behind
//! a mutex that is held for the whole refresh, so concurrent callers that find
//! the token expired wait for a single network fetch and then share its result.

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use reqwest::blocking::Client;
use reqwest::header::ACCEPT;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value as JsonValue;
use tracing::{debug, info};

use crate::config::Config;
use crate::domain::result::{Error, Result};

/// Lifetime assumed when the token endpoint omits `expires_in`
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(1799);

/// Longest response body quoted back in an error message
const MAX_ERROR_BODY: usize = 512;

/// A bearer token together with the instant it stops being usable
///
/// `expires_at` already has the refresh margin subtracted.
#[derive(Clone)]
pub struct AccessToken {
    value: Arc<SecretString>,
    expires_at: Instant,
}

impl AccessToken {
    pub(crate) fn new(value: String, ttl: Duration, margin: Duration) -> Self {
        let now = Instant::now();
        let lifetime = ttl.saturating_sub(margin);
        let expires_at = now
            .checked_add(lifetime)
            .or_else(|| now.checked_add(DEFAULT_TOKEN_TTL.saturating_sub(margin)))
            .unwrap_or(now);
        Self {
            value: Arc::new(SecretString::from(value)),
            expires_at,
        }
    }

    pub fn is_valid(&self) -> bool {
        Instant::now() < self.expires_at
    }

    pub(crate) fn secret(&self) -> &str {
        self.value.expose_secret()
    }

    fn same_as(&self, other: &AccessToken) -> bool {
        Arc::ptr_eq(&self.value, &other.value)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("value", &"[REDACTED]")
            .field("valid", &self.is_valid())
            .finish()
    }
}

/// Token endpoint payload
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    /// Seconds; some gateways send it as a string
    #[serde(default)]
    expires_in: Option<JsonValue>,
}

impl TokenResponse {
    fn ttl(&self) -> Duration {
        let seconds = match &self.expires_in {
            Some(JsonValue::Number(n)) => n.as_f64(),
            Some(JsonValue::String(s)) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        seconds
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
            .unwrap_or(DEFAULT_TOKEN_TTL)
    }
}

/// Owns the access token and fetches a new one whenever it is missing or stale
pub struct TokenManager {
    config: Arc<Config>,
    client: Client,
    cached: Mutex<Option<AccessToken>>,
}

impl TokenManager {
    pub fn new(config: Arc<Config>, client: Client) -> Self {
        Self {
            config,
            client,
            cached: Mutex::new(None),
        }
    }

    /// Return the cached token, fetching a fresh one if it is absent or expired
    pub fn get_valid_token(&self) -> Result<AccessToken> {
        let mut cached = self.lock();

        if let Some(token) = cached.as_ref() {
            if token.is_valid() {
                debug!("using cached access token");
                return Ok(token.clone());
            }
            debug!("cached access token expired");
        }

        // Dropped first so a failed refresh never leaves a stale token behind
        *cached = None;
        let token = self.fetch()?;
        *cached = Some(token.clone());
        Ok(token)
    }

    /// Forget `rejected` if it is still the cached token
    ///
    /// Callers that raced on the same rejected token only clear it once; the
    /// first caller to refresh installs the replacement for everyone else.
    pub fn invalidate(&self, rejected: &AccessToken) {
        let mut cached = self.lock();
        if cached.as_ref().is_some_and(|t| t.same_as(rejected)) {
            debug!("discarding rejected access token");
            *cached = None;
        }
    }

    /// True while a usable token is cached
    pub fn has_valid_token(&self) -> bool {
        self.lock().as_ref().is_some_and(AccessToken::is_valid)
    }

    fn lock(&self) -> MutexGuard<'_, Option<AccessToken>> {
        // The guarded value is a plain Option, so a panic elsewhere cannot
        // leave it half-written.
        self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fetch(&self) -> Result<AccessToken> {
        let url = self.config.token_url();
        debug!(%url, "requesting access token");

        let response = self
            .client
            .post(&url)
            .basic_auth(
                &self.config.client_id,
                Some(self.config.client_secret.expose_secret()),
            )
            .header("x-api-key", self.config.api_key.expose_secret())
            .header(ACCEPT, "application/json")
            .form(&[("grant_type", "client_credentials")])
            .send()
            .map_err(|e| {
                Error::authentication(None, format!("token request failed: {}", describe_transport(&e)))
            })?;

        let status = response.status();
        let body = response
            .text()
            .map_err(|e| Error::authentication(Some(status.as_u16()), format!("failed to read token response: {}", e)))?;

        if !status.is_success() {
            return Err(Error::authentication(
                Some(status.as_u16()),
                format!("token endpoint returned HTTP {}: {}", status.as_u16(), truncate(&body)),
            ));
        }

        let payload: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            Error::authentication(Some(status.as_u16()), format!("malformed token response: {}", e))
        })?;

        let ttl = payload.ttl();
        let value = payload
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::authentication(Some(status.as_u16()), "no access token in response")
            })?;

        info!(ttl_secs = ttl.as_secs(), "obtained new access token");
        Ok(AccessToken::new(value, ttl, self.config.refresh_margin))
    }
}

/// User-facing description of a failed HTTP exchange
pub(crate) fn describe_transport(error: &reqwest::Error) -> String {
    if error.is_timeout() {
        "connection timed out".to_string()
    } else if error.is_connect() {
        "unable to connect to the Investec API".to_string()
    } else {
        error.to_string()
    }
}

pub(crate) fn truncate(body: &str) -> &str {
    if body.len() <= MAX_ERROR_BODY {
        return body;
    }
    let mut end = MAX_ERROR_BODY;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}
