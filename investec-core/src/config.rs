//! Client configuration
//!
//! Credentials and connection settings are read from the environment:
//!
//! ```text
//! INVESTEC_CLIENT_ID, INVESTEC_CLIENT_SECRET, INVESTEC_API_KEY   (required)
//! INVESTEC_USE_SANDBOX, INVESTEC_TIMEOUT,
//! INVESTEC_PRODUCTION_URL, INVESTEC_SANDBOX_URL,
//! INVESTEC_REFRESH_MARGIN, INVESTEC_RETRY_ON_UNAUTHORIZED        (optional)
//! ```
//!
//! When any of the prefixed credentials is missing, the un-prefixed names
//! (`CLIENT_ID`, `CLIENT_SECRET`, `API_KEY`, `USE_SANDBOX`, ...) are used
//! instead, as a complete set.

use std::fmt;
use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use url::Url;

use crate::domain::result::{Error, Result};

pub const PRODUCTION_URL: &str = "https://openapi.investec.com";
pub const SANDBOX_URL: &str = "https://openapisandbox.investec.com";
pub const TOKEN_PATH: &str = "/identity/v2/oauth2/token";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

/// Prefix tried first when reading the environment
pub const ENV_PREFIX: &str = "INVESTEC_";

// Investec's published sandbox credentials. They only work against
// openapisandbox.investec.com and return canned data.
const SANDBOX_CLIENT_ID: &str = "yAxzQRFX97vOcyQAwluEU6H6ePxMA5eY";
const SANDBOX_CLIENT_SECRET: &str = "4dY0PjEYqoBrZ99r";
const SANDBOX_API_KEY: &str = "eUF4elFSRlg5N3ZPY3lRQXdsdUVVNkg2ZVB4TUE1ZVk6YVc1MlpYTjBaV010ZW1FdGNHSXRZV05qYjNWdWRITXRjMkZ1WkdKdmVBPT0=";

/// Immutable credentials and connection settings for one client
pub struct Config {
    pub client_id: String,
    pub client_secret: SecretString,
    pub api_key: SecretString,
    pub use_sandbox: bool,
    pub timeout: Duration,
    pub production_url: String,
    pub sandbox_url: String,
    /// Subtracted from the server-reported token lifetime
    pub refresh_margin: Duration,
    /// Refresh the token and replay a request once after a 401
    pub retry_on_unauthorized: bool,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted())
    }
}

impl Config {
    /// Create a production config with default settings
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
            api_key: SecretString::from(api_key.into()),
            use_sandbox: false,
            timeout: DEFAULT_TIMEOUT,
            production_url: PRODUCTION_URL.to_string(),
            sandbox_url: SANDBOX_URL.to_string(),
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            retry_on_unauthorized: true,
        }
    }

    /// Config for the public Investec sandbox
    pub fn sandbox() -> Self {
        Self::new(SANDBOX_CLIENT_ID, SANDBOX_CLIENT_SECRET, SANDBOX_API_KEY).with_sandbox(true)
    }

    /// Load config from process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load config through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |prefix: &str, name: &str| {
            lookup(&format!("{}{}", prefix, name))
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let has_prefixed = ["CLIENT_ID", "CLIENT_SECRET", "API_KEY"]
            .iter()
            .all(|name| read(ENV_PREFIX, *name).is_some());
        let prefix = if has_prefixed { ENV_PREFIX } else { "" };

        let mut missing = Vec::new();
        let mut required = |name: &str| {
            read(prefix, name).unwrap_or_else(|| {
                missing.push(format!("{}{}", ENV_PREFIX, name));
                String::new()
            })
        };
        let client_id = required("CLIENT_ID");
        let client_secret = required("CLIENT_SECRET");
        let api_key = required("API_KEY");
        if !missing.is_empty() {
            return Err(Error::config(format!(
                "missing required setting(s): {}",
                missing.join(", ")
            )));
        }

        let mut config = Self::new(client_id, client_secret, api_key);

        if let Some(value) = read(prefix, "USE_SANDBOX") {
            config.use_sandbox = parse_bool(&format!("{}USE_SANDBOX", prefix), &value)?;
        }
        if let Some(value) = read(prefix, "TIMEOUT") {
            config.timeout = parse_seconds(&format!("{}TIMEOUT", prefix), &value)?;
        }
        if let Some(value) = read(prefix, "REFRESH_MARGIN") {
            config.refresh_margin = parse_seconds(&format!("{}REFRESH_MARGIN", prefix), &value)?;
        }
        if let Some(value) = read(prefix, "RETRY_ON_UNAUTHORIZED") {
            config.retry_on_unauthorized =
                parse_bool(&format!("{}RETRY_ON_UNAUTHORIZED", prefix), &value)?;
        }
        if let Some(url) = read(prefix, "PRODUCTION_URL") {
            config.production_url = url;
        }
        if let Some(url) = read(prefix, "SANDBOX_URL") {
            config.sandbox_url = url;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn with_sandbox(mut self, use_sandbox: bool) -> Self {
        self.use_sandbox = use_sandbox;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    pub fn with_retry_on_unauthorized(mut self, retry: bool) -> Self {
        self.retry_on_unauthorized = retry;
        self
    }

    /// Point the currently selected environment at another host
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        if self.use_sandbox {
            self.sandbox_url = url.into();
        } else {
            self.production_url = url.into();
        }
        self
    }

    /// Base URL for the selected environment
    pub fn base_url(&self) -> &str {
        if self.use_sandbox {
            &self.sandbox_url
        } else {
            &self.production_url
        }
    }

    /// Full OAuth token endpoint URL
    pub fn token_url(&self) -> String {
        format!("{}{}", self.base_url().trim_end_matches('/'), TOKEN_PATH)
    }

    /// Check that every required value is present and well-formed
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::config("client id cannot be empty"));
        }
        if self.client_secret.expose_secret().trim().is_empty() {
            return Err(Error::config("client secret cannot be empty"));
        }
        if self.api_key.expose_secret().trim().is_empty() {
            return Err(Error::config("API key cannot be empty"));
        }
        if self.timeout.is_zero() {
            return Err(Error::config("timeout must be greater than zero"));
        }
        let url = Url::parse(self.base_url())
            .map_err(|e| Error::config(format!("invalid base URL {:?}: {}", self.base_url(), e)))?;
        if !matches!(url.scheme(), "https" | "http") {
            return Err(Error::config(format!(
                "base URL must be http(s), got {:?}",
                self.base_url()
            )));
        }
        Ok(())
    }

    /// Log-safe summary with secrets masked
    pub fn redacted(&self) -> String {
        let id_hint: String = self.client_id.chars().take(4).collect();
        format!(
            "client_id={}..., client_secret={}, api_key={}, use_sandbox={}, timeout={}s, base_url={}",
            id_hint,
            mask(self.client_secret.expose_secret()),
            mask(self.api_key.expose_secret()),
            self.use_sandbox,
            self.timeout.as_secs(),
            self.base_url(),
        )
    }
}

fn mask(secret: &str) -> &'static str {
    if secret.is_empty() {
        "Not set"
    } else {
        "***"
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(Error::config(format!(
            "{} must be true or false, got {:?}",
            key, value
        ))),
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<Duration> {
    value
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|_| Error::config(format!("{} must be a whole number of seconds, got {:?}", key, value)))
}
