//! CLI command implementations

pub mod accounts;
pub mod beneficiaries;
pub mod documents;
pub mod tools;
pub mod transactions;
pub mod transfer;

use std::time::Duration;

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use investec_core::{Config, Error, InvestecClient};
use tracing::warn;

/// Build a client from the environment
///
/// With `--sandbox` and no credentials configured, falls back to Investec's
/// public sandbox credentials.
pub fn get_client(sandbox: bool) -> Result<InvestecClient> {
    let config = match Config::from_env() {
        Ok(config) if sandbox => config.with_sandbox(true),
        Ok(config) => config,
        Err(Error::Config(message)) if sandbox => {
            warn!(%message, "using public sandbox credentials");
            Config::sandbox()
        }
        Err(e) => {
            return Err(e).context(
                "Investec credentials not configured. Set INVESTEC_CLIENT_ID, \
                 INVESTEC_CLIENT_SECRET and INVESTEC_API_KEY, or pass --sandbox",
            )
        }
    };

    InvestecClient::new(config).context("Failed to create Investec client")
}

/// Run `f` behind a spinner on stderr when it is a terminal
pub fn with_spinner<T>(message: &str, f: impl FnOnce() -> investec_core::Result<T>) -> Result<T> {
    if atty::isnt(atty::Stream::Stderr) {
        return Ok(f()?);
    }

    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(80));

    let result = f();
    spinner.finish_and_clear();
    Ok(result?)
}
