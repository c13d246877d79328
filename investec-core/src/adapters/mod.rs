//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - Investec HTTP client for BankingProvider
//! - OAuth2 token manager and request dispatcher backing it
//! - In-process mock bank server for tests

pub mod auth;
pub mod http;
pub mod investec;

#[cfg(test)]
pub mod investec_mock;
