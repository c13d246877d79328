//! Port definitions (hexagonal architecture)
//!
//! Ports define the interfaces for external dependencies. The tool adapter
//! depends only on these traits, not on the concrete HTTP client.

mod banking;

pub use banking::BankingProvider;
