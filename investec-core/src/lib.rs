//! Investec Core - typed client for Investec Programmable Banking
//!
//! This crate follows a hexagonal layout:
//!
//! - **domain**: API models (Account, Transaction, TransferItem, etc.) and the error type
//! - **ports**: Trait definitions for the bank (BankingProvider)
//! - **services**: The tool adapter that exposes banking operations by name
//! - **adapters**: The Investec HTTP client, its token manager and dispatcher
//!
//! ```no_run
//! use investec_core::{Config, InvestecClient};
//!
//! # fn main() -> investec_core::Result<()> {
//! let client = InvestecClient::new(Config::sandbox())?;
//! for account in client.get_accounts()? {
//!     println!("{} {}", account.account_id, account.display_name());
//! }
//! # Ok(())
//! # }
//! ```

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

// Re-export commonly used types at crate root
pub use adapters::investec::InvestecClient;
pub use config::Config;
pub use domain::result::{Error, OperationResult, Result};
pub use domain::{
    Account, AccountBalance, AuthorisationSetup, Beneficiary, BeneficiaryCategory,
    BeneficiaryPaymentItem, Document, PendingTransaction, Profile, Transaction, TransactionQuery,
    TransactionStatus, TransactionType, TransferItem, TransferResponseItem, TransferResult,
};
pub use ports::BankingProvider;
pub use services::{ToolDefinition, ToolService};
