//! Core domain entities
//!
//! Typed request and response models for the Investec API. These are pure
//! data structures with (de)serialization and validation logic - no I/O.

mod account;
mod beneficiary;
pub(crate) mod de;
mod document;
mod payment;
mod profile;
pub mod result;
mod transaction;
mod transfer;

pub use account::{Account, AccountBalance};
pub use beneficiary::{Beneficiary, BeneficiaryCategory};
pub use document::Document;
pub use payment::{BeneficiaryPaymentItem, BeneficiaryPaymentRequest};
pub use profile::{AuthorisationPeriod, AuthorisationSetup, Authoriser, Profile};
pub use transaction::{
    PendingTransaction, Transaction, TransactionQuery, TransactionStatus, TransactionType,
};
pub use transfer::{TransferItem, TransferRequest, TransferResponseItem, TransferResult};
