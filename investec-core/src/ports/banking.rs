//! Banking provider port
//!
//! The operations the tool adapter needs from a bank. [`InvestecClient`]
//! implements it against the live API; tests substitute canned providers.
//!
//! [`InvestecClient`]: crate::adapters::investec::InvestecClient

use crate::domain::result::Result;
use crate::domain::{
    Account, AccountBalance, Beneficiary, BeneficiaryCategory, BeneficiaryPaymentItem,
    PendingTransaction, Profile, Transaction, TransactionQuery, TransferItem, TransferResult,
};

/// Read and money-movement operations exposed as tools
pub trait BankingProvider: Send + Sync {
    /// Provider name (e.g., "investec")
    fn name(&self) -> &str;

    fn get_accounts(&self) -> Result<Vec<Account>>;

    fn get_account_balance(&self, account_id: &str) -> Result<AccountBalance>;

    /// Transactions for one account, filtered by `query`
    fn get_account_transactions(
        &self,
        account_id: &str,
        query: &TransactionQuery,
    ) -> Result<Vec<Transaction>>;

    fn get_account_pending_transactions(&self, account_id: &str) -> Result<Vec<PendingTransaction>>;

    fn get_beneficiaries(&self) -> Result<Vec<Beneficiary>>;

    fn get_beneficiary_categories(&self) -> Result<Vec<BeneficiaryCategory>>;

    fn get_profiles(&self) -> Result<Vec<Profile>>;

    fn get_profile_accounts(&self, profile_id: &str) -> Result<Vec<Account>>;

    /// Move money between own accounts in one batch
    ///
    /// # Arguments
    /// * `account_id` - Account the money leaves from
    /// * `transfers` - Non-empty batch; results come back in the same order
    /// * `profile_id` - Profile owning the account, for multi-profile users
    fn transfer_multiple(
        &self,
        account_id: &str,
        transfers: &[TransferItem],
        profile_id: Option<&str>,
    ) -> Result<TransferResult>;

    /// Pay saved beneficiaries in one batch
    fn pay_beneficiaries(
        &self,
        account_id: &str,
        payments: &[BeneficiaryPaymentItem],
    ) -> Result<TransferResult>;
}
