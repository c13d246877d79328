//! Transaction listing commands

use anyhow::Result;
use colored::Colorize;
use investec_core::TransactionQuery;

use super::{get_client, with_spinner};
use crate::output;

/// Transactions are reported in the account currency
const CURRENCY: &str = "ZAR";

pub fn run_transactions(
    sandbox: bool,
    account_id: &str,
    query: &TransactionQuery,
    json: bool,
) -> Result<()> {
    let client = get_client(sandbox)?;
    let transactions = with_spinner("Fetching transactions...", || {
        client.get_account_transactions(account_id, query)
    })?;

    if json {
        return output::json(&transactions);
    }
    if transactions.is_empty() {
        output::warning("No transactions found for the specified criteria.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Date", "Description", "Amount", "Status", "Balance"]);
    for tx in &transactions {
        let status = if tx.is_pending() {
            tx.status.to_string().yellow().to_string()
        } else {
            tx.status.to_string()
        };
        table.add_row(vec![
            output::format_date(tx.transaction_date.or(tx.posting_date)),
            tx.description.clone(),
            output::colored_amount(tx.signed_amount(), CURRENCY).to_string(),
            status,
            tx.running_balance
                .map(|b| output::format_amount(b, CURRENCY))
                .unwrap_or_default(),
        ]);
    }
    println!("{}", table);
    println!("{}", format!("{} transaction(s)", transactions.len()).dimmed());
    Ok(())
}

pub fn run_pending(sandbox: bool, account_id: &str, json: bool) -> Result<()> {
    let client = get_client(sandbox)?;
    let pending = with_spinner("Fetching pending transactions...", || {
        client.get_account_pending_transactions(account_id)
    })?;

    if json {
        return output::json(&pending);
    }
    if pending.is_empty() {
        output::info("No pending transactions found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Date", "Description", "Type", "Amount"]);
    for tx in &pending {
        table.add_row(vec![
            output::format_date(tx.transaction_date),
            tx.description.clone(),
            tx.kind.to_string(),
            output::format_amount(tx.amount, CURRENCY),
        ]);
    }
    println!("{}", table);
    Ok(())
}
