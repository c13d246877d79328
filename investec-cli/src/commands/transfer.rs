//! Transfer and payment commands - these move real money

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use investec_core::{BeneficiaryPaymentItem, TransferItem, TransferResult};

use super::{get_client, with_spinner};
use crate::output;

/// Ask before moving money unless `--yes` was given
fn confirm(summary: &str, yes: bool) -> Result<bool> {
    if yes {
        return Ok(true);
    }

    println!("\n{}", summary.yellow());
    let confirmed = Confirm::new()
        .with_prompt("Proceed?")
        .default(false)
        .interact()?;
    if !confirmed {
        println!("{}\n", "Cancelled".dimmed());
    }
    Ok(confirmed)
}

fn print_result(result: &TransferResult, json: bool) -> Result<()> {
    if json {
        return output::json(result);
    }

    if let Some(message) = result.error_message.as_deref().filter(|m| !m.is_empty()) {
        output::error(message);
    }
    if result.transfer_responses.is_empty() {
        output::warning("No responses received.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Reference", "Date", "Status", "Beneficiary", "Needs authorisation"]);
    for response in &result.transfer_responses {
        table.add_row(vec![
            response.payment_reference_number.clone().unwrap_or_default(),
            response.payment_date.clone().unwrap_or_default(),
            response.status.clone().unwrap_or_default(),
            response
                .beneficiary_name
                .clone()
                .or_else(|| response.beneficiary_account_id.clone())
                .unwrap_or_default(),
            if response.authorisation_required { "yes" } else { "" }.to_string(),
        ]);
    }
    println!("{}", table);

    if result.requires_authorisation() {
        output::warning("Some payments are waiting for a second authoriser.");
    }
    Ok(())
}

pub fn run_transfer(
    sandbox: bool,
    account_id: &str,
    item: TransferItem,
    profile_id: Option<&str>,
    yes: bool,
    json: bool,
) -> Result<()> {
    let client = get_client(sandbox)?;

    let summary = format!(
        "Transfer {} from account {} to account {}.",
        output::format_amount(item.amount, "ZAR"),
        account_id,
        item.beneficiary_account_id
    );
    if !confirm(&summary, yes)? {
        return Ok(());
    }

    let items = [item];
    let result = with_spinner("Submitting transfer...", || {
        client.transfer_multiple(account_id, &items, profile_id)
    })?;
    print_result(&result, json)
}

pub fn run_pay(
    sandbox: bool,
    account_id: &str,
    item: BeneficiaryPaymentItem,
    yes: bool,
    json: bool,
) -> Result<()> {
    let client = get_client(sandbox)?;

    let summary = format!(
        "Pay {} from account {} to beneficiary {}{}.",
        output::format_amount(item.amount, "ZAR"),
        account_id,
        item.beneficiary_id,
        if item.faster_payment == Some(true) { " (instant)" } else { "" }
    );
    if !confirm(&summary, yes)? {
        return Ok(());
    }

    let items = [item];
    let result = with_spinner("Submitting payment...", || {
        client.pay_beneficiaries(account_id, &items)
    })?;
    print_result(&result, json)
}
