//! Beneficiary commands

use anyhow::Result;

use super::{get_client, with_spinner};
use crate::output;

/// List beneficiaries, either all of them or those of one profile account
pub fn run_beneficiaries(sandbox: bool, scope: Option<(String, String)>, json: bool) -> Result<()> {
    let client = get_client(sandbox)?;
    let beneficiaries = with_spinner("Fetching beneficiaries...", || match &scope {
        Some((profile_id, account_id)) => client.get_profile_beneficiaries(profile_id, account_id),
        None => client.get_beneficiaries(),
    })?;

    if json {
        return output::json(&beneficiaries);
    }
    if beneficiaries.is_empty() {
        output::warning("No beneficiaries found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Beneficiary ID", "Name", "Bank", "Account", "Last payment", "Fast"]);
    for b in &beneficiaries {
        let last_payment = match (&b.last_payment_amount, &b.last_payment_date) {
            (Some(amount), Some(date)) => format!("{} on {}", amount, date),
            (Some(amount), None) => amount.clone(),
            _ => String::new(),
        };
        table.add_row(vec![
            b.beneficiary_id.clone(),
            b.display_name().to_string(),
            b.bank.clone().unwrap_or_default(),
            b.account_number.clone().unwrap_or_default(),
            last_payment,
            if b.faster_payment_allowed { "yes" } else { "" }.to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

pub fn run_categories(sandbox: bool, json: bool) -> Result<()> {
    let client = get_client(sandbox)?;
    let categories = with_spinner("Fetching beneficiary categories...", || {
        client.get_beneficiary_categories()
    })?;

    if json {
        return output::json(&categories);
    }
    if categories.is_empty() {
        output::warning("No beneficiary categories found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["ID", "Name", "Default"]);
    for category in &categories {
        table.add_row(vec![
            category.id.clone(),
            category.name.clone(),
            if category.is_default { "yes" } else { "" }.to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}
