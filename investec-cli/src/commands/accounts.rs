//! Account, balance and profile commands

use anyhow::Result;
use colored::Colorize;
use comfy_table::Table;
use investec_core::Account;

use super::{get_client, with_spinner};
use crate::output;

fn accounts_table(accounts: &[Account]) -> Table {
    let mut table = output::create_table();
    table.set_header(vec!["Account ID", "Name", "Number", "Product", "Profile"]);
    for account in accounts {
        table.add_row(vec![
            account.account_id.as_str(),
            account.display_name(),
            account.account_number.as_str(),
            account.product_name.as_str(),
            account.profile_name.as_str(),
        ]);
    }
    table
}

fn print_accounts(accounts: &[Account], json: bool) -> Result<()> {
    if json {
        return output::json(&accounts);
    }
    if accounts.is_empty() {
        output::warning("No accounts found.");
        return Ok(());
    }
    println!("{}", accounts_table(accounts));
    Ok(())
}

pub fn run_accounts(sandbox: bool, json: bool) -> Result<()> {
    let client = get_client(sandbox)?;
    let accounts = with_spinner("Fetching accounts...", || client.get_accounts())?;
    print_accounts(&accounts, json)
}

pub fn run_profile_accounts(sandbox: bool, profile_id: &str, json: bool) -> Result<()> {
    let client = get_client(sandbox)?;
    let accounts = with_spinner("Fetching profile accounts...", || {
        client.get_profile_accounts(profile_id)
    })?;
    print_accounts(&accounts, json)
}

pub fn run_balance(sandbox: bool, account_id: &str, json: bool) -> Result<()> {
    let client = get_client(sandbox)?;
    let balance = with_spinner("Fetching balance...", || client.get_account_balance(account_id))?;

    if json {
        return output::json(&balance);
    }

    println!("{}", format!("Balance for account {}", balance.account_id).bold());
    let mut table = output::create_table();
    table.add_row(vec![
        "Current".to_string(),
        output::format_amount(balance.current_balance, &balance.currency),
    ]);
    table.add_row(vec![
        "Available".to_string(),
        output::format_amount(balance.available_balance, &balance.currency),
    ]);
    for (label, value) in [
        ("Budget", balance.budget_balance),
        ("Straight", balance.straight_balance),
        ("Cash", balance.cash_balance),
    ] {
        if let Some(value) = value {
            table.add_row(vec![
                label.to_string(),
                output::format_amount(value, &balance.currency),
            ]);
        }
    }
    println!("{}", table);
    Ok(())
}

pub fn run_profiles(sandbox: bool, json: bool) -> Result<()> {
    let client = get_client(sandbox)?;
    let profiles = with_spinner("Fetching profiles...", || client.get_profiles())?;

    if json {
        return output::json(&profiles);
    }
    if profiles.is_empty() {
        output::warning("No profiles found.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Profile ID", "Name", "Default"]);
    for profile in &profiles {
        table.add_row(vec![
            profile.profile_id.clone(),
            profile.profile_name.clone(),
            if profile.default_profile { "yes" } else { "" }.to_string(),
        ]);
    }
    println!("{}", table);
    Ok(())
}

pub fn run_auth_setup(sandbox: bool, profile_id: &str, account_id: &str, json: bool) -> Result<()> {
    let client = get_client(sandbox)?;
    let setup = with_spinner("Fetching authorisation setup...", || {
        client.get_authorisation_setup(profile_id, account_id)
    })?;

    if json {
        return output::json(&setup);
    }

    let required = if setup.number_of_authorisation_required.is_empty() {
        "0"
    } else {
        setup.number_of_authorisation_required.as_str()
    };
    println!("{} {}", "Authorisations required:".bold(), required);

    if !setup.period.is_empty() {
        println!();
        println!("{}", "Periods".bold());
        for period in &setup.period {
            println!("  {} {}", period.id.dimmed(), period.description);
        }
    }

    for (label, list) in [
        ("Authorisers (A)", &setup.authorisers_list_a),
        ("Authorisers (B)", &setup.authorisers_list_b),
    ] {
        if list.is_empty() {
            continue;
        }
        println!();
        println!("{}", label.bold());
        for authoriser in list {
            println!("  {} {}", authoriser.authoriser_id.dimmed(), authoriser.name);
        }
    }
    Ok(())
}
