//! Statement and tax document commands

use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use colored::Colorize;

use super::{get_client, with_spinner};
use crate::output;

pub fn run_list(sandbox: bool, account_id: &str, from: NaiveDate, to: NaiveDate, json: bool) -> Result<()> {
    let client = get_client(sandbox)?;
    let documents = with_spinner("Fetching documents...", || {
        client.get_documents(account_id, from, to)
    })?;

    if json {
        return output::json(&documents);
    }
    if documents.is_empty() {
        output::info(&format!("No documents between {} and {}.", from, to));
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Date", "Type"]);
    for document in &documents {
        table.add_row(vec![
            document.document_date.format("%Y-%m-%d").to_string(),
            document.document_type.clone(),
        ]);
    }
    println!("{}", table);
    println!(
        "{}",
        format!("Download with: inv document {} <type> <date> -o <file>", account_id).dimmed()
    );
    Ok(())
}

pub fn run_download(
    sandbox: bool,
    account_id: &str,
    document_type: &str,
    date: NaiveDate,
    path: &Path,
) -> Result<()> {
    let client = get_client(sandbox)?;
    let bytes = with_spinner("Downloading document...", || {
        client.get_document(account_id, document_type, date)
    })?;

    std::fs::write(path, &bytes)
        .with_context(|| format!("Failed to write document to {:?}", path))?;
    output::success(&format!("Saved {} bytes to {}", bytes.len(), path.display()));
    Ok(())
}
