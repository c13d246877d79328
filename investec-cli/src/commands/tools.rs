//! Tool commands - list and invoke the agent-facing tools

use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use investec_core::ToolService;
use serde_json::Value as JsonValue;

use super::{get_client, with_spinner};
use crate::output;

pub fn run_list(json: bool) -> Result<()> {
    let definitions = ToolService::definitions();

    if json {
        return output::json(&definitions);
    }

    let mut table = output::create_table();
    table.set_header(vec!["Tool", "Description", "Arguments"]);
    for definition in &definitions {
        let arguments = definition.input_schema["properties"]
            .as_object()
            .map(|props| props.keys().cloned().collect::<Vec<_>>().join(", "))
            .unwrap_or_default();
        table.add_row(vec![
            definition.name.to_string(),
            definition.description.to_string(),
            arguments,
        ]);
    }
    println!("{}", table);
    println!("{}", "Invoke with: inv tool <name> --args '<json>'".dimmed());
    Ok(())
}

/// Invoke one tool and print the result envelope; failures set the exit code
pub fn run_call(sandbox: bool, name: &str, args: &str) -> Result<()> {
    let args: JsonValue =
        serde_json::from_str(args).context("--args must be a JSON object")?;

    let client = get_client(sandbox)?;
    let tools = ToolService::new(Arc::new(client));
    let result = with_spinner(&format!("Running {}...", name), || Ok(tools.call_json(name, &args)))?;

    output::json(&result)?;
    if !result.success {
        anyhow::bail!("tool {} failed", name);
    }
    Ok(())
}
