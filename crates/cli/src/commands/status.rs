//! `status` and `test-email`: read-only probes of a running server.

use anyhow::{Context, Result};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use serde_json::Value;

use formmailer_client::{ClientConfig, HttpSubmitApi};

use crate::style;

/// Display the server status table.
pub async fn run_status(config: &ClientConfig, raw: bool) -> Result<()> {
    let api = HttpSubmitApi::new(config)?;
    let reply = api
        .get_json("/api/status")
        .await
        .with_context(|| format!("could not reach {}", config.api_base_url))?;

    if raw {
        println!("{}", serde_json::to_string_pretty(&reply.body)?);
        return Ok(());
    }

    println!();
    println!("{}", style::header("formmailer server"));
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Key", "Value"]);

    table.add_row(vec![Cell::new("URL"), Cell::new(&config.api_base_url)]);
    for key in ["status", "message", "version", "uptime_secs", "timestamp"] {
        if let Some(value) = reply.body.get(key) {
            table.add_row(vec![Cell::new(key), Cell::new(display_value(value))]);
        }
    }
    println!("{table}");

    if !reply.ok {
        anyhow::bail!("server answered with an error status");
    }
    Ok(())
}

/// Ask the server to verify its SMTP connection and print the verdict.
pub async fn run_test_email(config: &ClientConfig) -> Result<()> {
    let api = HttpSubmitApi::new(config)?;
    let reply = api
        .get_json("/test-email")
        .await
        .with_context(|| format!("could not reach {}", config.api_base_url))?;

    let success = reply.body.get("success").and_then(Value::as_bool) == Some(true);
    if success {
        println!("{}", style::success("SMTP connection verified"));
        if let Some(smtp) = reply.body.get("config") {
            for key in ["host", "port", "user"] {
                if let Some(value) = smtp.get(key) {
                    println!("  {:<5} {}", key, display_value(value));
                }
            }
        }
        return Ok(());
    }

    let error = reply.error.as_deref().unwrap_or("unknown error");
    println!("{}", style::error(error));
    if let Some(suggestion) = reply.body.get("suggestion").and_then(Value::as_str) {
        println!("  {}", style::dim(suggestion));
    }
    anyhow::bail!("SMTP check failed")
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_value_unquotes_strings() {
        assert_eq!(display_value(&json!("OK")), "OK");
        assert_eq!(display_value(&json!(42)), "42");
    }
}
