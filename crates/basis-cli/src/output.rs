// crates/basis-cli/src/output.rs
//
// Output formatting utilities for the Basis CLI.
// Supports table and JSON output modes.

use chrono::DateTime;
use serde::Serialize;
use tabled::{Table, Tabled};

use basis_core::{mul_div, Coins, Timestamp, PRICE_PRECISION, UNITS_PER_COIN};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

/// One line of a two-column field/value table.
#[derive(Tabled)]
pub struct Field {
    #[tabled(rename = "Field")]
    pub name: String,
    #[tabled(rename = "Value")]
    pub value: String,
}

impl Field {
    pub fn new(name: &str, value: impl ToString) -> Self {
        Self {
            name: name.to_string(),
            value: value.to_string(),
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data)
        .unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

/// Print `value` as JSON, or `fields` as a table.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T, fields: Vec<Field>) {
    match format {
        OutputFormat::Json => println!("{}", format_json(value)),
        OutputFormat::Table => println!("{}", format_table(&fields)),
    }
}

/// A Q64.64 native-per-token price as decimal coins.
pub fn price_coins(price_q64: u128) -> String {
    match mul_div(price_q64, UNITS_PER_COIN, PRICE_PRECISION) {
        Ok(units) => Coins(units).to_string(),
        Err(_) => format!("{} (Q64.64)", price_q64),
    }
}

/// Unix seconds as RFC 3339, keeping the raw value.
pub fn timestamp(ts: Timestamp) -> String {
    match DateTime::from_timestamp(ts as i64, 0) {
        Some(dt) => format!("{} ({})", dt.to_rfc3339(), ts),
        None => ts.to_string(),
    }
}

pub fn optional_timestamp(ts: Option<Timestamp>) -> String {
    ts.map(timestamp).unwrap_or_else(|| "now".to_string())
}
