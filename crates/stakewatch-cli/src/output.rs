// crates/stakewatch-cli/src/output.rs
//
// Output formatting utilities for the StakeWatch CLI.
// Supports table and JSON output modes.

use serde::Serialize;
use tabled::{Table, Tabled};

/// Output format for CLI commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Pretty-printed table output (default).
    Table,
    /// JSON output for machine consumption.
    Json,
}

impl OutputFormat {
    pub fn from_json_flag(json: bool) -> Self {
        if json {
            OutputFormat::Json
        } else {
            OutputFormat::Table
        }
    }
}

/// Format a slice of Tabled items as a table string.
pub fn format_table<T: Tabled>(data: &[T]) -> String {
    Table::new(data).to_string()
}

/// Format a serializable value as a pretty-printed JSON string.
pub fn format_json<T: Serialize>(data: &T) -> String {
    serde_json::to_string_pretty(data).unwrap_or_else(|e| format!("JSON serialization error: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Tabled, Serialize)]
    struct Row {
        name: &'static str,
        value: u32,
    }

    #[test]
    fn table_has_headers_and_rows() {
        let table = format_table(&[Row { name: "a", value: 1 }]);
        assert!(table.contains("name"));
        assert!(table.contains("value"));
        assert!(table.contains('1'));
    }

    #[test]
    fn json_is_pretty() {
        let json = format_json(&Row { name: "a", value: 1 });
        assert!(json.contains("\"value\": 1"));
    }

    #[test]
    fn json_flag_selects_format() {
        assert_eq!(OutputFormat::from_json_flag(true), OutputFormat::Json);
        assert_eq!(OutputFormat::from_json_flag(false), OutputFormat::Table);
    }
}
