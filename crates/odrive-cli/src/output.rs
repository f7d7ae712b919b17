//! Output formatting for CLI responses

use serde_json::{json, Value};

use crate::error::{CliError, CliResult};

/// Result of a command: a line for humans and the same data for scripts.
#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub text: String,
    pub data: Value,
}

impl Report {
    pub fn new(text: impl Into<String>, data: Value) -> Self {
        Report {
            text: text.into(),
            data,
        }
    }

    /// A command that produced no data.
    pub fn done() -> Self {
        Report::new("", Value::Null)
    }
}

/// Print a successful report.
pub fn print_report(report: &Report, json: bool) -> CliResult<()> {
    if json {
        let output = json!({ "success": true, "result": report.data });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if !report.text.is_empty() {
        println!("{}", report.text);
    }
    Ok(())
}

/// Print an error in the selected format.
pub fn print_error(error: &CliError, json: bool) {
    if json {
        let output = json!({ "success": false, "error": error.to_string() });
        match serde_json::to_string_pretty(&output) {
            Ok(s) => println!("{}", s),
            Err(e) => eprintln!("Failed to format error as JSON: {}", e),
        }
    } else {
        eprintln!("Error: {}", error);
    }
}
