//! JSON output for the tsq binary
//!
//! Results go to stdout, errors to stderr as `{"error": "..."}`, so callers
//! can always parse both streams.

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;

/// Render a value as pretty (default) or single-line JSON
pub fn render_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> serde_json::Result<String> {
    if compact {
        serde_json::to_string(value)
    } else {
        serde_json::to_string_pretty(value)
    }
}

/// Write a value to stdout followed by a newline
pub fn print_json<T: Serialize + ?Sized>(value: &T, compact: bool) -> Result<()> {
    let rendered = render_json(value, compact).context("Failed to serialize output")?;
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "{}", rendered).context("Failed to write output")?;
    Ok(())
}

/// Report a failure on stderr as a JSON object
pub fn error(message: &str) {
    eprintln!("{}", serde_json::json!({ "error": message }));
}
