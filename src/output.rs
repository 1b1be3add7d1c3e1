//! Output formatting and CSV export.

use anyhow::{Context, Result};
use serde::Serialize;
use std::fmt::Debug;
use tracing::{debug, info};

use csv::WriterBuilder;

/// Logs a value using Rust's debug pretty-print format.
pub fn print_pretty(value: &impl Debug) {
    debug!("{:#?}", value);
}

/// Logs a value as pretty-printed JSON.
pub fn print_json(value: &impl Serialize) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Writes `rows` to a CSV file at `path`, replacing any previous contents.
///
/// Headers come from the first row, so an empty slice yields an empty file.
pub fn write_table<T: Serialize>(path: &str, rows: &[T]) -> Result<()> {
    debug!(path, rows = rows.len(), "Writing CSV table");

    let mut writer = WriterBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("failed to create '{path}'"))?;

    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    Ok(())
}
