//! Output writing - binary PRG/CHR files and the optional JSON report.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::pipeline::ConversionStats;

/// Error type for output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("cannot serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// Write a byte buffer, creating parent directories as needed.
pub fn write_binary(path: &Path, data: &[u8]) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, data)?;
    Ok(())
}

/// Write the conversion stats as pretty-printed JSON.
pub fn write_report(path: &Path, stats: &ConversionStats) -> Result<(), OutputError> {
    let json = serde_json::to_string_pretty(stats)?;
    write_binary(path, json.as_bytes())
}
