//! The compose module writes cached summaries to files.

use log::info;
use std::fs::OpenOptions;
use std::io::Write;

use crate::DocumentKind;
use crate::error::{PipelineError, Result};
use crate::storage::Storage;

/// Writes the cached summary of a document kind of an origin to a plain text file.
///
/// # Arguments
///
/// * `storage` - Cache to read the summary from
/// * `origin` - Origin the summary is cached under
/// * `kind` - Which document summary to export
/// * `output_path` - Path to the output file, truncated if it exists
///
/// # Errors
///
/// Returns an error if:
/// * No summary is cached for the origin
/// * Database operations fail
/// * File operations fail
pub fn export_summary(
    storage: &Storage,
    origin: &str,
    kind: DocumentKind,
    output_path: &str,
) -> Result<()> {
    let summary = storage
        .cached_summary(origin, kind)?
        .ok_or_else(|| PipelineError::NotFound("No summary available to download.".into()))?;

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(output_path)?;

    file.write_all(summary.as_bytes())?;

    info!("Exported {kind} summary of {origin} to {output_path}");
    Ok(())
}
