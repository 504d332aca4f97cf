//! # Export Sources
//!
//! Reads a Meistertask export from disk and normalizes it into an
//! [`Export`](crate::domain::Export).
//!
//! ## Formats
//!
//! | Extension | Handling |
//! |-----------|----------|
//! | `.zip` | First `.json` member (archive order) parsed as the JSON document |
//! | `.csv` | One task per row, see [`export_from_rows`] |
//! | other | Parsed as the JSON document |
//!
//! Structural problems surface as [`ExportError`] before anything touches the network.

mod archive;
mod assignees;
mod tabular;

use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::domain::Export;

pub use archive::read_archive;
pub use assignees::{assignee_template, load_assignee_map, write_assignee_template, AssigneeMap};
pub use tabular::{export_from_rows, read_rows, TabularRow, DEFAULT_PROJECT_NAME, DEFAULT_SECTION};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Zip file {0} contains no .json export")]
    NoDocument(PathBuf),

    #[error("Invalid zip archive: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("Invalid JSON export: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CSV export: {0}")]
    Csv(#[from] csv::Error),

    #[error("Assignee map template generation only supports CSV exports, got {0}")]
    TemplateNeedsCsv(PathBuf),

    #[error("Assignee map must be a JSON object of {{name: user_id}}")]
    InvalidAssigneeMap,
}

/// Input format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Archive,
    Tabular,
    Document,
}

impl SourceFormat {
    /// Detects the format from a path's extension (case-insensitive)
    pub fn detect(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("zip") => SourceFormat::Archive,
            Some("csv") => SourceFormat::Tabular,
            _ => SourceFormat::Document,
        }
    }
}

/// Loads and normalizes an export from any supported format
pub fn load_export(path: &Path) -> Result<Export, ExportError> {
    match SourceFormat::detect(path) {
        SourceFormat::Archive => read_archive(path),
        SourceFormat::Tabular => Ok(export_from_rows(&read_rows(path)?)),
        SourceFormat::Document => {
            let content = read_file(path)?;
            parse_document(&content)
        }
    }
}

/// Parses the JSON document form of an export
pub fn parse_document(content: &str) -> Result<Export, ExportError> {
    Ok(serde_json::from_str(content)?)
}

fn read_file(path: &Path) -> Result<String, ExportError> {
    fs::read_to_string(path).map_err(|source| ExportError::Read {
        path: path.to_path_buf(),
        source,
    })
}
