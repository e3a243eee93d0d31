//! Fixture document output

use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// File extension of generated fixture documents
pub const EXTENSION: &str = "yml";

/// Who generated a document, written as its two-line header comment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Provenance {
    pub tool_name: String,
    pub project_url: String,
    pub org_name: String,
    pub org_url: String,
}

impl Default for Provenance {
    fn default() -> Self {
        Self {
            tool_name: "seedwright".to_string(),
            project_url: "https://github.com/seedwright/seedwright".to_string(),
            org_name: "Seedwright".to_string(),
            org_url: "https://seedwright.dev".to_string(),
        }
    }
}

impl Provenance {
    /// The header comment, newline terminated
    pub fn header(&self) -> String {
        format!(
            "# Generated by {} ({}).\n# This module is a part of {} ({}).\n",
            self.tool_name, self.project_url, self.org_name, self.org_url
        )
    }
}

/// Full document text: header followed by the entity blocks
pub fn document(provenance: &Provenance, body: &str) -> String {
    let mut text = provenance.header();
    text.push_str(body);
    text
}

/// Path of the document `<output_dir>/<filename>.yml`
pub fn output_path(output_dir: &Path, filename: &str) -> PathBuf {
    output_dir.join(format!("{}.{}", filename, EXTENSION))
}

/// Write a document, replacing whatever is at `path`
///
/// The text goes to a temporary file next to the target which is then
/// renamed over it, so a failed write leaves no partial document behind.
pub fn write(path: &Path, provenance: &Provenance, body: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let text = document(provenance, body);

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(text.as_bytes())?;
    file.flush()?;
    file.persist(path).map_err(|e| e.error)?;

    tracing::debug!("Wrote {} bytes to {:?}", text.len(), path);
    Ok(())
}
