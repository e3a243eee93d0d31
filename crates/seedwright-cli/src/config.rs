//! CLI configuration

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use seedwright_core::{ExportConfig, Provenance};

/// Default location of the config file
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("seedwright")
        .join("config.toml")
}

/// Configuration for the CLI
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory fixture documents are written to
    pub output_dir: PathBuf,
    /// Document name, without the `.yml` extension
    pub filename: String,
    pub follow_references: bool,
    pub tool_name: String,
    pub project_url: String,
    pub org_name: String,
    pub org_url: String,
}

impl Default for Config {
    fn default() -> Self {
        let export = ExportConfig::default();
        Self {
            output_dir: PathBuf::from("conf"),
            filename: "data".to_string(),
            follow_references: export.follow_references,
            tool_name: export.provenance.tool_name,
            project_url: export.provenance.project_url,
            org_name: export.provenance.org_name,
            org_url: export.provenance.org_url,
        }
    }
}

impl Config {
    /// Load the config file, falling back to defaults when it is absent
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            tracing::debug!("No config file at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Settable keys, in display order
    pub fn keys() -> &'static [&'static str] {
        &[
            "output_dir",
            "filename",
            "follow_references",
            "tool_name",
            "project_url",
            "org_name",
            "org_url",
        ]
    }

    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "output_dir" => Some(self.output_dir.display().to_string()),
            "filename" => Some(self.filename.clone()),
            "follow_references" => Some(self.follow_references.to_string()),
            "tool_name" => Some(self.tool_name.clone()),
            "project_url" => Some(self.project_url.clone()),
            "org_name" => Some(self.org_name.clone()),
            "org_url" => Some(self.org_url.clone()),
            _ => None,
        }
    }

    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "output_dir" => self.output_dir = PathBuf::from(value),
            "filename" => self.filename = value.to_string(),
            "follow_references" => {
                self.follow_references = value.parse().map_err(|_| {
                    anyhow::anyhow!("follow_references must be true or false, got '{}'", value)
                })?
            }
            "tool_name" => self.tool_name = value.to_string(),
            "project_url" => self.project_url = value.to_string(),
            "org_name" => self.org_name = value.to_string(),
            "org_url" => self.org_url = value.to_string(),
            _ => anyhow::bail!(
                "Unknown config key: {} (available: {})",
                key,
                Self::keys().join(", ")
            ),
        }
        Ok(())
    }

    /// Export settings derived from this config
    pub fn export_config(&self) -> ExportConfig {
        ExportConfig::new()
            .follow_references(self.follow_references)
            .with_provenance(Provenance {
                tool_name: self.tool_name.clone(),
                project_url: self.project_url.clone(),
                org_name: self.org_name.clone(),
                org_url: self.org_url.clone(),
            })
    }
}
