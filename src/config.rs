//! Config file loading.
//!
//! A config file describes one table: where it lives, which columns map to
//! which fields, and which CSV file backs it.

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use sheetable_core::{Credentials, Scheme, TableConfig};
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
struct ConfigFile {
    table_id: String,
    sheet: Option<String>,
    scheme: Scheme,
    #[serde(default)]
    credentials: Credentials,
    /// CSV file, relative to the config file.
    file: Option<PathBuf>,
}

/// Everything needed to open a table.
#[derive(Debug)]
pub struct LoadedConfig {
    pub table: TableConfig,
    pub scheme: Scheme,
    pub file: PathBuf,
}

pub fn load_config(path: Option<&Path>, file_override: Option<&Path>) -> Result<LoadedConfig> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => user_config_path().context("Could not determine a config directory")?,
    };
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    parse_config(&content, path.parent().unwrap_or(Path::new(".")), file_override)
        .with_context(|| format!("Failed to parse {}", path.display()))
}

fn parse_config(content: &str, base_dir: &Path, file_override: Option<&Path>) -> Result<LoadedConfig> {
    let parsed: ConfigFile = toml::from_str(content)?;

    let file = match file_override {
        Some(file) => file.to_path_buf(),
        None => {
            let file = parsed
                .file
                .clone()
                .unwrap_or_else(|| PathBuf::from(format!("{}.csv", parsed.table_id)));
            base_dir.join(file)
        }
    };

    let mut table = TableConfig::new(parsed.table_id).with_credentials(parsed.credentials);
    table.sheet = parsed.sheet;

    Ok(LoadedConfig {
        table,
        scheme: parsed.scheme,
        file,
    })
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "sheetable")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("tables.toml");
    Some(path)
}
