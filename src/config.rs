// config.rs
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

pub const CONFIG_FILE_NAME: &str = "salesbro.config";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Sales file opened when no path is given on the command line.
    pub default_source: Option<String>,
    /// Rows shown when printing a result.
    pub preview_rows: usize,
    /// Stored results listed above the main menu before "...and N more".
    pub summary_max_items: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_source: None,
            preview_rows: 30,
            summary_max_items: 6,
        }
    }
}

/// `$SALESBRO_CONFIG`, else `~/.salesbro/salesbro.config`.
pub fn config_path() -> PathBuf {
    if let Ok(path) = env::var("SALESBRO_CONFIG") {
        return PathBuf::from(path);
    }
    let home = env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".salesbro").join(CONFIG_FILE_NAME)
}

/// Reads the config at `path`. A missing file means defaults; a malformed
/// one is an error so typos do not go unnoticed.
pub fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!("no config at {}, using defaults", path.display());
        return Ok(Config::default());
    }

    let mut text = String::new();
    File::open(path)?.read_to_string(&mut text)?;
    let config: Config = serde_json::from_str(&text)?;
    tracing::debug!("loaded config from {}", path.display());
    Ok(config)
}

/// Writes `config` as pretty JSON, creating the parent directory.
pub fn save_config(path: &Path, config: &Config) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, serde_json::to_string_pretty(config)?)?;
    Ok(())
}
