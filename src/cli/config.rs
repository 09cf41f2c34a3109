use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::client::{Session, Theme};

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";
const CONFIG_FILE: &str = "cli.json";

/// Everything the CLI remembers between invocations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    #[serde(default = "default_server_url")]
    pub server_url: String,
    #[serde(default)]
    pub session: Option<Session>,
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_server_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            server_url: default_server_url(),
            session: None,
            theme: Theme::default(),
            updated_at: None,
        }
    }
}

pub fn get_config_dir() -> anyhow::Result<PathBuf> {
    let config_dir = if let Ok(custom_dir) = std::env::var("PTRACK_CONFIG_DIR") {
        PathBuf::from(custom_dir)
    } else {
        let home = std::env::var("HOME").map_err(|_| anyhow::anyhow!("HOME environment variable not set"))?;
        PathBuf::from(home).join(".config").join("ptrack")
    };

    if !config_dir.exists() {
        fs::create_dir_all(&config_dir)?;
    }

    Ok(config_dir)
}

pub fn config_path() -> anyhow::Result<PathBuf> {
    Ok(get_config_dir()?.join(CONFIG_FILE))
}

pub fn load_from(path: &Path) -> anyhow::Result<CliConfig> {
    if !path.exists() {
        return Ok(CliConfig::default());
    }

    let content = fs::read_to_string(path)?;
    if content.trim().is_empty() {
        return Ok(CliConfig::default());
    }
    let config: CliConfig = serde_json::from_str(&content)
        .map_err(|e| anyhow::anyhow!("Invalid CLI config at {}: {}", path.display(), e))?;
    Ok(config)
}

pub fn save_to(path: &Path, config: &CliConfig) -> anyhow::Result<()> {
    let mut config = config.clone();
    config.updated_at = Some(Utc::now());
    let content = serde_json::to_string_pretty(&config)?;
    fs::write(path, content)?;
    Ok(())
}
