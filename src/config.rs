use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

const APP_DIR: &str = "tunnel-rusty";

/// Runtime settings, read from `config.json` with every field optional
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Path to tmux binary
    pub tmux_path: String,
    /// ssh client config that hosts are read from and appended to
    pub ssh_config: PathBuf,
    /// JSON file holding named ports
    pub ports_file: PathBuf,
    /// How long to let ssh talk before reading the new session's pane
    pub settle_ms: u64,
    pub server_alive_interval: u32,
    pub server_alive_count_max: u32,
}

impl Default for Config {
    fn default() -> Self {
        let home = dirs::home_dir().unwrap_or_default();
        let data = dirs::data_dir().unwrap_or_else(|| home.join(".local").join("share"));

        Self {
            tmux_path: "tmux".to_string(),
            ssh_config: home.join(".ssh").join("config"),
            ports_file: data.join(APP_DIR).join("ports.json"),
            settle_ms: 500,
            server_alive_interval: 60,
            server_alive_count_max: 2,
        }
    }
}

impl Config {
    /// Where the config file lives when `--config` is not given
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.json"))
    }

    /// Load from `path`, or from the default location. A missing file means defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path.map(Path::to_path_buf).or_else(Self::default_path) {
            Some(path) => path,
            None => return Ok(Self::default()),
        };

        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Directory holding the ssh config, where identity files are looked up
    pub fn ssh_dir(&self) -> PathBuf {
        self.ssh_config
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default()
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
