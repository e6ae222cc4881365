//! Settings parser for ~/.config/blueland-panel/config.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use blpanel_core::prelude::*;

const CONFIG_DIR: &str = "blueland-panel";
const CONFIG_FILENAME: &str = "config.toml";

/// Runtime settings, all overridable from the config file or CLI flags
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Path of the agent's push (notification) socket
    pub push_socket: PathBuf,
    /// Path of the agent's command socket
    pub agent_socket: PathBuf,
    /// Seconds to wait for an agent reply before failing the command
    pub command_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        let runtime = dirs::runtime_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("blueland");
        Self {
            push_socket: runtime.join("blueland.sock"),
            agent_socket: runtime.join("agent.sock"),
            command_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Load settings from the user config file, falling back to defaults
    /// when the file does not exist. A file that exists but fails to
    /// parse is an error, not a silent fallback.
    pub fn load() -> Result<Self> {
        let Some(path) = Self::config_path() else {
            return Ok(Self::default());
        };
        Self::load_from(&path)
    }

    /// Load settings from an explicit path (missing file means defaults)
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No config file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&contents)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))?;

        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILENAME))
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}
