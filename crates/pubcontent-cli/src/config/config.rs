//! `AppConfig` struct, config file location and TOML read/write.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Host queried when neither `--host` nor the config file names one.
pub const DEFAULT_HOSTNAME: &str = "www.cancer.gov";

/// Config file name inside the config directory.
const CONFIG_FILE: &str = "config.toml";

/// Per-user config directory name.
const APP_DIR: &str = "pubcontent";

/// Top-level application configuration.
#[allow(clippy::module_name_repetitions)]
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// Listing server settings.
    #[serde(default)]
    pub server: ServerConfig,
}

/// Listing server configuration.
#[derive(Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host serving `/PublishedContent/List`.
    #[serde(default)]
    pub hostname: Option<String>,
    /// User-Agent sent with every request.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl AppConfig {
    /// Locates the config file.
    ///
    /// `--dir` wins; otherwise `pubcontent/config.toml` under
    /// `$XDG_CONFIG_HOME`, falling back to `$HOME/.config`.
    ///
    /// # Errors
    ///
    /// Returns an error if `dir` is `None` and no usable base directory is set.
    pub fn locate(dir: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = dir {
            return Ok(dir.join(CONFIG_FILE));
        }
        user_config_path(std::env::var_os("XDG_CONFIG_HOME"), std::env::var_os("HOME"))
            .context("cannot locate config: neither XDG_CONFIG_HOME nor HOME is set")
    }

    /// Locates and loads the config, returning the file path alongside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be located, read or parsed.
    pub fn load_from(dir: Option<&Path>) -> Result<(PathBuf, Self)> {
        let path = Self::locate(dir)?;
        let config = Self::load(&path)?;
        Ok((path, config))
    }

    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// Saves config to a TOML file, creating parent directories if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if directory creation or file write fails.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create directory {}", parent.display()))?;
        }
        let content = toml::to_string_pretty(self).context("failed to serialize config to TOML")?;
        std::fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
    }

    /// Picks the host: `--host` first, then the config file, then the default.
    #[must_use]
    pub fn resolve_hostname(&self, cli_host: Option<&str>) -> String {
        cli_host
            .or(self.server.hostname.as_deref())
            .map_or_else(|| String::from(DEFAULT_HOSTNAME), String::from)
    }
}

/// Per-user config file under `xdg` (if absolute) or `home/.config`.
fn user_config_path(xdg: Option<OsString>, home: Option<OsString>) -> Option<PathBuf> {
    let base = xdg
        .map(PathBuf::from)
        .filter(|p| p.is_absolute())
        .or_else(|| {
            home.filter(|h| !h.is_empty())
                .map(|h| PathBuf::from(h).join(".config"))
        })?;
    Some(base.join(APP_DIR).join(CONFIG_FILE))
}
