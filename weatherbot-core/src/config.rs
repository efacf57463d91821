use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

pub const BOT_TOKEN_VAR: &str = "DISCORD_TOKEN";
pub const WEATHER_API_KEY_VAR: &str = "WEATHER_API_KEY";

pub const DEFAULT_GEOCODING_URL: &str = "http://api.openweathermap.org/geo/1.0/direct";
pub const DEFAULT_ONECALL_URL: &str = "https://api.openweathermap.org/data/3.0/onecall";

/// Upstream endpoints. Overridable so tests can point at a mock server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geocoding_url: String,
    pub onecall_url: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding_url: DEFAULT_GEOCODING_URL.to_string(),
            onecall_url: DEFAULT_ONECALL_URL.to_string(),
        }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// discord_token = "..."
/// weather_api_key = "..."
///
/// [endpoints]
/// onecall_url = "https://api.openweathermap.org/data/3.0/onecall"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    pub discord_token: Option<String>,
    pub weather_api_key: Option<String>,
    #[serde(default)]
    pub endpoints: Endpoints,
}

/// Both secrets the bot needs before it can start.
#[derive(Clone)]
pub struct Credentials {
    pub bot_token: String,
    pub weather_api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("bot_token", &"<redacted>")
            .field("weather_api_key", &"<redacted>")
            .finish()
    }
}

impl Config {
    /// Load config from disk (empty default on first run), then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = Self::load_file()?;
        cfg.apply_env(|name| std::env::var(name).ok());
        Ok(cfg)
    }

    /// Load config from disk only, or return an empty default if it doesn't exist yet.
    pub fn load_file() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherbot", "weatherbot")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Non-empty environment values win over whatever the file holds.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(token) = non_empty(BOT_TOKEN_VAR) {
            self.discord_token = Some(token);
        }
        if let Some(key) = non_empty(WEATHER_API_KEY_VAR) {
            self.weather_api_key = Some(key);
        }
    }

    /// Both secrets, or an error naming the first one missing.
    pub fn credentials(&self) -> Result<Credentials> {
        let bot_token = self.discord_token.clone().ok_or_else(|| {
            anyhow!(
                "No bot token configured.\n\
                 Hint: set {BOT_TOKEN_VAR} or run `weatherbot configure`."
            )
        })?;

        let weather_api_key = self.weather_api_key.clone().ok_or_else(|| {
            anyhow!(
                "No weather API key configured.\n\
                 Hint: set {WEATHER_API_KEY_VAR} or run `weatherbot configure`."
            )
        })?;

        Ok(Credentials { bot_token, weather_api_key })
    }
}
