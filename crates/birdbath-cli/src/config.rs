//! Configuration loading from TOML files

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

use birdbath_x::Credentials;

/// Global configuration for birdbath
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub run: RunConfig,
    pub api: ApiConfig,
    pub auth: AuthConfig,
    pub pacing: PacingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub failed: PathBuf,
    pub batch_size: usize,
    pub limit: i64,
    pub retries: u32,
    pub retry_delay_secs: f64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("tweet_ids.txt"),
            output: PathBuf::from("hydrated_tweets.csv"),
            failed: PathBuf::from("failed_ids.txt"),
            batch_size: 25,
            limit: 150,
            retries: 3,
            retry_delay_secs: 2.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.x.com".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    #[serde(deserialize_with = "deserialize_env_var")]
    pub username: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub email: Option<String>,
    #[serde(deserialize_with = "deserialize_env_var")]
    pub password: Option<String>,
    pub cookie_file: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: std::env::var("X_USERNAME").ok(),
            email: std::env::var("X_EMAIL").ok(),
            password: std::env::var("X_PASSWORD").ok(),
            cookie_file: PathBuf::from("cookies.json"),
        }
    }
}

impl AuthConfig {
    /// Complete credential triple, if configured. Login is only possible
    /// with all three; cookie reuse needs none.
    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.email, &self.password) {
            (Some(username), Some(email), Some(password)) => Some(Credentials {
                username: username.clone(),
                email: email.clone(),
                password: password.clone(),
            }),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            min_secs: 1.0,
            max_secs: 2.5,
        }
    }
}

/// Deserialize a string that may contain environment variable reference like ${VAR}
fn deserialize_env_var<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    Ok(opt.and_then(|s| expand_env_var(&s)))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./birdbath.toml (current directory)
    /// 2. ~/.config/birdbath/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("birdbath.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "birdbath") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}
