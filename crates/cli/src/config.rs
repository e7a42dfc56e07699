use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use eyre::Result;
use extension_uaa::UaaConfig;
use extension_youshu::YoushuConfig;
use novelscout_engine::{DispatcherConfig, RandomConfig, SessionConfig};
use serde::{Deserialize, Serialize};
use tokio::fs;
use url::Url;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub youshu: YoushuConfig,
    #[serde(default)]
    pub uaa: UaaConfig,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub random: RandomConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct EnrichmentConfig {
    /// Overlay qidian metadata on youshu books.
    pub enabled: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct OutputConfig {
    /// Directory downloaded covers are written to.
    pub cover_dir: Option<String>,
}

impl Config {
    pub fn get_config_path() -> PathBuf {
        get_default_config_dir().join("config.json")
    }

    pub async fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()).await
    }

    /// Reads the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !fs::try_exists(path).await? {
            let default_config = Self::default();
            default_config.save_to(path).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    pub fn dispatcher_config(&self) -> DispatcherConfig {
        DispatcherConfig {
            session: self.session,
            random: self.random,
            enrichment: self.enrichment.enabled,
        }
    }

    pub fn set_value(&mut self, key: &str, value: &str) -> Result<()> {
        let parts: Vec<&str> = key.split('.').collect();

        match parts.as_slice() {
            ["youshu", "base_url"] => {
                self.youshu.base_url = parse_base_url(value)?;
            }
            ["youshu", "cookie"] => {
                self.youshu.cookie = optional(value);
            }
            ["uaa", "base_url"] => {
                self.uaa.base_url = parse_base_url(value)?;
            }
            ["enrichment", "enabled"] => {
                self.enrichment.enabled = value
                    .parse::<bool>()
                    .map_err(|_| eyre::eyre!("Invalid boolean value: {}", value))?;
            }
            ["session", "capacity"] => {
                self.session.capacity = parse_positive(value)?;
            }
            ["session", "idle_ttl_secs"] => {
                self.session.idle_ttl = Duration::from_secs(parse_positive(value)?);
            }
            ["random", "max_attempts"] => {
                self.random.max_attempts = parse_positive(value)?;
            }
            ["output", "cover_dir"] => {
                self.output.cover_dir = optional(value);
            }
            _ => {
                return Err(eyre::eyre!("Unknown configuration key: {}", key));
            }
        }

        Ok(())
    }

    pub fn get_value(&self, key: &str) -> Result<String> {
        let parts: Vec<&str> = key.split('.').collect();

        let value = match parts.as_slice() {
            ["youshu", "base_url"] => self.youshu.base_url.clone(),
            ["youshu", "cookie"] => self.youshu.cookie.clone().unwrap_or_default(),
            ["uaa", "base_url"] => self.uaa.base_url.clone(),
            ["enrichment", "enabled"] => self.enrichment.enabled.to_string(),
            ["session", "capacity"] => self.session.capacity.to_string(),
            ["session", "idle_ttl_secs"] => self.session.idle_ttl.as_secs().to_string(),
            ["random", "max_attempts"] => self.random.max_attempts.to_string(),
            ["output", "cover_dir"] => self.output.cover_dir.clone().unwrap_or_default(),
            _ => {
                return Err(eyre::eyre!("Unknown configuration key: {}", key));
            }
        };

        Ok(value)
    }

    pub fn show_all(&self) -> String {
        let cookie = if self.youshu.cookie.is_some() {
            "(set)"
        } else {
            "(not set)"
        };

        format!(
            "Configuration:\n\
             Youshu:\n\
             ├─ base_url: {}\n\
             └─ cookie: {}\n\
             Uaa:\n\
             └─ base_url: {}\n\
             Enrichment:\n\
             └─ enabled: {}\n\
             Session:\n\
             ├─ capacity: {}\n\
             └─ idle_ttl_secs: {}\n\
             Random:\n\
             └─ max_attempts: {}\n\
             Output:\n\
             └─ cover_dir: {}",
            self.youshu.base_url,
            cookie,
            self.uaa.base_url,
            self.enrichment.enabled,
            self.session.capacity,
            self.session.idle_ttl.as_secs(),
            self.random.max_attempts,
            self.output.cover_dir.as_deref().unwrap_or("(not set)"),
        )
    }
}

fn optional(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

/// Counts and durations of zero would disable the feature they size.
fn parse_positive<T>(value: &str) -> Result<T>
where
    T: std::str::FromStr + Default + PartialEq,
{
    let number = value
        .trim()
        .parse::<T>()
        .map_err(|_| eyre::eyre!("Invalid number: {}", value))?;
    if number == T::default() {
        return Err(eyre::eyre!("Value must be greater than zero"));
    }
    Ok(number)
}

/// Sources join relative paths onto the base url, so it must be an absolute
/// http(s) url.
fn parse_base_url(value: &str) -> Result<String> {
    let url = Url::parse(value.trim())
        .map_err(|err| eyre::eyre!("Invalid url '{}': {}", value, err))?;
    match url.scheme() {
        "http" | "https" => Ok(url.to_string()),
        scheme => Err(eyre::eyre!("Unsupported url scheme: {}", scheme)),
    }
}

/// Get the default configuration directory
fn get_default_config_dir() -> PathBuf {
    if let Some(proj_dirs) = ProjectDirs::from("org", "novelscout", "novelscout") {
        proj_dirs.config_dir().to_path_buf()
    } else {
        PathBuf::from(".novelscout").join("config")
    }
}
