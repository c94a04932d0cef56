use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::Result;
use crate::params::QueryParams;
use crate::source::HttpMethod;
use crate::state::DEFAULT_PAGE_SIZE;

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_title_field() -> String {
    "title".to_string()
}

fn default_token_env() -> Option<String> {
    Some("PAGELIST_TOKEN".to_string())
}

/// Per-list settings, fixed at construction.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ListConfig {
    #[serde(default = "default_page_size")]
    pub page_size: u32,
    #[serde(default)]
    pub params: QueryParams,
    /// Merged over `params` for single-item refreshes.
    #[serde(default)]
    pub detail_params: Option<QueryParams>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            params: QueryParams::default(),
            detail_params: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub method: HttpMethod,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Record field shown as the row title in the browser.
    #[serde(default = "default_title_field")]
    pub title_field: String,
    /// Env var holding a bearer token, if the endpoint needs one.
    #[serde(default = "default_token_env")]
    pub token_env: Option<String>,
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn token(&self) -> Option<String> {
        let var = self.token_env.as_ref()?;
        std::env::var(var).ok().filter(|t| !t.is_empty())
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            method: HttpMethod::default(),
            timeout_secs: default_timeout_secs(),
            title_field: default_title_field(),
            token_env: default_token_env(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub list: ListConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

pub fn config_path() -> Option<PathBuf> {
    let config_dir = dirs::config_dir()?;
    Some(config_dir.join("pagelist").join("config.toml"))
}

impl Config {
    /// Load from the user config dir, falling back to defaults.
    pub fn load() -> Self {
        let Some(path) = config_path() else {
            return Config::default();
        };

        if !path.exists() {
            return Config::default();
        }

        match Config::from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config");
                Config::default()
            }
        }
    }

    /// Load an explicitly named file. Errors are returned, not swallowed.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str::<Config>(&content)?)
    }
}
