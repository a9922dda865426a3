use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Environment variable naming the API server origin. `/api/rag` is appended.
pub const API_URL_ENV: &str = "RAGKB_API_URL";

const API_PREFIX: &str = "/api/rag";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub view: ViewConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout. Absent means requests may wait indefinitely.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: None,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ViewConfig {
    #[serde(default = "default_knowledge_base")]
    pub default_knowledge_base: String,
    #[serde(default = "default_search_limit")]
    pub search_limit: u32,
    /// Advisory allow-list shown next to the file picker. Not enforced.
    #[serde(default = "default_accepted_extensions")]
    pub accepted_extensions: Vec<String>,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            default_knowledge_base: default_knowledge_base(),
            search_limit: default_search_limit(),
            accepted_extensions: default_accepted_extensions(),
        }
    }
}

fn default_base_url() -> String {
    format!("http://localhost:8000{}", API_PREFIX)
}

fn default_knowledge_base() -> String {
    "default".to_string()
}

fn default_search_limit() -> u32 {
    5
}

fn default_accepted_extensions() -> Vec<String> {
    [
        ".pdf", ".txt", ".md", ".csv", ".xlsx", ".xls", ".docx", ".doc", ".json", ".xml", ".html",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

/// Load configuration from `path`.
///
/// When `path` does not exist and `required` is false, built-in defaults are
/// used. The `RAGKB_API_URL` environment variable is applied afterwards.
pub fn load_config(path: &Path, required: bool) -> Result<Config> {
    let mut config = if path.exists() || required {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        toml::from_str(&content).with_context(|| "Failed to parse config file")?
    } else {
        Config::default()
    };

    if let Ok(origin) = std::env::var(API_URL_ENV) {
        if !origin.trim().is_empty() {
            config.api.base_url = api_base_from_origin(&origin);
        }
    }

    validate(&config)?;
    Ok(config)
}

/// `http://host:8000/` → `http://host:8000/api/rag`
pub fn api_base_from_origin(origin: &str) -> String {
    format!("{}{}", origin.trim().trim_end_matches('/'), API_PREFIX)
}

pub fn validate(config: &Config) -> Result<()> {
    let url = reqwest::Url::parse(&config.api.base_url)
        .with_context(|| format!("api.base_url is not a valid URL: {}", config.api.base_url))?;
    match url.scheme() {
        "http" | "https" => {}
        other => bail!("api.base_url must use http or https, got '{}'", other),
    }

    if config.api.timeout_secs == Some(0) {
        bail!("api.timeout_secs must be > 0 when set");
    }

    if config.view.search_limit < 1 {
        bail!("view.search_limit must be >= 1");
    }

    if config.view.default_knowledge_base.trim().is_empty() {
        bail!("view.default_knowledge_base must not be empty");
    }

    Ok(())
}
