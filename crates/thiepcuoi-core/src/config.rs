use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "deepseek/deepseek-chat:free";
const COMPLETIONS_PATH: &str = "/chat/completions";

pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const MODEL_ENV: &str = "OPENROUTER_MODEL";
pub const BASE_URL_ENV: &str = "OPENROUTER_BASE_URL";

/// Provider secret. Never printed: `Debug` is redacted and there is no `Display`.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Blank values count as "not configured".
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Settings injected into the exchange controller at construction.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub api_key: Option<ApiKey>,
    pub model: String,
    pub base_url: String,
    /// `None` leaves timeouts to the HTTP transport.
    pub request_timeout: Option<Duration>,
}

impl ChatConfig {
    pub fn new() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: None,
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = ApiKey::new(key);
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn has_credential(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn completions_url(&self) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), COMPLETIONS_PATH)
    }
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// On-disk settings at `<config_dir>/thiepcuoi/config.json`.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub request_timeout_secs: Option<u64>,
    /// Front-end layout name (`full` or `widget`)
    pub layout: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_dir() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(config_dir.join("thiepcuoi"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.json"))
    }

    /// Merge with the process environment; environment wins over the file.
    pub fn resolve(&self) -> ChatConfig {
        self.resolve_with(|name| std::env::var(name).ok())
    }

    pub fn resolve_with<F>(&self, env: F) -> ChatConfig
    where
        F: Fn(&str) -> Option<String>,
    {
        let pick = |name: &str, file: &Option<String>| {
            env(name)
                .filter(|v| !v.trim().is_empty())
                .or_else(|| file.clone())
        };

        let mut chat = ChatConfig::new();
        chat.api_key = pick(API_KEY_ENV, &self.api_key).and_then(ApiKey::new);
        if let Some(model) = pick(MODEL_ENV, &self.model) {
            chat.model = model;
        }
        if let Some(base_url) = pick(BASE_URL_ENV, &self.base_url) {
            chat.base_url = base_url;
        }
        if let Some(secs) = self.request_timeout_secs {
            chat = chat.with_timeout(Duration::from_secs(secs));
        }
        chat
    }
}
