use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434/api/generate";
pub const DEFAULT_MODEL: &str = "llama2";
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) Chrome/91.0.4472.124";
pub const DEFAULT_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Process-wide settings. Read once at start-up, never mutated afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub endpoint: String,
    pub model: String,
    pub temperature: f64,
    pub fetch_timeout_secs: u64,
    pub generation_timeout_secs: u64,
    pub user_agent: String,
    pub accept: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.1,
            fetch_timeout_secs: 30,
            generation_timeout_secs: 60,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept: DEFAULT_ACCEPT.to_string(),
        }
    }
}

impl Settings {
    /// Defaults overridden by `EDITAL_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::from_source(Environment::with_prefix("EDITAL").try_parsing(true))
    }

    fn from_source(env: Environment) -> Result<Self> {
        let d = Settings::default();
        Config::builder()
            .set_default("endpoint", d.endpoint)?
            .set_default("model", d.model)?
            .set_default("temperature", d.temperature)?
            .set_default("fetch_timeout_secs", d.fetch_timeout_secs as i64)?
            .set_default("generation_timeout_secs", d.generation_timeout_secs as i64)?
            .set_default("user_agent", d.user_agent)?
            .set_default("accept", d.accept)?
            .add_source(env)
            .build()
            .context("Failed to build settings")?
            .try_deserialize()
            .context("Failed to read settings")
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn generation_timeout(&self) -> Duration {
        Duration::from_secs(self.generation_timeout_secs)
    }
}
