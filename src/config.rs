//! Application configuration.
//!
//! Environment variables are the only configuration source. The completion
//! credential is optional: without it the AI features degrade to defaults
//! instead of failing requests.

use std::path::PathBuf;

const DEFAULT_ENDPOINT: &str = "https://ark.cn-beijing.volces.com/api/v3/chat/completions";
const DEFAULT_MODEL: &str = "deepseek-r1-250528";

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// SQLite database path.
    pub database_path: PathBuf,
    /// Completion API credential. `None` means AI features are disabled.
    pub api_key: Option<String>,
    pub endpoint: String,
    pub model: String,
    /// Max candidates listed in a dependency-sync prompt.
    pub sync_candidate_limit: usize,
    /// Max pending titles listed in a dependency-likelihood prompt.
    pub dependency_title_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database_path: PathBuf::from("tasks.db"),
            api_key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            sync_candidate_limit: 15,
            dependency_title_limit: 20,
        }
    }
}

impl Config {
    /// Build a configuration from environment variables:
    /// - `DEEPSEEK_API_KEY` - completion credential (optional)
    /// - `DEEPSEEK_ENDPOINT`, `DEEPSEEK_MODEL` - completion endpoint overrides
    /// - `TASKBRAIN_HOST`, `TASKBRAIN_PORT` - listen address
    /// - `TASKBRAIN_DB` - SQLite database path
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_key = std::env::var("DEEPSEEK_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::warn!(
                "DEEPSEEK_API_KEY is not set; priority inference and reports will use defaults"
            );
        }

        Self {
            host: std::env::var("TASKBRAIN_HOST").unwrap_or(defaults.host),
            port: std::env::var("TASKBRAIN_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_path: std::env::var("TASKBRAIN_DB")
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            api_key,
            endpoint: std::env::var("DEEPSEEK_ENDPOINT").unwrap_or(defaults.endpoint),
            model: std::env::var("DEEPSEEK_MODEL").unwrap_or(defaults.model),
            sync_candidate_limit: defaults.sync_candidate_limit,
            dependency_title_limit: defaults.dependency_title_limit,
        }
    }
}
