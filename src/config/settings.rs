use anyhow::Result;
use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub server: ServerConfig,
    pub llm: LLMConfig,
    pub storage: StorageConfig,
    pub sessions: SessionConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub request_timeout_secs: u64,
    pub max_body_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LLMConfig {
    pub model: String,
    pub api_base: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub log_dir: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per session under `log_dir`.
    #[default]
    File,
    /// Process memory only; transcripts vanish on exit.
    Memory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Maximum number of live conversation handles kept in memory.
    pub capacity: usize,
    pub resume: ResumeMode,
    /// Entries shown on the initial chat page.
    pub page_size: usize,
    /// Entries returned per `load_more` request.
    pub batch_size: usize,
}

/// What happens to stored history when a session gets a fresh handle
/// (first message after a restart or after eviction).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResumeMode {
    /// The transcript is a display log only; the model starts from scratch.
    #[default]
    DisplayOnly,
    /// Stored turns are replayed into the new conversation as history.
    Replay,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 5000,
                request_timeout_secs: 90,
                max_body_bytes: 64 * 1024,
            },
            llm: LLMConfig {
                model: "gemini-2.0-flash".to_string(),
                api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
                temperature: 1.0,
                max_output_tokens: 2048,
                timeout_secs: 60,
            },
            storage: StorageConfig {
                backend: StorageBackend::File,
                log_dir: PathBuf::from("chat_logs"),
            },
            sessions: SessionConfig {
                capacity: 1024,
                resume: ResumeMode::DisplayOnly,
                page_size: 30,
                batch_size: 30,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
        }
    }
}

impl Settings {
    /// Built-in defaults, overlaid by `config/<CONFIG_ENV>.toml` (optional)
    /// and then by `APP__SECTION__KEY` environment variables.
    pub fn new() -> Result<Self, ConfigError> {
        let config_env = env::var("CONFIG_ENV").unwrap_or_else(|_| "default".to_string());

        let config = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name(&format!("config/{}", config_env)).required(false))
            .add_source(
                Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    pub fn api_key() -> Result<String> {
        env::var("GOOGLE_API_KEY")
            .map_err(|_| anyhow::anyhow!("GOOGLE_API_KEY environment variable not set"))
    }
}
