mod settings;

pub use settings::{
    LLMConfig, LoggingConfig, ResumeMode, ServerConfig, SessionConfig, Settings, StorageBackend,
    StorageConfig,
};
