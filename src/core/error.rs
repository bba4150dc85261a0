use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the transcript store, the session registry and the
/// remote model client. Each one fails a single request; none is retried.
#[derive(Debug, Error)]
pub enum ChatError {
    #[error("transcript I/O failed for {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("transcript {path:?} is not a valid entry list: {source}")]
    Corrupt {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("remote model call failed: {0}")]
    RemoteCall(String),

    #[error("remote model did not answer within {0:?}")]
    Timeout(Duration),

    #[error("invalid session id '{0}'")]
    InvalidSessionId(String),

    #[error("failed to render page: {0}")]
    Render(#[from] tera::Error),
}

impl ChatError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        Self::Corrupt {
            path: path.into(),
            source,
        }
    }

    /// True for failures of the remote collaborator rather than local storage.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::RemoteCall(_) | Self::Timeout(_))
    }
}

pub type ChatResult<T> = Result<T, ChatError>;
