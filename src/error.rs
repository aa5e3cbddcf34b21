//! Errors surfaced to the code embedding the server.
//!
//! Transport failures inside a session never show up here; they are
//! logged and end only that session.

#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// A route was registered, or `start` called, after the listener began
    /// accepting connections.
    #[error("server is already running; routes can only be registered before start")]
    AlreadyRunning,

    #[error("invalid route pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("accept loop terminated abnormally: {0}")]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ServerError {
    pub(crate) fn bind(addr: impl std::fmt::Display, source: std::io::Error) -> Self {
        ServerError::Bind {
            addr: addr.to_string(),
            source,
        }
    }
}

/// Convenience alias used across the public API.
pub type Result<T, E = ServerError> = std::result::Result<T, E>;
