//! Tycoon-Autopilot: an unattended account steward for Airlines Manager Tycoon
//!
//! This crate keeps an authenticated session against the game's web interface,
//! scrapes its paginated listings and reconciles a local model of every line
//! (route) against the live game, pushing ticket prices and requesting audits
//! when the two diverge.

pub mod agent;
pub mod config;
pub mod model;
pub mod reconcile;
pub mod scrape;
pub mod session;
pub mod storage;

use thiserror::Error;

/// Main error type for Tycoon-Autopilot operations
#[derive(Debug, Error)]
pub enum AutopilotError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// An expected page element, field or status code was not present
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A persisted record exists but cannot be trusted
    #[error("Corrupt state in {path}: {message}")]
    CorruptState { path: String, message: String },

    #[error("HTTP error for {url}: {source}")]
    Http { url: String, source: reqwest::Error },

    #[error("Too many redirects from {url}")]
    RedirectLimit { url: String },

    #[error("Invalid state transition: {from:?} -> {to:?}")]
    InvalidTransition {
        from: reconcile::LineState,
        to: reconcile::LineState,
    },

    #[error("Storage error: {0}")]
    Storage(storage::StorageError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<storage::StorageError> for AutopilotError {
    fn from(err: storage::StorageError) -> Self {
        match err {
            storage::StorageError::Corrupt { path, message } => {
                AutopilotError::CorruptState { path, message }
            }
            other => AutopilotError::Storage(other),
        }
    }
}

/// How the supervisor loop should react to a failed pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorDisposition {
    /// Transient: wait a short fixed delay and rerun the whole pass
    Retry,
    /// Needs an operator; stop the process
    Fatal,
}

impl AutopilotError {
    /// Classifies this error for the supervisor loop
    ///
    /// Layout drift and transport failures are retried wholesale; anything
    /// else stops the agent.
    pub fn disposition(&self) -> ErrorDisposition {
        match self {
            Self::Protocol(_)
            | Self::Http { .. }
            | Self::RedirectLimit { .. }
            | Self::Reqwest(_) => ErrorDisposition::Retry,
            _ => ErrorDisposition::Fatal,
        }
    }
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Missing account credential: {0}")]
    MissingCredential(String),
}

/// Result type alias for Tycoon-Autopilot operations
pub type Result<T> = std::result::Result<T, AutopilotError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use model::{Airport, CategorizedValue, Line};
pub use reconcile::{LineReconciler, LineState};
pub use session::{AuthSession, SessionStatus};
