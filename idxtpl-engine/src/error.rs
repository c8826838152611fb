//! Error types for template reconciliation.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while reconciling an index template.
#[derive(Debug, Error)]
pub enum Error {
    /// The cluster (dialect or version) cannot serve the index template API.
    #[error("index_template endpoint only available from Elasticsearch >= {minimum}: {reason}")]
    Capability { minimum: String, reason: String },

    /// Create collided with an existing template.
    #[error("conflict: {0}")]
    Conflict(String),

    /// The template does not exist on the cluster.
    #[error("not found: {0}")]
    NotFound(String),

    /// Connectivity, timeout or response decoding failure.
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    /// A response could not be re-encoded as canonical JSON.
    #[error("serialization: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The cluster rejected the request for a reason not covered above.
    #[error("remote error ({status}): {error_type}: {reason}")]
    Remote {
        status: StatusCode,
        error_type: String,
        reason: String,
    },

    /// Malformed JSON handed to the engine.
    #[error("parse: {0}")]
    Parse(String),

    /// Invalid client configuration.
    #[error("config: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn capability(reason: impl Into<String>) -> Self {
        Error::Capability {
            minimum: crate::resolver::MIN_INDEX_TEMPLATE_VERSION.to_string(),
            reason: reason.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::Conflict(_))
    }

    pub fn is_capability(&self) -> bool {
        matches!(self, Error::Capability { .. })
    }

    /// Whether a caller may reasonably retry the operation unchanged.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Transport(_) => true,
            Error::Remote { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }
}

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
