//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for groups, peers and the peer server.
///
/// Cloneable so that every caller coalesced onto one load observes the
/// same outcome.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Empty key passed to a group
    #[error("key is required")]
    EmptyKey,

    /// No group registered under this name
    #[error("group not found: {0}")]
    GroupNotFound(String),

    /// Malformed peer request
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Peer unreachable, non-success status, or undecodable body
    #[error("peer {peer}: {reason}")]
    Peer { peer: String, reason: String },

    /// Source-of-truth loader failed; displayed verbatim
    #[error("{0}")]
    Loader(Arc<anyhow::Error>),

    /// Response envelope could not be encoded
    #[error("encoding response: {0}")]
    Encode(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Wraps a loader failure.
    pub fn loader(err: anyhow::Error) -> Self {
        CacheError::Loader(Arc::new(err))
    }

    /// Builds a transport failure for `peer`.
    pub fn peer(peer: impl Into<String>, reason: impl ToString) -> Self {
        CacheError::Peer {
            peer: peer.into(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status the peer server answers with for this error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            CacheError::EmptyKey | CacheError::BadRequest(_) => StatusCode::BAD_REQUEST,
            CacheError::GroupNotFound(_) => StatusCode::NOT_FOUND,
            CacheError::Peer { .. }
            | CacheError::Loader(_)
            | CacheError::Encode(_)
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
