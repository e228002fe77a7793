//! Error types for the `dhan-oc-cache` crate.
//!
//! All fallible operations in this crate return [`Result<T>`], which is an
//! alias for `std::result::Result<T, DhanError>`.
//!
//! [`DhanError`] covers:
//! - **Transport errors**: network/TLS failures, unexpected HTTP status
//!   codes, structured DhanHQ error bodies and undecodable JSON
//! - **Upstream business errors**: a 200 response whose `status` is not
//!   `"success"`, or an empty expiry list
//! - **Cache errors**: Redis failures, with the `redis` feature
//! - **Configuration errors**: fatal at startup
//! - **Invalid arguments**: malformed instrument rows and similar input
//!
//! A cache miss or a corrupted cache entry is not an error at the query
//! surface; see [`Lookup`](crate::query::Lookup).

use std::fmt;

/// Error response returned by the DhanHQ API.
#[derive(Debug, Clone, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorBody {
    /// Category of the error (e.g. "Invalid Authentication").
    #[serde(default)]
    pub error_type: Option<String>,
    /// Dhan error code (e.g. "DH-901").
    #[serde(default)]
    pub error_code: Option<String>,
    /// Human-readable description of the error.
    #[serde(default)]
    pub error_message: Option<String>,
}

impl fmt::Display for ApiErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}: {}",
            self.error_code.as_deref().unwrap_or("UNKNOWN"),
            self.error_type.as_deref().unwrap_or("Unknown Error"),
            self.error_message.as_deref().unwrap_or("No message"),
        )
    }
}

/// All possible errors produced by this crate.
#[derive(Debug, thiserror::Error)]
pub enum DhanError {
    /// An error response returned by the DhanHQ REST API.
    #[error("API error: {0}")]
    Api(ApiErrorBody),

    /// The server returned an unexpected HTTP status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus {
        /// The HTTP status code.
        status: reqwest::StatusCode,
        /// The response body text.
        body: String,
    },

    /// A network or transport-level error from `reqwest`.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Failed to (de)serialize a JSON body.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The API answered 200 but reported a non-`"success"` status.
    #[error("upstream returned status {status:?}")]
    Upstream {
        /// The `status` field of the response envelope.
        status: String,
    },

    /// The expiry list for an underlying came back empty.
    #[error("no expiries listed for {scrip}_{segment}")]
    NoExpiries {
        /// Security ID of the underlying.
        scrip: u64,
        /// Segment of the underlying.
        segment: String,
    },

    /// A Redis protocol or connection error.
    #[cfg(feature = "redis")]
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// Startup configuration is missing or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// The caller provided an invalid argument.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl DhanError {
    /// Whether this error came from the HTTP layer (network, status, body).
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Api(_) | Self::HttpStatus { .. } | Self::Http(_) | Self::Json(_)
        )
    }

    /// Whether the broker answered but refused to hand over usable data.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Upstream { .. } | Self::NoExpiries { .. })
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, DhanError>;
