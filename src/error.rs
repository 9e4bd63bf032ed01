//! Crate-level error types.
//!
//! [`WatchError`] unifies every failure a polling cycle can hit
//! (configuration, network, upstream status, decoding, local state)
//! behind a single enum so the host can match on the variant it cares
//! about while the crate itself propagates with `?`.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, WatchError>;

/// Top-level error type returned by all public APIs.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// Configuration is missing or invalid for the selected mode.
    #[error("configuration error: {0}")]
    Config(String),

    /// The HTTP request could not be completed (connect, TLS, timeout).
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// The exchange answered with a non-2xx status.
    #[error("request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    /// A response body did not have the expected shape.
    #[error("decode error: {0}")]
    Decode(String),

    /// JSON serialization or deserialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// TLS root store could not be built.
    #[error("tls error: {0}")]
    Tls(String),

    /// Local file I/O failed (state file, CA bundle, sink).
    #[error("io error: {0}")]
    Io(String),
}

impl WatchError {
    /// True for failures reaching or talking to the exchange.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http(_) | Self::Status { .. })
    }

    /// True for failures interpreting a response body.
    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode(_) | Self::Json(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_error_display_includes_code_and_body() {
        let err = WatchError::Status {
            status: 500,
            body: "[\"error\",10020,\"nonce: small\"]".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "request failed with status 500: [\"error\",10020,\"nonce: small\"]"
        );
        assert!(err.is_transport());
        assert!(!err.is_decode());
    }

    #[test]
    fn decode_errors_are_classified() {
        assert!(WatchError::Decode("short row".into()).is_decode());
        assert!(!WatchError::Config("BFX_MODE is required".into()).is_transport());
    }
}
