//! Error types for sn-mailer
//!
//! One enum covers the whole pipeline: configuration, feed retrieval, asset
//! downloads, and mail submission. Marker-file recovery is not an error path
//! at all; see [`crate::marker::MarkerState`].

use thiserror::Error;

/// Result type alias for sn-mailer operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for sn-mailer
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "smtp.port")
        key: Option<String>,
    },

    /// The feed was retrieved but its content could not be interpreted
    #[error("feed error: {0}")]
    Feed(String),

    /// The feed endpoint answered with a non-success HTTP status
    #[error("feed returned HTTP {status}: {url}")]
    FeedStatus {
        /// HTTP status code returned by the feed server
        status: u16,
        /// The feed URL that was requested
        url: String,
    },

    /// An episode asset answered with a non-success HTTP status.
    ///
    /// Typically a 404 during the window where the feed has been updated but
    /// the files are not published yet.
    #[error("asset not available (HTTP {status}): {url}")]
    AssetUnavailable {
        /// HTTP status code returned by the asset server
        status: u16,
        /// The asset URL that was requested
        url: String,
    },

    /// Network error from the HTTP client
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A sender or recipient address could not be parsed
    #[error("invalid mail address: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The mail message could not be assembled
    #[error("mail composition error: {0}")]
    Mail(#[from] lettre::error::Error),

    /// SMTP transport failure (connection refused, STARTTLS, auth rejected)
    #[error("SMTP error: {0}")]
    Smtp(#[from] lettre::transport::smtp::Error),
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display_includes_message() {
        let err = Error::Config {
            message: "at least one recipient is required".into(),
            key: Some("delivery.recipients".into()),
        };
        assert_eq!(
            err.to_string(),
            "configuration error: at least one recipient is required"
        );
    }

    #[test]
    fn asset_unavailable_display_includes_status_and_url() {
        let err = Error::AssetUnavailable {
            status: 404,
            url: "https://media.grc.com/sn/sn-950-lq.mp3".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("404"));
        assert!(msg.contains("sn-950-lq.mp3"));
    }

    #[test]
    fn io_error_converts_via_from() {
        let err: Error = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, Error::Io(_)));
    }
}
