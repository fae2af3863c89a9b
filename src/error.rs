//! Unfurl error types

/// Unfurl error types
#[derive(Debug, thiserror::Error)]
pub enum UnfurlError {
    // Caller errors
    #[error("{0}")]
    Validation(String),

    /// No handler matched and the provider table (and discovery, when
    /// attempted) yielded no endpoint for the URL.
    #[error("no oEmbed provider found for the given URL{}", if *discovery_attempted { "" } else { " (maybe try discovery?)" })]
    NoProvider {
        /// Whether discovery ran before giving up. When false, the caller
        /// had discovery disabled and the message suggests enabling it.
        discovery_attempted: bool,
    },

    // Network errors
    #[error("HTTP error: {0}")]
    Http(String),

    #[error("there was an error fetching the oEmbed data: {0}")]
    Fetch(String),

    // Data errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("XML serialization failed: {0}")]
    Xml(String),

    // Configuration errors
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for UnfurlError {
    fn from(err: reqwest::Error) -> Self {
        UnfurlError::Http(err.to_string())
    }
}

/// Result type alias for unfurl operations
pub type Result<T> = std::result::Result<T, UnfurlError>;
