//! Error types for the harvester.
//!
//! A single `HarvesterError` is surfaced to library consumers. Fetch
//! failures keep their underlying `reqwest` error so callers see the
//! transport problem unchanged.

use thiserror::Error;

/// Main error type for the harvester library.
#[derive(Debug, Error)]
pub enum HarvesterError {
    /// Network-level failure while talking to a site.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("Failed to get data from {url} (status {status})")]
    Status { url: String, status: u16 },

    /// An encoding label that no decoder is known for.
    #[error("Unknown encoding label: '{0}'")]
    UnknownEncoding(String),

    /// Invalid byte sequence under a strict decode policy.
    #[error("Failed to decode content of {url} as {encoding}")]
    Decode { url: String, encoding: String },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    /// XML parsing failed.
    #[error("XML parsing failed: {0}")]
    XmlParse(#[from] roxmltree::Error),

    /// A CSS selector literal could not be parsed.
    #[error("Invalid CSS selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    /// Expected structure missing from a fetched page.
    #[error("Missing required element: {element} in {context}")]
    MissingElement { element: String, context: String },

    /// A loader configuration value outside its domain.
    #[error("Invalid {field} '{value}': expected {expected}")]
    InvalidConfig {
        field: &'static str,
        value: String,
        expected: String,
    },

    /// A configuration the site variant does not implement.
    #[error("Unsupported configuration: {0}")]
    Unsupported(String),

    /// A harvested reference whose target is of no known media type.
    #[error("Unexpected link: {0}")]
    UnexpectedLink(String),

    /// The download worker pool could not be started.
    #[error("Failed to start worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// Output location unusable.
    #[error("Invalid output directory {path}: {reason}")]
    InvalidOutputDir { path: String, reason: String },
}

impl HarvesterError {
    /// Build an `InvalidConfig` error from anything displayable.
    pub fn invalid_config(
        field: &'static str,
        value: impl ToString,
        expected: impl Into<String>,
    ) -> Self {
        Self::InvalidConfig {
            field,
            value: value.to_string(),
            expected: expected.into(),
        }
    }

    /// Build a `MissingElement` error.
    pub fn missing(element: impl Into<String>, context: impl Into<String>) -> Self {
        Self::MissingElement {
            element: element.into(),
            context: context.into(),
        }
    }
}

/// Result type alias for harvester operations.
pub type Result<T> = std::result::Result<T, HarvesterError>;
