//! Error types for pipeline operations.
//!
//! This module defines [`FilingsError`] which covers all error cases that can occur
//! when fetching filings, calling the annotation service, caching text, or exporting
//! extraction results.

use thiserror::Error;

/// Errors that can occur during pipeline operations.
#[derive(Error, Debug)]
pub enum FilingsError {
    /// Network-related errors (connection failures, timeouts, non-success status).
    #[error("Network error: {0}")]
    Network(String),

    /// The ticker is not present in the CIK lookup table.
    #[error("CIK not found for ticker: {0}")]
    TickerNotFound(String),

    /// The filing index returned no filings of the requested type.
    #[error("No {filing_type} filings found for {ticker}")]
    NoFilings {
        /// The ticker that was searched.
        ticker: String,
        /// The filing type that was searched.
        filing_type: String,
    },

    /// No filing survived the year filter.
    #[error("No {filing_type} filings found for {ticker} in {year}")]
    NoFilingsForYear {
        /// The ticker that was searched.
        ticker: String,
        /// The filing type that was searched.
        filing_type: String,
        /// The year substring used as filter.
        year: String,
    },

    /// The filing detail page had no primary document link.
    #[error("Could not find main document link on {0}")]
    MissingDocument(String),

    /// Error parsing a page or a service response.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Error interacting with the cache.
    #[error("Cache error: {0}")]
    Cache(String),

    /// The annotation service failed or returned an unusable answer.
    #[error("Annotation error: {0}")]
    Annotation(String),

    /// Error writing an export artifact.
    #[error("Export error: {0}")]
    Export(String),

    /// An invalid parameter was provided.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// A required credential is not configured.
    #[error("{0} not set in environment")]
    MissingCredential(String),

    /// Filesystem errors.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias using [`FilingsError`].
pub type Result<T> = std::result::Result<T, FilingsError>;
