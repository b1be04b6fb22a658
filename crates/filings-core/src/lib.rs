#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for the SEC filing extraction pipeline.
//!
//! This crate provides the foundational abstractions shared by every stage:
//!
//! - [`Extraction`](extraction::Extraction) - A labeled, source-grounded text span
//! - [`AnnotatedDocument`](extraction::AnnotatedDocument) - Source text plus its extractions
//! - [`Filing`](types::Filing) - A fetched filing and its cleaned text
//! - [`FilingCache`](cache::FilingCache) - Caching abstraction for filing text
//! - [`Annotator`](annotator::Annotator) - The hosted extraction service seam

/// Annotation service trait and its parameters.
pub mod annotator;
/// Cache trait for storing fetched filing text.
pub mod cache;
/// Error types for pipeline operations.
pub mod error;
/// Extraction data model.
pub mod extraction;
/// Filing types (Ticker, FilingType, FilingRecord, Filing).
pub mod types;

// Re-export commonly used items at crate root
pub use annotator::{
    Annotator, DEFAULT_EXTRACTION_PASSES, DEFAULT_MAX_CHAR_BUFFER, DEFAULT_MAX_WORKERS,
    DEFAULT_MODEL_ID, ExtractionConfig,
};
pub use cache::{FilingCache, cache_key_for_url, sanitize_key};
pub use error::{FilingsError, Result};
pub use extraction::{
    AlignmentStatus, AnnotatedDocument, Attributes, CharInterval, ExampleData, Extraction,
    ExtractionClass, Facts, most_common,
};
pub use types::{Filing, FilingRecord, FilingType, SECTION_TEXT_LIMIT, TextScope, Ticker};
