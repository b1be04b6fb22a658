#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! LLM extraction of financial facts from SEC filing text.
//!
//! This crate turns cleaned filing text into an [`AnnotatedDocument`]:
//!
//! - [`financial_extraction_prompt`] and [`financial_examples`] - The fixed request
//! - [`chunk_text`] - Splits long text into bounded, contiguous chunks
//! - [`GeminiAnnotator`] - [`Annotator`] backed by the Gemini `generateContent` API
//! - [`extract_from_text`] - The single entry point used by the pipeline
//!
//! # Example
//!
//! ```no_run
//! use filings_core::ExtractionConfig;
//! use filings_extract::{GeminiAnnotator, extract_from_text};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let annotator = GeminiAnnotator::new()?;
//!     let config = ExtractionConfig::new(std::env::var("LANGEXTRACT_API_KEY")?);
//!
//!     let doc = extract_from_text(&annotator, "Revenue was $60.9 billion.", &config).await?;
//!     println!("{} extractions", doc.extractions.len());
//!
//!     Ok(())
//! }
//! ```

/// Splitting text into bounded chunks.
pub mod chunking;
/// Gemini-backed annotator.
mod gemini;
/// The financial extraction prompt and worked examples.
pub mod prompt;
/// Prompt rendering, answer parsing and source alignment.
pub mod resolver;

pub use chunking::{TextChunk, chunk_text};
pub use gemini::{API_KEY_ENV, GEMINI_BASE_URL, GeminiAnnotator};
pub use prompt::{financial_examples, financial_extraction_prompt};

use filings_core::{AnnotatedDocument, Annotator, ExtractionConfig, FilingsError, Result};
use tracing::info;

/// Runs the financial extraction over a filing's text.
///
/// # Errors
/// Returns [`FilingsError::InvalidParameter`] for empty text and propagates any
/// annotator failure.
pub async fn extract_from_text(
    annotator: &dyn Annotator,
    text: &str,
    config: &ExtractionConfig,
) -> Result<AnnotatedDocument> {
    if text.trim().is_empty() {
        return Err(FilingsError::InvalidParameter(
            "Cannot extract from empty text".to_string(),
        ));
    }

    info!("Extracting financial information using {}...", config.model_id);
    info!("Text length: {} characters", text.chars().count());

    let examples = financial_examples();
    let document = annotator
        .annotate(text, financial_extraction_prompt(), &examples, config)
        .await?;

    info!("Extracted {} entities", document.extractions.len());
    Ok(document)
}
