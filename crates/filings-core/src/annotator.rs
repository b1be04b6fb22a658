//! Annotation service seam.
//!
//! The hosted LLM annotation service is consumed as a single call: submit text,
//! an instruction prompt and worked examples, receive an [`AnnotatedDocument`].
//! Chunking, parallelism and multi-pass semantics belong to the implementation.

use async_trait::async_trait;
use std::fmt;

use crate::error::{FilingsError, Result};
use crate::extraction::{AnnotatedDocument, ExampleData};

/// Default hosted model identifier.
pub const DEFAULT_MODEL_ID: &str = "gemini-3-flash-preview";

/// Default number of extraction passes.
pub const DEFAULT_EXTRACTION_PASSES: usize = 2;

/// Default number of chunk requests in flight.
pub const DEFAULT_MAX_WORKERS: usize = 10;

/// Default upper bound on chunk size, in characters.
pub const DEFAULT_MAX_CHAR_BUFFER: usize = 2_000;

/// Parameters passed through to the annotation service.
#[derive(Clone, PartialEq, Eq)]
pub struct ExtractionConfig {
    /// Model identifier.
    pub model_id: String,
    /// Service credential.
    pub api_key: Option<String>,
    /// Number of extraction passes over the text.
    pub extraction_passes: usize,
    /// Maximum number of chunk requests processed in parallel.
    pub max_workers: usize,
    /// Maximum chunk size in characters.
    pub max_char_buffer: usize,
}

impl ExtractionConfig {
    /// Creates a config with the default model and tuning.
    #[must_use]
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: Some(api_key.into()),
            ..Self::default()
        }
    }

    /// Sets the model identifier.
    #[must_use]
    pub fn with_model(mut self, model_id: impl Into<String>) -> Self {
        self.model_id = model_id.into();
        self
    }

    /// Sets the number of passes.
    #[must_use]
    pub const fn with_passes(mut self, passes: usize) -> Self {
        self.extraction_passes = passes;
        self
    }

    /// Sets the worker count.
    #[must_use]
    pub const fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    /// Sets the chunk size bound.
    #[must_use]
    pub const fn with_max_char_buffer(mut self, chars: usize) -> Self {
        self.max_char_buffer = chars;
        self
    }

    /// Checks that the tuning values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.model_id.trim().is_empty() {
            return Err(FilingsError::InvalidParameter("Empty model id".to_string()));
        }
        if self.extraction_passes == 0 {
            return Err(FilingsError::InvalidParameter(
                "extraction_passes must be at least 1".to_string(),
            ));
        }
        if self.max_workers == 0 {
            return Err(FilingsError::InvalidParameter(
                "max_workers must be at least 1".to_string(),
            ));
        }
        if self.max_char_buffer == 0 {
            return Err(FilingsError::InvalidParameter(
                "max_char_buffer must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            model_id: DEFAULT_MODEL_ID.to_string(),
            api_key: None,
            extraction_passes: DEFAULT_EXTRACTION_PASSES,
            max_workers: DEFAULT_MAX_WORKERS,
            max_char_buffer: DEFAULT_MAX_CHAR_BUFFER,
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("model_id", &self.model_id)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .field("extraction_passes", &self.extraction_passes)
            .field("max_workers", &self.max_workers)
            .field("max_char_buffer", &self.max_char_buffer)
            .finish()
    }
}

/// A hosted service that tags source-grounded spans in text.
#[async_trait]
pub trait Annotator: Send + Sync + fmt::Debug {
    /// Returns the name of this service (e.g., "Gemini").
    fn name(&self) -> &str;

    /// Annotates `text` following `prompt` and `examples`.
    async fn annotate(
        &self,
        text: &str,
        prompt: &str,
        examples: &[ExampleData],
        config: &ExtractionConfig,
    ) -> Result<AnnotatedDocument>;
}
