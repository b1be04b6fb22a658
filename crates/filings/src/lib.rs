#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC filing financial extraction pipeline.
//!
//! This crate re-exports the `filings-*` crates and provides the [`Pipeline`]
//! that ties them together: fetch a filing from SEC EDGAR (or reuse the cached
//! text), extract financial facts with an LLM annotator and write every output
//! artifact.
//!
//! # Crates
//!
//! - `filings-core` - Types, errors and the cache and annotator traits
//! - `filings-cache` - In-memory, no-op and file-backed caches
//! - `filings-edgar` - SEC EDGAR fetcher
//! - `filings-extract` - Prompt, chunking and the Gemini annotator
//! - `filings-export` - CSV, JSON, Markdown and HTML outputs

// Core types and traits
pub use filings_core::*;

// Cache implementations
pub use filings_cache::{FileCache, InMemoryCache, NoopCache};

// Fetcher
pub use filings_edgar::{DEFAULT_USER_AGENT, EdgarFetcher, filter_by_year, lookup_cik};

// Annotation
pub use filings_extract::{
    API_KEY_ENV, GEMINI_BASE_URL, GeminiAnnotator, TextChunk, chunk_text, extract_from_text,
    financial_examples, financial_extraction_prompt,
};

// Export
pub use filings_export::{
    ExportManifest, Exporter, ExtractionSummary, MetricRow, RiskRecord, SegmentRow,
    export_business_segments, export_financial_metrics, export_full_table, export_risk_factors,
    full_table, generate_summary_report, load_annotated_documents, metrics_rows,
    render_visualization, risk_records, save_annotated_document, segment_rows, summary_report,
    thousands,
};

/// End-to-end fetch, extract and export.
mod pipeline;
pub use pipeline::{CACHE_DIR_NAME, DEFAULT_OUTPUT_DIR, Pipeline, PipelineConfig, PipelineOutput};
