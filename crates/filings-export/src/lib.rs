#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Output artifacts for annotated SEC filings.
//!
//! Every writer reads the same immutable [`AnnotatedDocument`](filings_core::AnnotatedDocument):
//!
//! - [`save_annotated_document`] / [`load_annotated_documents`] - JSON Lines records
//! - [`export_financial_metrics`], [`export_business_segments`], [`export_full_table`] - CSV tables
//! - [`export_risk_factors`] - Risk factors as a JSON array
//! - [`generate_summary_report`] - Markdown analysis report
//! - [`render_visualization`] - Self-contained HTML page
//! - [`Exporter`] - Writes all of the above under one base name
//!
//! # Example
//!
//! ```no_run
//! use filings_core::{AnnotatedDocument, FilingType, Ticker};
//! use filings_export::Exporter;
//!
//! fn main() -> filings_core::Result<()> {
//!     let doc = AnnotatedDocument::new("Revenue was $60.9 billion.", Vec::new());
//!     let manifest = Exporter::new("./output").export_all(&doc, &Ticker::new("NVDA"), FilingType::TenK)?;
//!     println!("Summary written to {}", manifest.summary.display());
//!     Ok(())
//! }
//! ```

/// Writes every artifact for one document.
mod exporter;
/// JSON Lines persistence.
pub mod records;
/// Markdown report and console summary.
pub mod report;
/// Risk factor JSON.
pub mod risks;
/// Metrics, segment and full extraction tables.
pub mod tables;
/// HTML visualization.
pub mod visualize;

pub use exporter::{ExportManifest, Exporter};
pub use records::{load_annotated_documents, save_annotated_document, save_annotated_documents};
pub use report::{
    ExtractionSummary, MetricSample, generate_summary_report, summary_report, thousands,
};
pub use risks::{Position, RiskRecord, export_risk_factors, risk_records};
pub use tables::{
    MetricRow, SegmentRow, export_business_segments, export_financial_metrics, export_full_table,
    full_table, metrics_rows, segment_rows,
};
pub use visualize::{render_documents, render_visualization};
