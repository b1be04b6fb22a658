//! Writes every artifact for one annotated filing.

use crate::records::save_annotated_document;
use crate::report::generate_summary_report;
use crate::risks::export_risk_factors;
use crate::tables::{export_business_segments, export_financial_metrics, export_full_table};
use crate::visualize::render_visualization;
use filings_core::{AnnotatedDocument, FilingType, Result, Ticker};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Paths of the artifacts written by [`Exporter::export_all`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportManifest {
    /// JSON Lines record of the annotated document.
    pub jsonl: PathBuf,
    /// HTML visualization.
    pub visualization: PathBuf,
    /// Metrics CSV.
    pub metrics: PathBuf,
    /// Risk factor JSON.
    pub risks: PathBuf,
    /// Segment CSV.
    pub segments: PathBuf,
    /// Markdown report.
    pub summary: PathBuf,
    /// Full extraction CSV.
    pub full_table: PathBuf,
}

impl ExportManifest {
    fn new(dir: &Path, base_name: &str) -> Self {
        let path = |suffix: &str| dir.join(format!("{base_name}{suffix}"));
        Self {
            jsonl: path(".jsonl"),
            visualization: path("_visualization.html"),
            metrics: path("_metrics.csv"),
            risks: path("_risks.json"),
            segments: path("_segments.csv"),
            summary: path("_summary.md"),
            full_table: path("_full.csv"),
        }
    }

    /// Every artifact with a short description, in write order.
    #[must_use]
    pub fn files(&self) -> [(&Path, &'static str); 7] {
        [
            (self.jsonl.as_path(), "structured extraction data"),
            (self.visualization.as_path(), "interactive visualization"),
            (self.metrics.as_path(), "financial metrics table"),
            (self.risks.as_path(), "risk factors"),
            (self.segments.as_path(), "business segments"),
            (self.summary.as_path(), "markdown report"),
            (self.full_table.as_path(), "complete extraction table"),
        ]
    }
}

/// Exports annotated filings into one output directory.
#[derive(Debug, Clone)]
pub struct Exporter {
    output_dir: PathBuf,
}

impl Exporter {
    /// Creates an exporter writing under `output_dir`.
    #[must_use]
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// The output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Artifact name prefix, e.g. `NVDA_10-K_extraction`.
    #[must_use]
    pub fn base_name(ticker: &Ticker, filing_type: FilingType) -> String {
        format!("{ticker}_{filing_type}_extraction")
    }

    /// Writes all seven artifacts, creating the directory if needed.
    ///
    /// The visualization is rendered from the JSON Lines file just written.
    pub fn export_all(
        &self,
        doc: &AnnotatedDocument,
        ticker: &Ticker,
        filing_type: FilingType,
    ) -> Result<ExportManifest> {
        fs::create_dir_all(&self.output_dir)?;
        let manifest = ExportManifest::new(&self.output_dir, &Self::base_name(ticker, filing_type));

        save_annotated_document(doc, &manifest.jsonl)?;
        info!("Saved extractions to: {}", manifest.jsonl.display());

        fs::write(&manifest.visualization, render_visualization(&manifest.jsonl)?)?;
        info!("Generated visualization: {}", manifest.visualization.display());

        let n = export_financial_metrics(doc, &manifest.metrics)?;
        info!("Exported {n} financial metrics to: {}", manifest.metrics.display());

        let n = export_risk_factors(doc, &manifest.risks)?;
        info!("Exported {n} risk factors to: {}", manifest.risks.display());

        let n = export_business_segments(doc, &manifest.segments)?;
        info!("Exported {n} business segment entries to: {}", manifest.segments.display());

        generate_summary_report(doc, ticker.as_str(), filing_type.as_str(), &manifest.summary)?;
        info!("Generated summary report: {}", manifest.summary.display());

        let n = export_full_table(doc, &manifest.full_table)?;
        info!("Exported {n} rows of full extraction data to: {}", manifest.full_table.display());

        Ok(manifest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filings_core::{CharInterval, Extraction, ExtractionClass};

    fn scenario() -> AnnotatedDocument {
        let text = "Revenue for fiscal 2024 was $60.9 billion. Export controls restrict sales to China.";
        AnnotatedDocument::new(
            text,
            vec![
                Extraction::new(ExtractionClass::FinancialMetric, "Revenue for fiscal 2024 was $60.9 billion")
                    .with_interval(CharInterval::new(0, 41))
                    .with_attribute("metric_name", "revenue")
                    .with_attribute("value", "60.9")
                    .with_attribute("unit", "USD_billions")
                    .with_attribute("time_period", "fiscal_2024"),
                Extraction::new(ExtractionClass::RiskFactor, "Export controls restrict sales to China")
                    .with_interval(CharInterval::new(43, 82))
                    .with_attribute("risk_category", "regulatory")
                    .with_attribute("geographic_exposure", "china"),
            ],
        )
        .with_document_id("NVDA_10-K")
    }

    #[test]
    fn test_base_name() {
        assert_eq!(
            Exporter::base_name(&Ticker::new("nvda"), FilingType::TenK),
            "NVDA_10-K_extraction"
        );
    }

    #[test]
    fn test_export_all_writes_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path().join("out"));
        let manifest = exporter
            .export_all(&scenario(), &Ticker::new("NVDA"), FilingType::TenK)
            .unwrap();
        for (path, _) in manifest.files() {
            assert!(path.exists(), "{} missing", path.display());
        }
        assert_eq!(
            manifest.metrics.file_name().unwrap(),
            "NVDA_10-K_extraction_metrics.csv"
        );
    }

    #[test]
    fn test_revenue_and_regulatory_scenario() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = Exporter::new(dir.path())
            .export_all(&scenario(), &Ticker::new("NVDA"), FilingType::TenK)
            .unwrap();

        let mut reader = csv::Reader::from_path(&manifest.metrics).unwrap();
        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(&rows[0][0], "revenue");
        assert_eq!(&rows[0][1], "60.9");
        assert_eq!(&rows[0][2], "USD_billions");
        assert_eq!(&rows[0][3], "fiscal_2024");

        let risks: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&manifest.risks).unwrap()).unwrap();
        let risks = risks.as_array().unwrap();
        assert_eq!(risks.len(), 1);
        assert_eq!(risks[0]["category"], "regulatory");
        assert_eq!(risks[0]["geographic_exposure"], "china");
        assert_eq!(risks[0]["position"]["start"], 43);
    }

    #[test]
    fn test_export_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path());
        let doc = scenario();
        let ticker = Ticker::new("NVDA");

        let first = exporter.export_all(&doc, &ticker, FilingType::TenK).unwrap();
        let before: Vec<Vec<u8>> = first.files().iter().map(|(p, _)| fs::read(p).unwrap()).collect();
        let second = exporter.export_all(&doc, &ticker, FilingType::TenK).unwrap();
        let after: Vec<Vec<u8>> = second.files().iter().map(|(p, _)| fs::read(p).unwrap()).collect();

        assert_eq!(first, second);
        assert_eq!(before, after);
    }

    #[test]
    fn test_export_empty_document() {
        let dir = tempfile::tempdir().unwrap();
        let doc = AnnotatedDocument::new("Nothing to see.", vec![]);
        let manifest = Exporter::new(dir.path())
            .export_all(&doc, &Ticker::new("AAPL"), FilingType::TenQ)
            .unwrap();
        assert_eq!(fs::read_to_string(&manifest.risks).unwrap(), "[]");
        assert_eq!(
            fs::read_to_string(&manifest.segments).unwrap(),
            "segment_name,segment_type,metric_name,value,unit\n"
        );
        let summary = fs::read_to_string(&manifest.summary).unwrap();
        assert!(summary.starts_with("# Financial Analysis Report: AAPL 10-Q"));
    }
}
