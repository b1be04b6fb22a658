//! Human-readable reports: the Markdown summary and the console analysis.

use filings_core::{AnnotatedDocument, ExtractionClass, Facts, Result, most_common};
use std::fmt;
use std::fs;
use std::path::Path;

const RISK_EXCERPT_CHARS: usize = 150;
const CONSOLE_EXCERPT_CHARS: usize = 60;

/// Formats an integer with comma thousands separators.
#[must_use]
pub fn thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

fn prefix(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte, _)) => &text[..byte],
        None => text,
    }
}

/// Renders the Markdown analysis report.
#[must_use]
pub fn summary_report(doc: &AnnotatedDocument, ticker: &str, filing_type: &str) -> String {
    let company: Vec<_> = doc.of_class(&ExtractionClass::CompanyInfo).collect();
    let metrics: Vec<_> = doc.of_class(&ExtractionClass::FinancialMetric).collect();
    let risks: Vec<_> = doc.of_class(&ExtractionClass::RiskFactor).collect();
    let segments: Vec<_> = doc.of_class(&ExtractionClass::BusinessSegment).collect();

    let mut lines = vec![
        format!("# Financial Analysis Report: {ticker} {filing_type}"),
        String::new(),
        "## Executive Summary".to_string(),
        String::new(),
        format!("- **Total Extractions**: {}", doc.extractions.len()),
        format!("- **Financial Metrics**: {}", metrics.len()),
        format!("- **Risk Factors**: {}", risks.len()),
        format!("- **Business Segments**: {}", segments.len()),
        format!("- **Document Length**: {} characters", thousands(doc.text_len())),
        String::new(),
        "## Company Information".to_string(),
        String::new(),
    ];

    for info in company.iter().take(5) {
        let info_type = info.attr("info_type").unwrap_or("unknown");
        lines.push(format!("- **{info_type}**: {}", info.extraction_text));
    }

    lines.extend([
        String::new(),
        "## Key Financial Metrics".to_string(),
        String::new(),
        "| Metric | Value | Period |".to_string(),
        "|--------|-------|--------|".to_string(),
    ]);
    for metric in metrics.iter().take(10) {
        if let Facts::FinancialMetric {
            metric_name,
            value,
            unit,
            time_period,
            ..
        } = metric.facts()
        {
            lines.push(format!(
                "| {} | {} {} | {} |",
                metric_name.unwrap_or("unknown"),
                value.unwrap_or_default(),
                unit.unwrap_or_default(),
                time_period.unwrap_or_default(),
            ));
        }
    }

    lines.extend([String::new(), "## Business Segments".to_string(), String::new()]);
    for segment in segments.iter().take(5) {
        let segment_type = segment.attr("segment_type").unwrap_or("unknown");
        lines.push(format!("- **{}** ({segment_type})", segment.extraction_text));
    }

    lines.extend([String::new(), "## Risk Factor Categories".to_string(), String::new()]);
    let categories = most_common(
        risks
            .iter()
            .map(|r| r.attr("risk_category").unwrap_or("unknown")),
    );
    for (category, count) in categories {
        lines.push(format!("- **{category}**: {count} risks identified"));
    }

    lines.extend([String::new(), "## Sample Risk Factors".to_string(), String::new()]);
    for risk in risks.iter().take(3) {
        let category = risk.attr("risk_category").unwrap_or("unknown");
        let text = &risk.extraction_text;
        let excerpt = if text.chars().count() > RISK_EXCERPT_CHARS {
            format!("{}...", prefix(text, RISK_EXCERPT_CHARS))
        } else {
            text.clone()
        };
        lines.push(format!("- **[{category}]** {excerpt}"));
    }

    lines.extend([
        String::new(),
        "---".to_string(),
        String::new(),
        "*Report generated by the filings financial extraction pipeline*".to_string(),
    ]);

    lines.join("\n")
}

/// Writes the Markdown report.
pub fn generate_summary_report(
    doc: &AnnotatedDocument,
    ticker: &str,
    filing_type: &str,
    path: &Path,
) -> Result<()> {
    fs::write(path, summary_report(doc, ticker, filing_type))?;
    Ok(())
}

/// Sample metric line of the console analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSample {
    /// Metric identifier, "unknown" when absent.
    pub name: String,
    /// Value, "N/A" when absent.
    pub value: String,
    /// Unit.
    pub unit: String,
    /// Leading characters of the source text.
    pub excerpt: String,
}

/// Statistics printed after extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionSummary {
    /// Number of extractions.
    pub total: usize,
    /// Source length in characters.
    pub document_length: usize,
    /// Class counts, most frequent first.
    pub breakdown: Vec<(String, usize)>,
    /// Up to five metrics.
    pub sample_metrics: Vec<MetricSample>,
    /// Total `risk_factor` count.
    pub risk_count: usize,
    /// Up to three `(category, excerpt)` risk samples.
    pub sample_risks: Vec<(String, String)>,
}

impl ExtractionSummary {
    /// Computes the summary for a document.
    #[must_use]
    pub fn from_document(doc: &AnnotatedDocument) -> Self {
        let breakdown = doc
            .class_counts()
            .into_iter()
            .map(|(class, count)| (class.to_string(), count))
            .collect();

        let sample_metrics = doc
            .of_class(&ExtractionClass::FinancialMetric)
            .take(5)
            .map(|m| MetricSample {
                name: m.attr("metric_name").unwrap_or("unknown").to_string(),
                value: m.attr("value").unwrap_or("N/A").to_string(),
                unit: m.attr("unit").unwrap_or_default().to_string(),
                excerpt: prefix(&m.extraction_text, CONSOLE_EXCERPT_CHARS).to_string(),
            })
            .collect();

        let risks: Vec<_> = doc.of_class(&ExtractionClass::RiskFactor).collect();
        let sample_risks = risks
            .iter()
            .take(3)
            .map(|r| {
                (
                    r.attr("risk_category").unwrap_or("unknown").to_string(),
                    prefix(&r.extraction_text, CONSOLE_EXCERPT_CHARS).to_string(),
                )
            })
            .collect();

        Self {
            total: doc.extractions.len(),
            document_length: doc.text_len(),
            breakdown,
            sample_metrics,
            risk_count: risks.len(),
            sample_risks,
        }
    }
}

impl fmt::Display for ExtractionSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rule = "=".repeat(60);
        let thin = "-".repeat(40);
        writeln!(f, "{rule}")?;
        writeln!(f, "EXTRACTION SUMMARY")?;
        writeln!(f, "{rule}")?;
        writeln!(f)?;
        writeln!(f, "Total entities: {}", self.total)?;
        writeln!(f, "Document length: {} characters", thousands(self.document_length))?;
        writeln!(f)?;
        writeln!(f, "Entity Type Breakdown:")?;
        writeln!(f, "{thin}")?;
        for (class, count) in &self.breakdown {
            let pct = *count as f64 / self.total.max(1) as f64 * 100.0;
            writeln!(f, "  {class}: {count} ({pct:.1}%)")?;
        }
        writeln!(f)?;
        writeln!(f, "Sample Financial Metrics:")?;
        writeln!(f, "{thin}")?;
        for m in &self.sample_metrics {
            writeln!(f, "  {}: {} {}", m.name, m.value, m.unit)?;
            writeln!(f, "    -> \"{}...\"", m.excerpt)?;
        }
        if self.risk_count > 0 {
            writeln!(f)?;
            writeln!(f, "Risk Factors Found: {}", self.risk_count)?;
            writeln!(f, "{thin}")?;
            for (category, excerpt) in &self.sample_risks {
                writeln!(f, "  [{category}] \"{excerpt}...\"")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filings_core::Extraction;

    fn risk(category: &str, text: &str) -> Extraction {
        Extraction::new(ExtractionClass::RiskFactor, text).with_attribute("risk_category", category)
    }

    fn doc() -> AnnotatedDocument {
        AnnotatedDocument::new(
            "x".repeat(1_234_567),
            vec![
                Extraction::new(ExtractionClass::CompanyInfo, "NVIDIA Corporation")
                    .with_attribute("info_type", "company_name"),
                Extraction::new(ExtractionClass::CompanyInfo, "NVDA"),
                Extraction::new(ExtractionClass::FinancialMetric, "Revenue was $60.9 billion")
                    .with_attribute("metric_name", "revenue")
                    .with_attribute("value", "60.9")
                    .with_attribute("unit", "USD_billions")
                    .with_attribute("time_period", "fiscal_2024"),
                Extraction::new(ExtractionClass::BusinessSegment, "Gaming"),
                risk("market", "Demand may fall"),
                risk("regulatory", "Export controls"),
                risk("regulatory", &"y".repeat(200)),
                Extraction::new(ExtractionClass::RiskFactor, "Unlabelled risk"),
            ],
        )
    }

    #[test]
    fn test_thousands() {
        assert_eq!(thousands(0), "0");
        assert_eq!(thousands(999), "999");
        assert_eq!(thousands(1_000), "1,000");
        assert_eq!(thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_summary_sections() {
        let report = summary_report(&doc(), "NVDA", "10-K");
        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines[0], "# Financial Analysis Report: NVDA 10-K");
        assert!(report.contains("- **Total Extractions**: 8\n"));
        assert!(report.contains("- **Risk Factors**: 4\n"));
        assert!(report.contains("- **Document Length**: 1,234,567 characters\n"));
        assert!(report.contains("- **company_name**: NVIDIA Corporation\n- **unknown**: NVDA\n"));
        assert!(report.contains("| revenue | 60.9 USD_billions | fiscal_2024 |"));
        assert!(report.contains("- **Gaming** (unknown)"));
        assert!(report.ends_with("---\n\n*Report generated by the filings financial extraction pipeline*"));
    }

    #[test]
    fn test_risk_categories_descending_once_each() {
        let report = summary_report(&doc(), "NVDA", "10-K");
        let categories: Vec<&str> = report
            .lines()
            .filter(|l| l.ends_with("risks identified"))
            .collect();
        assert_eq!(
            categories,
            vec![
                "- **regulatory**: 2 risks identified",
                "- **market**: 1 risks identified",
                "- **unknown**: 1 risks identified",
            ]
        );
    }

    #[test]
    fn test_risk_samples_truncated() {
        let report = summary_report(&doc(), "NVDA", "10-K");
        let expected = format!("- **[regulatory]** {}...", "y".repeat(150));
        assert!(report.contains(&expected));
        assert!(report.contains("- **[market]** Demand may fall\n"));
        assert!(!report.contains("Unlabelled risk"));
    }

    #[test]
    fn test_empty_document_report() {
        let report = summary_report(&AnnotatedDocument::new("abc", vec![]), "AAPL", "10-Q");
        assert!(report.contains("- **Total Extractions**: 0"));
        assert!(report.contains("|--------|-------|--------|\n\n## Business Segments"));
    }

    #[test]
    fn test_extraction_summary() {
        let summary = ExtractionSummary::from_document(&doc());
        assert_eq!(summary.total, 8);
        assert_eq!(summary.breakdown[0], ("risk_factor".to_string(), 4));
        assert_eq!(summary.sample_metrics[0].name, "revenue");
        assert_eq!(summary.sample_risks.len(), 3);
        assert_eq!(summary.sample_risks[2].1.chars().count(), 60);

        let printed = summary.to_string();
        assert!(printed.contains("EXTRACTION SUMMARY"));
        assert!(printed.contains("  risk_factor: 4 (50.0%)"));
        assert!(printed.contains("Risk Factors Found: 4"));
    }
}
