//! Risk factor list export.

use filings_core::{AnnotatedDocument, ExtractionClass, Facts, Result};
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Source position of a risk, both ends null when ungrounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Position {
    /// First character.
    pub start: Option<usize>,
    /// One past the last character.
    pub end: Option<usize>,
}

/// One `risk_factor` extraction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskRecord<'a> {
    /// `risk_category`, "unknown" when absent.
    pub category: &'a str,
    /// Full extraction text.
    pub description: &'a str,
    /// `geographic_exposure`, "" when absent.
    pub geographic_exposure: &'a str,
    /// Position in the source.
    pub position: Position,
}

/// One record per `risk_factor`, in document order.
#[must_use]
pub fn risk_records(doc: &AnnotatedDocument) -> Vec<RiskRecord<'_>> {
    doc.of_class(&ExtractionClass::RiskFactor)
        .map(|e| {
            let (category, exposure) = match e.facts() {
                Facts::RiskFactor {
                    risk_category,
                    geographic_exposure,
                } => (risk_category, geographic_exposure),
                _ => (None, None),
            };
            let (start, end) = e.position();
            RiskRecord {
                category: category.unwrap_or("unknown"),
                description: &e.extraction_text,
                geographic_exposure: exposure.unwrap_or_default(),
                position: Position { start, end },
            }
        })
        .collect()
}

/// Writes the risk list as pretty-printed JSON. Returns the number of records.
pub fn export_risk_factors(doc: &AnnotatedDocument, path: &Path) -> Result<usize> {
    let records = risk_records(doc);
    fs::write(path, serde_json::to_string_pretty(&records)?)?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use filings_core::{CharInterval, Extraction};

    #[test]
    fn test_risk_records_defaults() {
        let doc = AnnotatedDocument::new(
            "Exposure to Zölle in China",
            vec![
                Extraction::new(ExtractionClass::RiskFactor, "Exposure to Zölle")
                    .with_interval(CharInterval::new(0, 17))
                    .with_attribute("risk_category", "regulatory")
                    .with_attribute("geographic_exposure", "china"),
                Extraction::new(ExtractionClass::RiskFactor, "in China"),
                Extraction::new(ExtractionClass::CompanyInfo, "ignored"),
            ],
        );
        let records = risk_records(&doc);
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].position, Position { start: Some(0), end: Some(17) });
        assert_eq!(records[1].category, "unknown");
        assert_eq!(records[1].geographic_exposure, "");
        assert_eq!(records[1].position, Position { start: None, end: None });
    }

    #[test]
    fn test_export_risks_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("risks.json");
        let doc = AnnotatedDocument::new(
            "Zölle",
            vec![Extraction::new(ExtractionClass::RiskFactor, "Zölle")
                .with_attribute("risk_category", "market")],
        );
        assert_eq!(export_risk_factors(&doc, &path).unwrap(), 1);
        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(
            content,
            "[\n  {\n    \"category\": \"market\",\n    \"description\": \"Zölle\",\n    \
             \"geographic_exposure\": \"\",\n    \"position\": {\n      \"start\": null,\n      \
             \"end\": null\n    }\n  }\n]"
        );
    }

    #[test]
    fn test_export_no_risks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("risks.json");
        let doc = AnnotatedDocument::new("text", vec![]);
        assert_eq!(export_risk_factors(&doc, &path).unwrap(), 0);
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }
}
