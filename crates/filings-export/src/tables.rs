//! Tabular exports: metrics, segments and the full extraction table.

use filings_core::{AnnotatedDocument, ExtractionClass, Facts, FilingsError, Result};
use polars::prelude::*;
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::fs::File;
use std::path::Path;

const METRIC_HEADERS: [&str; 6] = ["metric_name", "value", "unit", "time_period", "segment", "text"];
const SEGMENT_HEADERS: [&str; 5] = ["segment_name", "segment_type", "metric_name", "value", "unit"];

/// One row of the metrics table.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct MetricRow<'a> {
    /// Metric identifier.
    pub metric_name: &'a str,
    /// Value as written.
    pub value: &'a str,
    /// Unit.
    pub unit: &'a str,
    /// Reporting period.
    pub time_period: &'a str,
    /// Segment tag.
    pub segment: &'a str,
    /// Source text of the extraction.
    pub text: &'a str,
}

/// One row per `financial_metric`, missing attributes as "".
#[must_use]
pub fn metrics_rows(doc: &AnnotatedDocument) -> Vec<MetricRow<'_>> {
    doc.of_class(&ExtractionClass::FinancialMetric)
        .filter_map(|e| match e.facts() {
            Facts::FinancialMetric {
                metric_name,
                value,
                unit,
                time_period,
                segment,
            } => Some(MetricRow {
                metric_name: metric_name.unwrap_or_default(),
                value: value.unwrap_or_default(),
                unit: unit.unwrap_or_default(),
                time_period: time_period.unwrap_or_default(),
                segment: segment.unwrap_or_default(),
                text: &e.extraction_text,
            }),
            _ => None,
        })
        .collect()
}

/// A row of the segment table.
///
/// Segment extractions and segment-tagged metrics share one table; both shapes
/// serialize to the same five columns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentRow<'a> {
    /// A `business_segment` extraction.
    Segment {
        /// Segment text.
        name: &'a str,
        /// `segment_type` attribute.
        segment_type: &'a str,
    },
    /// A `financial_metric` carrying a `segment` attribute.
    Metric {
        /// The `segment` attribute.
        name: &'a str,
        /// Metric identifier.
        metric_name: &'a str,
        /// Value as written.
        value: &'a str,
        /// Unit.
        unit: &'a str,
    },
}

impl Serialize for SegmentRow<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let (name, segment_type, metric_name, value, unit) = match *self {
            Self::Segment { name, segment_type } => (name, segment_type, "", "", ""),
            Self::Metric {
                name,
                metric_name,
                value,
                unit,
            } => (name, "metric", metric_name, value, unit),
        };
        let mut row = serializer.serialize_struct("SegmentRow", 5)?;
        row.serialize_field("segment_name", name)?;
        row.serialize_field("segment_type", segment_type)?;
        row.serialize_field("metric_name", metric_name)?;
        row.serialize_field("value", value)?;
        row.serialize_field("unit", unit)?;
        row.end()
    }
}

/// Segments in document order, followed by segment-tagged metrics.
#[must_use]
pub fn segment_rows(doc: &AnnotatedDocument) -> Vec<SegmentRow<'_>> {
    doc.of_class(&ExtractionClass::BusinessSegment)
        .map(|e| SegmentRow::Segment {
            name: &e.extraction_text,
            segment_type: e.attr("segment_type").unwrap_or_default(),
        })
        .chain(
            doc.of_class(&ExtractionClass::FinancialMetric)
                .filter_map(|e| match e.facts() {
                    Facts::FinancialMetric {
                        metric_name,
                        value,
                        unit,
                        segment: Some(segment),
                        ..
                    } if !segment.is_empty() => Some(SegmentRow::Metric {
                        name: segment,
                        metric_name: metric_name.unwrap_or_default(),
                        value: value.unwrap_or_default(),
                        unit: unit.unwrap_or_default(),
                    }),
                    _ => None,
                }),
        )
        .collect()
}

fn write_csv<T: Serialize>(path: &Path, headers: &[&str], rows: &[T]) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| FilingsError::Export(format!("{}: {e}", path.display())))?;
    writer
        .write_record(headers)
        .map_err(|e| FilingsError::Export(e.to_string()))?;
    for row in rows {
        writer
            .serialize(row)
            .map_err(|e| FilingsError::Export(e.to_string()))?;
    }
    writer.flush()?;
    Ok(())
}

/// Writes the metrics table. Returns the number of data rows.
pub fn export_financial_metrics(doc: &AnnotatedDocument, path: &Path) -> Result<usize> {
    let rows = metrics_rows(doc);
    write_csv(path, &METRIC_HEADERS, &rows)?;
    Ok(rows.len())
}

/// Writes the segment table. Returns the number of data rows.
pub fn export_business_segments(doc: &AnnotatedDocument, path: &Path) -> Result<usize> {
    let rows = segment_rows(doc);
    write_csv(path, &SEGMENT_HEADERS, &rows)?;
    Ok(rows.len())
}

/// Builds a frame with one row per extraction.
///
/// Columns are `extraction_class`, `extraction_text`, `start_pos`, `end_pos`,
/// then `attr_<key>` for every attribute key in first-seen order. Rows without
/// a key hold null there.
pub fn full_table(doc: &AnnotatedDocument) -> Result<DataFrame> {
    let extractions = &doc.extractions;

    let mut keys: Vec<&str> = Vec::new();
    for e in extractions {
        for key in e.attributes.keys() {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
    }

    let classes: Vec<&str> = extractions.iter().map(|e| e.extraction_class.as_str()).collect();
    let texts: Vec<&str> = extractions.iter().map(|e| e.extraction_text.as_str()).collect();
    let starts: Vec<Option<u64>> = extractions
        .iter()
        .map(|e| e.char_interval.map(|i| i.start_pos as u64))
        .collect();
    let ends: Vec<Option<u64>> = extractions
        .iter()
        .map(|e| e.char_interval.map(|i| i.end_pos as u64))
        .collect();

    let mut columns = vec![
        Column::new("extraction_class".into(), classes),
        Column::new("extraction_text".into(), texts),
        Column::new("start_pos".into(), starts),
        Column::new("end_pos".into(), ends),
    ];
    for key in keys {
        let values: Vec<Option<&str>> = extractions.iter().map(|e| e.attr(key)).collect();
        columns.push(Column::new(format!("attr_{key}").into(), values));
    }

    DataFrame::new(columns).map_err(|e| FilingsError::Export(e.to_string()))
}

/// Writes the full extraction table. Returns the number of data rows.
pub fn export_full_table(doc: &AnnotatedDocument, path: &Path) -> Result<usize> {
    let mut df = full_table(doc)?;
    let mut file = File::create(path)?;
    CsvWriter::new(&mut file)
        .include_header(true)
        .finish(&mut df)
        .map_err(|e| FilingsError::Export(e.to_string()))?;
    Ok(df.height())
}
