//! Extraction data model.
//!
//! An [`Extraction`] is a labeled span of the source document with a free-form
//! attribute map. The attribute keys depend on the extraction class; [`Facts`]
//! gives a typed view with named optional fields for the known classes and falls
//! back to the raw [`Attributes`] for anything else.

use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Class label of an extraction.
///
/// Serialized as its snake_case label. Labels outside the known set are kept
/// verbatim in [`ExtractionClass::Other`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExtractionClass {
    /// Company name, ticker, CIK, sector.
    CompanyInfo,
    /// Revenue, operating income, EPS and similar figures.
    FinancialMetric,
    /// Risk disclosures.
    RiskFactor,
    /// Business units, product lines, regions.
    BusinessSegment,
    /// Fiscal years, quarters, reporting periods.
    TimePeriod,
    /// Growth rates and period-over-period comparisons.
    MetricChange,
    /// Any label not in the list above.
    Other(String),
}

impl ExtractionClass {
    /// The six classes the extraction prompt asks for, in prompt order.
    pub const KNOWN: [Self; 6] = [
        Self::CompanyInfo,
        Self::FinancialMetric,
        Self::RiskFactor,
        Self::BusinessSegment,
        Self::TimePeriod,
        Self::MetricChange,
    ];

    /// Returns the wire label (e.g., "financial_metric").
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::CompanyInfo => "company_info",
            Self::FinancialMetric => "financial_metric",
            Self::RiskFactor => "risk_factor",
            Self::BusinessSegment => "business_segment",
            Self::TimePeriod => "time_period",
            Self::MetricChange => "metric_change",
            Self::Other(label) => label,
        }
    }
}

impl From<&str> for ExtractionClass {
    fn from(label: &str) -> Self {
        match label.trim() {
            "company_info" => Self::CompanyInfo,
            "financial_metric" => Self::FinancialMetric,
            "risk_factor" => Self::RiskFactor,
            "business_segment" => Self::BusinessSegment,
            "time_period" => Self::TimePeriod,
            "metric_change" => Self::MetricChange,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ExtractionClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ExtractionClass {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for ExtractionClass {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let label = String::deserialize(deserializer)?;
        Ok(Self::from(label.as_str()))
    }
}

/// Half-open `[start_pos, end_pos)` character interval into the source text.
///
/// Offsets count Unicode scalar values, not bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharInterval {
    /// First character of the span.
    pub start_pos: usize,
    /// One past the last character of the span.
    pub end_pos: usize,
}

impl CharInterval {
    /// Creates a new interval.
    #[must_use]
    pub const fn new(start_pos: usize, end_pos: usize) -> Self {
        Self { start_pos, end_pos }
    }

    /// Number of characters covered.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.end_pos.saturating_sub(self.start_pos)
    }

    /// Returns true if the interval covers no characters.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if the two intervals share at least one character.
    #[must_use]
    pub const fn overlaps(&self, other: &Self) -> bool {
        self.start_pos < other.end_pos && other.start_pos < self.end_pos
    }

    /// Returns the interval moved right by `offset` characters.
    #[must_use]
    pub const fn shifted(&self, offset: usize) -> Self {
        Self::new(self.start_pos + offset, self.end_pos + offset)
    }
}

/// How an extraction's text was located in the source.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignmentStatus {
    /// The text occurs verbatim.
    MatchExact,
    /// The text occurs ignoring case.
    MatchLesser,
}

/// Insertion-ordered string-to-string attribute map.
///
/// Deserialization accepts any JSON scalar as a value (numbers and booleans are
/// stringified, nulls dropped) since annotation services do not always quote
/// numeric attributes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attributes(Vec<(String, String)>);

impl Attributes {
    /// Creates an empty attribute map.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns the value for a key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Sets a key, replacing an existing value in place.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.0.push((key, value)),
        }
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterates keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if there are no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Attributes {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut attributes = Self::new();
        for (k, v) in iter {
            attributes.insert(k, v);
        }
        attributes
    }
}

impl Serialize for Attributes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Attributes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<serde_json::Map<String, Value>>::deserialize(deserializer)?;
        Ok(raw
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(k, v)| value_to_string(v).map(|v| (k, v)))
            .collect())
    }
}

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .into_iter()
                .filter_map(value_to_string)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        obj @ Value::Object(_) => Some(obj.to_string()),
    }
}

/// A labeled, source-grounded text span with attributes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Extraction {
    /// Class label.
    pub extraction_class: ExtractionClass,
    /// Exact substring of the source document.
    pub extraction_text: String,
    /// Position in the source, when the text could be located.
    #[serde(default)]
    pub char_interval: Option<CharInterval>,
    /// How the position was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alignment_status: Option<AlignmentStatus>,
    /// Class-dependent attributes.
    #[serde(default)]
    pub attributes: Attributes,
}

impl Extraction {
    /// Creates an ungrounded extraction with no attributes.
    #[must_use]
    pub fn new(extraction_class: ExtractionClass, extraction_text: impl Into<String>) -> Self {
        Self {
            extraction_class,
            extraction_text: extraction_text.into(),
            char_interval: None,
            alignment_status: None,
            attributes: Attributes::new(),
        }
    }

    /// Sets the source position.
    #[must_use]
    pub const fn with_interval(mut self, interval: CharInterval) -> Self {
        self.char_interval = Some(interval);
        self
    }

    /// Sets the alignment status.
    #[must_use]
    pub const fn with_alignment(mut self, status: AlignmentStatus) -> Self {
        self.alignment_status = Some(status);
        self
    }

    /// Adds one attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key, value);
        self
    }

    /// Returns an attribute value.
    #[must_use]
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes.get(key)
    }

    /// Start and end positions, `None` when ungrounded.
    #[must_use]
    pub fn position(&self) -> (Option<usize>, Option<usize>) {
        match self.char_interval {
            Some(interval) => (Some(interval.start_pos), Some(interval.end_pos)),
            None => (None, None),
        }
    }

    /// Typed view of the attributes for this extraction's class.
    #[must_use]
    pub fn facts(&self) -> Facts<'_> {
        let a = &self.attributes;
        match &self.extraction_class {
            ExtractionClass::CompanyInfo => Facts::CompanyInfo {
                info_type: a.get("info_type"),
            },
            ExtractionClass::FinancialMetric => Facts::FinancialMetric {
                metric_name: a.get("metric_name"),
                value: a.get("value"),
                unit: a.get("unit"),
                time_period: a.get("time_period"),
                segment: a.get("segment"),
            },
            ExtractionClass::RiskFactor => Facts::RiskFactor {
                risk_category: a.get("risk_category"),
                geographic_exposure: a.get("geographic_exposure"),
            },
            ExtractionClass::BusinessSegment => Facts::BusinessSegment {
                segment_type: a.get("segment_type"),
            },
            ExtractionClass::TimePeriod => Facts::TimePeriod {
                period_type: a.get("period_type"),
            },
            ExtractionClass::MetricChange => Facts::MetricChange {
                change_type: a.get("change_type"),
                percentage: a.get("percentage"),
                comparison_period: a.get("comparison_period"),
            },
            ExtractionClass::Other(_) => Facts::Other(a),
        }
    }
}

/// Typed, class-specific view over an extraction's attributes.
///
/// Absent keys are `None`; callers pick the default.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Facts<'a> {
    /// `company_info` attributes.
    CompanyInfo {
        /// "company_name", "ticker", "cik", "sector".
        info_type: Option<&'a str>,
    },
    /// `financial_metric` attributes.
    FinancialMetric {
        /// Metric identifier, e.g. "revenue".
        metric_name: Option<&'a str>,
        /// Numeric value as written.
        value: Option<&'a str>,
        /// Unit, e.g. "USD_billions" or "percent".
        unit: Option<&'a str>,
        /// Reporting period, e.g. "fiscal_2024".
        time_period: Option<&'a str>,
        /// Business segment the metric belongs to.
        segment: Option<&'a str>,
    },
    /// `risk_factor` attributes.
    RiskFactor {
        /// Risk type, e.g. "regulatory".
        risk_category: Option<&'a str>,
        /// Region the risk concerns.
        geographic_exposure: Option<&'a str>,
    },
    /// `business_segment` attributes.
    BusinessSegment {
        /// e.g. "product_line".
        segment_type: Option<&'a str>,
    },
    /// `time_period` attributes.
    TimePeriod {
        /// e.g. "annual".
        period_type: Option<&'a str>,
    },
    /// `metric_change` attributes.
    MetricChange {
        /// e.g. "year_over_year_growth".
        change_type: Option<&'a str>,
        /// Change in percent.
        percentage: Option<&'a str>,
        /// Period compared against.
        comparison_period: Option<&'a str>,
    },
    /// Unrecognized class: the raw attribute map.
    Other(&'a Attributes),
}

/// Source text plus its ordered extractions.
///
/// Extractions may overlap; nothing here enforces disjoint spans.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    /// Optional document identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    /// Ordered extractions.
    #[serde(default)]
    pub extractions: Vec<Extraction>,
    /// Source text.
    pub text: String,
}

impl AnnotatedDocument {
    /// Creates a document from text and extractions.
    #[must_use]
    pub fn new(text: impl Into<String>, extractions: Vec<Extraction>) -> Self {
        Self {
            document_id: None,
            extractions,
            text: text.into(),
        }
    }

    /// Sets the document identifier.
    #[must_use]
    pub fn with_document_id(mut self, id: impl Into<String>) -> Self {
        self.document_id = Some(id.into());
        self
    }

    /// Extractions of one class, in document order.
    pub fn of_class<'a>(
        &'a self,
        class: &'a ExtractionClass,
    ) -> impl Iterator<Item = &'a Extraction> + 'a {
        self.extractions
            .iter()
            .filter(move |e| &e.extraction_class == class)
    }

    /// Number of extractions of one class.
    #[must_use]
    pub fn count_of(&self, class: &ExtractionClass) -> usize {
        self.of_class(class).count()
    }

    /// Extraction counts per class, most frequent first.
    #[must_use]
    pub fn class_counts(&self) -> Vec<(&ExtractionClass, usize)> {
        most_common(self.extractions.iter().map(|e| &e.extraction_class))
    }

    /// Source length in characters.
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Index pairs `(i, j)` with `i < j` whose intervals overlap.
    #[must_use]
    pub fn overlapping_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs = Vec::new();
        for (i, a) in self.extractions.iter().enumerate() {
            let Some(ia) = a.char_interval else { continue };
            for (j, b) in self.extractions.iter().enumerate().skip(i + 1) {
                if let Some(ib) = b.char_interval
                    && ia.overlaps(&ib)
                {
                    pairs.push((i, j));
                }
            }
        }
        pairs
    }
}

/// A worked example handed to the annotation service.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleData {
    /// Example source text.
    pub text: String,
    /// Expected extractions for that text.
    pub extractions: Vec<Extraction>,
}

impl ExampleData {
    /// Creates an example.
    #[must_use]
    pub fn new(text: impl Into<String>, extractions: Vec<Extraction>) -> Self {
        Self {
            text: text.into(),
            extractions,
        }
    }
}

/// Counts items and orders them by descending frequency.
///
/// Ties keep first-seen order, so the result is deterministic for a given input.
pub fn most_common<K: PartialEq>(items: impl IntoIterator<Item = K>) -> Vec<(K, usize)> {
    let mut counts: Vec<(K, usize)> = Vec::new();
    for item in items {
        match counts.iter_mut().find(|(k, _)| *k == item) {
            Some(entry) => entry.1 += 1,
            None => counts.push((item, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric() -> Extraction {
        Extraction::new(
            ExtractionClass::FinancialMetric,
            "Revenue for fiscal 2024 was $60.9 billion",
        )
        .with_interval(CharInterval::new(10, 51))
        .with_alignment(AlignmentStatus::MatchExact)
        .with_attribute("metric_name", "revenue")
        .with_attribute("value", "60.9")
        .with_attribute("unit", "USD_billions")
        .with_attribute("time_period", "fiscal_2024")
    }

    #[test]
    fn test_class_labels() {
        for class in ExtractionClass::KNOWN {
            assert_eq!(ExtractionClass::from(class.as_str()), class);
        }
        let other = ExtractionClass::from("guidance");
        assert_eq!(other, ExtractionClass::Other("guidance".to_string()));
        assert_eq!(other.to_string(), "guidance");
    }

    #[test]
    fn test_interval_overlap() {
        let a = CharInterval::new(0, 10);
        assert!(a.overlaps(&CharInterval::new(9, 12)));
        assert!(!a.overlaps(&CharInterval::new(10, 12)));
        assert_eq!(a.shifted(5), CharInterval::new(5, 15));
        assert!(CharInterval::new(3, 3).is_empty());
    }

    #[test]
    fn test_attributes_order_and_replace() {
        let mut attrs: Attributes = [("b", "1"), ("a", "2")].into_iter().collect();
        attrs.insert("b", "3");
        attrs.insert("c", "4");
        assert_eq!(attrs.keys().collect::<Vec<_>>(), vec!["b", "a", "c"]);
        assert_eq!(attrs.get("b"), Some("3"));
        assert_eq!(attrs.get("z"), None);
    }

    #[test]
    fn test_attributes_lenient_deserialize() {
        let attrs: Attributes =
            serde_json::from_str(r#"{"value": 60.9, "flag": true, "gone": null, "unit": "USD"}"#)
                .unwrap();
        assert_eq!(attrs.get("value"), Some("60.9"));
        assert_eq!(attrs.get("flag"), Some("true"));
        assert_eq!(attrs.get("gone"), None);
        assert_eq!(attrs.keys().collect::<Vec<_>>(), vec!["value", "flag", "unit"]);

        let empty: Attributes = serde_json::from_str("null").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_extraction_json_shape() {
        let json = serde_json::to_value(metric()).unwrap();
        assert_eq!(json["extraction_class"], "financial_metric");
        assert_eq!(json["char_interval"]["start_pos"], 10);
        assert_eq!(json["alignment_status"], "match_exact");
        assert_eq!(json["attributes"]["unit"], "USD_billions");

        let ungrounded = Extraction::new(ExtractionClass::RiskFactor, "x");
        let json = serde_json::to_value(&ungrounded).unwrap();
        assert!(json["char_interval"].is_null());
        assert!(json.get("alignment_status").is_none());

        let back: Extraction = serde_json::from_value(serde_json::to_value(metric()).unwrap()).unwrap();
        assert_eq!(back, metric());
    }

    #[test]
    fn test_facts_view() {
        match metric().facts() {
            Facts::FinancialMetric {
                metric_name,
                value,
                segment,
                ..
            } => {
                assert_eq!(metric_name, Some("revenue"));
                assert_eq!(value, Some("60.9"));
                assert_eq!(segment, None);
            }
            other => panic!("unexpected facts: {other:?}"),
        }

        let other = Extraction::new(ExtractionClass::from("guidance"), "g").with_attribute("k", "v");
        match other.facts() {
            Facts::Other(attrs) => assert_eq!(attrs.get("k"), Some("v")),
            f => panic!("unexpected facts: {f:?}"),
        }
    }

    #[test]
    fn test_document_counts_and_overlaps() {
        let doc = AnnotatedDocument::new(
            "text",
            vec![
                Extraction::new(ExtractionClass::RiskFactor, "a").with_interval(CharInterval::new(0, 5)),
                metric(),
                Extraction::new(ExtractionClass::RiskFactor, "b").with_interval(CharInterval::new(4, 8)),
                Extraction::new(ExtractionClass::RiskFactor, "c"),
            ],
        );
        assert_eq!(doc.count_of(&ExtractionClass::RiskFactor), 3);
        let counts = doc.class_counts();
        assert_eq!(counts[0], (&ExtractionClass::RiskFactor, 3));
        assert_eq!(counts[1], (&ExtractionClass::FinancialMetric, 1));
        assert_eq!(doc.overlapping_pairs(), vec![(0, 2)]);
    }

    #[test]
    fn test_most_common_ties_keep_first_seen() {
        let counts = most_common(["b", "a", "a", "b", "c"]);
        assert_eq!(counts, vec![("b", 2), ("a", 2), ("c", 1)]);
    }
}
