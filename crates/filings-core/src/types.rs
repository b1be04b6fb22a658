//! Core filing types.
//!
//! This module defines the structures describing what was fetched from EDGAR:
//!
//! - [`Ticker`] - Stock ticker symbol
//! - [`FilingType`] - Periodic report form (10-K, 10-Q)
//! - [`TextScope`] - How much of a filing's text to keep
//! - [`FilingRecord`] - One row of a filing index search
//! - [`Filing`] - A filing record plus its cleaned text

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FilingsError;

/// A stock ticker symbol.
///
/// Tickers are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Ticker(String);

impl Ticker {
    /// Creates a new ticker from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().trim().to_uppercase())
    }

    /// Returns the ticker as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Ticker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Ticker {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Ticker {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Ticker {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// Periodic report form type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FilingType {
    /// Annual report.
    #[default]
    #[serde(rename = "10-K")]
    TenK,
    /// Quarterly report.
    #[serde(rename = "10-Q")]
    TenQ,
}

impl FilingType {
    /// Returns the EDGAR form label (e.g., "10-K").
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::TenK => "10-K",
            Self::TenQ => "10-Q",
        }
    }

    /// Document-type labels that identify the primary document of a filing.
    ///
    /// Amended forms are accepted for either filing type.
    #[must_use]
    pub const fn primary_document_labels() -> &'static [&'static str] {
        &["10-K", "10-Q", "10-K/A", "10-Q/A"]
    }
}

impl fmt::Display for FilingType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilingType {
    type Err = FilingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "10-K" => Ok(Self::TenK),
            "10-Q" => Ok(Self::TenQ),
            other => Err(FilingsError::InvalidParameter(format!(
                "unsupported filing type: {other} (expected 10-K or 10-Q)"
            ))),
        }
    }
}

/// Maximum characters kept when a section-scoped fetch is requested.
pub const SECTION_TEXT_LIMIT: usize = 50_000;

/// How much of a filing's cleaned text to keep.
///
/// Section-aware extraction is not implemented: a non-empty
/// [`TextScope::Sections`] request yields the first [`SECTION_TEXT_LIMIT`]
/// characters of the full text regardless of which sections were named. An
/// empty section list is the same as [`TextScope::Full`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum TextScope {
    /// The whole cleaned document.
    #[default]
    Full,
    /// Named sections (e.g., "Item 1", "Item 7"); currently truncated full text.
    Sections(Vec<String>),
}

impl TextScope {
    /// Applies this scope to a cleaned document.
    #[must_use]
    pub fn apply(&self, text: String) -> String {
        match self {
            Self::Full => text,
            Self::Sections(sections) if sections.is_empty() => text,
            Self::Sections(_) => match text.char_indices().nth(SECTION_TEXT_LIMIT) {
                Some((byte_idx, _)) => text[..byte_idx].to_string(),
                None => text,
            },
        }
    }
}

/// One filing found by an EDGAR index search.
///
/// Identity is the filing index URL.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilingRecord {
    /// Ticker the search was made for.
    pub ticker: Ticker,
    /// Form type that was searched.
    pub filing_type: FilingType,
    /// Filing date as shown by EDGAR (usually `YYYY-MM-DD`).
    pub filing_date: String,
    /// Absolute URL of the filing's index/detail page.
    pub filing_url: String,
}

impl FilingRecord {
    /// Creates a new filing record.
    #[must_use]
    pub fn new(
        ticker: Ticker,
        filing_type: FilingType,
        filing_date: impl Into<String>,
        filing_url: impl Into<String>,
    ) -> Self {
        Self {
            ticker,
            filing_type,
            filing_date: filing_date.into(),
            filing_url: filing_url.into(),
        }
    }

    /// Parses the filing date, if it is in `YYYY-MM-DD` form.
    #[must_use]
    pub fn filed_on(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.filing_date.trim(), "%Y-%m-%d").ok()
    }

    /// Returns true if the filing date contains the given year substring.
    #[must_use]
    pub fn matches_year(&self, year: &str) -> bool {
        self.filing_date.contains(year)
    }
}

/// A fetched filing and its cleaned text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Filing {
    /// The index record the text was retrieved from.
    pub record: FilingRecord,
    /// Cleaned document text.
    pub text: String,
}
