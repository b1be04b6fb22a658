//! EDGAR page parsing and document text cleanup.

use filings_core::{FilingType, FilingsError, Result};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Tags whose contents never make it into cleaned text.
const SKIPPED_TAGS: [&str; 4] = ["script", "style", "meta", "link"];

static BLANK_LINES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n{3,}").expect("valid blank-line regex"));
static INLINE_SPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[ \t]{2,}").expect("valid inline-space regex"));

/// A row of the filing index search table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRow {
    /// Filing date cell text.
    pub filing_date: String,
    /// Absolute URL of the filing detail page.
    pub filing_url: String,
}

fn selector(css: &'static str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| FilingsError::Parse(format!("invalid selector {css}: {e:?}")))
}

fn cell_text(cell: &ElementRef<'_>) -> String {
    cell.text().collect::<String>().trim().to_string()
}

/// Makes an EDGAR `href` absolute against `base_url`.
///
/// Inline XBRL viewer links (`/ix?doc=/Archives/...`) are unwrapped to the
/// archive path so the raw document is fetched instead of the viewer page.
#[must_use]
pub fn absolute_url(base_url: &str, href: &str) -> String {
    let href = href.strip_prefix("/ix?doc=").unwrap_or(href);
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if href.starts_with('/') {
        format!("{base}{href}")
    } else {
        format!("{base}/{href}")
    }
}

/// Parses the `tableFile2` results table of a company filing search.
///
/// The header row is skipped; rows with fewer than four cells or without a
/// link in the second cell are ignored. At most `limit` rows are read.
///
/// # Errors
/// Returns [`FilingsError::Parse`] when the page has no results table.
pub fn parse_filing_index(html: &str, base_url: &str, limit: usize) -> Result<Vec<IndexRow>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table.tableFile2")?;
    let tr_sel = selector("tr")?;
    let td_sel = selector("td")?;
    let a_sel = selector("a")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| FilingsError::Parse("No filings table found".to_string()))?;

    let mut rows = Vec::new();
    for row in table.select(&tr_sel).skip(1).take(limit) {
        let cells: Vec<ElementRef<'_>> = row.select(&td_sel).collect();
        if cells.len() < 4 {
            continue;
        }
        let href = cells[1]
            .select(&a_sel)
            .next()
            .and_then(|a| a.value().attr("href"));
        if let Some(href) = href {
            rows.push(IndexRow {
                filing_date: cell_text(&cells[3]),
                filing_url: absolute_url(base_url, href),
            });
        }
    }

    Ok(rows)
}

/// Finds the primary document link on a filing detail page.
///
/// Scans the `tableFile` document table (header skipped) for the first row
/// whose type cell is one of [`FilingType::primary_document_labels`] and
/// returns the absolute URL of the link in its document cell.
///
/// # Errors
/// Returns [`FilingsError::Parse`] when the page has no document table.
pub fn find_primary_document(html: &str, base_url: &str) -> Result<Option<String>> {
    let document = Html::parse_document(html);
    let table_sel = selector("table.tableFile")?;
    let tr_sel = selector("tr")?;
    let td_sel = selector("td")?;
    let a_sel = selector("a")?;

    let table = document
        .select(&table_sel)
        .next()
        .ok_or_else(|| FilingsError::Parse("Could not find document table".to_string()))?;

    let labels = FilingType::primary_document_labels();
    for row in table.select(&tr_sel).skip(1) {
        let cells: Vec<ElementRef<'_>> = row.select(&td_sel).collect();
        if cells.len() < 4 {
            continue;
        }
        let doc_type = cell_text(&cells[3]);
        if !labels.contains(&doc_type.as_str()) {
            continue;
        }
        if let Some(href) = cells[2]
            .select(&a_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            return Ok(Some(absolute_url(base_url, href)));
        }
    }

    Ok(None)
}

/// Converts a filing document to plain text.
///
/// `script`, `style`, `meta` and `link` contents are dropped. Every remaining
/// text node is trimmed and non-empty ones are joined with newlines, then runs
/// of three or more newlines become a blank line and runs of spaces/tabs become
/// a single space.
#[must_use]
pub fn clean_document_text(html: &str) -> String {
    let document = Html::parse_document(html);

    let mut pieces: Vec<&str> = Vec::new();
    for node in document.tree.root().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let skipped = node.ancestors().any(|ancestor| {
            ancestor
                .value()
                .as_element()
                .is_some_and(|el| SKIPPED_TAGS.contains(&el.name()))
        });
        if skipped {
            continue;
        }
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            pieces.push(trimmed);
        }
    }

    collapse_whitespace(&pieces.join("\n"))
}

/// Collapses blank-line runs and inline whitespace runs, then trims.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    let text = BLANK_LINES_RE.replace_all(text, "\n\n");
    let text = INLINE_SPACE_RE.replace_all(&text, " ");
    text.trim().to_string()
}
