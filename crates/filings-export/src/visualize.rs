//! Self-contained HTML view of annotated documents.

use crate::records::load_annotated_documents;
use filings_core::{AnnotatedDocument, Extraction, ExtractionClass, FilingsError, Result};
use std::fmt::{self, Write};
use std::path::Path;

const PALETTE: [&str; 10] = [
    "#D2E3FC", "#C8E6C9", "#FEF0C3", "#F9DEDC", "#FFDDBE", "#EADDFF", "#C4E9E4", "#FCE4EC",
    "#E8EAED", "#DDE8E8",
];

const STYLE: &str = "\
body { font-family: -apple-system, 'Segoe UI', Roboto, sans-serif; margin: 24px; color: #202124; }
h1 { font-size: 20px; }
h2 { font-size: 16px; margin-top: 24px; }
.legend span { display: inline-block; padding: 2px 8px; margin: 2px; border-radius: 4px; }
.text { white-space: pre-wrap; line-height: 1.6; border: 1px solid #dadce0; padding: 12px; max-height: 600px; overflow-y: auto; }
.text mark { border-radius: 3px; padding: 0 1px; }
table { border-collapse: collapse; margin-top: 8px; width: 100%; }
th, td { border: 1px solid #dadce0; padding: 4px 8px; text-align: left; vertical-align: top; font-size: 13px; }
th { background: #f1f3f4; }
";

/// Escapes text for HTML element and attribute content.
#[must_use]
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Classes in first-seen order, each paired with its colour.
fn class_colours(doc: &AnnotatedDocument) -> Vec<(&ExtractionClass, &'static str)> {
    let mut classes: Vec<&ExtractionClass> = Vec::new();
    for e in &doc.extractions {
        if !classes.contains(&&e.extraction_class) {
            classes.push(&e.extraction_class);
        }
    }
    classes
        .into_iter()
        .enumerate()
        .map(|(i, class)| (class, PALETTE[i % PALETTE.len()]))
        .collect()
}

fn colour_of(colours: &[(&ExtractionClass, &'static str)], class: &ExtractionClass) -> &'static str {
    colours
        .iter()
        .find(|(c, _)| *c == class)
        .map_or(PALETTE[0], |(_, colour)| *colour)
}

fn attributes_label(e: &Extraction) -> String {
    e.attributes
        .iter()
        .map(|(k, v)| format!("{k}: {v}"))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Source text with grounded extractions wrapped in `<mark>`.
///
/// Spans are taken in start order; one that overlaps an already highlighted
/// span, or falls outside the text, is left unmarked.
fn highlighted_text(doc: &AnnotatedDocument, colours: &[(&ExtractionClass, &'static str)]) -> String {
    let mut byte_at: Vec<usize> = doc.text.char_indices().map(|(b, _)| b).collect();
    byte_at.push(doc.text.len());
    let char_len = byte_at.len() - 1;

    let mut spans: Vec<&Extraction> = doc
        .extractions
        .iter()
        .filter(|e| {
            e.char_interval
                .is_some_and(|i| !i.is_empty() && i.end_pos <= char_len)
        })
        .collect();
    spans.sort_by_key(|e| e.char_interval.map(|i| (i.start_pos, i.end_pos)));

    let mut html = String::with_capacity(doc.text.len() * 2);
    let mut cursor = 0;
    for e in spans {
        let Some(interval) = e.char_interval else { continue };
        if interval.start_pos < cursor {
            continue;
        }
        html.push_str(&escape_html(&doc.text[byte_at[cursor]..byte_at[interval.start_pos]]));
        let title = format!("{}: {}", e.extraction_class, attributes_label(e));
        html.push_str(&format!(
            "<mark style=\"background-color: {}\" title=\"{}\">{}</mark>",
            colour_of(colours, &e.extraction_class),
            escape_html(&title),
            escape_html(&doc.text[byte_at[interval.start_pos]..byte_at[interval.end_pos]]),
        ));
        cursor = interval.end_pos;
    }
    html.push_str(&escape_html(&doc.text[byte_at[cursor]..]));
    html
}

fn render_section(html: &mut String, doc: &AnnotatedDocument, index: usize) -> fmt::Result {
    let colours = class_colours(doc);
    let title = doc
        .document_id
        .clone()
        .unwrap_or_else(|| format!("Document {}", index + 1));

    writeln!(html, "<section>")?;
    writeln!(html, "<h1>{}</h1>", escape_html(&title))?;
    writeln!(
        html,
        "<p>{} extractions over {} characters</p>",
        doc.extractions.len(),
        doc.text_len()
    )?;

    writeln!(html, "<div class=\"legend\">")?;
    for (class, count) in doc.class_counts() {
        writeln!(
            html,
            "<span style=\"background-color: {}\">{} ({count})</span>",
            colour_of(&colours, class),
            escape_html(class.as_str()),
        )?;
    }
    writeln!(html, "</div>")?;

    writeln!(html, "<h2>Source</h2>")?;
    writeln!(html, "<div class=\"text\">{}</div>", highlighted_text(doc, &colours))?;

    writeln!(html, "<h2>Extractions</h2>")?;
    writeln!(
        html,
        "<table>\n<tr><th>#</th><th>Class</th><th>Text</th><th>Position</th><th>Attributes</th></tr>"
    )?;
    for (i, e) in doc.extractions.iter().enumerate() {
        let position = e
            .char_interval
            .map_or_else(|| "-".to_string(), |iv| format!("{}-{}", iv.start_pos, iv.end_pos));
        writeln!(
            html,
            "<tr><td>{}</td><td><span style=\"background-color: {}\">{}</span></td><td>{}</td><td>{}</td><td>{}</td></tr>",
            i + 1,
            colour_of(&colours, &e.extraction_class),
            escape_html(e.extraction_class.as_str()),
            escape_html(&e.extraction_text),
            position,
            escape_html(&attributes_label(e)),
        )?;
    }
    writeln!(html, "</table>")?;
    writeln!(html, "</section>")
}

/// Renders a page for the given documents.
///
/// # Errors
/// Returns [`FilingsError::Export`] if a section fails to format.
pub fn render_documents(docs: &[AnnotatedDocument]) -> Result<String> {
    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<title>Extraction visualization</title>\n<style>\n");
    html.push_str(STYLE);
    html.push_str("</style>\n</head>\n<body>\n");
    for (i, doc) in docs.iter().enumerate() {
        render_section(&mut html, doc, i)
            .map_err(|e| FilingsError::Export(format!("Failed to render document {}: {e}", i + 1)))?;
    }
    html.push_str("</body>\n</html>\n");
    Ok(html)
}

/// Reads a JSON Lines file written by
/// [`save_annotated_document`](crate::save_annotated_document) and renders it.
///
/// # Errors
/// Fails when the file cannot be read or holds no documents.
pub fn render_visualization(jsonl_path: &Path) -> Result<String> {
    let docs = load_annotated_documents(jsonl_path)?;
    if docs.is_empty() {
        return Err(FilingsError::Export(format!(
            "No documents in {}",
            jsonl_path.display()
        )));
    }
    render_documents(&docs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::save_annotated_document;
    use filings_core::CharInterval;

    fn doc() -> AnnotatedDocument {
        AnnotatedDocument::new(
            "NVIDIA <Corp> revenue grew",
            vec![
                Extraction::new(ExtractionClass::CompanyInfo, "NVIDIA <Corp>")
                    .with_interval(CharInterval::new(0, 13))
                    .with_attribute("info_type", "company_name"),
                Extraction::new(ExtractionClass::FinancialMetric, "Corp> revenue")
                    .with_interval(CharInterval::new(8, 21)),
                Extraction::new(ExtractionClass::FinancialMetric, "grew")
                    .with_interval(CharInterval::new(22, 26)),
                Extraction::new(ExtractionClass::RiskFactor, "ungrounded"),
            ],
        )
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">&'"#), "&lt;a href=&quot;x&quot;&gt;&amp;&#39;");
    }

    #[test]
    fn test_highlight_skips_overlaps() {
        let d = doc();
        let colours = class_colours(&d);
        let html = highlighted_text(&d, &colours);
        assert_eq!(html.matches("<mark").count(), 2);
        assert!(html.starts_with("<mark style=\"background-color: #D2E3FC\" title=\"company_info: info_type: company_name\">NVIDIA &lt;Corp&gt;</mark>"));
        assert!(html.ends_with(">grew</mark>"));
        assert!(html.contains(" revenue "));
    }

    #[test]
    fn test_highlight_ignores_out_of_range() {
        let d = AnnotatedDocument::new(
            "short",
            vec![Extraction::new(ExtractionClass::TimePeriod, "later").with_interval(CharInterval::new(3, 40))],
        );
        assert_eq!(highlighted_text(&d, &class_colours(&d)), "short");
    }

    #[test]
    fn test_render_documents_one_section_each() {
        let docs = vec![doc().with_document_id("NVDA_10-K"), doc()];
        let html = render_documents(&docs).unwrap();
        assert_eq!(html.matches("<section>").count(), 2);
        assert!(html.contains("<h1>NVDA_10-K</h1>"));
        assert!(html.contains("<h1>Document 2</h1>"));
        assert!(html.ends_with("</body>\n</html>\n"));
    }

    #[test]
    fn test_render_visualization_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.jsonl");
        save_annotated_document(&doc().with_document_id("NVDA_10-K"), &path).unwrap();

        let html = render_visualization(&path).unwrap();
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<h1>NVDA_10-K</h1>"));
        assert!(html.contains("financial_metric (2)"));
        assert!(html.contains("risk_factor (1)"));
        assert_eq!(html.matches("<tr><td>").count(), 4);
        assert_eq!(html, render_visualization(&path).unwrap());
    }

    #[test]
    fn test_render_visualization_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jsonl");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(render_visualization(&path), Err(FilingsError::Export(_))));
    }
}
