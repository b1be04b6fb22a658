//! Prompt rendering, answer parsing and source grounding.
//!
//! The service is shown the instruction, every worked example as a question and
//! a fenced JSON answer, then the chunk to annotate. Answers come back in the
//! same shape:
//!
//! ```json
//! {"extractions": [{"financial_metric": "Revenue was $60.9 billion",
//!                   "financial_metric_attributes": {"metric_name": "revenue"}}]}
//! ```

use filings_core::{
    AlignmentStatus, Attributes, CharInterval, ExampleData, Extraction, ExtractionClass,
    FilingsError, Result,
};
use serde_json::{Map, Value, json};

const ATTRIBUTES_SUFFIX: &str = "_attributes";

fn example_answer(example: &ExampleData) -> Value {
    let items: Vec<Value> = example
        .extractions
        .iter()
        .map(|e| {
            let class = e.extraction_class.as_str();
            let mut item = Map::new();
            item.insert(class.to_string(), Value::String(e.extraction_text.clone()));
            item.insert(format!("{class}{ATTRIBUTES_SUFFIX}"), json!(e.attributes));
            Value::Object(item)
        })
        .collect();
    json!({ "extractions": items })
}

/// Renders the full request text for one chunk.
#[must_use]
pub fn render_prompt(description: &str, examples: &[ExampleData], chunk: &str) -> String {
    let mut prompt = String::with_capacity(description.len() + chunk.len() + 4096);
    prompt.push_str(description.trim_end());
    prompt.push_str("\n\n");
    if !examples.is_empty() {
        prompt.push_str("Examples\n");
        for example in examples {
            prompt.push_str("Q: ");
            prompt.push_str(example.text.trim_end());
            prompt.push_str("\nA: ```json\n");
            prompt.push_str(&example_answer(example).to_string());
            prompt.push_str("\n```\n\n");
        }
    }
    prompt.push_str("Q: ");
    prompt.push_str(chunk);
    prompt.push_str("\nA: ");
    prompt
}

/// Strips a Markdown code fence around the answer, if any.
fn strip_fence(answer: &str) -> &str {
    let trimmed = answer.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let body = &trimmed[start + 3..];
    let body = body.find('\n').map_or(body, |nl| {
        let lang = body[..nl].trim();
        if lang.chars().all(|c| c.is_ascii_alphanumeric()) {
            &body[nl + 1..]
        } else {
            body
        }
    });
    match body.rfind("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

fn parse_item(item: &Map<String, Value>) -> Option<Extraction> {
    // Explicit form.
    if let Some(Value::String(text)) = item.get("extraction_text") {
        let class = item.get("extraction_class")?.as_str()?;
        let attributes = item
            .get("attributes")
            .cloned()
            .and_then(|v| serde_json::from_value::<Attributes>(v).ok())
            .unwrap_or_default();
        let mut extraction = Extraction::new(ExtractionClass::from(class), text.clone());
        extraction.attributes = attributes;
        return Some(extraction);
    }

    let (class, text) = item.iter().find_map(|(key, value)| {
        if key.ends_with(ATTRIBUTES_SUFFIX) || key == "extraction_index" {
            return None;
        }
        match value {
            Value::String(s) => Some((key.as_str(), s.clone())),
            Value::Number(n) => Some((key.as_str(), n.to_string())),
            _ => None,
        }
    })?;
    let attributes = item
        .get(&format!("{class}{ATTRIBUTES_SUFFIX}"))
        .cloned()
        .and_then(|v| serde_json::from_value::<Attributes>(v).ok())
        .unwrap_or_default();
    let mut extraction = Extraction::new(ExtractionClass::from(class), text);
    extraction.attributes = attributes;
    Some(extraction)
}

/// Parses a service answer into ungrounded extractions.
///
/// Accepts fenced or bare JSON, either an object with an `extractions` array or
/// the array itself. Items that carry no text are skipped.
///
/// # Errors
/// Returns [`FilingsError::Parse`] when the answer is not JSON of that shape.
pub fn parse_extractions(answer: &str) -> Result<Vec<Extraction>> {
    let body = strip_fence(answer);
    let value: Value = serde_json::from_str(body)
        .map_err(|e| FilingsError::Parse(format!("Invalid extraction answer: {e}")))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("extractions") {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(FilingsError::Parse(format!(
                    "'extractions' must be an array, got {other}"
                )));
            }
        },
        other => {
            return Err(FilingsError::Parse(format!(
                "Expected an object or array, got {other}"
            )));
        }
    };

    Ok(items
        .iter()
        .filter_map(Value::as_object)
        .filter_map(parse_item)
        .filter(|e| !e.extraction_text.trim().is_empty())
        .collect())
}

fn char_index(text: &str, byte: usize) -> usize {
    text[..byte].chars().count()
}

/// Locates each extraction inside `chunk` and sets its source interval.
///
/// Search starts after the previous exact match so repeated phrases map in
/// order, falling back to the whole chunk. A case-insensitive hit is marked
/// [`AlignmentStatus::MatchLesser`]. Text that cannot be found stays ungrounded.
/// Intervals are shifted by `char_offset` into source coordinates.
#[must_use]
pub fn align_extractions(
    extractions: Vec<Extraction>,
    chunk: &str,
    char_offset: usize,
) -> Vec<Extraction> {
    let folded_chunk = chunk.to_ascii_lowercase();
    let mut cursor = 0;

    extractions
        .into_iter()
        .map(|extraction| {
            let needle = extraction.extraction_text.as_str();
            let exact = chunk[cursor..]
                .find(needle)
                .map(|pos| pos + cursor)
                .or_else(|| chunk.find(needle));
            let (found, status) = match exact {
                Some(pos) => {
                    cursor = pos + needle.len();
                    (Some(pos), AlignmentStatus::MatchExact)
                }
                None => (
                    folded_chunk.find(&needle.to_ascii_lowercase()),
                    AlignmentStatus::MatchLesser,
                ),
            };
            match found {
                Some(byte) => {
                    let start = char_index(chunk, byte);
                    let interval = CharInterval::new(start, start + needle.chars().count())
                        .shifted(char_offset);
                    extraction.with_interval(interval).with_alignment(status)
                }
                None => extraction,
            }
        })
        .collect()
}
