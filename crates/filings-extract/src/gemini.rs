//! Gemini-backed [`Annotator`].

use crate::chunking::{TextChunk, chunk_text};
use crate::resolver::{align_extractions, parse_extractions, render_prompt};
use async_trait::async_trait;
use filings_core::{
    AnnotatedDocument, Annotator, ExampleData, Extraction, ExtractionConfig, FilingsError, Result,
};
use futures::{StreamExt, TryStreamExt, stream};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

/// Default Gemini models endpoint.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Environment variable holding the service key.
pub const API_KEY_ENV: &str = "LANGEXTRACT_API_KEY";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// Concatenated text of the first candidate.
    fn into_text(self) -> Option<String> {
        let content = self.candidates.into_iter().next()?.content?;
        let text: String = content.parts.into_iter().map(|p| p.text).collect();
        (!text.trim().is_empty()).then_some(text)
    }
}

/// Annotator that calls the Gemini `generateContent` endpoint.
///
/// The document is split into chunks of at most `max_char_buffer` characters.
/// Each pass sends every chunk, at most `max_workers` at a time, and grounds the
/// returned spans in the source. Later passes only add extractions that do not
/// overlap anything already found.
#[derive(Debug, Clone)]
pub struct GeminiAnnotator {
    client: Client,
    base_url: String,
}

impl GeminiAnnotator {
    /// Creates an annotator for the public endpoint.
    ///
    /// # Errors
    /// Returns an error if the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FilingsError::Network(e.to_string()))?;
        Ok(Self::with_client(client))
    }

    /// Creates an annotator using the provided HTTP client.
    #[must_use]
    pub fn with_client(client: Client) -> Self {
        Self {
            client,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Overrides the models endpoint.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The models endpoint in use.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn generate(&self, prompt: &str, model_id: &str, api_key: &str) -> Result<String> {
        let url = format!("{}/{}:generateContent", self.base_url, model_id);
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| FilingsError::Network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| FilingsError::Network(e.to_string()))?;
        if !status.is_success() {
            return Err(FilingsError::Annotation(format!(
                "{model_id} returned {status}: {text}"
            )));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| FilingsError::Annotation(format!("Unreadable response: {e}")))?;
        parsed
            .into_text()
            .ok_or_else(|| FilingsError::Annotation(format!("{model_id} returned no candidates")))
    }

    #[instrument(skip_all, fields(offset = chunk.char_offset, len = chunk.text.len()))]
    async fn annotate_chunk(
        &self,
        chunk: &TextChunk,
        prompt: &str,
        examples: &[ExampleData],
        model_id: &str,
        api_key: &str,
    ) -> Result<Vec<Extraction>> {
        let request = render_prompt(prompt, examples, &chunk.text);
        let answer = self.generate(&request, model_id, api_key).await?;
        let extractions = match parse_extractions(&answer) {
            Ok(extractions) => extractions,
            Err(e) => {
                warn!(error = %e, "Discarding unparseable chunk answer");
                return Ok(Vec::new());
            }
        };
        debug!(count = extractions.len(), "Chunk annotated");
        Ok(align_extractions(extractions, &chunk.text, chunk.char_offset))
    }
}

/// Adds `found` to `kept`, skipping anything that collides with earlier results.
///
/// A grounded extraction collides when its interval overlaps a kept one; an
/// ungrounded one when the same class and text were already kept.
fn merge_pass(kept: &mut Vec<Extraction>, found: Vec<Extraction>) -> usize {
    let existing = kept.len();
    for extraction in found {
        let collides = kept[..existing].iter().any(|k| {
            match (&extraction.char_interval, &k.char_interval) {
                (Some(a), Some(b)) => a.overlaps(b),
                (None, None) => {
                    k.extraction_class == extraction.extraction_class
                        && k.extraction_text == extraction.extraction_text
                }
                _ => false,
            }
        });
        if !collides {
            kept.push(extraction);
        }
    }
    kept.len() - existing
}

/// Orders by start position, ungrounded extractions last.
fn sort_by_position(extractions: &mut [Extraction]) {
    extractions.sort_by_key(|e| {
        e.char_interval
            .map_or((1, 0, 0), |i| (0, i.start_pos, i.end_pos))
    });
}

#[async_trait]
impl Annotator for GeminiAnnotator {
    fn name(&self) -> &str {
        "gemini"
    }

    #[instrument(skip_all, fields(model = %config.model_id, len = text.len()))]
    async fn annotate(
        &self,
        text: &str,
        prompt: &str,
        examples: &[ExampleData],
        config: &ExtractionConfig,
    ) -> Result<AnnotatedDocument> {
        config.validate()?;
        let api_key = config
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| FilingsError::MissingCredential(API_KEY_ENV.to_string()))?;

        let chunks = chunk_text(text, config.max_char_buffer);
        info!(chunks = chunks.len(), passes = config.extraction_passes, "Annotating document");

        let mut kept: Vec<Extraction> = Vec::new();
        for pass in 1..=config.extraction_passes {
            let requests: Vec<_> = chunks
                .iter()
                .map(|chunk| {
                    self.annotate_chunk(chunk, prompt, examples, &config.model_id, api_key)
                })
                .collect();
            let found: Vec<Vec<Extraction>> = stream::iter(requests)
            .buffered(config.max_workers)
            .try_collect()
            .await?;

            let found: Vec<Extraction> = found.into_iter().flatten().collect();
            let total = found.len();
            let added = if pass == 1 {
                kept = found;
                total
            } else {
                merge_pass(&mut kept, found)
            };
            debug!(pass, total, added, "Extraction pass complete");
        }

        sort_by_position(&mut kept);
        Ok(AnnotatedDocument::new(text, kept))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use filings_core::{CharInterval, ExtractionClass};

    const DEAD_HOST: &str = "http://127.0.0.1:9";

    fn grounded(text: &str, start: usize) -> Extraction {
        Extraction::new(ExtractionClass::FinancialMetric, text)
            .with_interval(CharInterval::new(start, start + text.chars().count()))
    }

    #[test]
    fn test_request_body_shape() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.0,
                response_mime_type: "application/json",
            },
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["temperature"], 0.0);
    }

    #[test]
    fn test_response_text() {
        let raw = r#"{"candidates":[{"content":{"parts":[{"text":"{\"extractions\":"},{"text":"[]}"}],"role":"model"},"finishReason":"STOP"}]}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(parsed.into_text().as_deref(), Some(r#"{"extractions":[]}"#));

        let empty: GenerateResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.into_text().is_none());
        let blocked: GenerateResponse =
            serde_json::from_str(r#"{"candidates":[{"finishReason":"SAFETY"}]}"#).unwrap();
        assert!(blocked.into_text().is_none());
    }

    #[test]
    fn test_merge_pass_keeps_non_overlapping() {
        let mut kept = vec![grounded("Revenue was $60.9 billion", 0)];
        let added = merge_pass(
            &mut kept,
            vec![
                grounded("$60.9 billion", 12),
                grounded("Net income reached $29.8 billion", 40),
                Extraction::new(ExtractionClass::RiskFactor, "export controls"),
            ],
        );
        assert_eq!(added, 2);
        assert_eq!(kept.len(), 3);
        assert_eq!(kept[1].extraction_text, "Net income reached $29.8 billion");
    }

    #[test]
    fn test_merge_pass_drops_repeated_ungrounded() {
        let mut kept = vec![Extraction::new(ExtractionClass::RiskFactor, "export controls")];
        let added = merge_pass(
            &mut kept,
            vec![Extraction::new(ExtractionClass::RiskFactor, "export controls")],
        );
        assert_eq!(added, 0);
    }

    #[test]
    fn test_sort_by_position_puts_ungrounded_last() {
        let mut extractions = vec![
            Extraction::new(ExtractionClass::RiskFactor, "floating"),
            grounded("later", 50),
            grounded("first", 3),
        ];
        sort_by_position(&mut extractions);
        let texts: Vec<&str> = extractions.iter().map(|e| e.extraction_text.as_str()).collect();
        assert_eq!(texts, vec!["first", "later", "floating"]);
    }

    #[test]
    fn test_base_url_trimmed() {
        let annotator = GeminiAnnotator::with_client(Client::new()).with_base_url("http://x/models/");
        assert_eq!(annotator.base_url(), "http://x/models");
        assert_eq!(annotator.name(), "gemini");
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_network() {
        let annotator = GeminiAnnotator::with_client(Client::new()).with_base_url(DEAD_HOST);
        let err = annotator
            .annotate("Revenue grew.", "prompt", &[], &ExtractionConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, FilingsError::MissingCredential(_)));
    }

    #[tokio::test]
    async fn test_unreachable_service_is_network_error() {
        let annotator = GeminiAnnotator::with_client(Client::new()).with_base_url(DEAD_HOST);
        let config = ExtractionConfig::new("key").with_passes(1);
        let err = annotator
            .annotate("Revenue grew.", "prompt", &[], &config)
            .await
            .unwrap_err();
        assert!(matches!(err, FilingsError::Network(_)));
    }

    #[tokio::test]
    async fn test_empty_text_makes_no_requests() {
        let annotator = GeminiAnnotator::with_client(Client::new()).with_base_url(DEAD_HOST);
        let doc = annotator
            .annotate("", "prompt", &[], &ExtractionConfig::new("key"))
            .await
            .unwrap();
        assert!(doc.extractions.is_empty());
    }
}
