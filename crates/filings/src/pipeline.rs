//! End-to-end fetch, extract and export pipeline.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, warn};

use filings_cache::FileCache;
use filings_core::{
    AnnotatedDocument, Annotator, ExtractionConfig, FilingCache, FilingType, FilingsError, Result,
    TextScope, Ticker,
};
use filings_edgar::{DEFAULT_USER_AGENT, EdgarFetcher};
use filings_export::{ExportManifest, Exporter, ExtractionSummary};
use filings_extract::{GeminiAnnotator, extract_from_text};

/// Default directory for every artifact.
pub const DEFAULT_OUTPUT_DIR: &str = "./output";

/// Cache subdirectory under the output directory.
pub const CACHE_DIR_NAME: &str = "sec_cache";

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Company ticker.
    pub ticker: Ticker,
    /// Form to fetch.
    pub filing_type: FilingType,
    /// Optional filing-date year filter.
    pub year: Option<String>,
    /// Where artifacts and the cache live.
    pub output_dir: PathBuf,
    /// Reuse `{TICKER}_{TYPE}.txt` from the cache instead of fetching.
    pub skip_fetch: bool,
    /// User agent sent to EDGAR.
    pub user_agent: String,
    /// Annotation settings.
    pub extraction: ExtractionConfig,
}

impl PipelineConfig {
    /// Creates a configuration with default paths and extraction settings.
    #[must_use]
    pub fn new(ticker: Ticker, filing_type: FilingType) -> Self {
        Self {
            ticker,
            filing_type,
            year: None,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            skip_fetch: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            extraction: ExtractionConfig::default(),
        }
    }

    /// Restricts the search to filings dated in `year`.
    #[must_use]
    pub fn with_year(mut self, year: impl Into<String>) -> Self {
        self.year = Some(year.into());
        self
    }

    /// Sets the output directory.
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Reads the cached text instead of fetching.
    #[must_use]
    pub const fn with_skip_fetch(mut self, skip: bool) -> Self {
        self.skip_fetch = skip;
        self
    }

    /// Sets the EDGAR user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the annotation settings.
    #[must_use]
    pub fn with_extraction(mut self, extraction: ExtractionConfig) -> Self {
        self.extraction = extraction;
        self
    }

    /// `{output_dir}/sec_cache`.
    #[must_use]
    pub fn cache_dir(&self) -> PathBuf {
        self.output_dir.join(CACHE_DIR_NAME)
    }

    /// Cache key of the per-ticker copy, e.g. `NVDA_10-K`.
    #[must_use]
    pub fn filing_key(&self) -> String {
        format!("{}_{}", self.ticker, self.filing_type)
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// The annotated filing.
    pub document: AnnotatedDocument,
    /// Console statistics.
    pub summary: ExtractionSummary,
    /// Written artifacts.
    pub manifest: ExportManifest,
}

/// Fetch, extract and export for one ticker and form.
pub struct Pipeline {
    config: PipelineConfig,
    cache: Arc<dyn FilingCache>,
    fetcher: EdgarFetcher,
    annotator: Arc<dyn Annotator>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("config", &self.config)
            .field("cache", &self.cache)
            .field("fetcher", &self.fetcher.base_url())
            .field("annotator", &self.annotator.name())
            .finish()
    }
}

impl Pipeline {
    /// Creates a pipeline with a file cache under the output directory, the
    /// EDGAR fetcher and the Gemini annotator.
    ///
    /// # Errors
    /// Fails when the cache directory or an HTTP client cannot be created.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        let cache: Arc<dyn FilingCache> = Arc::new(FileCache::new(config.cache_dir())?);
        let fetcher = EdgarFetcher::new(&config.user_agent, Arc::clone(&cache))?;
        let annotator: Arc<dyn Annotator> = Arc::new(GeminiAnnotator::new()?);
        Ok(Self {
            config,
            cache,
            fetcher,
            annotator,
        })
    }

    /// Replaces the annotator.
    #[must_use]
    pub fn with_annotator(mut self, annotator: Arc<dyn Annotator>) -> Self {
        debug!(annotator = annotator.name(), "Using annotator");
        self.annotator = annotator;
        self
    }

    /// Replaces the fetcher.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: EdgarFetcher) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// The run settings.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Filing text, fetched or read back from the per-ticker cache entry.
    ///
    /// A fetched filing is stored under [`PipelineConfig::filing_key`] so a
    /// later run can skip the fetch.
    ///
    /// # Errors
    /// Any fetch failure, or a missing cache entry when fetching is skipped.
    pub async fn load_text(&self) -> Result<String> {
        let key = self.config.filing_key();

        if self.config.skip_fetch {
            return match self.cache.get_text(&key).await? {
                Some(text) => {
                    info!("Using cached filing: {key}");
                    Ok(text)
                }
                None => Err(FilingsError::Cache(format!(
                    "Cached file not found: {}",
                    self.config.cache_dir().join(format!("{key}.txt")).display()
                ))),
            };
        }

        let filing = self
            .fetcher
            .try_get_filing(
                &self.config.ticker,
                self.config.filing_type,
                self.config.year.as_deref(),
                &TextScope::Full,
            )
            .await?;

        self.cache.put_text(&key, &filing.text).await?;
        info!(
            "Retrieved {} filed {}: {} characters",
            key,
            filing.record.filing_date,
            filing.text.chars().count()
        );
        Ok(filing.text)
    }

    /// Runs the extraction and tags the document with the filing key.
    ///
    /// # Errors
    /// Propagates annotator failures.
    pub async fn extract(&self, text: &str) -> Result<AnnotatedDocument> {
        let document = extract_from_text(self.annotator.as_ref(), text, &self.config.extraction)
            .await?
            .with_document_id(self.config.filing_key());

        let overlaps = document.overlapping_pairs().len();
        if overlaps > 0 {
            warn!(overlaps, "Extractions contain overlapping spans");
        }
        Ok(document)
    }

    /// Writes every artifact for `document`.
    ///
    /// # Errors
    /// Any filesystem or serialization failure.
    pub fn export(&self, document: &AnnotatedDocument) -> Result<ExportManifest> {
        Exporter::new(&self.config.output_dir).export_all(
            document,
            &self.config.ticker,
            self.config.filing_type,
        )
    }

    /// Fetch, extract and export.
    ///
    /// # Errors
    /// The first failing stage's error.
    pub async fn run(&self) -> Result<PipelineOutput> {
        info!(
            "Financial Extraction Pipeline: {} {}",
            self.config.ticker, self.config.filing_type
        );
        let text = self.load_text().await?;
        let document = self.extract(&text).await?;
        let summary = ExtractionSummary::from_document(&document);
        let manifest = self.export(&document)?;
        info!("Results saved to: {}", self.config.output_dir.display());
        Ok(PipelineOutput {
            document,
            summary,
            manifest,
        })
    }
}
