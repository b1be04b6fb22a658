//! `filings` command-line entry point.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use filings::{
    API_KEY_ENV, DEFAULT_EXTRACTION_PASSES, DEFAULT_MAX_CHAR_BUFFER, DEFAULT_MAX_WORKERS,
    DEFAULT_MODEL_ID, DEFAULT_OUTPUT_DIR, DEFAULT_USER_AGENT, ExtractionConfig, ExtractionSummary,
    FilingType, FilingsError, Pipeline, PipelineConfig, Ticker, thousands,
};
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "warn,filings=info";

/// End-to-end SEC filing extraction pipeline.
#[derive(Debug, Parser)]
#[command(name = "filings", version, about)]
struct Args {
    /// Stock ticker symbol
    #[arg(long, default_value = "NVDA")]
    ticker: Ticker,

    /// Filing type (10-K or 10-Q)
    #[arg(long, default_value = "10-K")]
    filing_type: FilingType,

    /// Year to fetch (e.g. 2024); defaults to the most recent filing
    #[arg(long)]
    year: Option<String>,

    /// Model to use for extraction
    #[arg(long, default_value = DEFAULT_MODEL_ID)]
    model: String,

    /// Output directory for results
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Use the cached filing text instead of fetching
    #[arg(long)]
    skip_fetch: bool,

    /// Extraction passes over the document
    #[arg(long, default_value_t = DEFAULT_EXTRACTION_PASSES)]
    passes: usize,

    /// Concurrent chunk requests
    #[arg(long, default_value_t = DEFAULT_MAX_WORKERS)]
    workers: usize,

    /// Maximum characters per chunk
    #[arg(long, default_value_t = DEFAULT_MAX_CHAR_BUFFER)]
    chunk_size: usize,

    /// User agent sent to SEC EDGAR
    #[arg(long, env = "SEC_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    user_agent: String,
}

impl Args {
    fn into_config(self, api_key: String) -> PipelineConfig {
        let extraction = ExtractionConfig::new(api_key)
            .with_model(self.model)
            .with_passes(self.passes)
            .with_max_workers(self.workers)
            .with_max_char_buffer(self.chunk_size);

        let mut config = PipelineConfig::new(self.ticker, self.filing_type)
            .with_output_dir(self.output_dir)
            .with_skip_fetch(self.skip_fetch)
            .with_user_agent(self.user_agent)
            .with_extraction(extraction);
        config.year = self.year;
        config
    }
}

/// Accepts a looked-up key only when it is non-blank.
fn require_api_key_from(value: Option<String>) -> anyhow::Result<String> {
    value
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| FilingsError::MissingCredential(API_KEY_ENV.to_string()).into())
}

fn require_api_key() -> anyhow::Result<String> {
    require_api_key_from(std::env::var(API_KEY_ENV).ok())
}

fn banner(title: &str) {
    let rule = "=".repeat(80);
    println!("{rule}");
    println!("{title}");
    println!("{rule}");
}

fn step(title: &str) {
    println!("{title}");
    println!("{}", "-".repeat(40));
}

async fn run(config: PipelineConfig) -> anyhow::Result<()> {
    banner(&format!(
        "Financial Extraction Pipeline: {} {}",
        config.ticker, config.filing_type
    ));
    println!();

    let skip_fetch = config.skip_fetch;
    let pipeline = Pipeline::new(config).context("Failed to set up pipeline")?;

    let text = if skip_fetch {
        let text = pipeline
            .load_text()
            .await
            .context("Failed to load cached filing")?;
        println!("Using cached filing: {} characters\n", thousands(text.chars().count()));
        text
    } else {
        step("Step 1: Fetching SEC Filing");
        let text = pipeline
            .load_text()
            .await
            .context("Failed to fetch filing")?;
        println!("Retrieved filing: {} characters\n", thousands(text.chars().count()));
        text
    };

    step("Step 2: Extracting Structured Information");
    let document = pipeline
        .extract(&text)
        .await
        .context("Extraction failed")?;
    println!("Extracted {} entities\n", document.extractions.len());

    step("Step 3: Analyzing Results");
    println!("{}", ExtractionSummary::from_document(&document));

    step("Step 4: Exporting Results");
    let manifest = pipeline
        .export(&document)
        .context("Failed to export results")?;

    println!();
    banner("Pipeline Complete!");
    println!("\nResults saved to: {}/", pipeline.output_dir().display());
    println!("\nGenerated files:");
    for (path, description) in manifest.files() {
        let name = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        println!("  - {name} ({description})");
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let args = Args::parse();

    let api_key = match require_api_key() {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("   Set it with: export {API_KEY_ENV}='your-key-here'");
            eprintln!("   Or add it to a .env file");
            return ExitCode::FAILURE;
        }
    };

    match run(args.into_config(api_key)).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
