#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/factordynamics/filings/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! SEC EDGAR filing fetcher.
//!
//! This crate provides access to SEC EDGAR filing documents:
//!
//! - CIK (Central Index Key) lookup from a static ticker table
//! - Filing index search for 10-K / 10-Q forms
//! - Primary document retrieval and HTML-to-text cleanup
//! - Text caching keyed by filing URL
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use filings_cache::FileCache;
//! use filings_core::{FilingType, TextScope, Ticker};
//! use filings_edgar::EdgarFetcher;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cache = Arc::new(FileCache::new("./sec_filings_cache")?);
//!     let fetcher = EdgarFetcher::new("MyApp/1.0 (contact@example.com)", cache)?;
//!
//!     let text = fetcher
//!         .get_filing(&Ticker::new("NVDA"), FilingType::TenK, Some("2024"), &TextScope::Full)
//!         .await;
//!     match text {
//!         Some(text) => println!("Retrieved {} characters", text.len()),
//!         None => println!("Failed to retrieve filing"),
//!     }
//!
//!     Ok(())
//! }
//! ```

/// EDGAR page parsing and text cleanup.
pub mod html;

use filings_core::{
    Filing, FilingCache, FilingRecord, FilingType, FilingsError, Result, TextScope, Ticker,
    cache_key_for_url,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, warn};

/// SEC website base URL
const SEC_BASE_URL: &str = "https://www.sec.gov";

/// Default identifying user agent (SEC rejects anonymous clients)
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (compatible; Research/1.0; your-email@example.com)";

/// Timeout for index and detail page requests
const PAGE_TIMEOUT: Duration = Duration::from_secs(10);

/// Timeout for the primary document request
const DOCUMENT_TIMEOUT: Duration = Duration::from_secs(30);

/// Pause before downloading the primary document
const DOCUMENT_FETCH_DELAY: Duration = Duration::from_millis(100);

/// Number of filings requested from the index when fetching by ticker
pub const DEFAULT_SEARCH_COUNT: usize = 10;

/// Ticker to zero-padded CIK.
///
/// Lookups outside this table fail without touching the network.
const TICKER_TO_CIK: &[(&str, &str)] = &[
    ("NVDA", "0001045810"),
    ("MSFT", "0000789019"),
    ("AAPL", "0000320193"),
    ("GOOGL", "0001652044"),
    ("AMZN", "0001018724"),
    ("TSLA", "0001318605"),
    ("META", "0001326801"),
];

/// Look up a company's CIK from the static ticker table.
///
/// # Returns
/// The zero-padded 10-digit CIK, or `None` for an unknown ticker
#[must_use]
pub fn lookup_cik(ticker: &Ticker) -> Option<&'static str> {
    TICKER_TO_CIK
        .iter()
        .find(|(t, _)| *t == ticker.as_str())
        .map(|(_, cik)| *cik)
}

/// Keep only filings whose date contains `year`.
#[must_use]
pub fn filter_by_year(filings: Vec<FilingRecord>, year: &str) -> Vec<FilingRecord> {
    filings.into_iter().filter(|f| f.matches_year(year)).collect()
}

/// Order filings most recent first.
///
/// EDGAR already lists newest first; the page order is kept as-is when any date
/// fails to parse.
fn sort_most_recent_first(filings: &mut [FilingRecord]) {
    if filings.iter().all(|f| f.filed_on().is_some()) {
        filings.sort_by_key(|f| std::cmp::Reverse(f.filed_on()));
    }
}

/// SEC EDGAR filing fetcher.
///
/// Resolves tickers, searches the filing index, downloads the primary document
/// and caches its cleaned text. Requests are issued one at a time.
#[derive(Debug)]
pub struct EdgarFetcher {
    client: reqwest::Client,
    base_url: String,
    cache: Arc<dyn FilingCache>,
}

impl EdgarFetcher {
    /// Create a new fetcher with the specified user agent and cache.
    ///
    /// The SEC requires identifying user agent headers. Format should be:
    /// "AppName/Version (contact@email.com)"
    ///
    /// # Errors
    /// Returns [`FilingsError::Network`] if the HTTP client cannot be built.
    pub fn new(user_agent: &str, cache: Arc<dyn FilingCache>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| FilingsError::Network(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self::with_client(client, cache))
    }

    /// Create a new fetcher with a custom HTTP client.
    ///
    /// The client is expected to carry an identifying user agent already.
    pub fn with_client(client: reqwest::Client, cache: Arc<dyn FilingCache>) -> Self {
        Self {
            client,
            base_url: SEC_BASE_URL.to_string(),
            cache,
        }
    }

    /// Point the fetcher at a different EDGAR host (mirrors, test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// The EDGAR host requests are sent to.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Look up a company's CIK number from its ticker symbol.
    ///
    /// No network access is involved.
    pub fn get_cik(&self, ticker: &Ticker) -> Result<&'static str> {
        if ticker.as_str().is_empty() {
            return Err(FilingsError::InvalidParameter("Empty ticker".to_string()));
        }
        lookup_cik(ticker).ok_or_else(|| FilingsError::TickerNotFound(ticker.to_string()))
    }

    async fn fetch_page(&self, url: &str, query: &[(&str, &str)], timeout: Duration) -> Result<String> {
        debug!("Fetching {}", url);
        let response = self
            .client
            .get(url)
            .query(query)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| FilingsError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(FilingsError::Network(format!(
                "Failed to fetch {}: HTTP {}",
                url,
                response.status()
            )));
        }

        response
            .text()
            .await
            .map_err(|e| FilingsError::Network(format!("Failed to read {}: {}", url, e)))
    }

    /// Search for recent filings of a specific type.
    ///
    /// # Arguments
    /// * `ticker` - Ticker the records are attributed to
    /// * `cik` - Company CIK (leading zeros are stripped for the query)
    /// * `filing_type` - Form to search for
    /// * `count` - Maximum number of filings to return
    ///
    /// # Returns
    /// Filing records, most recent first
    pub async fn search_filings(
        &self,
        ticker: &Ticker,
        cik: &str,
        filing_type: FilingType,
        count: usize,
    ) -> Result<Vec<FilingRecord>> {
        let cik_trimmed = cik.trim_start_matches('0');
        let count_param = count.to_string();
        let url = format!("{}/cgi-bin/browse-edgar", self.base_url);

        info!("Searching for {} filings for CIK {}", filing_type, cik);
        let html = self
            .fetch_page(
                &url,
                &[
                    ("action", "getcompany"),
                    ("CIK", cik_trimmed),
                    ("type", filing_type.as_str()),
                    ("dateb", ""),
                    ("owner", "exclude"),
                    ("count", &count_param),
                    ("search_text", ""),
                ],
                PAGE_TIMEOUT,
            )
            .await?;

        let mut filings: Vec<FilingRecord> = html::parse_filing_index(&html, &self.base_url, count)?
            .into_iter()
            .map(|row| FilingRecord::new(ticker.clone(), filing_type, row.filing_date, row.filing_url))
            .collect();
        sort_most_recent_first(&mut filings);

        info!("Found {} filings", filings.len());
        Ok(filings)
    }

    /// Fetch and clean the primary document of a filing.
    ///
    /// A cache hit short-circuits all network access. Otherwise the detail page
    /// is fetched, the primary document located and downloaded, cleaned, scoped
    /// and cached.
    ///
    /// # Arguments
    /// * `filing_url` - URL of the filing's detail (index) page
    /// * `scope` - How much of the cleaned text to keep
    pub async fn get_filing_text(&self, filing_url: &str, scope: &TextScope) -> Result<String> {
        let cache_key = cache_key_for_url(filing_url);
        if let Some(text) = self.cache.get_text(&cache_key).await? {
            info!("Using cached filing: {}", cache_key);
            return Ok(text);
        }

        info!("Fetching filing from: {}", filing_url);
        let detail = self.fetch_page(filing_url, &[], PAGE_TIMEOUT).await?;
        let doc_link = html::find_primary_document(&detail, &self.base_url)?
            .ok_or_else(|| FilingsError::MissingDocument(filing_url.to_string()))?;

        info!("Downloading document: {}", doc_link);
        sleep(DOCUMENT_FETCH_DELAY).await;
        let document = self.fetch_page(&doc_link, &[], DOCUMENT_TIMEOUT).await?;

        let text = scope.apply(html::clean_document_text(&document));

        self.cache.put_text(&cache_key, &text).await?;
        info!("Cached filing as: {}", cache_key);

        Ok(text)
    }

    /// Fetch a filing by ticker and type, reporting why it failed.
    ///
    /// Uses the most recent filing, after applying the optional year filter.
    pub async fn try_get_filing(
        &self,
        ticker: &Ticker,
        filing_type: FilingType,
        year: Option<&str>,
        scope: &TextScope,
    ) -> Result<Filing> {
        let cik = self.get_cik(ticker)?;

        let filings = self
            .search_filings(ticker, cik, filing_type, DEFAULT_SEARCH_COUNT)
            .await?;
        if filings.is_empty() {
            return Err(FilingsError::NoFilings {
                ticker: ticker.to_string(),
                filing_type: filing_type.to_string(),
            });
        }

        let filings = match year {
            Some(year) => filter_by_year(filings, year),
            None => filings,
        };

        let Some(record) = filings.into_iter().next() else {
            return Err(FilingsError::NoFilingsForYear {
                ticker: ticker.to_string(),
                filing_type: filing_type.to_string(),
                year: year.unwrap_or_default().to_string(),
            });
        };

        info!("Fetching {} {} from {}", ticker, filing_type, record.filing_date);
        let text = self.get_filing_text(&record.filing_url, scope).await?;

        Ok(Filing { record, text })
    }

    /// Fetch a filing's cleaned text by ticker and type.
    ///
    /// Every failure is logged and reported as `None`.
    pub async fn get_filing(
        &self,
        ticker: &Ticker,
        filing_type: FilingType,
        year: Option<&str>,
        scope: &TextScope,
    ) -> Option<String> {
        match self.try_get_filing(ticker, filing_type, year, scope).await {
            Ok(filing) => Some(filing.text),
            Err(e) => {
                warn!("Failed to fetch {} {}: {}", ticker, filing_type, e);
                None
            }
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use filings_cache::InMemoryCache;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Nothing listens here; any request made against it fails fast.
    const DEAD_HOST: &str = "http://127.0.0.1:9";

    fn fetcher(cache: Arc<dyn FilingCache>) -> EdgarFetcher {
        EdgarFetcher::new("Test/1.0 (test@example.com)", cache)
            .unwrap()
            .with_base_url(DEAD_HOST)
    }

    fn record(date: &str) -> FilingRecord {
        FilingRecord::new(
            Ticker::new("NVDA"),
            FilingType::TenK,
            date,
            format!("{DEAD_HOST}/Archives/{date}-index.htm"),
        )
    }

    #[test]
    fn test_lookup_cik() {
        assert_eq!(lookup_cik(&Ticker::new("nvda")), Some("0001045810"));
        assert_eq!(lookup_cik(&Ticker::new("META")), Some("0001326801"));
        assert_eq!(lookup_cik(&Ticker::new("ZZZZ")), None);
    }

    #[test]
    fn test_cik_trimming() {
        assert_eq!("0000320193".trim_start_matches('0'), "320193");
    }

    #[tokio::test]
    async fn test_unknown_ticker_fails_without_network() {
        let cache = Arc::new(InMemoryCache::new());
        let fetcher = fetcher(cache.clone());

        let err = fetcher
            .try_get_filing(&Ticker::new("ZZZZ"), FilingType::TenK, None, &TextScope::Full)
            .await
            .unwrap_err();
        assert!(matches!(err, FilingsError::TickerNotFound(ref t) if t == "ZZZZ"));

        let text = fetcher
            .get_filing(&Ticker::new("ZZZZ"), FilingType::TenK, None, &TextScope::Full)
            .await;
        assert!(text.is_none());
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_empty_ticker_rejected() {
        let fetcher = fetcher(Arc::new(InMemoryCache::new()));
        assert!(matches!(
            fetcher.get_cik(&Ticker::new("")),
            Err(FilingsError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_year_filter_without_match_is_empty() {
        let filings = vec![record("2023-02-24"), record("2022-03-18")];
        assert!(filter_by_year(filings, "2024").is_empty());
    }

    #[test]
    fn test_year_filter_keeps_substring_matches() {
        let filings = vec![record("2024-02-21"), record("2023-02-24"), record("2024-11-20")];
        let kept = filter_by_year(filings, "2024");
        assert_eq!(kept.len(), 2);
        assert!(kept.iter().all(|f| f.filing_date.contains("2024")));
    }

    #[test]
    fn test_sort_most_recent_first() {
        let mut filings = vec![record("2022-03-18"), record("2024-02-21"), record("2023-02-24")];
        sort_most_recent_first(&mut filings);
        let dates: Vec<_> = filings.iter().map(|f| f.filing_date.as_str()).collect();
        assert_eq!(dates, vec!["2024-02-21", "2023-02-24", "2022-03-18"]);
    }

    #[test]
    fn test_sort_keeps_page_order_with_unparseable_dates() {
        let mut filings = vec![record("2022-03-18"), record("n/a"), record("2024-02-21")];
        sort_most_recent_first(&mut filings);
        let dates: Vec<_> = filings.iter().map(|f| f.filing_date.as_str()).collect();
        assert_eq!(dates, vec!["2022-03-18", "n/a", "2024-02-21"]);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network() {
        let cache = Arc::new(InMemoryCache::new());
        let url = format!("{DEAD_HOST}/Archives/edgar/data/1045810/0001045810-24-000029-index.htm");
        cache
            .put_text(&cache_key_for_url(&url), "cached filing text")
            .await
            .unwrap();

        let fetcher = fetcher(cache);
        let text = fetcher.get_filing_text(&url, &TextScope::Full).await.unwrap();
        assert_eq!(text, "cached filing text");
    }

    #[tokio::test]
    async fn test_network_failure_is_reported() {
        let fetcher = fetcher(Arc::new(InMemoryCache::new()));
        let err = fetcher
            .try_get_filing(&Ticker::new("NVDA"), FilingType::TenK, Some("2024"), &TextScope::Full)
            .await
            .unwrap_err();
        assert!(matches!(err, FilingsError::Network(_)));

        let text = fetcher
            .get_filing(&Ticker::new("NVDA"), FilingType::TenK, None, &TextScope::Full)
            .await;
        assert!(text.is_none());
    }

    /// Serves `body` for every request on a local port; returns the base URL and hit counter.
    async fn serve_page(body: &'static str) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut request = Vec::new();
                let mut buf = [0u8; 1024];
                while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => break,
                        Ok(n) => request.extend_from_slice(&buf[..n]),
                    }
                }
                let response = format!(
                    "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                    body.len(),
                    body
                );
                socket.write_all(response.as_bytes()).await.ok();
                socket.shutdown().await.ok();
            }
        });

        (format!("http://{addr}"), hits)
    }

    const INDEX_2023_ONLY: &str = r#"<html><body>
        <table class="tableFile2">
          <tr><th>Filings</th><th>Format</th><th>Description</th><th>Filing Date</th></tr>
          <tr>
            <td>10-K</td>
            <td><a href="/Archives/edgar/data/1045810/0001045810-23-000017-index.htm">Documents</a></td>
            <td>Annual report</td>
            <td>2023-02-24</td>
          </tr>
        </table>
        </body></html>"#;

    const INDEX_HEADER_ONLY: &str = r#"<html><body>
        <table class="tableFile2">
          <tr><th>Filings</th><th>Format</th><th>Description</th><th>Filing Date</th></tr>
        </table>
        </body></html>"#;

    #[tokio::test]
    async fn test_year_without_filings_is_reported() {
        let (base_url, hits) = serve_page(INDEX_2023_ONLY).await;
        let cache = Arc::new(InMemoryCache::new());
        let fetcher = fetcher(cache.clone()).with_base_url(base_url);
        let nvda = Ticker::new("NVDA");

        let err = fetcher
            .try_get_filing(&nvda, FilingType::TenK, Some("2024"), &TextScope::Full)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FilingsError::NoFilingsForYear { ref ticker, ref year, .. } if ticker == "NVDA" && year == "2024"
        ));
        assert_eq!(err.to_string(), "No 10-K filings found for NVDA in 2024");
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let text = fetcher
            .get_filing(&nvda, FilingType::TenK, Some("2024"), &TextScope::Full)
            .await;
        assert!(text.is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_empty_index_is_reported() {
        let (base_url, hits) = serve_page(INDEX_HEADER_ONLY).await;
        let fetcher = fetcher(Arc::new(InMemoryCache::new())).with_base_url(base_url);
        let nvda = Ticker::new("NVDA");

        let err = fetcher
            .try_get_filing(&nvda, FilingType::TenQ, None, &TextScope::Full)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            FilingsError::NoFilings { ref ticker, ref filing_type } if ticker == "NVDA" && filing_type == "10-Q"
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        let text = fetcher
            .get_filing(&nvda, FilingType::TenQ, None, &TextScope::Full)
            .await;
        assert!(text.is_none());
    }

    #[test]
    fn test_base_url_trimmed() {
        let fetcher = fetcher(Arc::new(InMemoryCache::new())).with_base_url("https://www.sec.gov/");
        assert_eq!(fetcher.base_url(), "https://www.sec.gov");
    }
}
