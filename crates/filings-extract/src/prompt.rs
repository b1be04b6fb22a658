//! Extraction request builder.
//!
//! The instruction and the worked examples are constants; nothing here depends on
//! the filing being processed.

use filings_core::{ExampleData, Extraction, ExtractionClass};

const FINANCIAL_EXTRACTION_PROMPT: &str = "\
Extract financial information from SEC filings and earnings reports.

Extract the following entity types in order of appearance:
- company_info: Company name, ticker symbol, CIK number
- financial_metric: Revenue, operating income, net income, EBITDA, EPS, etc.
- risk_factor: Risk disclosures and concerns
- business_segment: Business units, product lines, geographic regions
- time_period: Fiscal years, quarters, reporting periods
- metric_change: Year-over-year changes, growth rates, comparisons

Critical rules:
1. Use EXACT text from the document for extraction_text
2. Do NOT paraphrase or summarize
3. Do NOT overlap text spans
4. Extract entities in order of appearance
5. Provide meaningful attributes for context

For financial_metric entities, include these attributes:
- metric_name: The specific metric (e.g., \"revenue\", \"net_income\")
- value: The numerical value
- unit: Currency or percentage (e.g., \"USD_millions\", \"percent\")
- time_period: The reporting period

For company_info entities, include:
- info_type: \"company_name\", \"ticker\", \"cik\", \"sector\"

For risk_factor entities, include:
- risk_category: Type of risk (e.g., \"market\", \"operational\", \"regulatory\")
";

const RESULTS_EXAMPLE_TEXT: &str = "\
NVIDIA Corporation (NASDAQ: NVDA) reported fiscal year 2024 results.
Revenue for fiscal 2024 was $60.9 billion, up 126% from $27.0 billion
in fiscal 2023. Operating income increased to $33.0 billion compared
to $4.2 billion in the prior year. Net income reached $29.8 billion.
";

const SEGMENTS_EXAMPLE_TEXT: &str = "\
The Data Center segment generated $47.5 billion in revenue, representing
78% of total revenue. Gaming revenue was $10.4 billion. The company faces
risks related to export controls impacting sales to China.
";

/// The instruction handed to the annotation service.
#[must_use]
pub fn financial_extraction_prompt() -> &'static str {
    FINANCIAL_EXTRACTION_PROMPT
}

fn metric(text: &str, name: &str, value: &str, unit: &str) -> Extraction {
    Extraction::new(ExtractionClass::FinancialMetric, text)
        .with_attribute("metric_name", name)
        .with_attribute("value", value)
        .with_attribute("unit", unit)
}

/// The two worked examples handed to the annotation service.
#[must_use]
pub fn financial_examples() -> Vec<ExampleData> {
    vec![
        ExampleData::new(
            RESULTS_EXAMPLE_TEXT,
            vec![
                Extraction::new(ExtractionClass::CompanyInfo, "NVIDIA Corporation")
                    .with_attribute("info_type", "company_name"),
                Extraction::new(ExtractionClass::CompanyInfo, "NASDAQ: NVDA")
                    .with_attribute("info_type", "ticker"),
                Extraction::new(ExtractionClass::TimePeriod, "fiscal year 2024")
                    .with_attribute("period_type", "annual"),
                metric(
                    "Revenue for fiscal 2024 was $60.9 billion",
                    "revenue",
                    "60.9",
                    "USD_billions",
                )
                .with_attribute("time_period", "fiscal_2024"),
                Extraction::new(
                    ExtractionClass::MetricChange,
                    "up 126% from $27.0 billion in fiscal 2023",
                )
                .with_attribute("change_type", "year_over_year_growth")
                .with_attribute("percentage", "126")
                .with_attribute("comparison_period", "fiscal_2023"),
                metric(
                    "Operating income increased to $33.0 billion",
                    "operating_income",
                    "33.0",
                    "USD_billions",
                )
                .with_attribute("time_period", "fiscal_2024"),
                metric(
                    "$4.2 billion in the prior year",
                    "operating_income",
                    "4.2",
                    "USD_billions",
                )
                .with_attribute("time_period", "fiscal_2023"),
                metric(
                    "Net income reached $29.8 billion",
                    "net_income",
                    "29.8",
                    "USD_billions",
                )
                .with_attribute("time_period", "fiscal_2024"),
            ],
        ),
        ExampleData::new(
            SEGMENTS_EXAMPLE_TEXT,
            vec![
                Extraction::new(ExtractionClass::BusinessSegment, "Data Center segment")
                    .with_attribute("segment_type", "product_line"),
                metric(
                    "$47.5 billion in revenue",
                    "segment_revenue",
                    "47.5",
                    "USD_billions",
                )
                .with_attribute("segment", "data_center"),
                metric(
                    "78% of total revenue",
                    "revenue_percentage",
                    "78",
                    "percent",
                )
                .with_attribute("segment", "data_center"),
                Extraction::new(ExtractionClass::BusinessSegment, "Gaming")
                    .with_attribute("segment_type", "product_line"),
                metric(
                    "Gaming revenue was $10.4 billion",
                    "segment_revenue",
                    "10.4",
                    "USD_billions",
                )
                .with_attribute("segment", "gaming"),
                Extraction::new(
                    ExtractionClass::RiskFactor,
                    "risks related to export controls impacting sales to China",
                )
                .with_attribute("risk_category", "regulatory")
                .with_attribute("geographic_exposure", "china"),
            ],
        ),
    ]
}
