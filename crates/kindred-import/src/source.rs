//! Tabular source providers: Google Sheets, remote CSV, and an in-memory
//! source for tests and fixtures.
//!
//! Every provider exposes the same two operations: list the tables a
//! source contains, and fetch one table as a [`Table`] with column and
//! row order preserved. Network failures surface as `SourceUnavailable`;
//! structural problems as `MalformedSource`.

use serde::Deserialize;
use url::Url;

use kindred_core::Table;

use crate::error::{ImportError, Result};

const SHEETS_API_BASE: &str = "https://sheets.googleapis.com/v4/spreadsheets";
const SPREADSHEET_URL_PREFIX: &str = "https://docs.google.com/spreadsheets/d/";

/// A tabular data source.
#[derive(Clone)]
pub enum Source {
    Sheets(SheetsSource),
    Csv(CsvSource),
    Memory(MemorySource),
}

impl Source {
    /// Names of all tables in the source, in source order.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        match self {
            Self::Sheets(s) => s.list_tables().await,
            Self::Csv(s) => Ok(vec![s.table_name.clone()]),
            Self::Memory(s) => Ok(s.tables.iter().map(|t| t.name.clone()).collect()),
        }
    }

    /// Fetch one table by name.
    pub async fn fetch_table(&self, name: &str) -> Result<Table> {
        match self {
            Self::Sheets(s) => s.fetch_table(name).await,
            Self::Csv(s) => s.fetch_table().await,
            Self::Memory(s) => s.fetch_table(name),
        }
    }

    /// Short human-readable description for logs and reports.
    pub fn describe(&self) -> String {
        match self {
            Self::Sheets(s) => format!("spreadsheet:{}", s.spreadsheet_id),
            Self::Csv(s) => format!("csv:{}", s.url),
            Self::Memory(_) => "memory".to_string(),
        }
    }
}

// ── Google Sheets ─────────────────────────────────────────────────

/// Google Sheets v4 API source, authenticated with an API key (the
/// spreadsheet must be link-readable).
#[derive(Clone)]
pub struct SheetsSource {
    client: reqwest::Client,
    spreadsheet_id: String,
    api_key: String,
}

#[derive(Deserialize)]
struct SpreadsheetMeta {
    #[serde(default)]
    sheets: Vec<SheetEntry>,
}

#[derive(Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Deserialize)]
struct SheetProperties {
    title: String,
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<String>>,
}

impl SheetsSource {
    pub fn new(spreadsheet_id: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            spreadsheet_id: spreadsheet_id.into(),
            api_key: api_key.into(),
        }
    }

    fn api_url(&self, extra_segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(SHEETS_API_BASE)
            .map_err(|e| ImportError::SourceUnavailable(e.to_string()))?;
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| ImportError::SourceUnavailable("invalid API base URL".to_string()))?;
            segments.push(&self.spreadsheet_id);
            for segment in extra_segments {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .client
            .get(url)
            .query(&[("key", self.api_key.as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| ImportError::SourceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ImportError::SourceUnavailable(format!(
                "Sheets API returned {status}: {body}"
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| ImportError::SourceUnavailable(e.to_string()))
    }

    async fn list_tables(&self) -> Result<Vec<String>> {
        let url = self.api_url(&[])?;
        let meta: SpreadsheetMeta = self
            .get_json(url, &[("fields", "sheets.properties.title")])
            .await?;
        Ok(meta.sheets.into_iter().map(|s| s.properties.title).collect())
    }

    async fn fetch_table(&self, name: &str) -> Result<Table> {
        // Sheet names are quoted in A1 notation so spaces survive.
        let range = format!("'{name}'!A1:ZZ");
        let url = self.api_url(&["values", &range])?;
        let values: ValueRange = self.get_json(url, &[]).await?;

        tracing::debug!(sheet = %name, rows = values.values.len(), "Fetched sheet");
        Ok(Table::from_rows(name, values.values)?)
    }
}

// ── Remote CSV ────────────────────────────────────────────────────

/// A single-table source backed by a CSV document fetched over HTTP.
#[derive(Clone)]
pub struct CsvSource {
    client: reqwest::Client,
    pub(crate) url: Url,
    pub(crate) table_name: String,
}

impl CsvSource {
    pub fn new(url: &str) -> Result<Self> {
        let url = Url::parse(url).map_err(|e| ImportError::InvalidUrl(e.to_string()))?;
        let table_name = csv_table_name(&url);
        Ok(Self {
            client: reqwest::Client::new(),
            url,
            table_name,
        })
    }

    async fn fetch_table(&self) -> Result<Table> {
        let response = self
            .client
            .get(self.url.clone())
            .send()
            .await
            .map_err(|e| ImportError::SourceUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ImportError::SourceUnavailable(format!(
                "CSV fetch returned {status}"
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ImportError::SourceUnavailable(e.to_string()))?;

        parse_csv(&self.table_name, &body)
    }
}

/// Derive a table name from the last URL path segment, minus extension.
fn csv_table_name(url: &Url) -> String {
    url.path_segments()
        .and_then(|mut segments| segments.next_back())
        .map(|last| last.trim_end_matches(".csv"))
        .filter(|name| !name.is_empty())
        .unwrap_or("csv")
        .to_string()
}

/// Parse CSV text into a table. Row 0 is the header; short rows are
/// padded by `Table::from_rows`, over-wide rows are malformed.
pub fn parse_csv(name: &str, data: &str) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(data.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ImportError::CsvParse(e.to_string()))?;
        rows.push(record.iter().map(|cell| cell.to_string()).collect());
    }

    Ok(Table::from_rows(name, rows)?)
}

// ── In-memory ─────────────────────────────────────────────────────

/// Fixed tables held in memory. Used by tests and fixtures.
#[derive(Clone)]
pub struct MemorySource {
    tables: Vec<Table>,
}

impl MemorySource {
    pub fn new(tables: Vec<Table>) -> Self {
        Self { tables }
    }

    fn fetch_table(&self, name: &str) -> Result<Table> {
        self.tables
            .iter()
            .find(|t| t.name == name)
            .cloned()
            .ok_or_else(|| ImportError::SourceUnavailable(format!("no such table: {name}")))
    }
}

// ── Spreadsheet URLs ──────────────────────────────────────────────

/// Extract the spreadsheet ID from a Google Sheets URL, rejecting
/// anything that is not a docs.google.com spreadsheet link.
pub fn extract_spreadsheet_id(url: &str) -> Result<String> {
    let rest = url
        .strip_prefix(SPREADSHEET_URL_PREFIX)
        .ok_or_else(|| ImportError::InvalidUrl(url.to_string()))?;

    let id: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();

    let tail = &rest[id.len()..];
    let tail_ok = tail.is_empty() || tail.starts_with('/') || tail.starts_with('?');
    if id.is_empty() || !tail_ok {
        return Err(ImportError::InvalidUrl(url.to_string()));
    }
    Ok(id)
}
