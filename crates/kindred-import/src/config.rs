//! Configuration for the import pipeline.

use serde::Deserialize;

/// Import pipeline configuration.
///
/// Loaded from the `kindred.toml` `[import]` section or
/// `KINDRED__IMPORT__` environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// API key for the Google Sheets v4 API.
    #[serde(default)]
    pub google_api_key: String,

    /// Exact name of the single sheet holding graph edges. Every other
    /// sheet is a node sheet, and this name is reserved as a label.
    #[serde(default = "default_relationships_sheet")]
    pub relationships_sheet: String,

    /// Header that designates the natural node key column (case-sensitive
    /// exact match).
    #[serde(default = "default_primary_marker")]
    pub primary_name_marker: String,

    /// Maximum in-flight node upserts per sheet.
    #[serde(default = "default_max_upserts")]
    pub max_concurrent_upserts: usize,
}

fn default_relationships_sheet() -> String {
    "Relationships".to_string()
}

fn default_primary_marker() -> String {
    "Name".to_string()
}

fn default_max_upserts() -> usize {
    16
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            google_api_key: String::new(),
            relationships_sheet: default_relationships_sheet(),
            primary_name_marker: default_primary_marker(),
            max_concurrent_upserts: default_max_upserts(),
        }
    }
}
