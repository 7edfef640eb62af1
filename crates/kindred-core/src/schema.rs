//! Header normalization: arbitrary human-authored column headers become
//! storage-safe property keys.
//!
//! `normalize_header` is pure and idempotent, so re-deriving a schema from
//! already-normalized keys is a no-op. Collisions and empty keys are schema
//! errors, never silently resolved.

use crate::error::SchemaError;

/// The reserved node key property. The column matching the configured
/// primary-name marker maps here, and both the uniqueness constraint and
/// edge endpoint matching go through this property.
pub const NODE_KEY_FIELD: &str = "id";

/// Normalize a raw header into a property key: trimmed, lowercased,
/// whitespace runs collapsed to `_`, everything outside `[a-z0-9_]`
/// dropped, leading/trailing underscores stripped.
///
/// Total over all inputs; fully-symbolic headers degenerate to `""`,
/// which `HeaderSchema::derive` rejects.
pub fn normalize_header(raw: &str) -> String {
    let mut key = String::with_capacity(raw.len());
    for token in raw.split_whitespace() {
        let cleaned: String = token
            .chars()
            .map(|c| c.to_ascii_lowercase())
            .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
            .collect();
        if cleaned.is_empty() {
            continue;
        }
        if !key.is_empty() {
            key.push('_');
        }
        key.push_str(&cleaned);
    }
    key.trim_matches('_').to_string()
}

/// The normalized schema of one header row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderSchema {
    /// Normalized key per column, in source order.
    pub keys: Vec<String>,
    /// Index of the node key column (the primary-name marker), if present.
    pub key_column: Option<usize>,
}

impl HeaderSchema {
    /// Derive the schema for a header row.
    ///
    /// A header exactly equal to `primary_marker` (case-sensitive) maps to
    /// [`NODE_KEY_FIELD`] instead of the generic transform. Keys must be
    /// pairwise distinct and non-empty across the row.
    pub fn derive(headers: &[String], primary_marker: &str) -> Result<Self, SchemaError> {
        let mut keys = Vec::with_capacity(headers.len());
        let mut seen: Vec<(String, String)> = Vec::with_capacity(headers.len());
        let mut key_column = None;

        for (index, raw) in headers.iter().enumerate() {
            let key = if raw == primary_marker {
                key_column = Some(index);
                NODE_KEY_FIELD.to_string()
            } else {
                normalize_header(raw)
            };

            if key.is_empty() {
                return Err(SchemaError::EmptyColumn {
                    index,
                    raw: raw.clone(),
                });
            }
            if let Some((_, first)) = seen.iter().find(|(k, _)| *k == key) {
                return Err(SchemaError::DuplicateColumn {
                    first: first.clone(),
                    second: raw.clone(),
                    key,
                });
            }

            seen.push((key.clone(), raw.clone()));
            keys.push(key);
        }

        Ok(Self { keys, key_column })
    }

    /// Column index of a normalized key, if the row has it.
    pub fn index_of(&self, key: &str) -> Option<usize> {
        self.keys.iter().position(|k| k == key)
    }
}
