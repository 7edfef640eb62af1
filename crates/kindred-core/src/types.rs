//! Core domain types for the Kindred relationship graph.
//!
//! Labels and relationship types end up interpolated into Cypher (they
//! cannot be parameterized), so both are newtypes whose constructors
//! enforce an `[A-Za-z_][A-Za-z0-9_]*` allow-list. Values always travel
//! as query parameters instead.

use std::fmt;

use crate::error::{SchemaError, TableError};

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ── Label ─────────────────────────────────────────────────────────

/// A node label derived from a sheet name: trimmed, internal whitespace
/// replaced by `_`, validated against the identifier allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Label(String);

impl Label {
    pub fn from_sheet_name(raw: &str) -> Result<Self, SchemaError> {
        let name = raw.split_whitespace().collect::<Vec<_>>().join("_");
        if !is_identifier(&name) {
            return Err(SchemaError::InvalidLabel {
                raw: raw.to_string(),
            });
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Relationship type ─────────────────────────────────────────────

/// A directed edge type from the relationships sheet: trimmed,
/// upper-cased, internal whitespace replaced by `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RelationshipType(String);

impl RelationshipType {
    pub fn parse(raw: &str) -> Result<Self, SchemaError> {
        let ty = raw
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("_")
            .to_ascii_uppercase();
        if !is_identifier(&ty) {
            return Err(SchemaError::InvalidRelationshipType {
                raw: raw.to_string(),
            });
        }
        Ok(Self(ty))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ── Table ─────────────────────────────────────────────────────────

/// One fetched sheet: a header row plus data rows, orders preserved.
///
/// Every data row has exactly `header.len()` cells. Sources that truncate
/// trailing blanks (the Sheets values API does) are padded back out on
/// construction; rows wider than the header are rejected.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Table {
    pub name: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Build a table from raw rows, row 0 being the header.
    pub fn from_rows(name: &str, mut raw: Vec<Vec<String>>) -> Result<Self, TableError> {
        if raw.is_empty() || raw[0].is_empty() {
            return Err(TableError::MissingHeader {
                name: name.to_string(),
            });
        }
        let header = raw.remove(0);
        let expected = header.len();

        for (i, row) in raw.iter_mut().enumerate() {
            if row.len() > expected {
                return Err(TableError::RaggedRow {
                    name: name.to_string(),
                    row: i + 1,
                    width: row.len(),
                    expected,
                });
            }
            row.resize(expected, String::new());
        }

        Ok(Self {
            name: name.to_string(),
            header,
            rows: raw,
        })
    }

    pub fn width(&self) -> usize {
        self.header.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
