//! kindred-core: Shared types and schema normalization for the Kindred
//! relationship graph.
//!
//! This crate provides the pure building blocks used across the Kindred
//! backend:
//! - `Label` and `RelationshipType`, validated identifiers safe to
//!   interpolate into Cypher
//! - `Table`, the in-memory form of one fetched sheet
//! - Header normalization and schema derivation
//! - Schema-level error types

pub mod error;
pub mod schema;
pub mod types;

pub use error::{SchemaError, TableError};
pub use schema::{normalize_header, HeaderSchema, NODE_KEY_FIELD};
pub use types::{Label, RelationshipType, Table};
