//! Kindred Graph — Neo4j client for the relationship graph.
//!
//! This crate is the single mutation point for the Neo4j graph. All
//! reads and writes flow through it so that label/type sanitization and
//! upsert semantics stay in one place. Labels and relationship types are
//! only accepted as the validated newtypes from `kindred-core`; cell
//! values always travel as query parameters.

pub mod client;
pub mod mutations;
pub mod queries;

pub use client::{GraphClient, GraphConfig, GraphError};
pub use queries::LabelCount;
