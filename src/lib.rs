//! # tabex
//!
//! Core library for extracting a tabular semantic model — tables, columns,
//! measures, relationships, and query expressions — from a directory tree
//! of table-definition (TMDL) and formula (M) dialect files, and
//! assembling it into one normalized, cross-referenced JSON document.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! extract   → source probes, per-stage extractors, assembler, entry point
//!   ↓
//! model     → entity and document types (the wire format)
//!   ↓
//! project   → directory layout contract, UTF-8 loading, deterministic walks
//!   ↓
//! parser    → logos lexer, dialect block scanners, text normalization
//! ```
//!
//! The usual entry point:
//!
//! ```no_run
//! use std::path::Path;
//!
//! let extraction = tabex::extract_model(Path::new("/path/to/model"))?;
//! let json = extraction.document.to_json_pretty()?;
//! # Ok::<(), tabex::ExtractError>(())
//! ```

/// Error taxonomy: fatal I/O vs. structural absence
pub mod error;

/// Extraction stages and the pipeline entry point
pub mod extract;

/// Entity and document types (serialized wire format)
pub mod model;

/// Dialect scanners: logos lexer, TMDL blocks, M section documents
pub mod parser;

/// Directory layout contract and file loading
pub mod project;

// Re-export the surface most callers need.
pub use error::ExtractError;
pub use extract::{Extraction, Warning, extract_model, extract_model_at};
pub use model::Document;
pub use project::ModelLayout;
