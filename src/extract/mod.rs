//! Extraction pipeline: three independent stages and a final assembly.
//!
//! ```text
//! Model/tables/*.tmdl        → tables (columns, measures)
//! Model/relationships[.tmdl] → relationships
//! Mashup / *.m / expressions → query expressions
//!                 ↓
//!            assembler       → Document (+ referential warnings)
//! ```
//!
//! Stages 1-3 have no data dependency on each other; stage 4 is a pure
//! merge. The whole run either produces a document or fails before any
//! partial output.

mod assembler;
mod queries;
mod relationships;
mod source;
mod tables;

pub use assembler::assemble;
pub use source::ProbeOutcome;
pub use tables::table_from_source;

use std::fmt;
use std::path::Path;

use rustc_hash::FxHashSet;

use crate::error::ExtractError;
use crate::model::Document;
use crate::project::ModelLayout;

/// A produced document plus non-fatal findings about it.
#[derive(Debug, Clone, PartialEq)]
pub struct Extraction {
    pub document: Document,
    /// Referential inconsistencies. The document itself is untouched;
    /// dangling references pass through for resilience against
    /// partially-modeled inputs.
    pub warnings: Vec<Warning>,
}

/// A non-fatal finding collected alongside the output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Warning {
    /// A relationship endpoint names a table absent from the document.
    DanglingRelationship { table: String, column: String },
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DanglingRelationship { table, column } => write!(
                f,
                "relationship references unknown table {table} (column {column})"
            ),
        }
    }
}

/// Run the whole extraction over one model root.
///
/// Returns the assembled document and any referential warnings, or the
/// first fatal error. Malformed-but-readable input never fails; worst
/// case is an empty document.
pub fn extract_model(root: &Path) -> Result<Extraction, ExtractError> {
    extract_model_at(root, assembler::current_timestamp())
}

/// [`extract_model`] with an explicit `extractDate`, the only run-to-run
/// unstable field. With a fixed timestamp the output is byte-identical
/// across runs on an unchanged tree.
pub fn extract_model_at(
    root: &Path,
    extract_date: impl Into<String>,
) -> Result<Extraction, ExtractError> {
    if !root.is_dir() {
        return Err(ExtractError::RootNotFound(root.to_path_buf()));
    }
    let layout = ModelLayout::new(root);

    let tables = tables::extract_tables(&layout)?;
    let relationships = relationships::extract_relationships(&layout)?;
    let queries = queries::extract_queries(&layout)?;

    tracing::debug!(
        tables = tables.len(),
        relationships = relationships.len(),
        queries = queries.len(),
        "assembling document"
    );
    let document = assemble(
        layout.model_name(),
        tables,
        relationships,
        queries,
        extract_date.into(),
    );
    let warnings = check_references(&document);
    for warning in &warnings {
        tracing::warn!(%warning, "referential inconsistency");
    }

    Ok(Extraction { document, warnings })
}

/// Report relationships whose endpoints name tables that are not in the
/// document. Duplicate table names are legal and count as present.
fn check_references(document: &Document) -> Vec<Warning> {
    let known: FxHashSet<&str> = document
        .model
        .tables
        .iter()
        .map(|t| t.name.as_str())
        .collect();

    let mut warnings = Vec::new();
    for relationship in &document.model.relationships {
        if !known.contains(relationship.from_table.as_str()) {
            warnings.push(Warning::DanglingRelationship {
                table: relationship.from_table.clone(),
                column: relationship.from_column.clone(),
            });
        }
        if !known.contains(relationship.to_table.as_str()) {
            warnings.push(Warning::DanglingRelationship {
                table: relationship.to_table.clone(),
                column: relationship.to_column.clone(),
            });
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Relationship, Table};

    fn relationship(from: &str, to: &str) -> Relationship {
        Relationship {
            from_table: from.to_string(),
            from_column: "ID".to_string(),
            to_table: to.to_string(),
            to_column: "ID".to_string(),
            cross_filtering_behavior: "bothDirections".to_string(),
        }
    }

    #[test]
    fn test_dangling_relationship_warned_not_dropped() {
        let doc = assemble(
            "M".into(),
            vec![Table::new("Sales")],
            vec![relationship("Sales", "Ghost")],
            vec![],
            "t0".into(),
        );
        let warnings = check_references(&doc);
        assert_eq!(
            warnings,
            vec![Warning::DanglingRelationship {
                table: "Ghost".to_string(),
                column: "ID".to_string(),
            }]
        );
        // Still in the document.
        assert_eq!(doc.model.relationships.len(), 1);
    }

    #[test]
    fn test_resolved_relationship_is_quiet() {
        let doc = assemble(
            "M".into(),
            vec![Table::new("Sales"), Table::new("Customer")],
            vec![relationship("Sales", "Customer")],
            vec![],
            "t0".into(),
        );
        assert!(check_references(&doc).is_empty());
    }
}
