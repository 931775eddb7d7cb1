//! Stage 2: relationships.
//!
//! Two mutually exclusive sources: the aggregated
//! `Model/relationships.tmdl`, falling back to per-file
//! `Model/relationships/*.tmdl` only when the aggregated probe is not
//! populated. Never both — but an existing-yet-empty aggregated file does
//! trigger the fallback.

use crate::error::ExtractError;
use crate::model::{DEFAULT_CROSS_FILTERING, Relationship};
use crate::parser::tmdl::{self, RelationshipDecl};
use crate::project::{self, ModelLayout};

use super::source::ProbeOutcome;

/// Extract the model's relationship sequence in discovery order. No
/// deduplication and no symmetry check; both directions are kept when
/// both are declared.
pub fn extract_relationships(layout: &ModelLayout) -> Result<Vec<Relationship>, ExtractError> {
    let aggregated = probe_aggregated(layout)?;
    if let ProbeOutcome::Populated(records) = aggregated {
        tracing::debug!(count = records.len(), "relationships from aggregated file");
        return Ok(records);
    }

    tracing::debug!("aggregated relationships not populated, probing per-file source");
    let fallback = probe_per_file(layout)?;
    Ok(fallback.into_records())
}

fn probe_aggregated(layout: &ModelLayout) -> Result<ProbeOutcome<Relationship>, ExtractError> {
    let path = layout.relationships_file();
    if !path.is_file() {
        return Ok(ProbeOutcome::Absent);
    }
    let source = project::read_text(&path)?;
    let records = tmdl::parse_aggregated_relationships(&source)
        .into_iter()
        .map(into_relationship)
        .collect();
    Ok(ProbeOutcome::from_records(records))
}

fn probe_per_file(layout: &ModelLayout) -> Result<ProbeOutcome<Relationship>, ExtractError> {
    let dir = layout.relationships_dir();
    if !dir.is_dir() {
        return Ok(ProbeOutcome::Absent);
    }
    let mut records = Vec::new();
    for path in project::list_dialect_files(&dir)? {
        let source = project::read_text(&path)?;
        // A file missing any required attribute contributes nothing.
        if let Some(decl) = tmdl::parse_relationship_file(&source) {
            records.push(into_relationship(decl));
        }
    }
    Ok(ProbeOutcome::from_records(records))
}

fn into_relationship(decl: RelationshipDecl) -> Relationship {
    Relationship {
        from_table: decl.from_table,
        from_column: decl.from_column,
        to_table: decl.to_table,
        to_column: decl.to_column,
        cross_filtering_behavior: decl
            .cross_filtering_behavior
            .unwrap_or_else(|| DEFAULT_CROSS_FILTERING.to_string()),
    }
}
