//! Stage 3: query expressions.
//!
//! Strict source priority: the primary formula section document, then
//! per-file query modules, then the expressions declaration file. The
//! first populated probe wins and later sources are never consulted.

use crate::error::ExtractError;
use crate::model::QueryExpression;
use crate::parser::{mashup, tmdl};
use crate::project::{self, ModelLayout};

use super::source::ProbeOutcome;

pub fn extract_queries(layout: &ModelLayout) -> Result<Vec<QueryExpression>, ExtractError> {
    let section = probe_section_document(layout)?;
    if section.is_populated() {
        return Ok(section.into_records());
    }

    let modules = probe_query_modules(layout)?;
    if modules.is_populated() {
        return Ok(modules.into_records());
    }

    let declarations = probe_expression_declarations(layout)?;
    Ok(declarations.into_records())
}

/// Priority 1: the section document registers the whole file under the
/// section name, then each `shared` binding on its own. A section
/// declaration alone is enough to suppress every other source.
fn probe_section_document(
    layout: &ModelLayout,
) -> Result<ProbeOutcome<QueryExpression>, ExtractError> {
    let path = layout.section_file();
    if !path.is_file() {
        return Ok(ProbeOutcome::Absent);
    }
    let source = project::read_text(&path)?;
    let Some(doc) = mashup::parse_section_document(&source) else {
        return Ok(ProbeOutcome::Empty);
    };

    let mut records = Vec::with_capacity(doc.shared.len() + 1);
    records.push(QueryExpression::new(doc.name, source));
    for binding in doc.shared {
        records.push(QueryExpression::new(binding.name, binding.body));
    }
    tracing::debug!(count = records.len(), "queries from section document");
    Ok(ProbeOutcome::from_records(records))
}

/// Priority 2: every other `*.m` file under the root, named after its
/// file stem, contents verbatim.
fn probe_query_modules(
    layout: &ModelLayout,
) -> Result<ProbeOutcome<QueryExpression>, ExtractError> {
    let mut records = Vec::new();
    for path in project::list_mashup_files(layout.root())? {
        let name = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let expression = project::read_text(&path)?;
        records.push(QueryExpression::new(name, expression));
    }
    if !records.is_empty() {
        tracing::debug!(count = records.len(), "queries from per-file modules");
    }
    Ok(ProbeOutcome::from_records(records))
}

/// Priority 3: `expression <name> { Value: "..." }` declarations.
fn probe_expression_declarations(
    layout: &ModelLayout,
) -> Result<ProbeOutcome<QueryExpression>, ExtractError> {
    let path = layout.expressions_file();
    if !path.is_file() {
        return Ok(ProbeOutcome::Absent);
    }
    let source = project::read_text(&path)?;
    let records = tmdl::parse_expressions_file(&source)
        .into_iter()
        .map(|decl| QueryExpression::new(decl.name, decl.value))
        .collect();
    Ok(ProbeOutcome::from_records(records))
}
