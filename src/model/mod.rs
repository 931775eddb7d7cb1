//! Semantic model entities extracted from the source tree.
//!
//! Field names and declaration order are a compatibility surface: they
//! serialize to the exact wire shape downstream tooling consumes (see
//! [`document`]). Treat them as a versioned format, not an implementation
//! detail.

mod document;

pub use document::{
    ConnectionDetails, DataSource, Document, Metadata, Model, Queries, FORMAT_VERSION, SOURCE_TAG,
};

use serde::Serialize;

/// One analytical table with its columns and measures.
///
/// Identity key is `name`, case-sensitive. Duplicate table names are not
/// deduplicated; when matched by name downstream, every same-named table
/// receives the match.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    /// Placeholder field, currently always empty.
    pub description: String,
    pub measures: Vec<Measure>,
    pub columns: Vec<Column>,
    /// Populated only by the assembler, for tables whose name matches a
    /// query expression.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partitions: Option<Vec<Partition>>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            measures: Vec::new(),
            columns: Vec::new(),
            partitions: None,
        }
    }
}

/// A stored or calculated column.
///
/// Stored columns carry only `name` and `dataType`; calculated columns
/// additionally carry `type: "calculated"` and a normalized `expression`,
/// with `dataType` set to the literal `"calculated"`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Column {
    pub name: String,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub column_type: Option<String>,
    pub data_type: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expression: Option<String>,
}

impl Column {
    /// A stored column with an explicit data type.
    pub fn stored(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: None,
            data_type: data_type.into(),
            description: String::new(),
            expression: None,
        }
    }

    /// A calculated column derived from a row-level expression.
    pub fn calculated(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            column_type: Some("calculated".to_string()),
            data_type: "calculated".to_string(),
            description: String::new(),
            expression: Some(expression.into()),
        }
    }
}

/// A named aggregation formula attached to a table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Measure {
    pub name: String,
    pub description: String,
    pub expression: String,
    pub format_string: String,
    pub display_folder: String,
}

impl Measure {
    pub fn new(
        name: impl Into<String>,
        expression: impl Into<String>,
        format_string: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            expression: expression.into(),
            format_string: format_string.into(),
            display_folder: String::new(),
        }
    }
}

/// Default filter propagation when a relationship does not declare one.
pub const DEFAULT_CROSS_FILTERING: &str = "bothDirections";

/// A join between two table columns.
///
/// Endpoints are not checked against the extracted tables; dangling
/// references pass through and surface as non-fatal warnings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relationship {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub cross_filtering_behavior: String,
}

/// A named query (M) expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryExpression {
    pub name: String,
    pub expression: String,
}

impl QueryExpression {
    pub fn new(name: impl Into<String>, expression: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
        }
    }
}

/// A binding of a table to one data-loading expression.
///
/// Synthesized during assembly for tables whose name exactly equals a
/// query expression's name; never extracted directly.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Partition {
    pub name: String,
    pub source: PartitionSource,
}

impl Partition {
    /// Build the partition that binds a table to its matching query.
    pub fn for_query(query: &QueryExpression) -> Self {
        Self {
            name: format!("{} Partition", query.name),
            source: PartitionSource {
                source_type: "m".to_string(),
                expression: query.expression.clone(),
            },
        }
    }
}

/// Source half of a [`Partition`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartitionSource {
    #[serde(rename = "type")]
    pub source_type: String,
    pub expression: String,
}
