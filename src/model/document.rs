//! The assembled output document.
//!
//! Top-level key order (`metadata`, `model`, `dataSources`, `queries`) and
//! all nested field casing follow the documented wire format exactly.

use serde::Serialize;

use super::{QueryExpression, Relationship, Table};
use crate::error::ExtractError;

/// Format version tag written into `metadata.version`.
pub const FORMAT_VERSION: &str = "1.0";

/// Source tag written into `metadata.source`.
pub const SOURCE_TAG: &str = "Power BI";

/// The single JSON-serializable document produced by an extraction run.
///
/// Write-once: nothing mutates a document after assembly completes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    pub metadata: Metadata,
    pub model: Model,
    pub data_sources: Vec<DataSource>,
    pub queries: Queries,
}

impl Document {
    /// Serialize with 2-space indentation, the layout the persistence
    /// collaborator writes to disk.
    pub fn to_json_pretty(&self) -> Result<String, ExtractError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Serialize the pretty-printed document into a writer.
    pub fn write_json<W: std::io::Write>(&self, writer: W) -> Result<(), ExtractError> {
        Ok(serde_json::to_writer_pretty(writer, self)?)
    }
}

/// Run metadata. `extract_date` is the one run-to-run unstable field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    pub version: String,
    pub source: String,
    pub extract_date: String,
}

/// The extracted model graph.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Model {
    pub name: String,
    pub tables: Vec<Table>,
    pub relationships: Vec<Relationship>,
    pub expressions: Vec<QueryExpression>,
}

/// Data-source mirror of a query expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub name: String,
    pub connection_details: ConnectionDetails,
}

/// Connection details carrying the raw M expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionDetails {
    pub m: String,
}

/// Flat query list mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Queries {
    pub power_queries: Vec<QueryExpression>,
}
