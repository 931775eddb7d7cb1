//! Stage 4: assemble the output document.
//!
//! A pure merge over the three extraction outputs. For each query, in
//! order: append to the model-level expression list, mirror into the
//! data-source list, attach a synthesized partition to every table whose
//! name equals the query's name, and mirror into the flat query list.

use std::time::{SystemTime, UNIX_EPOCH};

use rustc_hash::FxHashMap;

use crate::model::{
    ConnectionDetails, DataSource, Document, FORMAT_VERSION, Metadata, Model, Partition, Queries,
    QueryExpression, Relationship, SOURCE_TAG, Table,
};

/// Merge extraction outputs into the final document. No I/O, no failure.
pub fn assemble(
    model_name: String,
    mut tables: Vec<Table>,
    relationships: Vec<Relationship>,
    queries: Vec<QueryExpression>,
    extract_date: String,
) -> Document {
    // Duplicate table names are not deduplicated; every same-named table
    // receives the partition.
    let mut by_name: FxHashMap<String, Vec<usize>> = FxHashMap::default();
    for (i, table) in tables.iter().enumerate() {
        by_name.entry(table.name.clone()).or_default().push(i);
    }

    let mut expressions = Vec::with_capacity(queries.len());
    let mut data_sources = Vec::with_capacity(queries.len());
    let mut power_queries = Vec::with_capacity(queries.len());

    for query in queries {
        expressions.push(query.clone());
        data_sources.push(DataSource {
            name: query.name.clone(),
            connection_details: ConnectionDetails {
                m: query.expression.clone(),
            },
        });
        if let Some(indices) = by_name.get(&query.name) {
            for &i in indices {
                tables[i]
                    .partitions
                    .get_or_insert_with(Vec::new)
                    .push(Partition::for_query(&query));
            }
        }
        power_queries.push(query);
    }

    Document {
        metadata: Metadata {
            version: FORMAT_VERSION.to_string(),
            source: SOURCE_TAG.to_string(),
            extract_date,
        },
        model: Model {
            name: model_name,
            tables,
            relationships,
            expressions,
        },
        data_sources,
        queries: Queries { power_queries },
    }
}

/// Wall-clock extraction timestamp, ISO 8601 UTC. The one run-to-run
/// unstable value in the document.
pub fn current_timestamp() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    iso_utc(secs)
}

fn iso_utc(secs: u64) -> String {
    let days = (secs / 86_400) as i64;
    let rem = secs % 86_400;
    let (year, month, day) = civil_from_days(days);
    format!(
        "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z",
        year,
        month,
        day,
        rem / 3600,
        rem % 3600 / 60,
        rem % 60
    )
}

// Days-since-epoch to calendar date (proleptic Gregorian).
fn civil_from_days(z: i64) -> (i64, u32, u32) {
    let z = z + 719_468;
    let era = z.div_euclid(146_097);
    let doe = z.rem_euclid(146_097);
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let year = yoe + era * 400;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u32;
    let month = if mp < 10 { mp + 3 } else { mp - 9 } as u32;
    (if month <= 2 { year + 1 } else { year }, month, day)
}
