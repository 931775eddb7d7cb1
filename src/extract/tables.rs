//! Stage 1: tables, columns, and measures.

use rayon::prelude::*;

use crate::error::ExtractError;
use crate::model::{Column, Measure, Table};
use crate::parser::text::{normalize_calculated_expression, normalize_measure_expression};
use crate::parser::tmdl;
use crate::project::{self, ModelLayout};

/// Extract every table from `<root>/Model/tables/*.tmdl`.
///
/// Files parse independently and in parallel; results keep the sorted
/// file order. A file without a table declaration contributes nothing.
pub fn extract_tables(layout: &ModelLayout) -> Result<Vec<Table>, ExtractError> {
    let files = project::list_dialect_files(&layout.tables_dir())?;

    let parsed: Vec<Option<Table>> = files
        .par_iter()
        .map(|path| {
            let source = project::read_text(path)?;
            Ok(table_from_source(&source))
        })
        .collect::<Result<_, ExtractError>>()?;

    let tables: Vec<Table> = parsed.into_iter().flatten().collect();
    tracing::debug!(
        files = files.len(),
        tables = tables.len(),
        "table extraction complete"
    );
    Ok(tables)
}

/// Build one table record from one file's contents.
///
/// Stored columns come first, then calculated columns, each group in
/// source order. A column block declared with both patterns yields both a
/// stored and a calculated entry; this is deliberate, the two patterns
/// are structurally exclusive in well-formed input.
pub fn table_from_source(source: &str) -> Option<Table> {
    let decl = tmdl::parse_table_file(source)?;
    let mut table = Table::new(decl.name);

    for column in &decl.columns {
        if let Some(data_type) = &column.data_type {
            table.columns.push(Column::stored(&column.name, data_type));
        }
    }
    for column in &decl.columns {
        if let Some(expression) = &column.calculated_expression {
            table.columns.push(Column::calculated(
                &column.name,
                normalize_calculated_expression(expression),
            ));
        }
    }

    for measure in &decl.measures {
        table.measures.push(Measure::new(
            &measure.name,
            normalize_measure_expression(&measure.expression),
            measure.format_string.clone().unwrap_or_default(),
        ));
    }

    Some(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_then_calculated_order() {
        let source = "\
table T
\tcolumn Derived
\t\t{
\t\t\ttype: calculated
\t\t\texpression: '[A] + [B]'
\t\t}
\tcolumn A
\t\t{
\t\t\tdataType: int64
\t\t}
";
        let table = table_from_source(source).unwrap();
        let names: Vec<&str> = table.columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["A", "Derived"]);
        assert_eq!(table.columns[0].data_type, "int64");
        assert_eq!(table.columns[1].data_type, "calculated");
        assert_eq!(table.columns[1].column_type.as_deref(), Some("calculated"));
        assert_eq!(table.columns[1].expression.as_deref(), Some("[A] + [B]"));
    }

    #[test]
    fn test_measure_normalization_applied() {
        let source = "\
table T
\tmeasure M = VAR x =\t\tSUM(T[A])\n\t\tRETURN   x\n\tannotation a = b
";
        let table = table_from_source(source).unwrap();
        assert_eq!(table.measures[0].expression, "VAR x = SUM(T[A])\nRETURN x");
        assert_eq!(table.measures[0].format_string, "");
        assert_eq!(table.measures[0].display_folder, "");
    }

    #[test]
    fn test_calculated_expression_escapes_decoded() {
        let source = "\
table T
\tcolumn C
\t\t{
\t\t\ttype: calculated
\t\t\texpression: 'IF(\\n  [A] > 0,\\n  1,\\n  0\\n)'
\t\t}
";
        let table = table_from_source(source).unwrap();
        assert_eq!(
            table.columns[0].expression.as_deref(),
            Some("IF( [A] > 0, 1, 0 )")
        );
    }

    #[test]
    fn test_calculated_expression_with_real_newlines_collapsed() {
        let source = "\
table T
\tcolumn C
\t\t{
\t\t\ttype: calculated
\t\t\texpression: 'IF(
\t\t\t\t[A] > 0,
\t\t\t\t1,
\t\t\t\t0)'
\t\t}
";
        let table = table_from_source(source).unwrap();
        assert_eq!(table.columns.len(), 1);
        assert_eq!(
            table.columns[0].expression.as_deref(),
            Some("IF( [A] > 0, 1, 0)")
        );
    }

    #[test]
    fn test_no_table_yields_none() {
        assert!(table_from_source("// just a comment\n").is_none());
    }
}
