//! Dialect scanners built on a logos lexer.
//!
//! Two dialects are covered:
//! - the table-definition dialect (tables, columns, measures,
//!   relationships, expression declarations) in [`tmdl`]
//! - the formula dialect's section document (`section` / `shared`) in
//!   [`mashup`]
//!
//! Scanners are pure functions from source text to raw declarations; they
//! never touch the filesystem and never fail — unmatched input is simply
//! absent from the result.

pub mod lexer;
pub mod mashup;
pub mod text;
pub mod tmdl;

pub use lexer::{Lexer, Token, TokenKind, tokenize};
pub use mashup::{SectionDocument, SharedBinding, parse_section_document};
pub use tmdl::{
    ColumnDecl, ExpressionDecl, MeasureDecl, RelationshipDecl, TableDecl,
    parse_aggregated_relationships, parse_expressions_file, parse_relationship_file,
    parse_table_file,
};
