//! Block scanners for the table-definition dialect.
//!
//! The dialect has no published grammar, so these scanners work the way the
//! files are actually structured: declarations are anchored to line starts,
//! attribute blocks are brace-delimited with explicit depth tracking, and
//! raw expression text is sliced back out of the source between token
//! offsets. Quoted names and strings are single tokens, so braces inside
//! them never disturb block depth.
//!
//! Scanners return raw declarations; expression normalization happens in
//! the extraction layer.

use super::lexer::{Token, TokenKind, tokenize};
use super::text::{strip_name_quotes, strip_quote_pair, unescape_value};

/// One table declaration with its raw column and measure declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableDecl {
    pub name: String,
    pub columns: Vec<ColumnDecl>,
    pub measures: Vec<MeasureDecl>,
}

/// One column block. A block can carry both a `dataType` attribute and a
/// calculated pattern (`type: calculated` plus `expression:`); the two are
/// structurally exclusive in well-formed input but both are kept when they
/// co-occur.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDecl {
    pub name: String,
    pub data_type: Option<String>,
    pub calculated_expression: Option<String>,
}

/// One measure declaration with its raw (unnormalized) expression.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeasureDecl {
    pub name: String,
    pub expression: String,
    /// Looked up inside the measure's own attribute region, never
    /// file-wide.
    pub format_string: Option<String>,
}

/// One relationship, from either the aggregated or the per-file dialect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationshipDecl {
    pub from_table: String,
    pub from_column: String,
    pub to_table: String,
    pub to_column: String,
    pub cross_filtering_behavior: Option<String>,
}

/// One `expression <name> { ... Value: "..." ... }` block, value decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpressionDecl {
    pub name: String,
    pub value: String,
}

/// Parse one table-definition file. Returns `None` when the file contains
/// no table declaration; that is structural absence, not an error.
pub fn parse_table_file(source: &str) -> Option<TableDecl> {
    let tokens = tokenize(source);

    let table_idx = tokens
        .iter()
        .position(|t| t.kind == TokenKind::Ident && t.text == "table")?;
    let name_start = tokens[table_idx].end();
    let mut name_end = source.len();
    for t in &tokens[table_idx + 1..] {
        if matches!(t.kind, TokenKind::Newline | TokenKind::LBrace) {
            name_end = t.offset;
            break;
        }
    }
    let name = strip_name_quotes(source[name_start..name_end].trim());
    if name.is_empty() {
        return None;
    }

    let mut decl = TableDecl {
        name: name.to_string(),
        columns: Vec::new(),
        measures: Vec::new(),
    };

    let mut i = 0;
    while i < tokens.len() {
        let t = tokens[i];
        if t.kind == TokenKind::Ident && is_line_start(&tokens, i) {
            match t.text {
                "column" => {
                    i = scan_column(source, &tokens, i, &mut decl.columns);
                    continue;
                }
                "measure" => {
                    i = scan_measure(source, &tokens, i, &mut decl.measures);
                    continue;
                }
                _ => {}
            }
        }
        i += 1;
    }

    Some(decl)
}

/// Parse the aggregated relationships dialect: blocks of
/// `relationship <id>` followed by `fromColumn:` and `toColumn:` lines with
/// dotted `table.column` values. Blocks whose sides do not split on `.`
/// are skipped without aborting the scan.
pub fn parse_aggregated_relationships(source: &str) -> Vec<RelationshipDecl> {
    let lines: Vec<&str> = source.lines().collect();
    let mut out = Vec::new();
    let mut i = 0;
    while i < lines.len() {
        let Some(id) = lines[i].trim().strip_prefix("relationship") else {
            i += 1;
            continue;
        };
        if !id.starts_with([' ', '\t']) || id.trim().is_empty() {
            i += 1;
            continue;
        }
        let Some(f) = next_content_line(&lines, i + 1) else {
            break;
        };
        let Some(t) = next_content_line(&lines, f + 1) else {
            break;
        };
        let (Some(from_value), Some(to_value)) = (
            lines[f].trim().strip_prefix("fromColumn:"),
            lines[t].trim().strip_prefix("toColumn:"),
        ) else {
            i += 1;
            continue;
        };
        match (split_dotted(from_value), split_dotted(to_value)) {
            (Some((from_table, from_column)), Some((to_table, to_column))) => {
                out.push(RelationshipDecl {
                    from_table,
                    from_column,
                    to_table,
                    to_column,
                    cross_filtering_behavior: None,
                });
            }
            _ => {
                tracing::debug!(
                    line = i + 1,
                    "skipping relationship block with undotted column reference"
                );
            }
        }
        i = t + 1;
    }
    out
}

/// Parse one per-relationship file: four required labeled attributes plus
/// an optional `crossFilteringBehavior:`. Returns `None` unless all four
/// required attributes are present.
pub fn parse_relationship_file(source: &str) -> Option<RelationshipDecl> {
    let from_table = find_labeled_value(source, "fromTable:")?;
    let from_column = find_labeled_value(source, "fromColumn:")?;
    let to_table = find_labeled_value(source, "toTable:")?;
    let to_column = find_labeled_value(source, "toColumn:")?;
    let cross = find_labeled_value(source, "crossFilteringBehavior:");

    Some(RelationshipDecl {
        from_table: strip_quote_pair(&from_table).to_string(),
        from_column: strip_quote_pair(&from_column).to_string(),
        to_table: strip_quote_pair(&to_table).to_string(),
        to_column: strip_quote_pair(&to_column).to_string(),
        cross_filtering_behavior: cross,
    })
}

/// Parse the expressions declaration dialect: `expression <name> { ... }`
/// blocks whose body carries a `Value: "<escaped>"` attribute. Blocks
/// without a usable `Value` contribute nothing.
pub fn parse_expressions_file(source: &str) -> Vec<ExpressionDecl> {
    let tokens = tokenize(source);
    let mut out = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        let t = tokens[i];
        if !(t.kind == TokenKind::Ident && t.text == "expression" && is_line_start(&tokens, i)) {
            i += 1;
            continue;
        }
        let Some(name_idx) = next_significant(&tokens, i + 1) else {
            break;
        };
        if !matches!(
            tokens[name_idx].kind,
            TokenKind::Ident | TokenKind::QuotedName | TokenKind::Text
        ) {
            i = name_idx;
            continue;
        }
        let name = strip_name_quotes(tokens[name_idx].text).to_string();

        let open = match next_significant(&tokens, name_idx + 1) {
            Some(idx) if tokens[idx].kind == TokenKind::LBrace => idx,
            _ => {
                i = name_idx + 1;
                continue;
            }
        };
        let Some(close) = find_matching_brace(&tokens, open) else {
            break;
        };

        if let Some(value) = block_string_attribute(&tokens[open + 1..close], "Value") {
            out.push(ExpressionDecl {
                name,
                value: unescape_value(&value),
            });
        }
        i = close + 1;
    }
    out
}

// ---------------------------------------------------------------------------
// token stream helpers
// ---------------------------------------------------------------------------

/// True when `tokens[i]` is the first non-space token on its line.
fn is_line_start(tokens: &[Token], i: usize) -> bool {
    let mut j = i;
    while j > 0 {
        match tokens[j - 1].kind {
            TokenKind::Space => j -= 1,
            TokenKind::Newline => return true,
            _ => return false,
        }
    }
    true
}

/// Index of the next non-trivia token at or after `from`.
fn next_significant(tokens: &[Token], from: usize) -> Option<usize> {
    (from..tokens.len()).find(|&j| !tokens[j].is_trivia())
}

/// Index of the brace matching the opener at `open`, tracking nesting.
fn find_matching_brace(tokens: &[Token], open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (j, t) in tokens.iter().enumerate().skip(open) {
        match t.kind {
            TokenKind::LBrace => depth += 1,
            TokenKind::RBrace => {
                depth -= 1;
                if depth == 0 {
                    return Some(j);
                }
            }
            _ => {}
        }
    }
    None
}

fn is_declaration_keyword(text: &str) -> bool {
    matches!(text, "table" | "column" | "measure" | "partition")
}

/// Value of a `<key>: <token>` attribute inside a block, if present.
fn find_attribute_token(block: &[Token], key: &str) -> Option<String> {
    attribute_value_index(block, key).map(|v| block[v].text.to_string())
}

/// Value of a `<key>: '<text>'` attribute inside a block. Empty quoted
/// values count as absent.
///
/// Quoted-name tokens are single-line, so a value spanning real newlines
/// never forms one; the opening quote surfaces as a lone stray token
/// instead, and the value is sliced out of the raw source up to the next
/// closing quote, wherever that is.
fn find_attribute_quoted(source: &str, block: &[Token], key: &str) -> Option<String> {
    let v = attribute_value_index(block, key)?;
    let token = block[v];
    if token.kind == TokenKind::QuotedName {
        let inner = &token.text[1..token.text.len() - 1];
        return (!inner.is_empty()).then(|| inner.to_string());
    }
    if token.text.starts_with('\'') && !token.text.ends_with('\'') || token.text == "'" {
        let start = token.offset + 1;
        let close = source[start..].find('\'')?;
        let inner = &source[start..start + close];
        return (!inner.is_empty()).then(|| inner.to_string());
    }
    None
}

/// Index of the value token of the first `<key>:` attribute in a block.
fn attribute_value_index(block: &[Token], key: &str) -> Option<usize> {
    let mut i = 0;
    while i < block.len() {
        if block[i].kind == TokenKind::Ident && block[i].text == key {
            if let Some(colon) = next_significant(block, i + 1) {
                if block[colon].kind == TokenKind::Colon {
                    if let Some(v) = next_significant(block, colon + 1) {
                        return Some(v);
                    }
                }
            }
        }
        i += 1;
    }
    None
}

/// Value of a `<key>: "<string>"` attribute inside a block, quotes
/// stripped, escapes left as-is. Empty strings count as absent.
fn block_string_attribute(block: &[Token], key: &str) -> Option<String> {
    let v = attribute_value_index(block, key)?;
    if block[v].kind != TokenKind::String {
        return None;
    }
    let inner = &block[v].text[1..block[v].text.len() - 1];
    (!inner.is_empty()).then(|| inner.to_string())
}

// ---------------------------------------------------------------------------
// column and measure scanning
// ---------------------------------------------------------------------------

/// Scan one column declaration starting at the `column` keyword; returns
/// the index to resume the outer scan at.
fn scan_column(source: &str, tokens: &[Token], kw: usize, out: &mut Vec<ColumnDecl>) -> usize {
    let Some(name_idx) = next_significant(tokens, kw + 1) else {
        return kw + 1;
    };
    let name_token = tokens[name_idx];
    if !matches!(
        name_token.kind,
        TokenKind::Ident | TokenKind::QuotedName | TokenKind::Text
    ) {
        return kw + 1;
    }
    let name = strip_name_quotes(name_token.text).to_string();

    // Find the block opener without crossing into another declaration.
    let mut open = None;
    let mut j = name_idx + 1;
    while j < tokens.len() {
        match tokens[j].kind {
            TokenKind::LBrace => {
                open = Some(j);
                break;
            }
            TokenKind::Ident
                if is_line_start(tokens, j) && is_declaration_keyword(tokens[j].text) =>
            {
                break;
            }
            _ => {}
        }
        j += 1;
    }
    let Some(open) = open else {
        return name_idx + 1;
    };
    let Some(close) = find_matching_brace(tokens, open) else {
        return open + 1;
    };

    let block = &tokens[open + 1..close];
    let data_type = find_attribute_token(block, "dataType");
    let calculated = find_attribute_token(block, "type").is_some_and(|v| v == "calculated");
    let calculated_expression = if calculated {
        find_attribute_quoted(source, block, "expression")
    } else {
        None
    };

    if data_type.is_some() || calculated_expression.is_some() {
        out.push(ColumnDecl {
            name,
            data_type,
            calculated_expression,
        });
    }
    close + 1
}

/// Scan one measure declaration starting at the `measure` keyword.
///
/// The expression runs from `=` to the first `formatString` attribute or a
/// line-start `annotation` block. A `;`, a new declaration, or end of input
/// before a terminator means the measure is malformed and is skipped.
fn scan_measure(source: &str, tokens: &[Token], kw: usize, out: &mut Vec<MeasureDecl>) -> usize {
    // Name runs up to the `=` on the declaration line.
    let mut eq = None;
    let mut j = kw + 1;
    while j < tokens.len() {
        match tokens[j].kind {
            TokenKind::Eq => {
                eq = Some(j);
                break;
            }
            TokenKind::Newline => break,
            _ => {}
        }
        j += 1;
    }
    let Some(eq) = eq else {
        return kw + 1;
    };

    let raw_name = source[tokens[kw].end()..tokens[eq].offset].trim();
    let raw_name = raw_name.strip_prefix('\'').unwrap_or(raw_name);
    let raw_name = raw_name.strip_suffix('\'').unwrap_or(raw_name);
    let name = raw_name.trim();
    if name.is_empty() {
        return eq + 1;
    }

    let mut term = None;
    let mut k = eq + 1;
    while k < tokens.len() {
        let t = tokens[k];
        match t.kind {
            TokenKind::Semicolon => break,
            TokenKind::Ident if t.text == "formatString" => {
                term = Some(k);
                break;
            }
            TokenKind::Ident if t.text == "annotation" && is_line_start(tokens, k) => {
                term = Some(k);
                break;
            }
            TokenKind::Ident if is_line_start(tokens, k) && is_declaration_keyword(t.text) => break,
            _ => {}
        }
        k += 1;
    }
    let Some(term) = term else {
        return eq + 1;
    };

    let expression = source[tokens[eq].end()..tokens[term].offset].trim();
    if expression.is_empty() {
        return term + 1;
    }

    out.push(MeasureDecl {
        name: name.to_string(),
        expression: expression.to_string(),
        format_string: measure_format_string(tokens, term),
    });
    term + 1
}

/// First `formatString: "..."` inside the measure's own attribute region:
/// from the expression terminator up to the next line-start declaration.
fn measure_format_string(tokens: &[Token], from: usize) -> Option<String> {
    let mut i = from;
    while i < tokens.len() {
        let t = tokens[i];
        if i > from
            && t.kind == TokenKind::Ident
            && is_line_start(tokens, i)
            && is_declaration_keyword(t.text)
        {
            return None;
        }
        if t.kind == TokenKind::Ident && t.text == "formatString" {
            if let Some(colon) = next_significant(tokens, i + 1) {
                if tokens[colon].kind == TokenKind::Colon {
                    if let Some(v) = next_significant(tokens, colon + 1) {
                        if tokens[v].kind == TokenKind::String {
                            let inner = &tokens[v].text[1..tokens[v].text.len() - 1];
                            return (!inner.is_empty()).then(|| inner.to_string());
                        }
                    }
                }
            }
            return None;
        }
        i += 1;
    }
    None
}

fn next_content_line(lines: &[&str], from: usize) -> Option<usize> {
    (from..lines.len()).find(|&j| !lines[j].trim().is_empty())
}

/// Split a dotted `table.column` reference on the first `.`, stripping
/// single-quote wrapping from each half.
fn split_dotted(value: &str) -> Option<(String, String)> {
    let (table, column) = value.trim().split_once('.')?;
    Some((
        table.trim().trim_matches('\'').to_string(),
        column.trim().trim_matches('\'').to_string(),
    ))
}

/// First `<label> <value>` occurrence anywhere in the file: at least one
/// whitespace character after the label, value is the following run of
/// non-whitespace.
fn find_labeled_value(source: &str, label: &str) -> Option<String> {
    let mut search = source;
    while let Some(idx) = search.find(label) {
        let rest = &search[idx + label.len()..];
        let trimmed = rest.trim_start();
        if trimmed.len() < rest.len() {
            let value: String = trimmed.chars().take_while(|c| !c.is_whitespace()).collect();
            if !value.is_empty() {
                return Some(value);
            }
        }
        search = rest;
    }
    None
}
