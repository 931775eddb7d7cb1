//! Text utilities shared by the dialect scanners: identifier quote
//! stripping, escape decoding, and expression whitespace normalization.

/// Strip single-quote delimiters from an identifier.
///
/// A matching pair of quotes is removed from both ends; a lone leading
/// quote (malformed or unterminated input) is removed on its own. Applied
/// uniformly to table and column identifiers.
pub fn strip_name_quotes(name: &str) -> &str {
    if name.len() >= 2 && name.starts_with('\'') && name.ends_with('\'') {
        &name[1..name.len() - 1]
    } else if let Some(stripped) = name.strip_prefix('\'') {
        stripped
    } else {
        name
    }
}

/// Strip a matching pair of single quotes only; a lone quote is kept.
///
/// The per-file relationship dialect uses this narrower rule.
pub fn strip_quote_pair(name: &str) -> &str {
    if name.len() >= 2 && name.starts_with('\'') && name.ends_with('\'') {
        &name[1..name.len() - 1]
    } else {
        name
    }
}

/// Collapse every run of whitespace (tabs, newlines included) to one space.
pub fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;
    for c in text.chars() {
        if c.is_whitespace() {
            in_run = true;
        } else {
            if in_run && !out.is_empty() {
                out.push(' ');
            }
            in_run = false;
            out.push(c);
        }
    }
    out
}

/// Normalize a measure (DAX) expression.
///
/// All whitespace runs collapse to single spaces, then every standalone
/// `VAR` and `RETURN` keyword is moved to the start of its own line. The
/// newline replaces the space before the keyword, so the result never
/// contains two consecutive whitespace characters.
pub fn normalize_measure_expression(raw: &str) -> String {
    let collapsed = collapse_whitespace(raw);
    let mut out = String::with_capacity(collapsed.len() + 8);
    for (i, word) in collapsed.split(' ').enumerate() {
        if i > 0 {
            if word == "VAR" || word == "RETURN" {
                out.push('\n');
            } else {
                out.push(' ');
            }
        }
        out.push_str(word);
    }
    out.trim().to_string()
}

/// Normalize a calculated-column expression: decode the literal two-byte
/// `\n` and `\r` escapes, then collapse all whitespace to single spaces.
pub fn normalize_calculated_expression(raw: &str) -> String {
    let decoded = raw.replace("\\n", "\n").replace("\\r", "");
    collapse_whitespace(&decoded).trim().to_string()
}

/// Decode the escape sequences used by `Value:` strings in the expressions
/// declaration dialect: `\n`, `\"`, and `\\`. Unknown escapes pass through
/// unchanged.
pub fn unescape_value(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("'Sales'", "Sales")]
    #[case("'Sales", "Sales")]
    #[case("Sales", "Sales")]
    #[case("''", "")]
    #[case("'", "")]
    fn test_strip_name_quotes(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_name_quotes(input), expected);
    }

    #[rstest]
    #[case("'Sales'", "Sales")]
    #[case("'Sales", "'Sales")]
    #[case("Sales", "Sales")]
    fn test_strip_quote_pair(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(strip_quote_pair(input), expected);
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a  b\t\nc"), "a b c");
        assert_eq!(collapse_whitespace("  leading"), "leading");
    }

    #[test]
    fn test_measure_normalization_var_return() {
        let raw = "VAR x =\n\t\tSUM(Sales[Amount])\n\tRETURN\n\t\tx * 2";
        assert_eq!(
            normalize_measure_expression(raw),
            "VAR x = SUM(Sales[Amount])\nRETURN x * 2"
        );
    }

    #[test]
    fn test_measure_normalization_no_double_whitespace() {
        let raw = "CALCULATE (\n    SUM ( Sales[Amount] ),\n    VAR   y = 1\n)";
        let normalized = normalize_measure_expression(raw);
        let chars: Vec<char> = normalized.chars().collect();
        for pair in chars.windows(2) {
            assert!(
                !(pair[0].is_whitespace() && pair[1].is_whitespace()),
                "double whitespace in {normalized:?}"
            );
        }
    }

    #[test]
    fn test_measure_keyword_must_stand_alone() {
        // VAR inside a longer word is not a keyword occurrence.
        assert_eq!(normalize_measure_expression("EVAR + 1"), "EVAR + 1");
    }

    #[test]
    fn test_calculated_expression_unescape_and_collapse() {
        assert_eq!(
            normalize_calculated_expression("IF(\\n\\r  [A] > 0,\\n  1, 0)"),
            "IF( [A] > 0, 1, 0)"
        );
    }

    #[rstest]
    #[case(r"let\n  a = 1", "let\n  a = 1")]
    #[case(r#"say \"hi\""#, r#"say "hi""#)]
    #[case(r"a\\b", r"a\b")]
    #[case(r"odd\q", r"odd\q")]
    fn test_unescape_value(#[case] input: &str, #[case] expected: &str) {
        assert_eq!(unescape_value(input), expected);
    }
}
