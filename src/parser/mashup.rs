//! Scanner for the formula-dialect section document.
//!
//! A section document declares `section <name>;` followed by
//! `shared <name> = <body>;` bindings. Bodies are kept verbatim, so the
//! scanner only tracks enough context to find the real terminators: `;`
//! inside double-quoted strings (with `""` doubling), quoted identifiers
//! (`#"..."`), and comments never terminate a binding.

/// A parsed section document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionDocument {
    pub name: String,
    pub shared: Vec<SharedBinding>,
}

/// One `shared <name> = <body>;` binding, body verbatim and trimmed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SharedBinding {
    pub name: String,
    pub body: String,
}

/// Parse a section document. Returns `None` when the source declares no
/// section; the shared list may legitimately be empty.
pub fn parse_section_document(source: &str) -> Option<SectionDocument> {
    let mask = code_mask(source);
    let name = find_section_name(source, &mask)?;
    let shared = scan_shared_bindings(source, &mask);
    Some(SectionDocument { name, shared })
}

fn find_section_name(source: &str, mask: &[bool]) -> Option<String> {
    let bytes = source.as_bytes();
    let mut from = 0;
    while let Some(kw) = find_word(source, mask, "section", from) {
        let after = kw + "section".len();
        if bytes.get(after).is_some_and(|b| b.is_ascii_whitespace()) {
            if let Some(semi) = find_code_byte(bytes, mask, b';', after) {
                let name = source[after..semi].trim();
                if !name.is_empty() {
                    return Some(name.to_string());
                }
            }
        }
        from = kw + 1;
    }
    None
}

fn scan_shared_bindings(source: &str, mask: &[bool]) -> Vec<SharedBinding> {
    let bytes = source.as_bytes();
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(kw) = find_word(source, mask, "shared", pos) {
        let mut i = kw + "shared".len();
        let ws_start = i;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i == ws_start || i >= bytes.len() {
            pos = kw + 1;
            continue;
        }

        let (name, after_name) = if bytes[i] == b'#' && bytes.get(i + 1) == Some(&b'"') {
            match close_of_string(bytes, i + 1) {
                Some(close) => (decode_quoted_identifier(&source[i + 2..close - 1]), close),
                None => {
                    pos = kw + 1;
                    continue;
                }
            }
        } else {
            let start = i;
            let mut j = i;
            while j < bytes.len()
                && !bytes[j].is_ascii_whitespace()
                && bytes[j] != b'='
                && bytes[j] != b';'
            {
                j += 1;
            }
            if j == start {
                pos = kw + 1;
                continue;
            }
            (source[start..j].to_string(), j)
        };

        let mut j = after_name;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if bytes.get(j) != Some(&b'=') {
            pos = kw + 1;
            continue;
        }
        j += 1;

        let Some(semi) = find_code_byte(bytes, mask, b';', j) else {
            pos = kw + 1;
            continue;
        };
        let body = source[j..semi].trim();
        if body.is_empty() {
            pos = semi + 1;
            continue;
        }

        out.push(SharedBinding {
            name,
            body: body.to_string(),
        });
        pos = semi + 1;
    }
    out
}

/// `""` is the quote escape inside `#"..."` identifiers.
fn decode_quoted_identifier(inner: &str) -> String {
    inner.replace("\"\"", "\"")
}

// ---------------------------------------------------------------------------
// context tracking
// ---------------------------------------------------------------------------

/// Byte mask marking positions that are code: outside strings, quoted
/// identifiers, and comments.
fn code_mask(source: &str) -> Vec<bool> {
    let bytes = source.as_bytes();
    let mut mask = vec![false; bytes.len()];
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'"' => {
                i = close_of_string(bytes, i).unwrap_or(bytes.len());
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i += 2;
                while i < bytes.len() && !(bytes[i] == b'*' && bytes.get(i + 1) == Some(&b'/')) {
                    i += 1;
                }
                i = (i + 2).min(bytes.len());
            }
            b'#' if bytes.get(i + 1) == Some(&b'"') => {
                // The opener is code so name parsing can anchor on it.
                mask[i] = true;
                i = close_of_string(bytes, i + 1).unwrap_or(bytes.len());
            }
            _ => {
                mask[i] = true;
                i += 1;
            }
        }
    }
    mask
}

/// Index one past the closing quote of the string opening at `open`,
/// honoring `""` doubling. `None` when unterminated.
fn close_of_string(bytes: &[u8], open: usize) -> Option<usize> {
    let mut i = open + 1;
    while i < bytes.len() {
        if bytes[i] == b'"' {
            if bytes.get(i + 1) == Some(&b'"') {
                i += 2;
            } else {
                return Some(i + 1);
            }
        } else {
            i += 1;
        }
    }
    None
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Next standalone occurrence of `word` in code context at or after `from`.
fn find_word(source: &str, mask: &[bool], word: &str, from: usize) -> Option<usize> {
    let bytes = source.as_bytes();
    let mut i = from;
    while i < source.len() {
        let rel = source[i..].find(word)?;
        let start = i + rel;
        let end = start + word.len();
        let boundary_before = start == 0 || !is_word_byte(bytes[start - 1]);
        let boundary_after = end >= bytes.len() || !is_word_byte(bytes[end]);
        if boundary_before && boundary_after && mask[start..end].iter().all(|&b| b) {
            return Some(start);
        }
        i = start + 1;
    }
    None
}

fn find_code_byte(bytes: &[u8], mask: &[bool], target: u8, from: usize) -> Option<usize> {
    (from..bytes.len()).find(|&i| mask[i] && bytes[i] == target)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECTION: &str = r#"section Section1;

shared Sales = let
    Source = Csv.Document(File.Contents("C:\data\sales.csv"))
in
    Source;

shared #"Customer List" = let
    Source = Excel.Workbook(File.Contents("customers.xlsx"))
in
    Source;
"#;

    #[test]
    fn test_section_name() {
        let doc = parse_section_document(SECTION).unwrap();
        assert_eq!(doc.name, "Section1");
    }

    #[test]
    fn test_shared_bindings() {
        let doc = parse_section_document(SECTION).unwrap();
        assert_eq!(doc.shared.len(), 2);
        assert_eq!(doc.shared[0].name, "Sales");
        assert!(doc.shared[0].body.starts_with("let"));
        assert!(doc.shared[0].body.ends_with("Source"));
        assert_eq!(doc.shared[1].name, "Customer List");
    }

    #[test]
    fn test_no_section_declaration() {
        assert!(parse_section_document("shared X = 1;").is_none());
    }

    #[test]
    fn test_section_with_zero_bindings() {
        let doc = parse_section_document("section Report;\n").unwrap();
        assert_eq!(doc.name, "Report");
        assert!(doc.shared.is_empty());
    }

    #[test]
    fn test_semicolon_inside_string_does_not_terminate() {
        let source = "section S;\nshared Q = Text.Combine({\"a;b\", \"c\"});\n";
        let doc = parse_section_document(source).unwrap();
        assert_eq!(doc.shared.len(), 1);
        assert_eq!(doc.shared[0].body, "Text.Combine({\"a;b\", \"c\"})");
    }

    #[test]
    fn test_semicolon_inside_comment_does_not_terminate() {
        let source = "section S;\nshared Q = let // note; not a terminator\n  a = 1\nin a;\n";
        let doc = parse_section_document(source).unwrap();
        assert_eq!(doc.shared.len(), 1);
        assert!(doc.shared[0].body.ends_with("in a"));
    }

    #[test]
    fn test_doubled_quote_in_identifier() {
        let source = "section S;\nshared #\"A\"\"B\" = 1;\n";
        let doc = parse_section_document(source).unwrap();
        assert_eq!(doc.shared[0].name, "A\"B");
    }
}
