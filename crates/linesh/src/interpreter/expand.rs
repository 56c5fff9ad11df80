//! Variable expansion
//!
//! Both passes are single-shot: substituted values are never rescanned.

use super::variables::{VariableStore, is_special};

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Substitute `$name`, `${name}` and `$?`-style references in `line`.
///
/// A `$` that does not start a reference (`$`, `$ `, `$(`) is copied through.
/// An unterminated `${` consumes the rest of the line as the name.
pub fn expand(line: &str, vars: &VariableStore) -> String {
    let mut out = String::with_capacity(line.len());
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            out.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('{') => {
                chars.next();
                let name: String = chars.by_ref().take_while(|&c| c != '}').collect();
                out.push_str(&vars.get(&name));
            }
            Some(s) if is_special(s) => {
                chars.next();
                let mut buf = [0u8; 4];
                out.push_str(&vars.get(s.encode_utf8(&mut buf)));
            }
            Some(n) if is_name_char(n) => {
                let mut name = String::new();
                while let Some(&n) = chars.peek() {
                    if !is_name_char(n) {
                        break;
                    }
                    name.push(n);
                    chars.next();
                }
                out.push_str(&vars.get(&name));
            }
            _ => out.push('$'),
        }
    }

    tracing::trace!(input_len = line.len(), output_len = out.len(), "expanded");
    out
}

/// Substitute bare identifiers inside an arithmetic expression.
///
/// An identifier is a `[A-Za-z_][A-Za-z0-9_]*` run not directly preceded by
/// a digit or `$`. Unset or empty variables become `0` so the evaluator never
/// sees a missing operand. Runs preceded by a digit or `$` are copied as-is.
pub fn expand_arithmetic(expr: &str, vars: &VariableStore) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut prev: Option<char> = None;
    let mut chars = expr.chars().peekable();

    while let Some(c) = chars.next() {
        if !(c.is_ascii_alphabetic() || c == '_') {
            out.push(c);
            prev = Some(c);
            continue;
        }

        let mut run = String::from(c);
        while let Some(&n) = chars.peek() {
            if !is_name_char(n) {
                break;
            }
            run.push(n);
            chars.next();
        }

        let literal = matches!(prev, Some(p) if p.is_ascii_digit() || p == '$');
        if literal {
            out.push_str(&run);
        } else {
            let value = vars.get(&run);
            if value.is_empty() {
                out.push('0');
            } else {
                out.push_str(&value);
            }
        }
        prev = run.chars().last();
    }

    tracing::trace!(input_len = expr.len(), output_len = out.len(), "expanded arithmetic");
    out
}

/// Strip one layer of matching `"` or `'` around `s`.
pub fn strip_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Split `line` on `sep` wherever it appears outside single or double quotes.
pub fn split_unquoted<'a>(line: &'a str, sep: &str) -> Vec<&'a str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut rest = line;
    while let Some(pos) = find_unquoted(rest, sep) {
        let abs = line.len() - rest.len() + pos;
        parts.push(&line[start..abs]);
        start = abs + sep.len();
        rest = &line[start..];
    }
    parts.push(&line[start..]);
    parts
}

/// Byte offset of the first `needle` in `haystack` outside quotes.
pub fn find_unquoted(haystack: &str, needle: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in haystack.char_indices() {
        match quote {
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if c == '"' || c == '\'' => quote = Some(c),
            None if haystack[i..].starts_with(needle) => return Some(i),
            None => {}
        }
    }
    None
}
