//! Line cursor for linesh scripts
//!
//! Turns physical source lines into logical lines. Blank lines and `#`
//! comments are dropped, and a line that opens with a control keyword is
//! split on unquoted `;` so one-line compounds read like their multi-line
//! form.

use std::collections::VecDeque;

use crate::interpreter::expand::find_unquoted;

/// Words that open, continue or close a block.
pub const KEYWORDS: &[&str] = &[
    "if", "elif", "else", "then", "fi", "for", "while", "do", "done", "case", "esac",
];

/// Keywords that may be followed by a command on the same logical line.
const LEADING_KEYWORDS: &[&str] = &["then", "do", "else"];

/// First whitespace-delimited word of a line.
pub fn first_word(line: &str) -> &str {
    line.split_whitespace().next().unwrap_or("")
}

/// Whether the line opens with a control keyword.
pub fn starts_with_keyword(line: &str) -> bool {
    KEYWORDS.contains(&first_word(line))
}

/// Forward-only cursor over logical lines.
pub struct Lexer<I> {
    source: I,
    pending: VecDeque<String>,
    line_number: usize,
}

impl<I> Lexer<I>
where
    I: Iterator,
    I::Item: AsRef<str>,
{
    /// Create a cursor over physical lines.
    pub fn new(source: I) -> Self {
        Self {
            source,
            pending: VecDeque::new(),
            line_number: 0,
        }
    }

    /// Number of physical lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Next logical line, or `None` at end of input.
    pub fn next_line(&mut self) -> Option<String> {
        if self.pending.is_empty() {
            self.fill();
        }
        self.pending.pop_front()
    }

    /// Look at the next logical line without consuming it.
    pub fn peek_line(&mut self) -> Option<&str> {
        if self.pending.is_empty() {
            self.fill();
        }
        self.pending.front().map(String::as_str)
    }

    /// Pull physical lines until one yields at least one logical line.
    fn fill(&mut self) {
        for raw in self.source.by_ref() {
            self.line_number += 1;
            let line = raw.as_ref().trim_end_matches(['\n', '\r']).trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            if starts_with_keyword(line) {
                self.pending.extend(split_compound(line));
            } else {
                self.pending.push_back(line.to_string());
            }

            if !self.pending.is_empty() {
                tracing::trace!(line = self.line_number, "read line");
                return;
            }
        }
    }
}

/// Split a keyword-led physical line into logical lines.
///
/// `;;` survives as its own line, leading `then`/`do`/`else` are detached
/// from the command that follows them, and `case X in REST` breaks after `in`.
pub fn split_compound(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    for segment in split_segments(line) {
        let mut segment = segment.trim();
        loop {
            if segment.is_empty() {
                break;
            }
            let word = first_word(segment);
            if LEADING_KEYWORDS.contains(&word) && segment.len() > word.len() {
                out.push(word.to_string());
                segment = segment[word.len()..].trim_start();
                continue;
            }
            if word == "case" {
                if let Some((header, rest)) = split_case_header(segment) {
                    out.push(header.to_string());
                    segment = rest;
                    continue;
                }
            }
            out.push(segment.to_string());
            break;
        }
    }
    out
}

/// Split on unquoted `;`, keeping `;;` as a segment of its own.
fn split_segments(line: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut rest = line;
    while let Some(pos) = find_unquoted(rest, ";") {
        segments.push(&rest[..pos]);
        if rest[pos..].starts_with(";;") {
            segments.push(";;");
            rest = &rest[pos + 2..];
        } else {
            rest = &rest[pos + 1..];
        }
    }
    segments.push(rest);
    segments
}

/// `case X in REST` -> (`case X in`, `REST`) when REST is non-empty.
fn split_case_header(segment: &str) -> Option<(&str, &str)> {
    let mut offset = 0;
    for word in segment.split_whitespace() {
        let start = offset + segment[offset..].find(word)?;
        offset = start + word.len();
        if word == "in" {
            let rest = segment[offset..].trim_start();
            return (!rest.is_empty()).then_some((&segment[..offset], rest));
        }
    }
    None
}
