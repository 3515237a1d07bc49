//! Just enough Python to rewrite and inspect ingest transform scripts.
//!
//! [`lexer`] turns source into a lossless token stream and [`lines`] groups
//! it into statement lines. The helpers below answer the structural
//! questions the Koza migration and Biolink documentation need: where does
//! this bracket close, what are the top-level arguments, what is the value
//! of this string literal.

use std::ops::Range;

pub mod lexer;
pub mod lines;

pub use lexer::{concat, tokenize, Token, TokenKind};
pub use lines::{logical_lines, LogicalLine, Module};

fn closing(open: &str) -> Option<&'static str> {
    match open {
        "(" => Some(")"),
        "[" => Some("]"),
        "{" => Some("}"),
        _ => None,
    }
}

/// Index of the bracket closing the one at `open`.
pub fn matching_close(tokens: &[Token<'_>], open: usize) -> Option<usize> {
    closing(tokens.get(open)?.text)?;
    let mut depth = 0usize;
    for (i, token) in tokens.iter().enumerate().skip(open) {
        if token.kind != TokenKind::Op {
            continue;
        }
        match token.text {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => {
                depth -= 1;
                if depth == 0 {
                    return Some(i);
                }
            }
            _ => {}
        }
    }
    None
}

/// Split `range` at `separator` operators that are not nested in brackets.
///
/// A trailing separator does not produce an empty final part.
pub fn split_top_level(tokens: &[Token<'_>], range: Range<usize>, separator: &str) -> Vec<Range<usize>> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = range.start;
    for i in range.clone() {
        let token = &tokens[i];
        if token.kind != TokenKind::Op {
            continue;
        }
        match token.text {
            "(" | "[" | "{" => depth += 1,
            ")" | "]" | "}" => depth = depth.saturating_sub(1),
            t if t == separator && depth == 0 => {
                parts.push(start..i);
                start = i + 1;
            }
            _ => {}
        }
    }
    if start < range.end && tokens[start..range.end].iter().any(|t| !t.is_trivia()) {
        parts.push(start..range.end);
    }
    parts
}

/// `range` with leading and trailing trivia removed.
pub fn trim(tokens: &[Token<'_>], range: Range<usize>) -> Range<usize> {
    let mut start = range.start;
    let mut end = range.end;
    while start < end && tokens[start].is_trivia() {
        start += 1;
    }
    while end > start && tokens[end - 1].is_trivia() {
        end -= 1;
    }
    start..end
}

/// The first non-trivia token at or after `from`, before `end`.
pub fn next_significant(tokens: &[Token<'_>], from: usize, end: usize) -> Option<usize> {
    (from..end.min(tokens.len())).find(|&i| !tokens[i].is_trivia())
}

/// The last non-trivia token before `before`.
pub fn prev_significant(tokens: &[Token<'_>], before: usize) -> Option<usize> {
    (0..before).rev().find(|&i| !tokens[i].is_trivia())
}

/// Split a string literal into its prefix and quoted body.
fn split_literal(text: &str) -> Option<(&str, &str)> {
    let quote_at = text.find(['\'', '"'])?;
    let (prefix, quoted) = text.split_at(quote_at);
    let quote = &quoted[..1];
    let delimiter = if quoted.len() >= 6 && quoted.starts_with(&quote.repeat(3)) {
        3
    } else {
        1
    };
    if quoted.len() < delimiter * 2 {
        return None;
    }
    Some((prefix, &quoted[delimiter..quoted.len() - delimiter]))
}

/// Whether `token` is a plain (non-f) string literal.
pub fn is_simple_string(token: &Token<'_>) -> bool {
    token.kind == TokenKind::String
        && split_literal(token.text).is_some_and(|(prefix, _)| !prefix.to_ascii_lowercase().contains(['f', 't']))
}

/// The value of a plain string literal, with escapes left as written.
pub fn string_value<'a>(token: &Token<'a>) -> Option<&'a str> {
    if !is_simple_string(token) {
        return None;
    }
    split_literal(token.text).map(|(_, body)| body)
}

/// The quote character delimiting a string literal.
pub fn quote_char(text: &str) -> Option<char> {
    text.chars().find(|c| matches!(c, '\'' | '"'))
}

/// `literal` with its quotes switched away from `outer`, so it can sit
/// inside a replacement field of a string delimited by `outer`.
///
/// Returned unchanged when it already uses the other quote, is
/// triple-quoted, or holds the other quote or a backslash.
pub fn requote(literal: &str, outer: char) -> String {
    let Some((prefix, body)) = split_literal(literal) else {
        return literal.to_string();
    };
    let other = if outer == '"' { '\'' } else { '"' };
    let triple = literal.len() - prefix.len() - body.len() == 6;
    if quote_char(literal) != Some(outer) || triple || body.contains([other, '\\']) {
        return literal.to_string();
    }
    format!("{prefix}{other}{body}{other}")
}

/// Byte ranges, within the token text, of the expressions in the
/// replacement fields of an f-string or t-string. Fields nested in a
/// format spec follow their enclosing field. Other tokens have none.
pub fn interpolations(token: &Token<'_>) -> Vec<Range<usize>> {
    if token.kind != TokenKind::String {
        return Vec::new();
    }
    let Some((prefix, body)) = split_literal(token.text) else {
        return Vec::new();
    };
    let lower = prefix.to_ascii_lowercase();
    if !lower.contains(['f', 't']) {
        return Vec::new();
    }
    let offset = prefix.len() + (token.text.len() - prefix.len() - body.len()) / 2;

    let mut scanner = FieldScanner {
        bytes: body.as_bytes(),
        raw: lower.contains('r'),
        fields: Vec::new(),
    };
    scanner.literal(0, false);
    scanner
        .fields
        .into_iter()
        .map(|field| field.start + offset..field.end + offset)
        .collect()
}

struct FieldScanner<'b> {
    bytes: &'b [u8],
    raw: bool,
    fields: Vec<Range<usize>>,
}

impl FieldScanner<'_> {
    /// Scan literal text from `at`. Inside a format spec (`nested`) this
    /// stops at the `}` closing the enclosing field and returns its index.
    fn literal(&mut self, mut at: usize, nested: bool) -> Option<usize> {
        let b = self.bytes;
        while at < b.len() {
            match b[at] {
                b'{' if !nested && b.get(at + 1) == Some(&b'{') => at += 2,
                b'}' if nested => return Some(at),
                b'}' if b.get(at + 1) == Some(&b'}') => at += 2,
                b'{' => at = self.field(at + 1)?,
                // `\N{NAME}` is an escape, not a field.
                b'\\' if !self.raw && b.get(at + 1) == Some(&b'N') && b.get(at + 2) == Some(&b'{') => {
                    at = b[at..]
                        .iter()
                        .position(|&c| c == b'}')
                        .map_or(b.len(), |p| at + p + 1);
                }
                b'\\' if !self.raw => at += 2,
                _ => at += 1,
            }
        }
        if nested {
            None
        } else {
            Some(at)
        }
    }

    /// Scan the field whose expression starts at `start`, returning the
    /// index after its closing `}`.
    fn field(&mut self, start: usize) -> Option<usize> {
        let b = self.bytes;
        let mut depth = 0usize;
        let mut at = start;
        loop {
            match *b.get(at)? {
                b'\'' | b'"' => {
                    at = skip_quoted(b, at)?;
                    continue;
                }
                b'(' | b'[' | b'{' => depth += 1,
                b')' | b']' | b'}' if depth > 0 => depth -= 1,
                b'}' | b':' if depth == 0 => break,
                b'!' if depth == 0 && b.get(at + 1) != Some(&b'=') => break,
                _ => {}
            }
            at += 1;
        }
        self.fields.push(start..at);

        if b[at] == b'!' {
            while at < b.len() && !matches!(b[at], b':' | b'}') {
                at += 1;
            }
        }
        if b.get(at) == Some(&b':') {
            at = self.literal(at + 1, true)?;
        }
        (b.get(at) == Some(&b'}')).then_some(at + 1)
    }
}

/// Index after the string literal starting with the quote at `at`.
fn skip_quoted(b: &[u8], at: usize) -> Option<usize> {
    let quote = b[at];
    let triple = b.get(at..at + 3) == Some(&[quote; 3][..]);
    let width = if triple { 3 } else { 1 };
    let mut i = at + width;
    while i < b.len() {
        if b[i] == b'\\' {
            i += 2;
            continue;
        }
        if b[i] == quote && (!triple || b.get(i..i + 3) == Some(&[quote; 3][..])) {
            return Some(i + width);
        }
        i += 1;
    }
    None
}
