//! Grouping tokens into logical lines.
//!
//! A [`LogicalLine`] is one statement line (a simple statement, or the
//! header of a compound one such as `while ...:`) together with the blank
//! and comment lines directly above it. Removing a statement therefore
//! removes its leading comments too, and rewriting one leaves every other
//! line byte-for-byte intact.

use std::ops::Range;

use super::lexer::{Token, TokenKind};

/// One statement line, as ranges of token indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// Blank and comment lines above the statement.
    pub leading: Range<usize>,
    /// The statement itself: indentation, code, trailing comment and the
    /// terminating newline (absent at end of file).
    pub statement: Range<usize>,
    /// Index of the first significant token.
    pub code: usize,
    /// 1-based line of the first significant token.
    pub first_line: usize,
}

impl LogicalLine {
    /// The indentation text of the statement ("" at top level).
    pub fn indent<'a>(&self, tokens: &[Token<'a>]) -> &'a str {
        match tokens.get(self.statement.start) {
            Some(t) if t.kind == TokenKind::Whitespace && self.statement.start < self.code => t.text,
            _ => "",
        }
    }

    /// Code tokens: from the first significant token up to, but not
    /// including, the terminating newline.
    pub fn code_range(&self, tokens: &[Token<'_>]) -> Range<usize> {
        let mut end = self.statement.end;
        if end > self.code && tokens[end - 1].kind == TokenKind::Newline {
            end -= 1;
        }
        self.code..end
    }

    /// Indices of the non-trivia tokens of the statement.
    pub fn significant(&self, tokens: &[Token<'_>]) -> Vec<usize> {
        self.code_range(tokens)
            .filter(|&i| !tokens[i].is_trivia())
            .collect()
    }

    /// Whether the statement opens an indented block (`...:` at end).
    pub fn opens_block(&self, tokens: &[Token<'_>]) -> bool {
        self.significant(tokens)
            .last()
            .is_some_and(|&i| tokens[i].is_op(":"))
    }
}

/// A tokenized module split into header, statement lines and footer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Module {
    /// Blank lines at the top of the file, up to the last one before the
    /// first statement. Comments directly above the first statement belong
    /// to that statement instead.
    pub header: Range<usize>,
    pub lines: Vec<LogicalLine>,
    /// Blank and comment lines after the last statement.
    pub footer: Range<usize>,
}

/// Split `tokens` into logical lines.
pub fn logical_lines(tokens: &[Token<'_>]) -> Module {
    let n = tokens.len();
    let mut lines = Vec::new();
    let mut leading_start = 0;
    let mut i = 0;

    while i < n {
        let physical_start = i;
        let mut j = i;
        while j < n && matches!(tokens[j].kind, TokenKind::Whitespace | TokenKind::Continuation) {
            j += 1;
        }
        if j >= n {
            break;
        }

        match tokens[j].kind {
            TokenKind::Comment => {
                j += 1;
                if j < n && matches!(tokens[j].kind, TokenKind::Nl | TokenKind::Newline) {
                    j += 1;
                }
                i = j;
                continue;
            }
            TokenKind::Nl | TokenKind::Newline => {
                i = j + 1;
                continue;
            }
            _ => {}
        }

        let code = j;
        let mut end = j;
        while end < n && tokens[end].kind != TokenKind::Newline {
            end += 1;
        }
        let end = (end + 1).min(n);

        lines.push(LogicalLine {
            leading: leading_start..physical_start,
            statement: physical_start..end,
            code,
            first_line: tokens[code].line,
        });
        leading_start = end;
        i = end;
    }

    let mut header = 0..0;
    if let Some(first) = lines.first_mut() {
        let header_end = last_blank_line_end(tokens, first.leading.clone());
        header = first.leading.start..header_end;
        first.leading.start = header_end;
    }

    Module {
        header,
        lines,
        footer: leading_start..n,
    }
}

/// End index of the last blank physical line within `range`, or the range
/// start if it holds none.
fn last_blank_line_end(tokens: &[Token<'_>], range: Range<usize>) -> usize {
    let mut result = range.start;
    let mut line_is_blank = true;
    for i in range {
        match tokens[i].kind {
            TokenKind::Nl | TokenKind::Newline => {
                if line_is_blank {
                    result = i + 1;
                }
                line_is_blank = true;
            }
            TokenKind::Whitespace => {}
            _ => line_is_blank = false,
        }
    }
    result
}
