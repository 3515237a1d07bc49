//! Lossless Python tokenizer.
//!
//! Every byte of the input ends up in exactly one token, whitespace and
//! comments included, so concatenating the token texts reproduces the
//! source. That is what lets the rewriting tools change a handful of
//! tokens and leave all formatting alone.
//!
//! The tokenizer does not produce INDENT/DEDENT tokens; indentation is the
//! leading `Whitespace` token of a line. A line break is a `Newline` when
//! it ends a logical line and an `Nl` otherwise (blank lines, comment-only
//! lines and breaks inside brackets).

use crate::error::{Error, Result};

/// Token categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Name,
    Number,
    String,
    Op,
    Comment,
    Whitespace,
    /// End of a logical line.
    Newline,
    /// Any other line break.
    Nl,
    /// A backslash line continuation, including its line break.
    Continuation,
}

/// One token and where it starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    pub kind: TokenKind,
    pub text: &'a str,
    /// Byte offset into the source.
    pub offset: usize,
    /// 1-based line number.
    pub line: usize,
    /// 0-based byte column.
    pub column: usize,
}

impl Token<'_> {
    /// Whitespace, comments and line breaks that do not end a statement.
    pub fn is_trivia(&self) -> bool {
        matches!(
            self.kind,
            TokenKind::Whitespace | TokenKind::Comment | TokenKind::Nl | TokenKind::Continuation
        )
    }

    pub fn is_op(&self, op: &str) -> bool {
        self.kind == TokenKind::Op && self.text == op
    }

    pub fn is_name(&self, name: &str) -> bool {
        self.kind == TokenKind::Name && self.text == name
    }
}

const OPERATORS_3: &[&str] = &["**=", "//=", ">>=", "<<=", "..."];
const OPERATORS_2: &[&str] = &[
    "**", "//", ">>", "<<", "<=", ">=", "==", "!=", "->", ":=", "+=", "-=", "*=", "/=", "%=",
    "&=", "|=", "^=", "@=",
];
const OPERATORS_1: &str = "+-*/%@&|^~<>()[]{},:;.=!";

const STRING_PREFIXES: &[&str] = &[
    "r", "u", "b", "f", "br", "rb", "fr", "rf", "t", "tr", "rt",
];

fn is_name_start(c: char) -> bool {
    c == '_' || c.is_alphabetic()
}

fn is_name_continue(c: char) -> bool {
    c == '_' || c.is_alphanumeric()
}

struct Lexer<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    line_start: usize,
    depth: usize,
    line_has_code: bool,
    tokens: Vec<Token<'a>>,
}

impl<'a> Lexer<'a> {
    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek_at(&self, byte_offset: usize) -> Option<char> {
        self.src.get(self.pos + byte_offset..)?.chars().next()
    }

    fn error(&self, message: impl Into<String>) -> Error {
        Error::PythonSyntax {
            line: self.line,
            message: message.into(),
        }
    }

    fn push(&mut self, kind: TokenKind, end: usize) {
        let text = &self.src[self.pos..end];
        self.tokens.push(Token {
            kind,
            text,
            offset: self.pos,
            line: self.line,
            column: self.pos - self.line_start,
        });

        if matches!(
            kind,
            TokenKind::Name | TokenKind::Number | TokenKind::String | TokenKind::Op
        ) {
            self.line_has_code = true;
        }

        // Advance line bookkeeping past every break inside the token.
        let bytes = text.as_bytes();
        for (i, &b) in bytes.iter().enumerate() {
            let is_break = b == b'\n' || (b == b'\r' && bytes.get(i + 1) != Some(&b'\n'));
            if is_break {
                self.line += 1;
                self.line_start = self.pos + i + 1;
            }
        }
        self.pos = end;
    }

    fn run(mut self) -> Result<Vec<Token<'a>>> {
        while let Some(c) = self.peek() {
            match c {
                ' ' | '\t' | '\x0c' => {
                    let len = self.src[self.pos..]
                        .find(|c| !matches!(c, ' ' | '\t' | '\x0c'))
                        .unwrap_or(self.src.len() - self.pos);
                    self.push(TokenKind::Whitespace, self.pos + len);
                }
                '#' => {
                    let len = self.src[self.pos..]
                        .find(['\r', '\n'])
                        .unwrap_or(self.src.len() - self.pos);
                    self.push(TokenKind::Comment, self.pos + len);
                }
                '\r' | '\n' => {
                    let len = if self.src[self.pos..].starts_with("\r\n") { 2 } else { 1 };
                    let kind = if self.depth == 0 && self.line_has_code {
                        self.line_has_code = false;
                        TokenKind::Newline
                    } else {
                        TokenKind::Nl
                    };
                    self.push(kind, self.pos + len);
                }
                '\\' => {
                    let rest = &self.src[self.pos + 1..];
                    let len = if rest.starts_with("\r\n") {
                        3
                    } else if rest.starts_with('\n') || rest.starts_with('\r') {
                        2
                    } else {
                        return Err(self.error("unexpected character after line continuation"));
                    };
                    self.push(TokenKind::Continuation, self.pos + len);
                }
                '\'' | '"' => self.string(0)?,
                c if c.is_ascii_digit() => self.number(),
                '.' if self.peek_at(1).is_some_and(|c| c.is_ascii_digit()) => self.number(),
                c if is_name_start(c) => self.name_or_prefixed_string()?,
                _ => self.operator()?,
            }
        }
        Ok(self.tokens)
    }

    fn name_or_prefixed_string(&mut self) -> Result<()> {
        let len = self.src[self.pos..]
            .find(|c: char| !is_name_continue(c))
            .unwrap_or(self.src.len() - self.pos);
        let word = &self.src[self.pos..self.pos + len];
        let quote_follows = matches!(self.src[self.pos + len..].chars().next(), Some('\'' | '"'));
        if quote_follows && STRING_PREFIXES.contains(&word.to_ascii_lowercase().as_str()) {
            return self.string(len);
        }
        self.push(TokenKind::Name, self.pos + len);
        Ok(())
    }

    /// Lex a string literal whose opening quote is `prefix_len` bytes ahead.
    fn string(&mut self, prefix_len: usize) -> Result<()> {
        let start = self.pos + prefix_len;
        let rest = &self.src[start..];
        let quote = &rest[..1];
        let triple = rest.starts_with(&quote.repeat(3));
        let delimiter = if triple { quote.repeat(3) } else { quote.to_string() };

        let body_start = start + delimiter.len();
        let bytes = self.src.as_bytes();
        let mut i = body_start;
        loop {
            if i >= bytes.len() {
                return Err(self.error("unterminated string literal"));
            }
            match bytes[i] {
                b'\\' => {
                    i += 1;
                    if bytes[i..].starts_with(b"\r\n") {
                        i += 2;
                    } else if let Some(c) = self.src[i..].chars().next() {
                        i += c.len_utf8();
                    }
                }
                b'\n' | b'\r' if !triple => {
                    return Err(self.error("unterminated string literal"));
                }
                _ if bytes[i..].starts_with(delimiter.as_bytes()) => {
                    i += delimiter.len();
                    break;
                }
                _ => i += 1,
            }
        }
        self.push(TokenKind::String, i);
        Ok(())
    }

    fn number(&mut self) {
        let bytes = self.src.as_bytes();
        let start = self.pos;
        let is_hex = self.src[start..].starts_with("0x") || self.src[start..].starts_with("0X");
        let mut i = start;
        while i < bytes.len() {
            let b = bytes[i];
            if b.is_ascii_alphanumeric() || b == b'_' || b == b'.' {
                i += 1;
            } else if (b == b'+' || b == b'-')
                && !is_hex
                && i > start
                && matches!(bytes[i - 1], b'e' | b'E')
            {
                i += 1;
            } else {
                break;
            }
        }
        self.push(TokenKind::Number, i);
    }

    fn operator(&mut self) -> Result<()> {
        let rest = &self.src[self.pos..];
        let len = if OPERATORS_3.iter().any(|op| rest.starts_with(op)) {
            3
        } else if OPERATORS_2.iter().any(|op| rest.starts_with(op)) {
            2
        } else if rest.starts_with(|c| OPERATORS_1.contains(c)) {
            1
        } else {
            let c = rest.chars().next().unwrap_or('?');
            return Err(self.error(format!("unexpected character {:?}", c)));
        };

        match &rest[..1] {
            "(" | "[" | "{" => self.depth += 1,
            ")" | "]" | "}" => self.depth = self.depth.saturating_sub(1),
            _ => {}
        }
        self.push(TokenKind::Op, self.pos + len);
        Ok(())
    }
}

/// Tokenize Python source.
pub fn tokenize(src: &str) -> Result<Vec<Token<'_>>> {
    Lexer {
        src,
        pos: 0,
        line: 1,
        line_start: 0,
        depth: 0,
        line_has_code: false,
        tokens: Vec::new(),
    }
    .run()
}

/// Concatenate token texts.
pub fn concat(tokens: &[Token<'_>]) -> String {
    tokens.iter().map(|t| t.text).collect()
}
