//! Migration of Koza transform scripts to the `transform_record` API.
//!
//! Old-style transforms pull rows in a loop and talk to a global app
//! object:
//!
//! ```python
//! from koza.cli_utils import get_koza_app
//! koza_app = get_koza_app("hpoa")
//! genes = koza_app.get_map("genes")
//!
//! while (row := koza_app.get_row()) is not None:
//!     koza_app.write(Gene(id=genes[row["id"]]))
//! ```
//!
//! New-style transforms are a function called once per record:
//!
//! ```python
//! def transform_record(koza: Koza, record: dict[str, Any]):
//!     koza.write(Gene(id=koza.lookup(record["id"], "genes")))
//! ```
//!
//! The rewrite works on the lossless token stream, so everything it does
//! not touch keeps its exact formatting and comments.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::ops::Range;
use std::path::Path;

use log::debug;

use crate::error::Result;
use crate::python::{
    concat, interpolations, is_simple_string, logical_lines, matching_close, next_significant,
    prev_significant, quote_char, requote, split_top_level, tokenize, trim, LogicalLine, Token,
    TokenKind,
};

/// Signature replacing the `while (row := ...)` loop header.
pub const TRANSFORM_SIGNATURE: &str = "def transform_record(koza: Koza, record: dict[str, Any]):";

const COMPARISON_OPERATORS: &[&str] = &["is", "in", "not", "==", "!=", "<", ">", "<=", ">="];

/// Whether the significant tokens `sig` spell out `pattern`, token by token.
fn spells(tokens: &[Token<'_>], sig: &[usize], pattern: &[&str]) -> bool {
    sig.len() >= pattern.len()
        && sig
            .iter()
            .zip(pattern)
            .all(|(&i, expected)| tokens[i].kind != TokenKind::String && tokens[i].text == *expected)
}

/// `from koza.cli_utils import get_koza_app [as name]`
fn is_get_koza_app_import(tokens: &[Token<'_>], sig: &[usize]) -> bool {
    const PREFIX: &[&str] = &["from", "koza", ".", "cli_utils", "import"];
    if !spells(tokens, sig, PREFIX) {
        return false;
    }
    let mut rest: Vec<&str> = sig[PREFIX.len()..].iter().map(|&i| tokens[i].text).collect();
    if rest.first() == Some(&"(") && rest.last() == Some(&")") {
        rest = rest[1..rest.len() - 1].to_vec();
    }
    if rest.last() == Some(&",") {
        rest.pop();
    }
    matches!(rest.as_slice(), ["get_koza_app"] | ["get_koza_app", "as", _])
}

/// `koza_app = get_koza_app(...)`
fn is_koza_app_assign(tokens: &[Token<'_>], sig: &[usize]) -> bool {
    spells(tokens, sig, &["koza_app", "=", "get_koza_app", "("])
        && matching_close(tokens, sig[3]) == sig.last().copied()
}

/// `<var> = koza_app.get_map(<string>)`, returning the variable and the
/// map name literal (quotes included).
fn map_assignment<'a>(tokens: &[Token<'a>], sig: &[usize]) -> Option<(&'a str, &'a str)> {
    if sig.len() < 7 || tokens[sig[0]].kind != TokenKind::Name {
        return None;
    }
    if !spells(tokens, &sig[1..], &["=", "koza_app", ".", "get_map", "("]) {
        return None;
    }
    let open = sig[5];
    if matching_close(tokens, open) != sig.last().copied() {
        return None;
    }

    let mut args = &sig[6..sig.len() - 1];
    if args.last().is_some_and(|&i| tokens[i].is_op(",")) {
        args = &args[..args.len() - 1];
    }
    if args.len() == 3 && tokens[args[0]].kind == TokenKind::Name && tokens[args[1]].is_op("=") {
        args = &args[2..];
    }
    match args {
        [literal] if is_simple_string(&tokens[*literal]) => {
            Some((tokens[sig[0]].text, tokens[*literal].text))
        }
        _ => None,
    }
}

struct Rewriter<'t, 'a> {
    tokens: &'t [Token<'a>],
    /// Map variable name to the map name literal.
    maps: HashMap<&'a str, String>,
}

impl<'t, 'a> Rewriter<'t, 'a> {
    /// Index of the `:` ending a `while (row := koza_app.get_row()) <cmp> ...`
    /// header.
    fn while_row_colon(&self, line: &LogicalLine) -> Option<usize> {
        let tokens = self.tokens;
        let sig = line.significant(tokens);
        if !spells(
            tokens,
            &sig,
            &["while", "(", "row", ":=", "koza_app", ".", "get_row", "("],
        ) {
            return None;
        }
        // No line breaks around the walrus.
        if tokens[sig[2]..sig[4]].iter().any(|t| t.kind == TokenKind::Nl) {
            return None;
        }

        let call_close = matching_close(tokens, sig[7])?;
        let paren_close = next_significant(tokens, call_close + 1, line.statement.end)?;
        if !tokens[paren_close].is_op(")") || matching_close(tokens, sig[1]) != Some(paren_close) {
            return None;
        }
        let comparison = next_significant(tokens, paren_close + 1, line.statement.end)?;
        if tokens[comparison].kind == TokenKind::String
            || !COMPARISON_OPERATORS.contains(&tokens[comparison].text)
        {
            return None;
        }

        let mut depth = 0usize;
        for i in comparison..line.statement.end {
            let token = &tokens[i];
            if token.kind != TokenKind::Op {
                continue;
            }
            match token.text {
                "(" | "[" | "{" => depth += 1,
                ")" | "]" | "}" => depth = depth.saturating_sub(1),
                ":" if depth == 0 => return Some(i),
                _ => {}
            }
        }
        None
    }

    /// Rewrite a kept line, leading lines included.
    fn line(&self, line: &LogicalLine) -> String {
        let mut out = concat(&self.tokens[line.leading.start..line.code]);
        let from = match self.while_row_colon(line) {
            Some(colon) => {
                debug!("Line {}: replacing row loop with transform_record", line.first_line);
                out.push_str(TRANSFORM_SIGNATURE);
                colon + 1
            }
            None => line.code,
        };
        out.push_str(&self.rewrite(from..line.statement.end, false));
        out
    }

    fn lookup(&self, expr: Range<usize>, map: &str) -> String {
        let expr = trim(self.tokens, expr);
        format!("koza.lookup({}, {})", self.rewrite(expr, false), map)
    }

    /// Rewrite the tokens in `range`. `in_write` is set inside the
    /// arguments of `koza_app.write(...)`.
    fn rewrite(&self, range: Range<usize>, in_write: bool) -> String {
        let tokens = self.tokens;
        let end = range.end;
        let mut out = String::new();
        let mut i = range.start;

        while i < end {
            let token = tokens[i];
            if token.kind == TokenKind::String {
                out.push_str(&self.interpolated(&token, in_write));
                i += 1;
                continue;
            }
            if token.kind != TokenKind::Name {
                out.push_str(token.text);
                i += 1;
                continue;
            }

            let is_attribute = prev_significant(tokens, i).is_some_and(|p| tokens[p].is_op("."));
            let next = next_significant(tokens, i + 1, end);

            if !is_attribute {
                if let (Some(map), Some(next)) = (self.maps.get(token.text), next) {
                    if let Some((rewritten, resume)) = self.map_access(next, end, map) {
                        out.push_str(&rewritten);
                        i = resume;
                        continue;
                    }
                }

                if token.text == "koza_app" {
                    if let Some((open, close)) = self.method_call(next, end, "write") {
                        out.push_str("koza");
                        out.push_str(&concat(&tokens[i + 1..=open]));
                        out.push_str(&self.rewrite(open + 1..close, true));
                        out.push_str(tokens[close].text);
                        i = close + 1;
                        continue;
                    }
                }
            }

            match token.text {
                "row" => out.push_str("record"),
                "koza_app" if in_write => out.push_str("koza"),
                text => out.push_str(text),
            }
            i += 1;
        }
        out
    }

    /// A string literal with the expressions of its replacement fields
    /// rewritten. Plain strings come back as written.
    fn interpolated(&self, token: &Token<'a>, in_write: bool) -> String {
        let fields = interpolations(token);
        if fields.is_empty() {
            return token.text.to_string();
        }

        let mut maps: HashMap<&'a str, String> = match quote_char(token.text) {
            Some(outer) => self
                .maps
                .iter()
                .map(|(var, map)| (*var, requote(map, outer)))
                .collect(),
            None => self.maps.clone(),
        };
        let mut out = String::new();
        let mut last = 0;
        for field in fields {
            let expr = &token.text[field.clone()];
            out.push_str(&token.text[last..field.start]);
            match tokenize(expr) {
                Ok(sub) => {
                    let nested = Rewriter { tokens: &sub, maps };
                    out.push_str(&nested.rewrite(0..sub.len(), in_write));
                    maps = nested.maps;
                }
                Err(_) => out.push_str(expr),
            }
            last = field.end;
        }
        out.push_str(&token.text[last..]);
        out
    }

    /// `.name(` following a token, returning the open and close parens.
    fn method_call(&self, dot: Option<usize>, end: usize, name: &str) -> Option<(usize, usize)> {
        let tokens = self.tokens;
        let dot = dot.filter(|&d| tokens[d].is_op("."))?;
        let method = next_significant(tokens, dot + 1, end).filter(|&m| tokens[m].is_name(name))?;
        let open = next_significant(tokens, method + 1, end).filter(|&o| tokens[o].is_op("("))?;
        let close = matching_close(tokens, open).filter(|&c| c < end)?;
        Some((open, close))
    }

    /// `map[key]` or `map.get(key)` where `next` follows the map variable.
    fn map_access(&self, next: usize, end: usize, map: &str) -> Option<(String, usize)> {
        let tokens = self.tokens;

        if tokens[next].is_op("[") {
            let close = matching_close(tokens, next).filter(|&c| c < end)?;
            let parts = split_top_level(tokens, next + 1..close, ",");
            let [index] = parts.as_slice() else {
                return None;
            };
            // A slice is not a lookup.
            if split_top_level(tokens, index.clone(), ":").len() != 1
                || tokens[index.clone()].iter().any(|t| t.is_op(":"))
            {
                return None;
            }
            return Some((self.lookup(index.clone(), map), close + 1));
        }

        let (open, close) = self.method_call(Some(next), end, "get")?;
        let args = split_top_level(tokens, open + 1..close, ",");
        let [arg] = args.as_slice() else {
            return None;
        };
        Some((self.lookup(arg.clone(), map), close + 1))
    }
}

/// Removed lines that must become `pass` so their block is not left empty.
fn emptied_blocks(tokens: &[Token<'_>], lines: &[LogicalLine], kept: &[Option<String>]) -> HashSet<usize> {
    let mut passes = HashSet::new();
    for (opener_index, opener) in lines.iter().enumerate() {
        if !opener.opens_block(tokens) {
            continue;
        }
        let width = opener.indent(tokens).len();
        let block: Vec<usize> = (opener_index + 1..lines.len())
            .take_while(|&i| lines[i].indent(tokens).len() > width)
            .collect();
        if let Some(&first) = block.first() {
            if block.iter().all(|&i| kept[i].is_none()) {
                passes.insert(first);
            }
        }
    }
    passes
}

/// Rewrite the source of a Koza transform to the new API.
pub fn transform_koza_code(source: &str) -> Result<String> {
    let tokens = tokenize(source)?;
    let module = logical_lines(&tokens);
    let mut rewriter = Rewriter {
        tokens: &tokens,
        maps: HashMap::new(),
    };

    let mut kept: Vec<Option<String>> = Vec::with_capacity(module.lines.len());
    for line in &module.lines {
        let sig = line.significant(&tokens);
        if is_get_koza_app_import(&tokens, &sig) || is_koza_app_assign(&tokens, &sig) {
            debug!("Line {}: removing koza_app setup", line.first_line);
            kept.push(None);
        } else if let Some((var, map)) = map_assignment(&tokens, &sig) {
            debug!("Line {}: map {} is {}", line.first_line, var, map);
            rewriter.maps.insert(var, map.to_string());
            kept.push(None);
        } else {
            kept.push(Some(rewriter.line(line)));
        }
    }

    let passes = emptied_blocks(&tokens, &module.lines, &kept);
    let mut out = concat(&tokens[module.header.clone()]);
    for (index, line) in module.lines.iter().enumerate() {
        match &kept[index] {
            Some(text) => out.push_str(text),
            None if passes.contains(&index) => {
                out.push_str(line.indent(&tokens));
                out.push_str("pass");
                if let Some(newline) = tokens[line.statement.clone()]
                    .last()
                    .filter(|t| t.kind == TokenKind::Newline)
                {
                    out.push_str(newline.text);
                }
            }
            None => {}
        }
    }
    out.push_str(&concat(&tokens[module.footer.clone()]));
    Ok(out)
}

/// Read a transform from disk and return its rewritten source.
pub fn transform_koza_file(path: &Path) -> Result<String> {
    let source = fs::read_to_string(path)?;
    transform_koza_code(&source)
}
