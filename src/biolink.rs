//! Documentation of the Biolink classes a transform script constructs.
//!
//! A statement is documented when the line directly above it is a comment
//! starting with [`CLASS_DOCUMENTATION_MARKER`]:
//!
//! ```python
//! # !DocumentClass
//! gene = Gene(
//!     # note: curated by hand until 2024
//!     # source: Column B
//!     label=row["Name"],
//!     category=["biolink:Gene"],
//! )
//! ```
//!
//! Every call in that statement whose callee resolves to a class in
//! `biolink_model.datamodel.pydanticmodel_v2` becomes a [`DocumentedClass`],
//! and each keyword argument a [`DocumentedField`]. Callees are resolved
//! through the script's own imports and simple aliases; nothing outside the
//! file is consulted.

use std::collections::HashMap;
use std::fmt::Write as _;
use std::fs;
use std::ops::Range;
use std::path::Path;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::python::{
    concat, interpolations, logical_lines, matching_close, next_significant, prev_significant,
    split_top_level, string_value, tokenize, trim, LogicalLine, Token, TokenKind,
};

/// Comment marking the statement below it for documentation.
pub const CLASS_DOCUMENTATION_MARKER: &str = "# !DocumentClass";

/// Module holding the Biolink pydantic classes.
pub const BIOLINK_MODULE: &str = "biolink_model.datamodel.pydanticmodel_v2";

/// How many alias hops resolution follows before giving up.
const MAX_ALIAS_DEPTH: usize = 16;

const KEYWORDS: &[&str] = &[
    "and", "as", "assert", "await", "del", "elif", "else", "except", "for", "from", "if",
    "import", "in", "is", "lambda", "not", "or", "raise", "return", "while", "with", "yield",
];

/// Annotations written as comments directly above a keyword argument.
///
/// An annotation line looks like `# note: ...`, `# source: ...`,
/// `# type: ...` or `# value: ...`. Any other comment continues the
/// previous annotation, joined with a space. Each `# source:` line starts a
/// new source.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentedFieldAnnotations {
    pub note: Option<String>,
    pub sources: Vec<String>,
    #[serde(rename = "type")]
    pub r#type: Option<String>,
    pub value: Option<String>,
}

#[derive(Clone, Copy)]
enum Group {
    Note,
    Source,
    Type,
    Value,
}

impl DocumentedFieldAnnotations {
    /// Parse annotation comments, in source order.
    pub fn from_comments<S: AsRef<str>>(comments: &[S]) -> Self {
        let mut annotations = Self::default();
        let mut group = None;

        for comment in comments {
            let comment = comment.as_ref();
            if let Some(text) = comment.strip_prefix("# type: ") {
                annotations.r#type = Some(text.to_string());
                group = Some(Group::Type);
            } else if let Some(text) = comment.strip_prefix("# source: ") {
                annotations.sources.push(text.to_string());
                group = Some(Group::Source);
            } else if let Some(text) = comment.strip_prefix("# note: ") {
                annotations.note = Some(text.to_string());
                group = Some(Group::Note);
            } else if let Some(text) = comment.strip_prefix("# value: ") {
                annotations.value = Some(text.to_string());
                group = Some(Group::Value);
            } else if let Some(group) = group {
                let more = comment.get(2..).unwrap_or("");
                let target = match group {
                    Group::Note => annotations.note.as_mut(),
                    Group::Source => annotations.sources.last_mut(),
                    Group::Type => annotations.r#type.as_mut(),
                    Group::Value => annotations.value.as_mut(),
                };
                if let Some(existing) = target {
                    existing.push(' ');
                    existing.push_str(more);
                }
            }
        }
        annotations
    }
}

/// One keyword argument of a documented class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentedField {
    pub name: String,
    /// Row columns the value is read from, when they can be seen.
    pub parsed_source: Option<Vec<String>>,
    /// The value, when it is a string literal or a list of one.
    pub constant: Option<String>,
    pub annotations: DocumentedFieldAnnotations,
}

/// A documented construction of a Biolink class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentedClass {
    pub name: String,
    pub fields: Vec<DocumentedField>,
}

#[derive(Debug, Clone)]
enum Bound {
    /// An imported module or object, by full dotted name.
    Import(String),
    /// `name = some.dotted.name`, resolved at the line it was written.
    Alias { path: Vec<String>, line: usize },
    /// A class, function or other value defined in this file.
    Local,
}

#[derive(Debug, Clone)]
struct Binding {
    name: String,
    line: usize,
    bound: Bound,
}

struct Analysis<'t, 'a> {
    tokens: &'t [Token<'a>],
    bindings: Vec<Binding>,
    /// Name to the lines where it is assigned.
    definitions: HashMap<&'a str, Vec<usize>>,
    /// `row["..."]` literals in unmarked assignments, by line.
    row_sources: HashMap<usize, Vec<String>>,
}

/// Whether the statement is preceded directly by the documentation marker.
fn is_marked(tokens: &[Token<'_>], line: &LogicalLine) -> bool {
    if line.opens_block(tokens) || tokens[line.code].is_op("@") {
        return false;
    }
    let statement_line = tokens[line.statement.start].line;
    tokens[line.leading.clone()]
        .iter()
        .rev()
        .find(|t| !matches!(t.kind, TokenKind::Nl | TokenKind::Whitespace))
        .is_some_and(|t| {
            t.kind == TokenKind::Comment
                && t.line + 1 == statement_line
                && t.text.starts_with(CLASS_DOCUMENTATION_MARKER)
        })
}

/// `biolink_model.datamodel.pydanticmodel_v2.Gene` -> `Gene`
fn biolink_class_name(full_name: &str) -> Option<&str> {
    let class = full_name.strip_prefix(BIOLINK_MODULE)?.strip_prefix('.')?;
    let is_class = !class.contains('.') && class.starts_with(|c: char| c.is_uppercase());
    is_class.then_some(class)
}

impl<'t, 'a> Analysis<'t, 'a> {
    fn new(tokens: &'t [Token<'a>]) -> Self {
        Self {
            tokens,
            bindings: Vec::new(),
            definitions: HashMap::new(),
            row_sources: HashMap::new(),
        }
    }

    fn significant(&self, range: Range<usize>) -> Vec<usize> {
        range.filter(|&i| !self.tokens[i].is_trivia()).collect()
    }

    fn text(&self, indices: &[usize]) -> Vec<&'a str> {
        indices.iter().map(|&i| self.tokens[i].text).collect()
    }

    fn bind(&mut self, name: &str, line: usize, bound: Bound) {
        debug!("Line {}: {} bound to {:?}", line, name, bound);
        self.bindings.push(Binding {
            name: name.to_string(),
            line,
            bound,
        });
    }

    /// Record imports, aliases and local definitions made by `line`.
    fn record_bindings(&mut self, line: &LogicalLine) {
        let tokens = self.tokens;
        let code = line.code_range(tokens);
        let sig = self.significant(code.clone());
        let words = self.text(&sig);
        let at = line.first_line;

        match words.as_slice() {
            ["import", ..] => {
                for part in split_top_level(tokens, sig[0] + 1..code.end, ",") {
                    let part = self.text(&self.significant(part));
                    match part.iter().position(|w| *w == "as") {
                        Some(as_at) if as_at + 1 < part.len() => {
                            self.bind(part[as_at + 1], at, Bound::Import(part[..as_at].concat()));
                        }
                        _ => {
                            if let Some(head) = part.first() {
                                self.bind(head, at, Bound::Import(head.to_string()));
                            }
                        }
                    }
                }
            }
            ["from", ..] => {
                let Some(import_at) = words.iter().position(|w| *w == "import") else {
                    return;
                };
                let module = words[1..import_at].concat();
                if module.starts_with('.') {
                    return;
                }
                for part in split_top_level(tokens, sig[import_at] + 1..code.end, ",") {
                    let part: Vec<&str> = self
                        .text(&self.significant(part))
                        .into_iter()
                        .filter(|w| *w != "(" && *w != ")")
                        .collect();
                    match part.as_slice() {
                        [name, "as", alias] => {
                            self.bind(alias, at, Bound::Import(format!("{}.{}", module, name)));
                        }
                        [name] if *name != "*" => {
                            self.bind(name, at, Bound::Import(format!("{}.{}", module, name)));
                        }
                        _ => {}
                    }
                }
            }
            ["class" | "def", name, ..] | ["async", "def", name, ..] => {
                self.bind(name, at, Bound::Local);
            }
            [name, "=", rest @ ..] if tokens[sig[0]].kind == TokenKind::Name => {
                let is_dotted_name = !rest.is_empty()
                    && rest.iter().enumerate().all(|(i, w)| {
                        let token = &tokens[sig[2 + i]];
                        if i % 2 == 0 {
                            token.kind == TokenKind::Name
                        } else {
                            *w == "."
                        }
                    })
                    && rest.len() % 2 == 1;
                let bound = if is_dotted_name {
                    Bound::Alias {
                        path: rest.iter().step_by(2).map(|w| w.to_string()).collect(),
                        line: at,
                    }
                } else {
                    Bound::Local
                };
                self.bind(name, at, bound);
            }
            _ => {}
        }
    }

    /// Record what an assignment statement defines and, outside marked
    /// statements, which row columns it reads.
    fn record_assignment(&mut self, line: &LogicalLine, record_sources: bool) {
        let tokens = self.tokens;
        let code = line.code_range(tokens);
        let parts = split_top_level(tokens, code.clone(), "=");
        if parts.len() < 2 {
            return;
        }

        for target in &parts[..parts.len() - 1] {
            let Some(target) = split_top_level(tokens, target.clone(), ":").into_iter().next() else {
                continue;
            };
            for i in target {
                let token = &tokens[i];
                if token.kind != TokenKind::Name {
                    continue;
                }
                let after_dot = prev_significant(tokens, i).is_some_and(|p| tokens[p].is_op("."));
                let before_access = next_significant(tokens, i + 1, code.end)
                    .is_some_and(|n| [".", "[", "("].iter().any(|op| tokens[n].is_op(op)));
                if !after_dot && !before_access {
                    self.definitions.entry(token.text).or_default().push(token.line);
                }
            }
        }

        if record_sources {
            for (at, source) in row_literals(self.tokens, code) {
                self.row_sources.entry(at).or_default().push(source);
            }
        }
    }

    /// Full dotted name of `path` as seen from `line`.
    fn resolve(&self, path: &[&str], line: usize, depth: usize) -> Option<String> {
        let (head, rest) = path.split_first()?;
        let binding = self
            .bindings
            .iter()
            .filter(|b| b.name == *head && b.line < line)
            .max_by_key(|b| b.line)?;

        match &binding.bound {
            Bound::Import(full) => {
                let mut name = full.clone();
                for segment in rest {
                    name.push('.');
                    name.push_str(segment);
                }
                Some(name)
            }
            Bound::Alias { path: target, line } if depth < MAX_ALIAS_DEPTH => {
                let mut joined: Vec<&str> = target.iter().map(String::as_str).collect();
                joined.extend_from_slice(rest);
                self.resolve(&joined, *line, depth + 1)
            }
            _ => None,
        }
    }

    /// The dotted callee in front of the `(` at `open`, if it is a plain
    /// name chain.
    fn callee(&self, open: usize) -> Option<(Vec<&'a str>, usize)> {
        let tokens = self.tokens;
        let mut at = prev_significant(tokens, open)?;
        if tokens[at].kind != TokenKind::Name || KEYWORDS.contains(&tokens[at].text) {
            return None;
        }

        let mut chain = vec![tokens[at].text];
        while let Some(dot) = prev_significant(tokens, at).filter(|&d| tokens[d].is_op(".")) {
            // `f().x(...)` and `a[0].x(...)` cannot be resolved.
            let name = prev_significant(tokens, dot).filter(|&n| tokens[n].kind == TokenKind::Name)?;
            chain.push(tokens[name].text);
            at = name;
        }
        chain.reverse();
        Some((chain, tokens[at].line))
    }

    /// Most recent assignment line of `name` before `line`.
    fn latest_definition(&self, name: &str, line: usize) -> Option<usize> {
        self.definitions
            .get(name)?
            .iter()
            .copied()
            .filter(|&l| l < line)
            .max()
    }

    fn constant(&self, value: Range<usize>) -> Option<String> {
        let tokens = self.tokens;
        let sig = self.significant(value);
        let literal = match sig.as_slice() {
            [literal] => *literal,
            [open, literal, close] if tokens[*open].is_op("[") && tokens[*close].is_op("]") => *literal,
            [open, literal, comma, close]
                if tokens[*open].is_op("[") && tokens[*comma].is_op(",") && tokens[*close].is_op("]") =>
            {
                *literal
            }
            _ => return None,
        };
        string_value(&tokens[literal]).map(str::to_string)
    }

    fn field(&self, keyword: usize, value: Range<usize>, comments: &[(usize, &str)]) -> DocumentedField {
        let tokens = self.tokens;
        let arg_line = tokens[keyword].line;

        // Comments on the lines directly above the argument, without gaps.
        let mut collected = Vec::new();
        let mut expected = arg_line.saturating_sub(1);
        for (at, text) in comments.iter().rev() {
            if *at > expected {
                continue;
            }
            if *at < expected {
                break;
            }
            collected.push(*text);
            expected = expected.saturating_sub(1);
        }
        collected.reverse();
        let annotations = DocumentedFieldAnnotations::from_comments(&collected);

        let value = trim(tokens, value);
        let mut sources: Vec<String> = row_literals(tokens, value.clone())
            .into_iter()
            .map(|(_, source)| source)
            .collect();

        let sig = self.significant(value.clone());
        if let [name] = sig.as_slice() {
            if tokens[*name].kind == TokenKind::Name {
                if let Some(defined) = self.latest_definition(tokens[*name].text, tokens[*name].line) {
                    if let Some(found) = self.row_sources.get(&defined) {
                        sources.extend(found.iter().cloned());
                    }
                }
            }
        }

        DocumentedField {
            name: tokens[keyword].text.to_string(),
            parsed_source: (!sources.is_empty()).then_some(sources),
            constant: self.constant(value),
            annotations,
        }
    }

    /// Document every Biolink class constructed by a marked statement.
    fn document_statement(&self, line: &LogicalLine) -> Vec<DocumentedClass> {
        let tokens = self.tokens;
        let mut classes = Vec::new();

        for open in line.code_range(tokens) {
            if !tokens[open].is_op("(") {
                continue;
            }
            let Some((path, at)) = self.callee(open) else {
                continue;
            };
            let Some(full_name) = self.resolve(&path, at, 0) else {
                debug!("Line {}: {} does not resolve", at, path.join("."));
                continue;
            };
            let Some(class) = biolink_class_name(&full_name) else {
                continue;
            };
            let Some(close) = matching_close(tokens, open) else {
                continue;
            };

            let comments: Vec<(usize, &str)> = tokens[open..close]
                .iter()
                .filter(|t| t.kind == TokenKind::Comment)
                .map(|t| (t.line, t.text))
                .collect();

            let mut fields = Vec::new();
            for arg in split_top_level(tokens, open + 1..close, ",") {
                let sig = self.significant(arg.clone());
                match sig.as_slice() {
                    [keyword, equals, ..]
                        if tokens[*keyword].kind == TokenKind::Name && tokens[*equals].is_op("=") =>
                    {
                        fields.push(self.field(*keyword, *equals + 1..arg.end, &comments));
                    }
                    _ => warn!(
                        "Skipping positional argument '{}' to {} on line {}",
                        concat(&tokens[trim(tokens, arg)]),
                        class,
                        at
                    ),
                }
            }

            debug!("Line {}: documenting {} with {} fields", at, class, fields.len());
            classes.push(DocumentedClass {
                name: class.to_string(),
                fields,
            });
        }
        classes
    }
}

/// Extract documented Biolink classes from Python source.
pub fn extract_from_source(source: &str) -> Result<Vec<DocumentedClass>> {
    let tokens = tokenize(source)?;
    let module = logical_lines(&tokens);
    let mut analysis = Analysis::new(&tokens);

    let marked: Vec<bool> = module.lines.iter().map(|l| is_marked(&tokens, l)).collect();
    for (line, is_marked) in module.lines.iter().zip(&marked) {
        analysis.record_bindings(line);
        analysis.record_assignment(line, !is_marked);
    }

    Ok(module
        .lines
        .iter()
        .zip(&marked)
        .filter(|(_, is_marked)| **is_marked)
        .flat_map(|(line, _)| analysis.document_statement(line))
        .collect())
}

/// Extract documented Biolink classes from a script on disk.
pub fn extract_biolink_documentation(path: &Path) -> Result<Vec<DocumentedClass>> {
    let source = fs::read_to_string(path)?;
    extract_from_source(&source)
}

fn cell(text: &str) -> String {
    text.replace('|', "\\|").replace('\n', " ")
}

/// Render classes as a Markdown section per class with a field table.
pub fn render_markdown(classes: &[DocumentedClass]) -> String {
    let mut out = String::new();
    for class in classes {
        let _ = writeln!(out, "## {}\n", class.name);
        if class.fields.is_empty() {
            out.push_str("No fields.\n\n");
            continue;
        }
        out.push_str("| Field | Source | Value | Type | Note |\n");
        out.push_str("| --- | --- | --- | --- | --- |\n");
        for field in &class.fields {
            let sources = if field.annotations.sources.is_empty() {
                field
                    .parsed_source
                    .iter()
                    .flatten()
                    .map(|s| format!("`{}`", s))
                    .collect::<Vec<_>>()
                    .join(", ")
            } else {
                field.annotations.sources.join(", ")
            };
            let value = match (&field.constant, &field.annotations.value) {
                (Some(constant), _) => format!("`{}`", constant),
                (None, Some(value)) => value.clone(),
                (None, None) => String::new(),
            };
            let _ = writeln!(
                out,
                "| {} | {} | {} | {} | {} |",
                cell(&field.name),
                cell(&sources),
                cell(&value),
                cell(field.annotations.r#type.as_deref().unwrap_or("")),
                cell(field.annotations.note.as_deref().unwrap_or("")),
            );
        }
        out.push('\n');
    }
    out
}

/// `row["..."]` literals in `range`, with the line of each literal.
/// Literals inside f-string fields report the line of the f-string.
fn row_literals(tokens: &[Token<'_>], range: Range<usize>) -> Vec<(usize, String)> {
    let mut found = Vec::new();
    for i in range.clone() {
        let token = &tokens[i];
        if token.kind == TokenKind::String {
            for field in interpolations(token) {
                if let Ok(sub) = tokenize(&token.text[field]) {
                    found.extend(
                        row_literals(&sub, 0..sub.len())
                            .into_iter()
                            .map(|(_, source)| (token.line, source)),
                    );
                }
            }
            continue;
        }
        if !token.is_name("row") || prev_significant(tokens, i).is_some_and(|p| tokens[p].is_op(".")) {
            continue;
        }
        let Some(open) = next_significant(tokens, i + 1, range.end).filter(|&o| tokens[o].is_op("[")) else {
            continue;
        };
        let Some(close) = matching_close(tokens, open) else {
            continue;
        };
        let mut inner: Vec<usize> = (open + 1..close).filter(|&j| !tokens[j].is_trivia()).collect();
        if inner.last().is_some_and(|&j| tokens[j].is_op(",")) {
            inner.pop();
        }
        if let [literal] = inner.as_slice() {
            if let Some(value) = string_value(&tokens[*literal]) {
                found.push((tokens[*literal].line, value.to_string()));
            }
        }
    }
    found
}

/// Render classes as pretty-printed JSON.
pub fn render_json(classes: &[DocumentedClass]) -> Result<String> {
    Ok(serde_json::to_string_pretty(classes)?)
}
