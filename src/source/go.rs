//! Go declaration scanner — line-by-line state machine.
//!
//! Recovers the package clause, doc comments, type declarations and struct
//! fields from a Go source file. Function bodies and other declarations are
//! skipped by bracket depth, so their contents are never inspected.

use super::{FieldDecl, SourceFile, TypeDecl, TypeKind};
use crate::error::SourceError;
use regex::Regex;
use std::mem;
use std::str::Lines;
use std::sync::LazyLock;

// -- Regex patterns -----------------------------------------------------------

const IDENT: &str = r"[\p{L}_][\p{L}\p{N}_]*";

static RE_PACKAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^package\s+({IDENT})\s*;?$")).unwrap());

static RE_TYPE_GROUP: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^type\s*\($").unwrap());

static RE_TYPE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^type\s+(.+)$").unwrap());

// Name, optional type parameter list, optional alias `=`, then the type.
static RE_TYPE_SPEC: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"^({IDENT})\s*(?:\[\s*{IDENT}\s+[^\]]*\])?\s*(?:=\s*)?(.*)$"
    ))
    .unwrap()
});

static RE_STRUCT_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^struct\s*\{(.*)$").unwrap());

static RE_OTHER_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:import|func|var|const)\b").unwrap());

static RE_NAMED_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^({IDENT}(?:\s*,\s*{IDENT})*)\s+(\S.*)$")).unwrap()
});

static RE_EMBEDDED_FIELD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^\*?{IDENT}(?:\.{IDENT})?(?:\[.+\])?$")).unwrap()
});

// Tool directives such as //go:generate are not documentation.
static RE_DIRECTIVE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:line |extern |export |[a-z0-9]+:[a-z0-9])").unwrap());

static RE_WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

// -- Public API ---------------------------------------------------------------

/// Scan a Go source file into its declaration set.
pub fn parse(input: &str) -> Result<SourceFile, SourceError> {
    let mut s = Scanner::new(input);
    let mut file = SourceFile::default();
    let mut package_seen = false;
    let mut doc: Vec<String> = Vec::new();

    while let Some((no, line)) = s.next_line()? {
        let code = line.code.trim();
        if code.is_empty() {
            collect_doc(&mut doc, line);
            continue;
        }

        if let Some(caps) = RE_PACKAGE.captures(code) {
            if package_seen {
                return Err(SourceError::new(no, "duplicate package clause"));
            }
            package_seen = true;
            file.package = caps[1].to_string();
            file.doc = doc_text(&mem::take(&mut doc));
            continue;
        }
        if !package_seen {
            return Err(SourceError::new(no, "expected package clause"));
        }

        if RE_TYPE_GROUP.is_match(code) {
            let group_doc = mem::take(&mut doc);
            file.types.extend(s.type_group(no, &group_doc)?);
        } else if let Some(caps) = RE_TYPE.captures(code) {
            let spec = caps[1].to_string();
            let decl = s.type_spec(no, &spec, mem::take(&mut doc), line.depth)?;
            file.types.push(decl);
        } else if RE_OTHER_DECL.is_match(code) {
            doc.clear();
            s.skip_block(no, line.depth, continues(code))?;
        } else if code != ";" {
            return Err(SourceError::new(
                no,
                format!("unexpected `{}` at top level", code),
            ));
        }
    }

    s.finish()?;
    if !package_seen {
        return Err(SourceError::new(s.last_line.max(1), "missing package clause"));
    }
    Ok(file)
}

// -- Line lexing --------------------------------------------------------------

/// One source line split into code and comment text.
#[derive(Debug, Default)]
struct ScannedLine {
    /// Code outside comments. String literals are kept intact.
    code: String,
    /// Comment text usable as documentation, one entry per comment line.
    docs: Vec<String>,
    /// The line holds a comment, possibly a directive.
    commented: bool,
    /// Net change of `{}`/`()` nesting.
    depth: i32,
}

#[derive(Default)]
struct Lexer {
    in_block_comment: bool,
    in_raw_string: bool,
    block_start: usize,
}

impl Lexer {
    fn scan(&mut self, line: &str) -> Result<ScannedLine, &'static str> {
        let mut out = ScannedLine::default();
        let mut block = String::new();
        let mut chars = line.chars().peekable();

        if self.in_block_comment {
            out.commented = true;
        }

        while let Some(c) = chars.next() {
            if self.in_block_comment {
                if c == '*' && chars.peek() == Some(&'/') {
                    chars.next();
                    self.in_block_comment = false;
                    out.docs.push(strip_comment_space(&block));
                    block.clear();
                } else {
                    block.push(c);
                }
                continue;
            }
            if self.in_raw_string {
                out.code.push(c);
                if c == '`' {
                    self.in_raw_string = false;
                }
                continue;
            }

            match c {
                '/' if chars.peek() == Some(&'/') => {
                    chars.next();
                    let text: String = chars.by_ref().collect();
                    out.commented = true;
                    if !RE_DIRECTIVE.is_match(&text) {
                        out.docs.push(strip_comment_space(&text));
                    }
                }
                '/' if chars.peek() == Some(&'*') => {
                    chars.next();
                    self.in_block_comment = true;
                    out.commented = true;
                }
                '"' | '\'' => {
                    out.code.push(c);
                    let mut closed = false;
                    while let Some(q) = chars.next() {
                        out.code.push(q);
                        if q == '\\' {
                            if let Some(escaped) = chars.next() {
                                out.code.push(escaped);
                            }
                        } else if q == c {
                            closed = true;
                            break;
                        }
                    }
                    if !closed {
                        return Err(if c == '"' {
                            "unterminated string literal"
                        } else {
                            "unterminated rune literal"
                        });
                    }
                }
                '`' => {
                    out.code.push(c);
                    self.in_raw_string = true;
                }
                '{' | '(' => {
                    out.depth += 1;
                    out.code.push(c);
                }
                '}' | ')' => {
                    out.depth -= 1;
                    out.code.push(c);
                }
                _ => out.code.push(c),
            }
        }

        if self.in_block_comment {
            out.docs.push(strip_comment_space(&block));
        }
        Ok(out)
    }
}

fn strip_comment_space(text: &str) -> String {
    text.strip_prefix(' ').unwrap_or(text).trim_end().to_string()
}

/// Blank lines end a doc block; comment lines extend it.
fn collect_doc(doc: &mut Vec<String>, line: ScannedLine) {
    if line.commented {
        doc.extend(line.docs);
    } else {
        doc.clear();
    }
}

/// Join doc lines, dropping leading and trailing blank lines.
fn doc_text(lines: &[String]) -> String {
    let first = lines.iter().position(|l| !l.trim().is_empty());
    let last = lines.iter().rposition(|l| !l.trim().is_empty());
    match (first, last) {
        (Some(first), Some(last)) => lines[first..=last].join("\n"),
        _ => String::new(),
    }
}

fn collapse(text: &str) -> String {
    RE_WHITESPACE.replace_all(text.trim(), " ").into_owned()
}

// -- Scanner ------------------------------------------------------------------

struct Scanner<'a> {
    lines: std::iter::Enumerate<Lines<'a>>,
    lexer: Lexer,
    last_line: usize,
}

impl<'a> Scanner<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            lines: input.lines().enumerate(),
            lexer: Lexer::default(),
            last_line: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<(usize, ScannedLine)>, SourceError> {
        let Some((i, raw)) = self.lines.next() else {
            return Ok(None);
        };
        let no = i + 1;
        self.last_line = no;
        if !self.lexer.in_block_comment {
            self.lexer.block_start = no;
        }
        let line = self
            .lexer
            .scan(raw)
            .map_err(|message| SourceError::new(no, message))?;
        Ok(Some((no, line)))
    }

    fn expect_line(
        &mut self,
        opened: usize,
        what: &str,
    ) -> Result<(usize, ScannedLine), SourceError> {
        self.next_line()?.ok_or_else(|| {
            SourceError::new(opened, format!("unterminated {} starting here", what))
        })
    }

    fn finish(&self) -> Result<(), SourceError> {
        if self.lexer.in_block_comment {
            return Err(SourceError::new(
                self.lexer.block_start,
                "unterminated block comment",
            ));
        }
        if self.lexer.in_raw_string {
            return Err(SourceError::new(self.last_line, "unterminated raw string"));
        }
        Ok(())
    }

    /// Consume lines until the declaration opened at `opened` ends: brackets
    /// balanced, no raw string open, and no operator left dangling.
    fn skip_block(
        &mut self,
        opened: usize,
        mut depth: i32,
        mut pending: bool,
    ) -> Result<(), SourceError> {
        while depth > 0 || pending || self.lexer.in_raw_string {
            let (_, line) = self.expect_line(opened, "declaration")?;
            depth += line.depth;
            if depth < 0 {
                break;
            }
            let code = line.code.trim();
            if !code.is_empty() {
                pending = continues(code);
            }
        }
        if depth < 0 {
            return Err(SourceError::new(opened, "unbalanced closing bracket"));
        }
        Ok(())
    }

    /// `type ( ... )`. A lone spec without its own doc takes the group's.
    fn type_group(
        &mut self,
        opened: usize,
        group_doc: &[String],
    ) -> Result<Vec<TypeDecl>, SourceError> {
        let mut specs = Vec::new();
        let mut doc = Vec::new();
        loop {
            let (no, line) = self.expect_line(opened, "type group")?;
            let code = line.code.trim();
            if code.is_empty() {
                collect_doc(&mut doc, line);
                continue;
            }
            if code.starts_with(')') {
                break;
            }
            let spec = code.to_string();
            specs.push(self.type_spec(no, &spec, mem::take(&mut doc), line.depth)?);
        }

        if let [only] = specs.as_mut_slice() {
            if only.doc.is_empty() {
                only.doc = doc_text(group_doc);
            }
        }
        Ok(specs)
    }

    /// One type spec, starting at `Name ...`.
    fn type_spec(
        &mut self,
        no: usize,
        spec: &str,
        doc: Vec<String>,
        depth: i32,
    ) -> Result<TypeDecl, SourceError> {
        let caps = RE_TYPE_SPEC
            .captures(spec)
            .ok_or_else(|| SourceError::new(no, format!("malformed type declaration `{}`", spec)))?;
        let name = caps[1].to_string();
        let body = caps[2].trim();
        if body.is_empty() {
            return Err(SourceError::new(no, format!("type {} has no type", name)));
        }

        let kind = match RE_STRUCT_OPEN.captures(body) {
            Some(open) if depth == 0 => {
                // Whole struct on one line: `struct{}` or `struct{ A int; B string }`.
                let inner = open[1].trim().trim_end_matches('}');
                let fields = split_fields(inner)
                    .into_iter()
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(|f| parse_field(no, f, Vec::new()))
                    .collect::<Result<Vec<_>, _>>()?;
                TypeKind::Struct(fields)
            }
            Some(_) => TypeKind::Struct(self.struct_body(no, depth)?),
            None => {
                self.skip_block(no, depth, continues(body))?;
                TypeKind::Other(collapse(body))
            }
        };

        Ok(TypeDecl {
            name,
            doc: doc_text(&doc),
            kind,
            line: no,
        })
    }

    fn struct_body(&mut self, opened: usize, depth: i32) -> Result<Vec<FieldDecl>, SourceError> {
        let mut fields = Vec::new();
        let mut doc = Vec::new();
        loop {
            let (no, line) = self.expect_line(opened, "struct")?;
            let code = line.code.trim();
            if code.is_empty() {
                collect_doc(&mut doc, line);
                continue;
            }
            if depth + line.depth <= 0 && code.starts_with('}') {
                if depth + line.depth < 0 {
                    return Err(SourceError::new(no, "unbalanced closing bracket"));
                }
                break;
            }

            let mut text = code.to_string();
            if line.depth > 0 {
                text = self.fold_field_type(no, text, line.depth)?;
            }
            fields.push(parse_field(no, &text, mem::take(&mut doc))?);
        }
        Ok(fields)
    }

    /// Fold a field type spanning several lines into a single line: inline
    /// `struct { ... }` members are joined with `; `, parameter lists with `, `.
    fn fold_field_type(
        &mut self,
        opened: usize,
        head: String,
        mut depth: i32,
    ) -> Result<String, SourceError> {
        let mut inner = Vec::new();
        let mut tail = String::new();
        while depth > 0 {
            let (_, line) = self.expect_line(opened, "field type")?;
            depth += line.depth;
            let code = line.code.trim();
            if code.is_empty() {
                continue;
            }
            if depth <= 0 {
                tail = code.to_string();
            } else {
                inner.push(code.to_string());
            }
        }
        if depth < 0 {
            return Err(SourceError::new(opened, "unbalanced closing bracket"));
        }
        let folded = if !head.ends_with('{') {
            let params = inner.join(" ");
            format!("{}{}{}", head, params.trim_end_matches(','), tail)
        } else if inner.is_empty() {
            format!("{} {}", head, tail)
        } else {
            format!("{} {} {}", head, inner.join("; "), tail)
        };
        Ok(folded)
    }
}

/// Whether a line's code leaves an expression open onto the next line.
fn continues(code: &str) -> bool {
    let code = code.trim_end();
    if code.ends_with("++") || code.ends_with("--") {
        return false;
    }
    code.ends_with(|c: char| "+-*/%&|^<>=!,.([{".contains(c))
}

// -- Fields -------------------------------------------------------------------

/// Split a one-line struct body on `;` outside string and rune literals.
fn split_fields(body: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (i, c) in body.char_indices() {
        match quote {
            Some(_) if escaped => escaped = false,
            Some(q) if c == '\\' && q != '`' => escaped = true,
            Some(q) if c == q => quote = None,
            Some(_) => {}
            None if matches!(c, '"' | '\'' | '`') => quote = Some(c),
            None if c == ';' => {
                parts.push(&body[start..i]);
                start = i + 1;
            }
            None => {}
        }
    }
    parts.push(&body[start..]);
    parts
}

fn parse_field(no: usize, text: &str, doc: Vec<String>) -> Result<FieldDecl, SourceError> {
    let (decl, tag) = split_tag(text);
    let decl = decl.trim().trim_end_matches(';').trim_end();

    let (names, ty) = if let Some(caps) = RE_NAMED_FIELD.captures(decl) {
        let names = caps[1].split(',').map(|n| n.trim().to_string()).collect();
        (names, collapse(&caps[2]))
    } else if RE_EMBEDDED_FIELD.is_match(decl) {
        (Vec::new(), decl.to_string())
    } else {
        return Err(SourceError::new(no, format!("malformed field `{}`", text)));
    };

    let doc = doc_text(&doc);
    Ok(FieldDecl {
        names,
        doc: (!doc.is_empty()).then_some(doc),
        tag: tag.map(str::to_string),
        ty,
        line: no,
    })
}

/// Split a trailing tag literal off a field line. Names and types never
/// contain quotes, so the first quote of the closing kind opens the tag.
fn split_tag(text: &str) -> (&str, Option<&str>) {
    let text = text.trim_end();
    for quote in ['`', '"'] {
        if text.ends_with(quote) {
            if let Some(open) = text.find(quote) {
                if open < text.len() - 1 {
                    return (&text[..open], Some(&text[open..]));
                }
            }
        }
    }
    (text, None)
}
