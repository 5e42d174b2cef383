//! Annotation parser for the `cli` struct tag.
//!
//! An annotation is a `;`-separated list of directives:
//!
//! - `arg:<spec>` binds a field to one positional argument, or a range of them
//! - `flag:<long>[,<s>]` binds a field to a named flag
//! - `default:<value>` gives the field a default value, kept verbatim
//!
//! Whitespace around separators and values is ignored. Unknown directives are
//! skipped, and when a directive is repeated the last occurrence wins.

use crate::error::DirectiveError;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::LazyLock;

const ARG: &str = "arg:";
const DEFAULT: &str = "default:";
const FLAG: &str = "flag:";

// N | [S] | [S:E] | [S:] | [:E] | [:]
static RE_ARG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?:(\d+)|\[([^:\]]+)?(:)?([^\]]+)?\])$").unwrap());

static RE_FLAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([a-zA-Z][a-zA-Z0-9_-]+)(?:,\s*([a-zA-Z]))?$").unwrap());

/// Positional argument binding.
///
/// `start == end` is a single fixed position. Otherwise the binding is the
/// half-open range `[start, end)`, or every argument from `start` onward when
/// `end` is [`ArgSpec::UNBOUNDED`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ArgSpec {
    pub start: i64,
    pub end: i64,
}

impl ArgSpec {
    pub const UNBOUNDED: i64 = -1;

    /// A single fixed position.
    pub fn at(index: i64) -> Self {
        Self {
            start: index,
            end: index,
        }
    }

    pub fn is_range(&self) -> bool {
        self.start != self.end
    }

    pub fn is_unbounded(&self) -> bool {
        self.end == Self::UNBOUNDED
    }
}

/// Renders an equivalent, though not necessarily identical, `arg:` value.
impl fmt::Display for ArgSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.start, self.end) {
            (0, Self::UNBOUNDED) => f.write_str("[:]"),
            (start, Self::UNBOUNDED) => write!(f, "[{}:]", start),
            (start, end) if start == end => write!(f, "{}", start),
            (start, end) => write!(f, "[{}:{}]", start, end),
        }
    }
}

/// Named flag binding: a long name and an optional one-letter short form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlagSpec {
    pub long: String,
    pub short: Option<char>,
}

impl FlagSpec {
    /// True when the flag has both a long and a short form.
    pub fn is_posix(&self) -> bool {
        !self.long.is_empty() && self.short.is_some()
    }

    /// Command-line spelling, e.g. `-v, --verbose` or `--verbose`.
    pub fn usage(&self) -> String {
        match self.short {
            Some(short) if self.is_posix() => format!("-{}, --{}", short, self.long),
            _ => format!("--{}", self.long),
        }
    }
}

/// Renders an equivalent, though not necessarily identical, `flag:` directive.
impl fmt::Display for FlagSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.short {
            Some(short) if self.is_posix() => write!(f, "flag:{},{}", self.long, short),
            _ => write!(f, "flag:{}", self.long),
        }
    }
}

/// The three raw directive values of an annotation. Empty means absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directives {
    pub arg: String,
    pub default: String,
    pub flag: String,
}

/// Renders back to annotation syntax, omitting absent directives.
impl fmt::Display for Directives {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = [(ARG, &self.arg), (DEFAULT, &self.default), (FLAG, &self.flag)]
            .into_iter()
            .filter(|(_, value)| !value.is_empty())
            .map(|(prefix, value)| format!("{}{}", prefix, value))
            .collect();
        f.write_str(&parts.join(";"))
    }
}

/// Directive kinds, as named in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Arg,
    Default,
    Flag,
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Directive::Arg => "arg",
            Directive::Default => "default",
            Directive::Flag => "flag",
        })
    }
}

/// Raw annotation string attached to one struct field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Split the annotation into its raw directive values. Never fails.
    pub fn decompose(&self) -> Directives {
        Directives {
            arg: self.lookup(ARG).unwrap_or_default().to_string(),
            default: self.lookup(DEFAULT).unwrap_or_default().to_string(),
            flag: self.lookup(FLAG).unwrap_or_default().to_string(),
        }
    }

    /// Value of the last directive with `prefix`. `Some("")` means the
    /// directive is present with an empty value.
    fn lookup(&self, prefix: &str) -> Option<&str> {
        self.0
            .split(';')
            .filter_map(|component| component.trim().strip_prefix(prefix))
            .map(str::trim)
            .last()
    }

    /// Positional binding, if the annotation has a well-formed `arg:`.
    pub fn arg(&self) -> Option<ArgSpec> {
        self.check_arg().and_then(Result::ok)
    }

    /// Like [`Tag::arg`], but keeps the reason a present directive was rejected.
    pub fn check_arg(&self) -> Option<Result<ArgSpec, DirectiveError>> {
        self.lookup(ARG).map(parse_arg)
    }

    /// Default value, verbatim. Absent when the directive is missing or empty.
    pub fn default_value(&self) -> Option<&str> {
        self.lookup(DEFAULT).filter(|value| !value.is_empty())
    }

    /// Flag binding, if the annotation has a well-formed `flag:`.
    pub fn flag(&self) -> Option<FlagSpec> {
        self.check_flag().and_then(Result::ok)
    }

    /// Like [`Tag::flag`], but keeps the reason a present directive was rejected.
    pub fn check_flag(&self) -> Option<Result<FlagSpec, DirectiveError>> {
        self.lookup(FLAG).map(parse_flag)
    }

    /// Every directive present in the annotation that the accessors would
    /// treat as absent.
    pub fn diagnose(&self) -> Vec<(Directive, DirectiveError)> {
        let mut problems = Vec::new();
        if let Some(Err(e)) = self.check_arg() {
            problems.push((Directive::Arg, e));
        }
        if self.lookup(DEFAULT) == Some("") {
            problems.push((Directive::Default, DirectiveError::Empty));
        }
        if let Some(Err(e)) = self.check_flag() {
            problems.push((Directive::Flag, e));
        }
        problems
    }
}

impl From<&str> for Tag {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl From<String> for Tag {
    fn from(raw: String) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn parse_arg(raw: &str) -> Result<ArgSpec, DirectiveError> {
    if raw.is_empty() {
        return Err(DirectiveError::Empty);
    }
    let caps = RE_ARG
        .captures(raw)
        .ok_or_else(|| DirectiveError::Malformed(raw.to_string()))?;

    if let Some(index) = caps.get(1) {
        return Ok(ArgSpec::at(parse_position(index.as_str(), raw)?));
    }

    let (start, colon, end) = (caps.get(2), caps.get(3), caps.get(4));
    let start = match start {
        Some(s) => parse_position(s.as_str(), raw)?,
        None if colon.is_none() => return Err(DirectiveError::Malformed(raw.to_string())),
        None => 0,
    };
    if colon.is_none() {
        return Ok(ArgSpec::at(start));
    }

    let end = match end {
        None => ArgSpec::UNBOUNDED,
        Some(e) => {
            let end = parse_position(e.as_str(), raw)?;
            if end <= start {
                return Err(DirectiveError::InvalidRange(raw.to_string()));
            }
            end
        }
    };
    Ok(ArgSpec { start, end })
}

fn parse_position(digits: &str, raw: &str) -> Result<i64, DirectiveError> {
    let n: i64 = digits
        .parse()
        .map_err(|_| DirectiveError::Malformed(raw.to_string()))?;
    if n < 0 {
        return Err(DirectiveError::Negative(raw.to_string()));
    }
    Ok(n)
}

fn parse_flag(raw: &str) -> Result<FlagSpec, DirectiveError> {
    if raw.is_empty() {
        return Err(DirectiveError::Empty);
    }
    let caps = RE_FLAG
        .captures(raw)
        .ok_or_else(|| DirectiveError::Malformed(raw.to_string()))?;
    Ok(FlagSpec {
        long: caps[1].to_string(),
        short: caps.get(2).and_then(|m| m.as_str().chars().next()),
    })
}
