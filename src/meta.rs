//! Command metadata compiled from a Go type declaration.
//!
//! A [`Command`] is what the emitter receives: the command name derived from
//! the package, help text from the package doc comment, a description from
//! the type's doc comment, and one [`CommandInput`] per eligible struct field.

use crate::error::CompileError;
use crate::source::{self, go, FieldDecl, SourceFile, TypeKind};
use crate::tag::Tag;
use heck::ToKebabCase;
use regex::Regex;
use serde::Serialize;
use std::io::Read;
use std::sync::LazyLock;
use tracing::{debug, info, warn};

/// Struct tag key holding annotations unless configured otherwise.
pub const DEFAULT_TAG_KEY: &str = "cli";

static RE_WHITESPACE_RUNS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileOptions {
    /// Struct tag key whose value is the annotation string.
    pub tag_key: String,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            tag_key: DEFAULT_TAG_KEY.to_string(),
        }
    }
}

/// How one struct field maps onto a command input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CommandInput {
    pub field_name: String,
    pub tag: Tag,
    pub doc: String,
    #[serde(rename = "type")]
    pub ty: String,
}

/// Compiled metadata for one command type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Command {
    /// Command name on the command line, kebab-cased from the package name.
    pub name: String,
    /// Package the command type lives in.
    pub package: String,
    /// Name of the command type.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Usage help, from the package doc comment.
    pub help: String,
    /// Short description, from the type's doc comment.
    pub description: String,
    /// Eligible struct fields in declaration order.
    pub inputs: Vec<CommandInput>,
}

impl Command {
    /// Build the command for `type_name` from a scanned file.
    ///
    /// A missing or non-struct type yields a command with no inputs; callers
    /// that need the type to exist go through [`from_source`].
    pub fn compile(file: &SourceFile, type_name: &str, options: &CompileOptions) -> Self {
        let name = command_name(&file.package);
        let decl = file.find_type(type_name);
        let inputs = match decl.map(|d| &d.kind) {
            Some(TypeKind::Struct(fields)) => compile_inputs(fields, options),
            _ => Vec::new(),
        };

        Command {
            help: sanitize_help(&file.doc, &file.package, &name),
            name,
            package: file.package.clone(),
            type_name: type_name.to_string(),
            description: decl.map(|d| d.doc.trim().to_string()).unwrap_or_default(),
            inputs,
        }
    }
}

/// Read Go source from `reader` and compile the command for `type_name`.
pub fn from_reader(
    file: &str,
    mut reader: impl Read,
    type_name: &str,
    options: &CompileOptions,
) -> Result<Command, CompileError> {
    let mut text = String::new();
    reader
        .read_to_string(&mut text)
        .map_err(|source| CompileError::Io {
            file: file.to_string(),
            source,
        })?;
    from_source(file, &text, type_name, options)
}

/// Compile the command for `type_name` from Go source text.
///
/// Fails when the source cannot be scanned, or when `type_name` is not an
/// exported struct type declared in it.
pub fn from_source(
    file: &str,
    text: &str,
    type_name: &str,
    options: &CompileOptions,
) -> Result<Command, CompileError> {
    let parsed = go::parse(text).map_err(|source| {
        warn!(file, error = %source, "failed to scan declarations");
        CompileError::SourceUnparsable {
            file: file.to_string(),
            source,
        }
    })?;

    let not_found = || CompileError::TypeNotFound {
        file: file.to_string(),
        type_name: type_name.to_string(),
    };
    match parsed.find_type(type_name).map(|d| &d.kind) {
        Some(_) if !source::is_exported(type_name) => {
            warn!(file, type_name, "type is unexported");
            return Err(not_found());
        }
        None => {
            warn!(file, type_name, "type not found in file");
            return Err(not_found());
        }
        Some(TypeKind::Other(ty)) => {
            warn!(file, type_name, underlying = %ty, "type is not a struct");
            return Err(not_found());
        }
        Some(TypeKind::Struct(_)) => {}
    }

    Ok(Command::compile(&parsed, type_name, options))
}

/// Command name for a package: the package name in kebab-case.
pub fn command_name(package: &str) -> String {
    package.to_kebab_case()
}

/// Turn a package doc comment into help text.
///
/// Drops the leading `Package ` marker, swaps a leading package name for the
/// command name, and collapses whitespace runs.
pub fn sanitize_help(doc: &str, package: &str, command: &str) -> String {
    let doc = match doc.strip_prefix("Package ") {
        Some(rest) => rest,
        None => {
            warn!(package, "package doc comment is malformed; proceeding anyway");
            doc
        }
    };
    if doc.is_empty() {
        warn!(package, "package has no doc comment");
        return String::new();
    }

    let doc = if doc.starts_with(package) {
        doc.replacen(package, command, 1)
    } else {
        doc.to_string()
    };
    RE_WHITESPACE_RUNS.replace_all(&doc, " ").trim().to_string()
}

/// Compile the eligible fields of a struct, in declaration order.
///
/// Embedded fields, multi-name fields and unexported fields are skipped.
pub fn compile_inputs(fields: &[FieldDecl], options: &CompileOptions) -> Vec<CommandInput> {
    fields
        .iter()
        .filter_map(|field| compile_input(field, options))
        .collect()
}

fn compile_input(field: &FieldDecl, options: &CompileOptions) -> Option<CommandInput> {
    let name = match field.names.as_slice() {
        [] => {
            info!(line = field.line, ty = %field.ty, "skipping nameless field");
            return None;
        }
        [name] => name,
        names => {
            warn!(line = field.line, ?names, "skipping field with multiple names");
            return None;
        }
    };
    if !source::is_exported(name) {
        info!(field = %name, "skipping unexported field");
        return None;
    }
    debug!(field = %name, "compiling field");

    let doc = match &field.doc {
        Some(doc) => {
            debug!(field = %name, doc = %doc, "field has doc comment");
            doc.clone()
        }
        None => {
            debug!(field = %name, "field has no doc comment");
            String::new()
        }
    };

    let tag = field
        .tag
        .as_deref()
        .and_then(|literal| annotation(name, literal, &options.tag_key))
        .unwrap_or_default();
    for (directive, error) in tag.diagnose() {
        warn!(field = %name, %directive, %error, "ignoring malformed directive");
    }

    Some(CommandInput {
        field_name: name.clone(),
        tag,
        doc,
        ty: field.ty.clone(),
    })
}

/// Pull the annotation for `key` out of a struct tag literal.
fn annotation(field: &str, literal: &str, key: &str) -> Option<Tag> {
    let tag = match source::unquote(literal) {
        Ok(tag) => tag,
        Err(error) => {
            warn!(field, %error, "couldn't unquote struct tag");
            return None;
        }
    };
    match source::lookup_tag(&tag, key) {
        Some(value) => {
            debug!(field, key, annotation = %value, "field has annotation");
            Some(Tag::from(value))
        }
        None => {
            debug!(field, key, "field has no annotation");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE: &str = r#"// Package simple is a simple test.
package simple

// Tester is a test.
type Tester struct {
	// String command input.
	String string
}
"#;

    fn field(names: &[&str], tag: Option<&str>) -> FieldDecl {
        FieldDecl {
            names: names.iter().map(|n| n.to_string()).collect(),
            doc: None,
            tag: tag.map(str::to_string),
            ty: "string".to_string(),
            line: 1,
        }
    }

    #[test]
    fn end_to_end_simple() {
        let got = from_source("simple.go", SIMPLE, "Tester", &CompileOptions::default()).unwrap();
        let want = Command {
            name: "simple".to_string(),
            package: "simple".to_string(),
            type_name: "Tester".to_string(),
            help: "simple is a simple test.".to_string(),
            description: "Tester is a test.".to_string(),
            inputs: vec![CommandInput {
                field_name: "String".to_string(),
                tag: Tag::default(),
                doc: "String command input.".to_string(),
                ty: "string".to_string(),
            }],
        };
        assert_eq!(got, want);
    }

    #[test]
    fn missing_type_is_not_found() {
        let err = from_source("simple.go", SIMPLE, "Nope", &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::TypeNotFound { .. }));
    }

    #[test]
    fn non_struct_type_is_not_found() {
        let src = "package p\n\ntype Mode int\n";
        let err = from_source("p.go", src, "Mode", &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::TypeNotFound { .. }));
    }

    #[test]
    fn unexported_type_is_not_found() {
        let src = "package p\n\ntype tester struct {\n\tName string\n}\n";
        let err = from_source("p.go", src, "tester", &CompileOptions::default()).unwrap_err();
        assert!(matches!(err, CompileError::TypeNotFound { .. }));
    }

    #[test]
    fn unparsable_source_is_distinct() {
        let err = from_source("bad.go", "not go at all", "T", &CompileOptions::default())
            .unwrap_err();
        assert!(matches!(err, CompileError::SourceUnparsable { .. }));
    }

    #[test]
    fn compile_without_matching_type_has_no_inputs() {
        let file = go::parse(SIMPLE).unwrap();
        let cmd = Command::compile(&file, "Missing", &CompileOptions::default());
        assert_eq!(cmd.name, "simple");
        assert_eq!(cmd.description, "");
        assert!(cmd.inputs.is_empty());
    }

    #[test]
    fn field_filtering() {
        let fields = [
            field(&[], None),
            field(&["First"], None),
            field(&["A", "B"], None),
            field(&["hidden"], None),
            field(&["Second"], Some(r#"`cli:"arg:0"`"#)),
        ];
        let inputs = compile_inputs(&fields, &CompileOptions::default());
        let names: Vec<&str> = inputs.iter().map(|i| i.field_name.as_str()).collect();
        assert_eq!(names, ["First", "Second"]);
        assert_eq!(inputs[1].tag, Tag::from("arg:0"));
    }

    #[test]
    fn skipped_field_shapes_yield_nothing() {
        let fields = [field(&[], None), field(&["A", "B"], None), field(&["lower"], None)];
        assert!(compile_inputs(&fields, &CompileOptions::default()).is_empty());
    }

    #[test]
    fn tag_key_selects_annotation() {
        let fields = [field(&["Name"], Some(r#"`json:"name" opt:"flag:name,n"`"#))];
        let default_key = compile_inputs(&fields, &CompileOptions::default());
        assert!(default_key[0].tag.is_empty());

        let options = CompileOptions {
            tag_key: "opt".to_string(),
        };
        let custom_key = compile_inputs(&fields, &options);
        assert_eq!(custom_key[0].tag.as_str(), "flag:name,n");
    }

    #[test]
    fn malformed_tag_literal_is_ignored() {
        let fields = [field(&["Name"], Some(r#""cli:\q""#))];
        let inputs = compile_inputs(&fields, &CompileOptions::default());
        assert_eq!(inputs.len(), 1);
        assert!(inputs[0].tag.is_empty());
    }

    #[test]
    fn malformed_directive_keeps_field() {
        let fields = [field(&["Name"], Some(r#"`cli:"arg:[4:2];flag:name"`"#))];
        let inputs = compile_inputs(&fields, &CompileOptions::default());
        assert_eq!(inputs[0].tag.arg(), None);
        assert_eq!(inputs[0].tag.flag().map(|f| f.long), Some("name".to_string()));
    }

    #[test]
    fn command_names_are_kebab_case() {
        assert_eq!(command_name("simple"), "simple");
        assert_eq!(command_name("fooBar"), "foo-bar");
        assert_eq!(command_name("foo_bar"), "foo-bar");
    }

    #[test]
    fn help_is_sanitized() {
        assert_eq!(
            sanitize_help("Package simple is a simple test.\n", "simple", "simple"),
            "simple is a simple test."
        );
        assert_eq!(
            sanitize_help("Package fooBar does\n\tthings  to fooBar.", "fooBar", "foo-bar"),
            "foo-bar does things to fooBar."
        );
        assert_eq!(
            sanitize_help("Does things without the marker.", "p", "p"),
            "Does things without the marker."
        );
        assert_eq!(sanitize_help("", "p", "p"), "");
        assert_eq!(sanitize_help("Package ", "p", "p"), "");
        assert_eq!(sanitize_help("Package   \n ", "p", "p"), "");
    }
}
