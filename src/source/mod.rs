//! Declaration introspection — the shape the compiler reads from source text.

pub mod go;
pub mod structtag;

pub use structtag::{lookup_tag, unquote};

/// Declarations recovered from one source file.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub package: String,
    /// Package doc comment, comment markers removed.
    pub doc: String,
    pub types: Vec<TypeDecl>,
}

impl SourceFile {
    pub fn find_type(&self, name: &str) -> Option<&TypeDecl> {
        self.types.iter().find(|t| t.name == name)
    }
}

/// A named type declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub doc: String,
    pub kind: TypeKind,
    pub line: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeKind {
    /// A struct type with its fields in declaration order.
    Struct(Vec<FieldDecl>),
    /// Any other type; holds the textual type descriptor.
    Other(String),
}

/// One field line of a struct type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Empty for embedded fields; more than one for `A, B int`.
    pub names: Vec<String>,
    pub doc: Option<String>,
    /// Tag literal exactly as written, quotes included.
    pub tag: Option<String>,
    pub ty: String,
    pub line: usize,
}

/// Whether an identifier is visible outside its package.
pub fn is_exported(name: &str) -> bool {
    name.chars().next().is_some_and(char::is_uppercase)
}
