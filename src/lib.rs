//! climeta — compile `cli` struct-tag annotations into command metadata.
//!
//! Given Go source and the name of a struct type, produces a [`Command`]:
//! the command name and help text derived from the package, a description
//! from the type's doc comment, and one [`CommandInput`] per exported field
//! carrying its raw annotation. [`Tag`] parses annotations into positional
//! ([`ArgSpec`]) and flag ([`FlagSpec`]) bindings for a code emitter.
//!
//! ```
//! use climeta::{from_source, CompileOptions};
//!
//! let src = r#"
//! // Package greet says hello.
//! package greet
//!
//! // Greeter greets someone.
//! type Greeter struct {
//!     // Name to greet.
//!     Name string `cli:"arg:0;default:world"`
//! }
//! "#;
//! let cmd = from_source("greet.go", src, "Greeter", &CompileOptions::default()).unwrap();
//! assert_eq!(cmd.help, "greet says hello.");
//! assert_eq!(cmd.inputs[0].tag.default_value(), Some("world"));
//! ```

pub mod error;
pub mod meta;
pub mod render;
pub mod source;
pub mod tag;

pub use error::{CompileError, DirectiveError, SourceError};
pub use meta::{from_reader, from_source, Command, CommandInput, CompileOptions, DEFAULT_TAG_KEY};
pub use tag::{ArgSpec, Directives, FlagSpec, Tag};
