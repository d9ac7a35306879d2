//! Code generation for introspected schemas.

pub mod document;
pub mod naming;
pub mod render;

pub use document::{ClientEntry, ConnectionDecl, Document, FieldDecl, FieldType, Node, TypeDecl};
pub use render::render;

/// File name of the declarations artifact.
pub const DECLARATIONS_FILE: &str = "types.rs";

/// File name of the runtime artifact.
pub const RUNTIME_FILE: &str = "runtime.rs";

/// The two rendered source files of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub declarations: String,
    pub runtime: String,
}
