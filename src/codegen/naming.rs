//! Name conversions for generated code.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::{Captures, Regex};

static SNAKE_SEGMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"_([a-z])").expect("static regex"));

const KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Names that cannot be written as raw identifiers.
const RESERVED: &[&str] = &["_", "crate", "self", "Self", "super"];

/// `created_at` → `createdAt`.
///
/// Only an underscore followed by a lowercase ASCII letter is folded; other
/// underscores are kept.
pub fn snake_to_camel(s: &str) -> String {
    SNAKE_SEGMENT
        .replace_all(s, |caps: &Captures| caps[1].to_uppercase())
        .into_owned()
}

/// Uppercase the first character.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Type name of the generated client struct.
pub const CLIENT_TYPE: &str = "AuroClient";

/// Field of the generated client holding the engine.
pub const CLIENT_ENGINE_FIELD: &str = "engine";

/// Type name for a table: `user_profiles` → `UserProfiles`.
pub fn type_name(table: &str) -> String {
    rust_ident(&capitalize_first(&snake_to_camel(table)))
}

/// `ident`, suffixed with `_` until it is not in `taken`. The result is
/// added to `taken`.
pub fn unique_ident(ident: String, taken: &mut HashSet<String>) -> String {
    let mut ident = ident;
    while !taken.insert(ident.clone()) {
        ident.push('_');
    }
    ident
}

/// A valid Rust identifier for an arbitrary column or table name.
pub fn rust_ident(name: &str) -> String {
    let mut ident: String = name
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if ident.is_empty() || ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }

    if RESERVED.contains(&ident.as_str()) {
        ident.push('_');
    } else if KEYWORDS.contains(&ident.as_str()) {
        ident.insert_str(0, "r#");
    }

    ident
}

/// The name serde derives for a field written as `ident`.
pub fn serde_name(ident: &str) -> &str {
    ident.strip_prefix("r#").unwrap_or(ident)
}
