//! Rendering of a [`Document`] into Rust source.
//!
//! The declarations artifact holds the table structs, the client struct,
//! connection impls and the joined-table list. The runtime artifact holds the
//! schema constant, the join table and the client constructor; it expects to
//! sit next to the declarations as `mod types; mod runtime;`.
//!
//! Generated code imports nothing but the client type and names every other
//! item by its full path, so table types can take any name.

use crate::ast::{JoinDefinition, Joins};

use super::Artifacts;
use super::document::{ClientEntry, ConnectionDecl, Document, FieldDecl, Node, TypeDecl};
use super::naming::{CLIENT_ENGINE_FIELD, CLIENT_TYPE, serde_name};

const HEADER: &str = "// Generated by auro. Do not edit.\n";

const OPTION: &str = "::core::option::Option";
const ARC: &str = "::std::sync::Arc";
const ENGINE: &str = "::auro::engine::Engine";
const QUERY: &str = "::auro::client::Query";
const MODEL: &str = "::auro::client::Model";
const CONNECTIONS: &str = "::auro::client::Connections";
const JOINS: &str = "::auro::ast::Joins";
const JOIN_DEFINITION: &str = "::auro::ast::JoinDefinition";
const CATALOG: &str = "::auro::config::Catalog";

/// Render both artifacts.
pub fn render(doc: &Document) -> Artifacts {
    Artifacts {
        declarations: render_declarations(doc),
        runtime: render_runtime(doc),
    }
}

/// Prefix of the line opening each table's model impl.
pub fn model_impl_prefix() -> String {
    format!("impl {} for ", MODEL)
}

/// Prefix of the line opening each connection impl.
pub fn connection_impl_prefix() -> String {
    format!("impl {} for ", CONNECTIONS)
}

fn render_declarations(doc: &Document) -> String {
    let mut out = String::from(HEADER);
    out.push_str("#![allow(non_snake_case, non_camel_case_types, dead_code)]\n");

    for node in &doc.nodes {
        match node {
            Node::Type(decl) => render_type(&mut out, decl),
            Node::Client(entries) => render_client(&mut out, entries),
            Node::Connection(decl) => render_connection(&mut out, decl),
            Node::Joins(joins) => render_joined_tables(&mut out, joins.keys().map(String::as_str)),
            Node::NoJoins => render_joined_tables(&mut out, std::iter::empty()),
        }
    }

    out
}

fn render_type(out: &mut String, decl: &TypeDecl) {
    out.push_str(&format!(
        "\n/// Row of `{}`.\n#[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]\npub struct {} {{\n",
        decl.table, decl.name
    ));
    for field in &decl.fields {
        render_field(out, field);
    }
    out.push_str("}\n");

    out.push_str(&format!(
        "\n{}{} {{\n    const TABLE: &'static str = {:?};\n}}\n",
        model_impl_prefix(),
        decl.name,
        decl.table
    ));
}

fn render_field(out: &mut String, field: &FieldDecl) {
    let mut attrs = Vec::new();
    if field.name != serde_name(&field.ident) {
        attrs.push(format!("rename = {:?}", field.name));
    }
    if field.optional {
        attrs.push("default".to_string());
        attrs.push(format!("skip_serializing_if = \"{}::is_none\"", OPTION));
    }
    if !attrs.is_empty() {
        out.push_str(&format!("    #[serde({})]\n", attrs.join(", ")));
    }

    // A nullable optional column collapses into one Option.
    let ty = field.ty.rust_type();
    let ty = if field.nullable || field.optional {
        format!("{}<{}>", OPTION, ty)
    } else {
        ty.to_string()
    };
    out.push_str(&format!("    pub {}: {},\n", field.ident, ty));
}

fn render_client(out: &mut String, entries: &[ClientEntry]) {
    out.push_str(&format!(
        "\n/// Typed entry point, one query handle per table.\npub struct {} {{\n",
        CLIENT_TYPE
    ));
    for entry in entries {
        out.push_str(&format!("    pub {}: {}<{}>,\n", entry.property, QUERY, entry.type_name));
    }
    out.push_str(&format!(
        "    pub(crate) {}: {}<dyn {}>,\n}}\n",
        CLIENT_ENGINE_FIELD, ARC, ENGINE
    ));
}

fn render_connection(out: &mut String, decl: &ConnectionDecl) {
    out.push_str(&format!(
        "\n{}{} {{\n    type Related = {};\n}}\n",
        connection_impl_prefix(),
        decl.type_name,
        decl.related
    ));
}

fn render_joined_tables<'a>(out: &mut String, tables: impl Iterator<Item = &'a str>) {
    let tables: Vec<String> = tables.map(|t| format!("{:?}", t)).collect();
    out.push_str(&format!(
        "\n/// Tables with at least one foreign key.\npub const JOINED_TABLES: &[&str] = &[{}];\n",
        tables.join(", ")
    ));
}

fn render_runtime(doc: &Document) -> String {
    let mut out = String::from(HEADER);
    out.push_str("#![allow(dead_code)]\n\n");
    out.push_str(&format!("use super::types::{};\n\n", CLIENT_TYPE));

    out.push_str(&format!("pub const SCHEMA: &str = {:?};\n", doc.schema));
    render_join_table(&mut out, doc.joins());
    render_constructor(&mut out, doc.client().unwrap_or_default());

    out
}

fn render_join_table(out: &mut String, joins: Option<&Joins>) {
    let joins = match joins {
        Some(joins) if !joins.is_empty() => joins,
        _ => {
            out.push_str(&format!("\npub fn joins() -> {0} {{\n    {0}::new()\n}}\n", JOINS));
            return;
        }
    };

    out.push_str(&format!(
        "\npub fn joins() -> {0} {{\n    let mut joins = {0}::new();\n",
        JOINS
    ));
    for (table, definitions) in joins {
        out.push_str(&format!("    joins.insert(\n        {:?}.to_string(),\n        vec![\n", table));
        for join in definitions {
            out.push_str(&format!("            {},\n", join_literal(join)));
        }
        out.push_str("        ],\n    );\n");
    }
    out.push_str("    joins\n}\n");
}

fn join_literal(join: &JoinDefinition) -> String {
    format!(
        "{}::new({:?}, {:?}, {:?}, {:?})",
        JOIN_DEFINITION, join.table, join.key, join.joining_table, join.joining_key
    )
}

fn render_constructor(out: &mut String, entries: &[ClientEntry]) {
    out.push_str(&format!(
        "\nimpl {} {{\n    pub fn new({}: {}<dyn {}>) -> Self {{\n",
        CLIENT_TYPE, CLIENT_ENGINE_FIELD, ARC, ENGINE
    ));
    if !entries.is_empty() {
        out.push_str(&format!(
            "        let catalog = {}::new({}::new(SCHEMA, joins()));\n",
            ARC, CATALOG
        ));
    }
    out.push_str("        Self {\n");
    for entry in entries {
        out.push_str(&format!(
            "            {property}: {QUERY}::new({table:?}, {ARC}::clone(&{CLIENT_ENGINE_FIELD}), {ARC}::clone(&catalog)),\n",
            property = entry.property,
            table = entry.table,
        ));
    }
    out.push_str(&format!("            {},\n        }}\n    }}\n\n", CLIENT_ENGINE_FIELD));
    out.push_str(&format!(
        "    pub async fn query_raw(\n        &self,\n        query: &str,\n    ) -> ::auro::error::AuroResult<{}<::serde_json::Value>> {{\n        ::auro::client::raw(self.{}.as_ref(), query).await\n    }}\n}}\n",
        OPTION, CLIENT_ENGINE_FIELD
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::document::FieldType;
    use crate::schema::Table;
    use pretty_assertions::assert_eq;

    fn field(column: &str, name: &str, ty: FieldType, nullable: bool, optional: bool) -> FieldDecl {
        FieldDecl {
            name: name.into(),
            column: column.into(),
            ident: crate::codegen::naming::rust_ident(column),
            ty,
            nullable,
            optional,
        }
    }

    fn users() -> TypeDecl {
        TypeDecl {
            name: "Users".into(),
            table: "users".into(),
            fields: vec![
                field("id", "id", FieldType::Number, false, false),
                field("created_at", "createdAt", FieldType::DateField, true, true),
                field("type", "type", FieldType::Unknown, false, true),
            ],
        }
    }

    #[test]
    fn test_render_struct() {
        let mut out = String::new();
        render_type(&mut out, &users());

        assert!(out.contains(
            "#[derive(Debug, Clone, PartialEq, ::serde::Serialize, ::serde::Deserialize)]\npub struct Users {\n"
        ));
        assert!(out.contains("    pub id: i64,\n"));
        assert!(out.contains(
            "    #[serde(rename = \"createdAt\", default, skip_serializing_if = \"::core::option::Option::is_none\")]\n    pub created_at: ::core::option::Option<::auro::fields::DateField>,\n"
        ));
        assert!(out.contains(
            "    #[serde(default, skip_serializing_if = \"::core::option::Option::is_none\")]\n    pub r#type: ::core::option::Option<::auro::fields::Unknown>,\n"
        ));
        assert!(out.contains(
            "impl ::auro::client::Model for Users {\n    const TABLE: &'static str = \"users\";\n}\n"
        ));
    }

    #[test]
    fn test_render_nullable_required() {
        let mut out = String::new();
        render_field(&mut out, &field("id", "id", FieldType::Number, true, false));
        assert_eq!(out, "    pub id: ::core::option::Option<i64>,\n");
    }

    #[test]
    fn test_render_suffixed_field_is_renamed() {
        let mut out = String::new();
        let mut decl = field("user_id", "userId", FieldType::Number, false, false);
        decl.ident = "user_id_".into();
        render_field(&mut out, &decl);
        assert_eq!(out, "    #[serde(rename = \"userId\")]\n    pub user_id_: i64,\n");
    }

    #[test]
    fn test_render_connection() {
        let mut out = String::new();
        render_connection(
            &mut out,
            &ConnectionDecl {
                type_name: "Posts".into(),
                related: "Users".into(),
            },
        );
        assert_eq!(
            out,
            "\nimpl ::auro::client::Connections for Posts {\n    type Related = Users;\n}\n"
        );
    }

    #[test]
    fn test_render_no_joins() {
        let mut doc = Document::new("public");
        doc.push(Node::Type(users()));
        doc.push(Node::Client(vec![ClientEntry {
            property: "users".into(),
            table: "users".into(),
            type_name: "Users".into(),
        }]));
        doc.push(Node::NoJoins);

        let artifacts = render(&doc);
        assert!(artifacts.declarations.contains("pub const JOINED_TABLES: &[&str] = &[];"));
        assert!(artifacts.declarations.contains("    pub users: ::auro::client::Query<Users>,\n"));
        assert!(artifacts.declarations.contains(
            "    pub(crate) engine: ::std::sync::Arc<dyn ::auro::engine::Engine>,\n"
        ));
        assert!(artifacts.runtime.contains("use super::types::AuroClient;\n"));
        assert!(artifacts.runtime.contains("pub const SCHEMA: &str = \"public\";"));
        assert!(artifacts.runtime.contains(
            "pub fn joins() -> ::auro::ast::Joins {\n    ::auro::ast::Joins::new()\n}\n"
        ));
        assert!(artifacts.runtime.contains(
            "users: ::auro::client::Query::new(\"users\", ::std::sync::Arc::clone(&engine), ::std::sync::Arc::clone(&catalog)),"
        ));
    }

    #[test]
    fn test_render_joins() {
        let mut joins = Joins::new();
        joins.insert(
            "posts".into(),
            vec![JoinDefinition::new("posts", "author_id", "users", "id")],
        );

        let mut doc = Document::new("app");
        doc.push(Node::Joins(joins));

        let artifacts = render(&doc);
        assert!(artifacts.declarations.contains("pub const JOINED_TABLES: &[&str] = &[\"posts\"];"));
        assert!(artifacts.runtime.contains(
            "            ::auro::ast::JoinDefinition::new(\"posts\", \"author_id\", \"users\", \"id\"),\n"
        ));
        assert!(!artifacts.runtime.contains("let catalog"));
    }

    #[test]
    fn test_generated_code_imports_only_the_client() {
        let mut doc = Document::new("public");
        doc.declare_tables(&[Table::new("users")]);
        doc.push(Node::NoJoins);

        let artifacts = render(&doc);
        let imports = |text: &str| -> Vec<String> {
            text.lines()
                .filter(|line| line.starts_with("use "))
                .map(str::to_string)
                .collect()
        };
        assert!(imports(&artifacts.declarations).is_empty());
        assert_eq!(imports(&artifacts.runtime), vec!["use super::types::AuroClient;"]);
    }

    #[test]
    fn test_render_tables_named_like_library_items() {
        let tables: Vec<Table> = ["connections", "query", "option", "engine", "auro_client", "model"]
            .into_iter()
            .map(Table::new)
            .collect();
        let mut doc = Document::new("public");
        doc.declare_tables(&tables);

        let mut joins = Joins::new();
        joins.insert(
            "connections".into(),
            vec![JoinDefinition::new("connections", "query_id", "query", "id")],
        );
        doc.push(Node::Joins(joins));
        doc.push(Node::Connection(ConnectionDecl {
            type_name: "Connections".into(),
            related: "Query".into(),
        }));

        let artifacts = render(&doc);
        let declarations = &artifacts.declarations;
        assert!(declarations.contains("pub struct Connections {\n"));
        assert!(declarations.contains("impl ::auro::client::Model for Connections {\n"));
        assert!(declarations.contains(
            "impl ::auro::client::Connections for Connections {\n    type Related = Query;\n}\n"
        ));
        assert!(declarations.contains("    pub connections: ::auro::client::Query<Connections>,\n"));
        assert!(declarations.contains("    pub query: ::auro::client::Query<Query>,\n"));
        assert!(declarations.contains("    pub option: ::auro::client::Query<Option>,\n"));
        assert!(declarations.contains("pub struct AuroClient_ {\n"));
        assert!(declarations.contains("    pub auro_client: ::auro::client::Query<AuroClient_>,\n"));
        assert!(declarations.contains("    pub engine_: ::auro::client::Query<Engine>,\n"));
        assert!(declarations.contains(
            "    pub(crate) engine: ::std::sync::Arc<dyn ::auro::engine::Engine>,\n"
        ));
        assert!(artifacts.runtime.contains("            engine_: ::auro::client::Query::new(\"engine\", "));
        assert!(artifacts.runtime.contains("            engine,\n"));
    }
}
