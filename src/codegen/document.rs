//! The generated-code document model.
//!
//! Generation builds a [`Document`] out of declaration nodes; rendering to
//! source text happens separately in [`render`](super::render).

use std::collections::HashSet;

use crate::ast::Joins;
use crate::schema::{Column, Table};

use super::naming::{
    CLIENT_ENGINE_FIELD, CLIENT_TYPE, rust_ident, snake_to_camel, type_name, unique_ident,
};

/// Field type of a generated declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    Number,
    Boolean,
    StringField,
    DateField,
    Any,
    Unknown,
}

impl FieldType {
    /// Map a database data type name.
    pub fn from_data_type(data_type: &str) -> Self {
        match data_type {
            "bigint" | "integer" | "smallint" => FieldType::Number,
            "boolean" => FieldType::Boolean,
            "character varying" | "text" => FieldType::StringField,
            "date" | "timestamp with time zone" => FieldType::DateField,
            "jsonb" => FieldType::Any,
            _ => FieldType::Unknown,
        }
    }

    /// The Rust type written for this field.
    pub fn rust_type(self) -> &'static str {
        match self {
            FieldType::Number => "i64",
            FieldType::Boolean => "bool",
            FieldType::StringField => "::auro::fields::StringField",
            FieldType::DateField => "::auro::fields::DateField",
            FieldType::Any => "::serde_json::Value",
            FieldType::Unknown => "::auro::fields::Unknown",
        }
    }
}

/// One field of a table declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// camelCase name, as serialized.
    pub name: String,
    /// Source column.
    pub column: String,
    /// Rust identifier of the struct field, unique within its struct.
    pub ident: String,
    pub ty: FieldType,
    pub nullable: bool,
    /// Non-primary-key columns are optional.
    pub optional: bool,
}

impl FieldDecl {
    pub fn from_column(column: &Column, ident: String) -> Self {
        Self {
            name: snake_to_camel(&column.name),
            column: column.name.clone(),
            ident,
            ty: FieldType::from_data_type(&column.data_type),
            nullable: column.is_nullable,
            optional: !column.is_primary_key,
        }
    }
}

/// The declaration generated for one table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDecl {
    pub name: String,
    pub table: String,
    pub fields: Vec<FieldDecl>,
}

impl TypeDecl {
    /// Declare `table` under the type name `name`.
    ///
    /// Columns whose identifiers collide (`user-id` and `user_id`) get `_`
    /// suffixes in column order.
    pub fn from_table(table: &Table, name: String) -> Self {
        let mut taken = HashSet::new();
        let fields = table
            .columns
            .iter()
            .map(|column| {
                let ident = unique_ident(rust_ident(&column.name), &mut taken);
                FieldDecl::from_column(column, ident)
            })
            .collect();

        Self {
            name,
            table: table.table_name.clone(),
            fields,
        }
    }
}

/// One query handle on the generated client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEntry {
    pub property: String,
    pub table: String,
    pub type_name: String,
}


/// Relates a table's type to the type of the table it joins to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionDecl {
    pub type_name: String,
    pub related: String,
}

/// A declaration node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Type(TypeDecl),
    Client(Vec<ClientEntry>),
    /// The full join table.
    Joins(Joins),
    Connection(ConnectionDecl),
    /// The schema has no joins at all.
    NoJoins,
}

/// Everything one generation run produces, before rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub schema: String,
    pub nodes: Vec<Node>,
}

impl Document {
    pub fn new(schema: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            nodes: Vec::new(),
        }
    }

    pub fn push(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn extend(&mut self, nodes: impl IntoIterator<Item = Node>) {
        self.nodes.extend(nodes);
    }

    /// Push one type node per table, then the client node.
    ///
    /// Type names never repeat and never take the client's name; client
    /// properties never repeat and never take the engine field. Later
    /// tables get `_` suffixes on collision.
    pub fn declare_tables(&mut self, tables: &[Table]) {
        let mut type_names: HashSet<String> = HashSet::from([CLIENT_TYPE.to_string()]);
        let mut properties: HashSet<String> = HashSet::from([CLIENT_ENGINE_FIELD.to_string()]);

        let mut entries = Vec::with_capacity(tables.len());
        for table in tables {
            let name = unique_ident(type_name(&table.table_name), &mut type_names);
            entries.push(ClientEntry {
                property: unique_ident(rust_ident(&table.table_name), &mut properties),
                table: table.table_name.clone(),
                type_name: name.clone(),
            });
            self.push(Node::Type(TypeDecl::from_table(table, name)));
        }
        self.push(Node::Client(entries));
    }

    pub fn types(&self) -> impl Iterator<Item = &TypeDecl> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Type(decl) => Some(decl),
            _ => None,
        })
    }

    pub fn connections(&self) -> impl Iterator<Item = &ConnectionDecl> {
        self.nodes.iter().filter_map(|node| match node {
            Node::Connection(decl) => Some(decl),
            _ => None,
        })
    }

    pub fn client(&self) -> Option<&[ClientEntry]> {
        self.nodes.iter().find_map(|node| match node {
            Node::Client(entries) => Some(entries.as_slice()),
            _ => None,
        })
    }

    pub fn joins(&self) -> Option<&Joins> {
        self.nodes.iter().find_map(|node| match node {
            Node::Joins(joins) => Some(joins),
            _ => None,
        })
    }
}
