//! Query intermediate representation.
//!
//! These are the shapes handed to the execution engine once a
//! [`QueryBuilder`](crate::builder::QueryBuilder) has been filled and built.
//! They carry no behavior beyond construction helpers and serialize to the
//! camelCase JSON the engine expects.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Number;

/// The kind of value carried by an [`Argument`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    String,
    Number,
    Boolean,
    /// The value is an already rendered comparison or pattern expression.
    Custom,
}

/// One name/value/value-kind triple contributed to a [`Field`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Argument {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<ValueType>,
}

impl Argument {
    /// A scalar argument.
    pub fn new(name: impl Into<String>, value: impl Into<String>, value_type: ValueType) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            value_type: Some(value_type),
        }
    }

    /// A pre-rendered comparison expression.
    pub fn custom(name: impl Into<String>, expr: impl Into<String>) -> Self {
        Self::new(name, expr, ValueType::Custom)
    }

    /// A bare column reference with no value.
    pub fn column(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
            value_type: None,
        }
    }
}

/// A named clause of the query (`where`, `select`, `data`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub name: String,
    pub arguments: Vec<Argument>,
}

impl Field {
    pub fn new(name: impl Into<String>, arguments: Vec<Argument>) -> Self {
        Self {
            name: name.into(),
            arguments,
        }
    }

    /// A field with no arguments, used as a marker (`include`, `no_return`).
    pub fn marker(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

/// Sort direction. Serialized as `0` (ascending) or `1` (descending).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Order {
    Asc = 0,
    Desc = 1,
}

impl Serialize for Order {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(*self as u8)
    }
}

impl<'de> Deserialize<'de> for Order {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Order::Asc),
            1 => Ok(Order::Desc),
            n => Err(serde::de::Error::custom(format!(
                "invalid order {n}, expected 0 or 1"
            ))),
        }
    }
}

/// A single `ORDER BY` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBy {
    pub field: String,
    pub direction: Order,
}

/// A statically known foreign-key edge from `table.key` to
/// `joining_table.joining_key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinDefinition {
    pub table: String,
    pub key: String,
    pub joining_table: String,
    pub joining_key: String,
}

impl JoinDefinition {
    pub fn new(
        table: impl Into<String>,
        key: impl Into<String>,
        joining_table: impl Into<String>,
        joining_key: impl Into<String>,
    ) -> Self {
        Self {
            table: table.into(),
            key: key.into(),
            joining_table: joining_table.into(),
            joining_key: joining_key.into(),
        }
    }
}

/// Join definitions keyed by the table that owns the foreign keys.
pub type Joins = IndexMap<String, Vec<JoinDefinition>>;

/// Joins to apply for relation includes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Include {
    pub joins: Vec<JoinDefinition>,
}

/// Execution options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Options {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_by: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_by: Option<Vec<OrderBy>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Include>,
}

/// Identifies the operation kind, target table and schema namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub command: String,
    pub table: String,
    pub schema: String,
}

/// The built query, handed as a whole to the execution engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryIr {
    pub metadata: Metadata,
    pub fields: Vec<Field>,
    pub options: Options,
}

impl QueryIr {
    /// Look up the first field with the given name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}
