//! Field types used by generated declarations.
//!
//! A string or date column holds either a plain value or, when the
//! declaration is used as a filter, an operator object:
//!
//! ```json
//! { "name": { "startsWith": "Al" }, "createdAt": { "gte": "2024-01-01T00:00:00Z" } }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Type of columns whose database type has no mapping.
pub type Unknown = serde_json::Value;

/// Pattern filters for a string column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StringFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contains: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub starts_with: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ends_with: Option<String>,
}

/// A string column: a value or a pattern filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StringField {
    Value(String),
    Filter(StringFilter),
}

impl StringField {
    pub fn contains(s: impl Into<String>) -> Self {
        StringField::Filter(StringFilter {
            contains: Some(s.into()),
            ..Default::default()
        })
    }

    pub fn starts_with(s: impl Into<String>) -> Self {
        StringField::Filter(StringFilter {
            starts_with: Some(s.into()),
            ..Default::default()
        })
    }

    pub fn ends_with(s: impl Into<String>) -> Self {
        StringField::Filter(StringFilter {
            ends_with: Some(s.into()),
            ..Default::default()
        })
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            StringField::Value(s) => Some(s),
            StringField::Filter(_) => None,
        }
    }
}

impl From<&str> for StringField {
    fn from(s: &str) -> Self {
        StringField::Value(s.to_string())
    }
}

impl From<String> for StringField {
    fn from(s: String) -> Self {
        StringField::Value(s)
    }
}

/// Range filters for a date column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equals: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<DateTime<Utc>>,
}

/// A date column: a timestamp or a range filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateField {
    Value(DateTime<Utc>),
    Filter(DateFilter),
}

impl DateField {
    /// Between `from` (inclusive) and `to` (exclusive).
    pub fn between(from: DateTime<Utc>, to: DateTime<Utc>) -> Self {
        DateField::Filter(DateFilter {
            gte: Some(from),
            lt: Some(to),
            ..Default::default()
        })
    }

    pub fn as_datetime(&self) -> Option<&DateTime<Utc>> {
        match self {
            DateField::Value(dt) => Some(dt),
            DateField::Filter(_) => None,
        }
    }
}

impl From<DateTime<Utc>> for DateField {
    fn from(dt: DateTime<Utc>) -> Self {
        DateField::Value(dt)
    }
}
