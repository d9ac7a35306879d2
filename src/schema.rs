//! Schema metadata read from introspection output.
//!
//! Column rows arrive as a flat JSON array, one row per column:
//!
//! ```json
//! [{ "table_name": "users", "column_name": "id", "data_type": "integer",
//!    "is_nullable": "NO", "is_primary_key": "YES" }]
//! ```
//!
//! Foreign-key rows carry `table_name`, `column_name`, `foreign_table_name`
//! and `foreign_column_name`.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::ast::{JoinDefinition, Joins};
use crate::error::{AuroError, AuroResult};

/// One physical column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub data_type: String,
    pub is_nullable: bool,
    pub is_primary_key: bool,
}

/// A table and its columns in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub table_name: String,
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            columns: Vec::new(),
        }
    }

    /// Append `column` unless one with the same name is already present.
    pub fn add_column(&mut self, column: Column) {
        if !self.columns.iter().any(|c| c.name == column.name) {
            self.columns.push(column);
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }
}

/// A raw introspection row.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Row {
    #[serde(default)]
    pub table_name: Option<String>,
    #[serde(default)]
    pub column_name: Option<String>,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default, deserialize_with = "yes_no")]
    pub is_nullable: bool,
    #[serde(default, deserialize_with = "yes_no")]
    pub is_primary_key: bool,
    #[serde(default)]
    pub foreign_table_name: Option<String>,
    #[serde(default)]
    pub foreign_column_name: Option<String>,
}

impl Row {
    /// The foreign-key edge this row describes, if all four parts are present.
    pub fn join(&self) -> Option<JoinDefinition> {
        Some(JoinDefinition::new(
            present(&self.table_name)?,
            present(&self.column_name)?,
            present(&self.foreign_table_name)?,
            present(&self.foreign_column_name)?,
        ))
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

/// Accept `"YES"`/`"NO"` as well as plain booleans.
fn yes_no<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(b) => b,
        Value::String(s) => s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true"),
        _ => false,
    })
}

fn parse_rows(json: &str, context: &'static str) -> AuroResult<Vec<Row>> {
    serde_json::from_str(json).map_err(|e| AuroError::parse(context, e.to_string()))
}

/// Fold raw column rows into tables.
///
/// Tables and columns keep first-seen order. Duplicate column rows and rows
/// missing a table or column name are dropped.
pub fn parse_tables(json: &str) -> AuroResult<Vec<Table>> {
    let mut tables: Vec<Table> = Vec::new();

    for row in parse_rows(json, "column rows")? {
        let (Some(table_name), Some(column_name)) = (present(&row.table_name), present(&row.column_name))
        else {
            continue;
        };

        let index = match tables.iter().position(|t| t.table_name == table_name) {
            Some(index) => index,
            None => {
                tables.push(Table::new(table_name));
                tables.len() - 1
            }
        };

        tables[index].add_column(Column {
            name: column_name.to_string(),
            data_type: row.data_type.clone().unwrap_or_default(),
            is_nullable: row.is_nullable,
            is_primary_key: row.is_primary_key,
        });
    }

    Ok(tables)
}

/// Fold raw foreign-key rows into `joins`, skipping incomplete rows.
///
/// Returns the number of join definitions added.
pub fn fold_foreign_keys(json: &str, joins: &mut Joins) -> AuroResult<usize> {
    let mut added = 0;

    for join in parse_rows(json, "foreign-key rows")?.iter().filter_map(Row::join) {
        joins.entry(join.table.clone()).or_default().push(join);
        added += 1;
    }

    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_tables() {
        let json = r#"[
            {"table_name": "users", "column_name": "id", "data_type": "integer", "is_nullable": "NO", "is_primary_key": "YES"},
            {"table_name": "users", "column_name": "email", "data_type": "text", "is_nullable": "YES", "is_primary_key": "NO"},
            {"table_name": "posts", "column_name": "id", "data_type": "bigint", "is_nullable": "NO", "is_primary_key": true}
        ]"#;

        let tables = parse_tables(json).unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].table_name, "users");
        assert_eq!(
            tables[0].columns,
            vec![
                Column {
                    name: "id".into(),
                    data_type: "integer".into(),
                    is_nullable: false,
                    is_primary_key: true,
                },
                Column {
                    name: "email".into(),
                    data_type: "text".into(),
                    is_nullable: true,
                    is_primary_key: false,
                },
            ]
        );
        assert!(tables[1].column("id").unwrap().is_primary_key);
    }

    #[test]
    fn test_parse_tables_drops_duplicate_columns() {
        let json = r#"[
            {"table_name": "users", "column_name": "id", "data_type": "integer", "is_primary_key": "YES"},
            {"table_name": "users", "column_name": "id", "data_type": "integer", "is_primary_key": "NO"},
            {"table_name": "users", "column_name": "name", "data_type": "text"}
        ]"#;

        let tables = parse_tables(json).unwrap();
        assert_eq!(tables.len(), 1);
        let names: Vec<&str> = tables[0].columns.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name"]);
        assert!(tables[0].columns[0].is_primary_key);
    }

    #[test]
    fn test_parse_tables_skips_malformed_rows() {
        let json = r#"[
            {"table_name": "users"},
            {"column_name": "orphan"},
            {"table_name": "", "column_name": "id"},
            {"table_name": "users", "column_name": "id", "data_type": "integer"}
        ]"#;

        let tables = parse_tables(json).unwrap();
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].columns.len(), 1);
    }

    #[test]
    fn test_parse_tables_rejects_non_array() {
        let err = parse_tables(r#"{"oops": true}"#).unwrap_err();
        assert!(matches!(err, AuroError::Parse { .. }));
    }

    #[test]
    fn test_fold_foreign_keys() {
        let json = r#"[
            {"table_name": "posts", "column_name": "author_id", "foreign_table_name": "users", "foreign_column_name": "id"},
            {"table_name": "posts", "column_name": "category_id", "foreign_table_name": "categories", "foreign_column_name": ""},
            {"table_name": "posts", "column_name": "editor_id", "foreign_table_name": "users", "foreign_column_name": "id"}
        ]"#;

        let mut joins = Joins::new();
        assert_eq!(fold_foreign_keys(json, &mut joins).unwrap(), 2);
        assert_eq!(
            joins["posts"],
            vec![
                JoinDefinition::new("posts", "author_id", "users", "id"),
                JoinDefinition::new("posts", "editor_id", "users", "id"),
            ]
        );
    }

    #[test]
    fn test_fold_empty_rows() {
        let mut joins = Joins::new();
        assert_eq!(fold_foreign_keys("[]", &mut joins).unwrap(), 0);
        assert!(joins.is_empty());
    }
}
