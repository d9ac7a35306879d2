//! Query builder.
//!
//! Accumulates [`Field`]s and [`Options`] from a [`QueryParams`] and
//! snapshots them into a [`QueryIr`].
//!
//! ```rust,ignore
//! let catalog = Catalog::new("public", joins());
//! let ir = QueryBuilder::new("users", "findmany", &catalog)
//!     .fill(&QueryParams::new().filter("active", true).limit(10))
//!     .build();
//! ```

use serde_json::{Map, Value};

use crate::arguments::arguments;
use crate::ast::{Argument, Field, Metadata, Options, OrderBy, QueryIr};
use crate::config::Catalog;
use crate::joins;
use crate::params::{Direction, ParamsField, QueryParams, Return, is_truthy_number};

/// Builds the intermediate representation of one operation on one table.
pub struct QueryBuilder<'a> {
    table: String,
    operation: String,
    catalog: &'a Catalog,
    fields: Vec<Field>,
    options: Options,
}

impl<'a> QueryBuilder<'a> {
    pub fn new(table: impl Into<String>, operation: impl Into<String>, catalog: &'a Catalog) -> Self {
        Self {
            table: table.into(),
            operation: operation.into(),
            catalog,
            fields: Vec::new(),
            options: Options::default(),
        }
    }

    /// Apply every present parameter.
    ///
    /// Keys are evaluated in a fixed order so the generated field sequence
    /// does not depend on how the caller ordered them.
    pub fn fill(&mut self, params: &QueryParams) -> &mut Self {
        if let Some(filter) = &params.r#where {
            self.push_arguments("where", filter);
        }

        if let Some(select) = &params.select {
            self.push_arguments("select", select);
        }

        if let Some(data) = &params.data {
            self.push_arguments("data", data);
        }

        // Exactly one of `return` and `no_return`.
        match &params.r#return {
            Some(Return::Fields(fields)) => self.push_arguments("return", fields),
            Some(Return::All(_)) | None => self.fields.push(Field::marker("no_return")),
        }

        if let Some(take) = params.take.as_ref().filter(|n| is_truthy_number(n)) {
            self.options.limit = Some(take.clone());
        }

        if let Some(skip) = params.skip.as_ref().filter(|n| is_truthy_number(n)) {
            self.options.offset = Some(skip.clone());
        }

        if let Some(order_by) = &params.order_by {
            self.order_by(order_by.iter());
        }

        if let Some(aggregate) = params.aggregate() {
            self.fields.push(Field::new("aggs", aggregate.arguments()));
        }

        if let Some(include) = &params.include {
            self.include(include);
        }

        if let Some(group_by) = &params.group_by {
            self.options.group_by = Some(group_by.clone());
        }

        self
    }

    /// Snapshot the accumulated state.
    pub fn build(&self) -> QueryIr {
        QueryIr {
            metadata: Metadata {
                command: self.operation.clone(),
                table: self.table.clone(),
                schema: self.catalog.schema().to_string(),
            },
            fields: self.fields.clone(),
            options: self.options.clone(),
        }
    }

    fn push_arguments(&mut self, name: &str, field: &ParamsField) {
        self.fields.push(Field::new(name, arguments(field)));
    }

    fn order_by<'p>(&mut self, entries: impl Iterator<Item = (&'p String, &'p Direction)>) {
        let order_by = entries
            .map(|(field, direction)| OrderBy {
                field: field.clone(),
                direction: (*direction).into(),
            })
            .collect();
        self.options.order_by = Some(order_by);
    }

    fn include(&mut self, include: &ParamsField) {
        let joining_tables: Vec<String> = include.keys().cloned().collect();

        self.fields.push(Field::marker("include"));
        let selected = nested_keys(include, "")
            .into_iter()
            .map(Argument::column)
            .collect();
        self.fields.push(Field::new("select", selected));

        let found = joins::resolve(self.catalog, &self.table, &joining_tables);
        let include = self.options.include.get_or_insert_with(Default::default);
        joins::merge_unique(include, found);
    }
}

/// Every leaf key-path of `obj`, dot-separated below the top level.
fn nested_keys(obj: &Map<String, Value>, parent: &str) -> Vec<String> {
    let mut keys = Vec::new();

    for (key, value) in obj {
        let path = if parent.is_empty() {
            key.clone()
        } else {
            format!("{}.{}", parent, key)
        };
        match value {
            Value::Object(child) => keys.extend(nested_keys(child, &path)),
            Value::Array(items) => {
                let indexed: Map<String, Value> = items
                    .iter()
                    .enumerate()
                    .map(|(i, v)| (i.to_string(), v.clone()))
                    .collect();
                keys.extend(nested_keys(&indexed, &path));
            }
            _ => keys.push(path),
        }
    }

    keys
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Include, JoinDefinition, Joins, Order, ValueType};
    use pretty_assertions::assert_eq;
    use serde_json::{Number, json};

    fn catalog() -> Catalog {
        let mut joins = Joins::new();
        joins.insert(
            "myTable".into(),
            vec![
                JoinDefinition::new("myTable", "user_id", "users", "id"),
                JoinDefinition::new("myTable", "post_id", "posts", "id"),
            ],
        );
        Catalog::new("public", joins)
    }

    fn build(params: serde_json::Value) -> QueryIr {
        let catalog = catalog();
        let params = QueryParams::from_value(params).unwrap();
        QueryBuilder::new("myTable", "myOperation", &catalog)
            .fill(&params)
            .build()
    }

    #[test]
    fn test_build_metadata() {
        let ir = build(json!({
            "where": {"fieldName": "fieldValue"},
            "select": {"field1": true, "field2": true},
        }));
        assert_eq!(
            ir.metadata,
            Metadata {
                command: "myOperation".into(),
                table: "myTable".into(),
                schema: "public".into(),
            }
        );
    }

    #[test]
    fn test_data() {
        let ir = build(json!({"data": {"field1": "value1", "field2": 42}}));
        assert!(ir.fields.contains(&Field::new(
            "data",
            vec![
                Argument::new("field1", "value1", ValueType::String),
                Argument::new("field2", "42", ValueType::Number),
            ]
        )));
    }

    #[test]
    fn test_where_with_contains() {
        let ir = build(json!({"where": {"field1": {"contains": "searchTerm"}}}));
        assert_eq!(
            ir.field("where"),
            Some(&Field::new(
                "where",
                vec![Argument::custom("field1", "LIKE '%searchTerm%'")]
            ))
        );
    }

    #[test]
    fn test_no_return_when_absent() {
        let ir = build(json!({}));
        assert_eq!(ir.fields, vec![Field::marker("no_return")]);
        assert!(ir.field("return").is_none());
    }

    #[test]
    fn test_no_return_when_false() {
        let ir = build(json!({"return": false}));
        assert_eq!(ir.fields, vec![Field::marker("no_return")]);
    }

    #[test]
    fn test_return_fields() {
        let ir = build(json!({"return": {"field1": true, "field2": true}}));
        assert_eq!(
            ir.fields,
            vec![Field::new(
                "return",
                vec![
                    Argument::new("field1", "true", ValueType::Boolean),
                    Argument::new("field2", "true", ValueType::Boolean),
                ]
            )]
        );
    }

    #[test]
    fn test_return_flag_is_no_return() {
        let ir = build(json!({"return": true}));
        assert_eq!(ir.fields, vec![Field::marker("no_return")]);
    }

    #[test]
    fn test_return_or_no_return_exactly_once() {
        for r in [json!(null), json!(false), json!(true), json!(1), json!({}), json!({"id": true})] {
            let ir = build(json!({"return": r}));
            let has_return = ir.field("return").is_some();
            let has_no_return = ir.field("no_return").is_some();
            assert!(has_return != has_no_return, "return = {r}");
        }
    }

    #[test]
    fn test_return_arguments_are_translated() {
        let ir = build(json!({"return": {"id": 1, "name": true, "hidden": false}}));
        assert_eq!(
            ir.field("return"),
            Some(&Field::new(
                "return",
                vec![
                    Argument::new("id", "1", ValueType::Number),
                    Argument::new("name", "true", ValueType::Boolean),
                ]
            ))
        );
    }

    #[test]
    fn test_aggregate_flag_has_no_arguments() {
        let ir = build(json!({"avg": true}));
        assert_eq!(
            ir.fields,
            vec![Field::marker("no_return"), Field::marker("aggs")]
        );

        let ir = build(json!({"count": {"id": true}}));
        assert_eq!(
            ir.field("aggs"),
            Some(&Field::new(
                "aggs",
                vec![Argument::new("id", "true", ValueType::Boolean)]
            ))
        );

        let ir = build(json!({"avg": false}));
        assert!(ir.field("aggs").is_none());
    }

    #[test]
    fn test_fixed_field_order() {
        let ir = build(json!({
            "avg": {"score": true},
            "data": {"name": "x"},
            "select": {"id": true},
            "where": {"id": 1},
        }));
        let names: Vec<&str> = ir.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["where", "select", "data", "no_return", "aggs"]);
    }

    #[test]
    fn test_limit_offset_group_by() {
        let ir = build(json!({"take": 10, "skip": 5, "groupBy": ["field1", "field2"]}));
        assert_eq!(ir.options.limit, Some(Number::from(10)));
        assert_eq!(ir.options.offset, Some(Number::from(5)));
        assert_eq!(
            ir.options.group_by,
            Some(vec!["field1".to_string(), "field2".to_string()])
        );
    }

    #[test]
    fn test_take_skip_verbatim_zero_absent() {
        let ir = build(json!({"take": -1, "skip": 2.5}));
        assert_eq!(ir.options.limit, Some(Number::from(-1)));
        assert_eq!(
            serde_json::to_value(&ir.options).unwrap(),
            json!({"limit": -1, "offset": 2.5})
        );

        let ir = build(json!({"take": 0, "skip": 0}));
        assert_eq!(ir.options.limit, None);
        assert_eq!(ir.options.offset, None);
    }

    #[test]
    fn test_order_by() {
        let ir = build(json!({"orderBy": {"field1": "asc", "field2": "desc"}}));
        assert_eq!(
            ir.options.order_by,
            Some(vec![
                OrderBy {
                    field: "field1".into(),
                    direction: Order::Asc
                },
                OrderBy {
                    field: "field2".into(),
                    direction: Order::Desc
                },
            ])
        );
    }

    #[test]
    fn test_include() {
        let ir = build(json!({"include": {"users": {"name": true, "email": true}}}));

        assert!(ir.fields.contains(&Field::marker("include")));
        assert!(ir.fields.contains(&Field::new(
            "select",
            vec![
                Argument::column("users.name"),
                Argument::column("users.email"),
            ]
        )));
        assert_eq!(
            ir.options.include,
            Some(Include {
                joins: vec![JoinDefinition::new("myTable", "user_id", "users", "id")]
            })
        );
    }

    #[test]
    fn test_include_deduplicates() {
        let catalog = catalog();
        let params = QueryParams::new()
            .include_relation("users", ["name"])
            .include_relation("posts", ["title"]);

        let mut builder = QueryBuilder::new("myTable", "findmany", &catalog);
        builder.fill(&params).fill(&params);
        let ir = builder.build();

        assert_eq!(
            ir.options.include.unwrap().joins,
            vec![
                JoinDefinition::new("myTable", "user_id", "users", "id"),
                JoinDefinition::new("myTable", "post_id", "posts", "id"),
            ]
        );
    }

    #[test]
    fn test_include_unknown_table_is_not_fatal() {
        let catalog = catalog();
        let params = QueryParams::new().include_relation("users", ["name"]);
        let ir = QueryBuilder::new("orphans", "findmany", &catalog)
            .fill(&params)
            .build();

        assert_eq!(ir.options.include, Some(Include::default()));
        assert!(ir.fields.contains(&Field::marker("include")));
    }

    #[test]
    fn test_nested_keys() {
        let include = json!({"users": {"profile": {"bio": true}, "name": true}, "tags": true});
        let Value::Object(map) = include else {
            unreachable!()
        };
        assert_eq!(
            nested_keys(&map, ""),
            vec!["users.profile.bio", "users.name", "tags"]
        );
    }

    #[test]
    fn test_build_is_repeatable() {
        let catalog = catalog();
        let params = QueryParams::from_value(json!({
            "where": {"age": {"gt": 18}},
            "include": {"users": {"name": true}},
            "orderBy": {"age": "desc"},
        }))
        .unwrap();
        let mut builder = QueryBuilder::new("myTable", "findmany", &catalog);
        builder.fill(&params);

        assert_eq!(builder.build(), builder.build());
    }
}
