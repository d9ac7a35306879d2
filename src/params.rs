//! Caller-facing parameter objects.
//!
//! A [`QueryParams`] is what application code hands to a
//! [`Query`](crate::client::Query) operation. It can be deserialized from the
//! JSON shape callers already use (`where`, `select`, `orderBy`, ...) or put
//! together with the chaining helpers below.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Number, Value};

use crate::arguments::arguments;
use crate::ast::{Argument, Order};
use crate::error::AuroResult;

/// A free-form parameter sub-object (`where`, `select`, `data`, ...).
///
/// Key order is preserved, which is what keeps argument order stable.
pub type ParamsField = Map<String, Value>;

/// Requested sort direction, as written by callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Asc,
    Desc,
}

impl From<Direction> for Order {
    fn from(direction: Direction) -> Self {
        match direction {
            Direction::Asc => Order::Asc,
            Direction::Desc => Order::Desc,
        }
    }
}

/// What a mutation should hand back.
#[derive(Debug, Clone, PartialEq)]
pub enum Return {
    /// Return the fields named by this sub-object.
    Fields(ParamsField),
    /// Shape left to the engine. Contributes no field either way.
    All(bool),
}

impl Return {
    /// Resolve a raw `return` value. `null` means the key was not given.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Object(fields) => Some(Return::Fields(fields)),
            other => Some(Return::All(is_truthy(&other))),
        }
    }
}

/// Columns an `avg` or `count` runs over.
#[derive(Debug, Clone, PartialEq)]
pub enum Aggregate {
    Columns(ParamsField),
    /// `true` aggregates over everything, `false` is the same as absent.
    All(bool),
}

impl Aggregate {
    /// Resolve a raw `avg`/`count` value. `null` means the key was not given.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Object(columns) => Some(Aggregate::Columns(columns)),
            other => Some(Aggregate::All(is_truthy(&other))),
        }
    }

    pub fn is_requested(&self) -> bool {
        match self {
            Aggregate::Columns(_) => true,
            Aggregate::All(flag) => *flag,
        }
    }

    /// The `aggs` arguments. A bare flag has none.
    pub fn arguments(&self) -> Vec<Argument> {
        match self {
            Aggregate::Columns(columns) => arguments(columns),
            Aggregate::All(_) => Vec::new(),
        }
    }
}

fn deserialize_return<'de, D>(deserializer: D) -> Result<Option<Return>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(Return::from_value))
}

fn deserialize_aggregate<'de, D>(deserializer: D) -> Result<Option<Aggregate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(Aggregate::from_value))
}

/// Parameters for a single query operation.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryParams {
    #[serde(default)]
    pub r#where: Option<ParamsField>,
    #[serde(default)]
    pub select: Option<ParamsField>,
    #[serde(default, alias = "set")]
    pub data: Option<ParamsField>,
    #[serde(default, deserialize_with = "deserialize_return")]
    pub r#return: Option<Return>,
    #[serde(default, alias = "limit")]
    pub take: Option<Number>,
    #[serde(default, alias = "offset")]
    pub skip: Option<Number>,
    #[serde(default)]
    pub order_by: Option<IndexMap<String, Direction>>,
    #[serde(default, deserialize_with = "deserialize_aggregate")]
    pub avg: Option<Aggregate>,
    #[serde(default, deserialize_with = "deserialize_aggregate")]
    pub count: Option<Aggregate>,
    #[serde(default)]
    pub include: Option<ParamsField>,
    #[serde(default)]
    pub group_by: Option<Vec<String>>,
}

impl QueryParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode parameters from a JSON value.
    pub fn from_value(value: Value) -> AuroResult<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Decode parameters from JSON text.
    pub fn from_json(json: &str) -> AuroResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Add a `where` entry. `value` may be a scalar or a filter object.
    pub fn filter(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.r#where
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Select the given columns.
    pub fn select_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let select = self.select.get_or_insert_with(Map::new);
        for column in columns {
            select.insert(column.into(), Value::Bool(true));
        }
        self
    }

    /// Add a `data` entry.
    pub fn set(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.data
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Ask for the given fields back.
    pub fn returning<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.r#return = Some(Return::Fields(flags(fields)));
        self
    }

    /// Ask for everything back, shape left to the engine.
    pub fn returning_all(mut self) -> Self {
        self.r#return = Some(Return::All(true));
        self
    }

    pub fn limit(mut self, take: impl Into<Number>) -> Self {
        self.take = Some(take.into());
        self
    }

    pub fn offset(mut self, skip: impl Into<Number>) -> Self {
        self.skip = Some(skip.into());
        self
    }

    pub fn order(mut self, field: impl Into<String>, direction: Direction) -> Self {
        self.order_by
            .get_or_insert_with(IndexMap::new)
            .insert(field.into(), direction);
        self
    }

    /// Average over the given columns.
    pub fn average<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.avg = Some(Aggregate::Columns(flags(columns)));
        self
    }

    /// Average over every column.
    pub fn average_all(mut self) -> Self {
        self.avg = Some(Aggregate::All(true));
        self
    }

    /// Count over the given columns.
    pub fn count<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.count = Some(Aggregate::Columns(flags(columns)));
        self
    }

    /// The aggregate the `aggs` field is built from: `avg` when requested,
    /// `count` otherwise.
    pub fn aggregate(&self) -> Option<&Aggregate> {
        self.avg
            .as_ref()
            .filter(|avg| avg.is_requested())
            .or_else(|| self.count.as_ref().filter(|count| count.is_requested()))
    }

    pub fn is_average(&self) -> bool {
        self.avg.as_ref().is_some_and(Aggregate::is_requested)
    }

    /// Include a related table, selecting the given columns from it.
    pub fn include_relation<I, S>(mut self, relation: impl Into<String>, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.include
            .get_or_insert_with(Map::new)
            .insert(relation.into(), Value::Object(flags(columns)));
        self
    }

    pub fn group<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.group_by = Some(columns.into_iter().map(Into::into).collect());
        self
    }
}

fn flags<I, S>(columns: I) -> ParamsField
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    columns
        .into_iter()
        .map(|c| (c.into(), Value::Bool(true)))
        .collect()
}

/// Numbers other than zero.
pub fn is_truthy_number(n: &Number) -> bool {
    n.as_f64().is_some_and(|f| f != 0.0)
}

/// JavaScript-style truthiness, the rule callers' parameter objects follow.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => is_truthy_number(n),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_keys() {
        let params = QueryParams::from_value(json!({
            "where": {"id": 1},
            "orderBy": {"name": "asc", "age": "desc"},
            "groupBy": ["role"],
            "take": 5,
            "skip": 10,
        }))
        .unwrap();

        assert_eq!(params.r#where.unwrap()["id"], json!(1));
        let order: Vec<_> = params.order_by.unwrap().into_iter().collect();
        assert_eq!(
            order,
            vec![
                ("name".to_string(), Direction::Asc),
                ("age".to_string(), Direction::Desc)
            ]
        );
        assert_eq!(params.group_by, Some(vec!["role".to_string()]));
        assert_eq!(params.take, Some(Number::from(5)));
        assert_eq!(params.skip, Some(Number::from(10)));
    }

    #[test]
    fn test_limit_offset_and_set_aliases() {
        let params = QueryParams::from_value(json!({
            "limit": 10,
            "offset": 5,
            "set": {"name": "x"},
        }))
        .unwrap();
        assert_eq!(params.take, Some(Number::from(10)));
        assert_eq!(params.skip, Some(Number::from(5)));
        assert_eq!(params.data.unwrap()["name"], json!("x"));
    }

    #[test]
    fn test_return_variants() {
        let fields = QueryParams::from_value(json!({"return": {"id": true, "name": false}})).unwrap();
        let Some(Return::Fields(set)) = fields.r#return else {
            panic!("expected a field set");
        };
        assert_eq!(Value::Object(set), json!({"id": true, "name": false}));

        let all = QueryParams::from_value(json!({"return": true})).unwrap();
        assert_eq!(all.r#return, Some(Return::All(true)));

        let none = QueryParams::from_value(json!({"return": false})).unwrap();
        assert_eq!(none.r#return, Some(Return::All(false)));

        let null = QueryParams::from_value(json!({"return": null})).unwrap();
        assert_eq!(null.r#return, None);

        let missing = QueryParams::from_value(json!({})).unwrap();
        assert_eq!(missing.r#return, None);
    }

    #[test]
    fn test_chaining_helpers() {
        let params = QueryParams::new()
            .filter("status", "active")
            .select_columns(["id", "email"])
            .order("created_at", Direction::Desc)
            .limit(20);

        assert_eq!(params.r#where.as_ref().unwrap()["status"], json!("active"));
        let select: Vec<_> = params.select.as_ref().unwrap().keys().cloned().collect();
        assert_eq!(select, vec!["id", "email"]);
        assert_eq!(params.take, Some(Number::from(20)));
    }

    #[test]
    fn test_take_skip_kept_verbatim() {
        let params = QueryParams::from_value(json!({"take": -1, "skip": 2.5})).unwrap();
        assert_eq!(params.take, Some(Number::from(-1)));
        assert_eq!(params.skip.unwrap().as_f64(), Some(2.5));
    }

    #[test]
    fn test_aggregate_flags() {
        let avg = QueryParams::from_value(json!({"avg": true})).unwrap();
        assert_eq!(avg.avg, Some(Aggregate::All(true)));
        assert!(avg.is_average());
        assert!(avg.aggregate().unwrap().arguments().is_empty());

        let count = QueryParams::from_value(json!({"count": {"id": true}})).unwrap();
        assert!(!count.is_average());
        assert_eq!(count.aggregate(), count.count.as_ref());

        let off = QueryParams::from_value(json!({"avg": false})).unwrap();
        assert!(!off.is_average());
        assert!(off.aggregate().is_none());
    }

    #[test]
    fn test_truthiness() {
        assert!(!is_truthy(&json!(null)));
        assert!(!is_truthy(&json!(false)));
        assert!(!is_truthy(&json!(0)));
        assert!(!is_truthy(&json!(0.0)));
        assert!(!is_truthy(&json!("")));
        assert!(is_truthy(&json!("0")));
        assert!(is_truthy(&json!(-1)));
        assert!(is_truthy(&json!({})));
        assert!(is_truthy(&json!([])));
    }
}
