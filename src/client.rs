//! Typed per-table query handles.
//!
//! A generated client holds one [`Query<T>`] per table. Each operation fills
//! a [`QueryBuilder`], hands the IR to the [`Engine`] and decodes the JSON it
//! answers with.
//!
//! ```rust,ignore
//! let adults = client
//!     .users
//!     .find_many(&QueryParams::new().filter("age", json!({"gte": 18})).limit(20))
//!     .await?;
//! ```

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::builder::QueryBuilder;
use crate::config::Catalog;
use crate::engine::Engine;
use crate::error::AuroResult;
use crate::params::QueryParams;

/// A generated table declaration.
pub trait Model {
    /// The table this type was generated from.
    const TABLE: &'static str;
}

/// Links a table's type to the type of the table it joins to.
pub trait Connections: Model {
    type Related: Model;
}

/// How many rows an operation answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    One,
    Many,
}

/// Decode engine result text.
///
/// Absent or blank text and an empty JSON array are all "no result". For
/// [`Shape::One`] an array answer is reduced to its first element.
pub fn parse_and_transform(text: Option<&str>, shape: Shape) -> AuroResult<Option<Value>> {
    let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
        return Ok(None);
    };

    match serde_json::from_str(text)? {
        Value::Array(rows) if rows.is_empty() => Ok(None),
        Value::Array(mut rows) if shape == Shape::One => Ok(Some(rows.swap_remove(0))),
        entity => Ok(Some(entity)),
    }
}

/// Run a raw query and decode its answer.
pub async fn raw(engine: &dyn Engine, query: &str) -> AuroResult<Option<Value>> {
    debug!(query, "raw query");
    let text = engine.query_raw(query).await?;
    parse_and_transform(text.as_deref(), Shape::Many)
}

/// Query handle for one table.
pub struct Query<T> {
    name: String,
    engine: Arc<dyn Engine>,
    catalog: Arc<Catalog>,
    _model: PhantomData<fn() -> T>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            engine: Arc::clone(&self.engine),
            catalog: Arc::clone(&self.catalog),
            _model: PhantomData,
        }
    }
}

impl<T> Query<T> {
    pub fn new(name: impl Into<String>, engine: Arc<dyn Engine>, catalog: Arc<Catalog>) -> Self {
        Self {
            name: name.into(),
            engine,
            catalog,
            _model: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Build `command` against this table and execute it.
    ///
    /// Returns the decoded answer without binding it to `T`, for callers
    /// selecting a partial shape.
    pub async fn execute(
        &self,
        command: &str,
        params: &QueryParams,
        shape: Shape,
    ) -> AuroResult<Option<Value>> {
        let ir = QueryBuilder::new(&self.name, command, &self.catalog)
            .fill(params)
            .build();
        debug!(table = %self.name, command, fields = ir.fields.len(), "executing query");

        let text = self
            .engine
            .query(&ir.fields, &ir.options, &ir.metadata)
            .await?;
        parse_and_transform(text.as_deref(), shape)
    }
}

impl<T: DeserializeOwned> Query<T> {
    pub async fn insert_one(&self, params: &QueryParams) -> AuroResult<Option<T>> {
        self.one("insertone", params).await
    }

    pub async fn insert_many(&self, params: &QueryParams) -> AuroResult<Vec<T>> {
        self.many("insertmany", params).await
    }

    pub async fn find_unique(&self, params: &QueryParams) -> AuroResult<Option<T>> {
        self.one("findfirst", params).await
    }

    pub async fn find_many(&self, params: &QueryParams) -> AuroResult<Vec<T>> {
        self.many("findmany", params).await
    }

    pub async fn update_one(&self, params: &QueryParams) -> AuroResult<Option<T>> {
        self.one("updateone", params).await
    }

    pub async fn update_many(&self, params: &QueryParams) -> AuroResult<Vec<T>> {
        self.many("updatemany", params).await
    }

    pub async fn delete_one(&self, params: &QueryParams) -> AuroResult<Option<T>> {
        self.one("deleteone", params).await
    }

    pub async fn delete_many(&self, params: &QueryParams) -> AuroResult<Vec<T>> {
        self.many("deletemany", params).await
    }

    /// `average` when `avg` is given, `count` otherwise.
    pub async fn aggregate<R: DeserializeOwned>(&self, params: &QueryParams) -> AuroResult<Option<R>> {
        let command = if params.is_average() { "average" } else { "count" };
        let entity = self.execute(command, params, Shape::One).await?;
        entity.map(serde_json::from_value).transpose().map_err(Into::into)
    }

    async fn one(&self, command: &str, params: &QueryParams) -> AuroResult<Option<T>> {
        let entity = self.execute(command, params, Shape::One).await?;
        entity.map(serde_json::from_value).transpose().map_err(Into::into)
    }

    async fn many(&self, command: &str, params: &QueryParams) -> AuroResult<Vec<T>> {
        match self.execute(command, params, Shape::Many).await? {
            Some(Value::Array(rows)) => rows
                .into_iter()
                .map(|row| serde_json::from_value(row).map_err(Into::into))
                .collect(),
            Some(row) => Ok(vec![serde_json::from_value(row)?]),
            None => Ok(Vec::new()),
        }
    }
}
