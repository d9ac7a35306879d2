//! Database collaborators.
//!
//! Query execution and schema introspection sit behind two traits so the
//! builder and the generation pipeline never talk to a database directly.
//! [`PgIntrospector`] reads PostgreSQL's `information_schema` with sqlx.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::ast::{Field, Metadata, Options};
use crate::error::{AuroError, AuroResult};

/// Executes built queries.
///
/// Results come back as JSON text; `None` or blank text means "no result".
#[async_trait]
pub trait Engine: Send + Sync {
    async fn query(
        &self,
        fields: &[Field],
        options: &Options,
        metadata: &Metadata,
    ) -> AuroResult<Option<String>>;

    async fn query_raw(&self, query: &str) -> AuroResult<Option<String>>;
}

/// Reads schema metadata.
#[async_trait]
pub trait Introspector: Send + Sync {
    /// All column rows of the schema as a JSON array.
    async fn introspect(&self) -> AuroResult<String>;

    /// Foreign-key rows of one table as a JSON array.
    async fn foreign_keys(&self, table: &str) -> AuroResult<Option<String>>;
}

const COLUMNS_SQL: &str = r#"
SELECT COALESCE(json_agg(t), '[]'::json)::text FROM (
    SELECT c.table_name,
           c.column_name,
           c.data_type,
           c.is_nullable,
           CASE WHEN EXISTS (
               SELECT 1
               FROM information_schema.table_constraints tc
               JOIN information_schema.key_column_usage kcu
                 ON tc.constraint_name = kcu.constraint_name
                AND tc.table_schema = kcu.table_schema
               WHERE tc.constraint_type = 'PRIMARY KEY'
                 AND tc.table_schema = c.table_schema
                 AND tc.table_name = c.table_name
                 AND kcu.column_name = c.column_name
           ) THEN 'YES' ELSE 'NO' END AS is_primary_key
    FROM information_schema.columns c
    WHERE c.table_schema = $1
    ORDER BY c.table_name, c.ordinal_position
) t
"#;

/// Each referencing column is paired with the referenced column at the same
/// position of the unique constraint, so composite keys yield one row per
/// column pair.
const FOREIGN_KEYS_SQL: &str = r#"
SELECT COALESCE(json_agg(t), '[]'::json)::text FROM (
    SELECT kcu.table_name,
           kcu.column_name,
           uk.table_name AS foreign_table_name,
           uk.column_name AS foreign_column_name
    FROM information_schema.referential_constraints rc
    JOIN information_schema.key_column_usage kcu
      ON kcu.constraint_schema = rc.constraint_schema
     AND kcu.constraint_name = rc.constraint_name
    JOIN information_schema.key_column_usage uk
      ON uk.constraint_schema = rc.unique_constraint_schema
     AND uk.constraint_name = rc.unique_constraint_name
     AND uk.ordinal_position = kcu.position_in_unique_constraint
    WHERE kcu.table_schema = $1
      AND kcu.table_name = $2
    ORDER BY kcu.constraint_name, kcu.ordinal_position
) t
"#;

/// Introspects one PostgreSQL schema.
#[derive(Clone)]
pub struct PgIntrospector {
    pool: PgPool,
    schema: String,
}

impl PgIntrospector {
    /// Connect using a `postgres://` URL.
    pub async fn connect(url: &str, schema: impl Into<String>) -> AuroResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await
            .map_err(|e| AuroError::Connection(e.to_string()))?;

        Ok(Self::with_pool(pool, schema))
    }

    pub fn with_pool(pool: PgPool, schema: impl Into<String>) -> Self {
        Self {
            pool,
            schema: schema.into(),
        }
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }
}

#[async_trait]
impl Introspector for PgIntrospector {
    async fn introspect(&self) -> AuroResult<String> {
        sqlx::query_scalar::<_, String>(COLUMNS_SQL)
            .bind(&self.schema)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuroError::introspection(e.to_string()))
    }

    async fn foreign_keys(&self, table: &str) -> AuroResult<Option<String>> {
        sqlx::query_scalar::<_, String>(FOREIGN_KEYS_SQL)
            .bind(&self.schema)
            .bind(table)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AuroError::introspection(e.to_string()))
    }
}
