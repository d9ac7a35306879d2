//! Configuration.
//!
//! Settings are read from `auro.toml` (working directory first, then the
//! user config directory) and environment variables, which take precedence.
//!
//! ```toml
//! schema = "public"
//! database_url = "postgres://localhost/app"
//! output_dir = "generated"
//! ```

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use serde::Deserialize;

use crate::ast::{JoinDefinition, Joins};
use crate::error::{AuroError, AuroResult};

/// Schema used when none is configured.
pub const DEFAULT_SCHEMA: &str = "public";

/// Environment variable naming the schema.
pub const SCHEMA_ENV: &str = "SCHEMA";

/// Environment variable naming the database URL.
pub const DATABASE_URL_ENV: &str = "AURO_DATABASE_URL";

const CONFIG_FILE: &str = "auro.toml";

/// Resolved settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    #[serde(default = "default_schema")]
    pub schema: String,
    #[serde(default)]
    pub database_url: Option<String>,
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
}

fn default_schema() -> String {
    DEFAULT_SCHEMA.to_string()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("generated")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            schema: default_schema(),
            database_url: None,
            output_dir: default_output_dir(),
        }
    }
}

impl Config {
    /// Load from the first `auro.toml` found, then apply the environment.
    pub fn load() -> AuroResult<Self> {
        let mut config = match Self::locate() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_env();
        Ok(config)
    }

    /// Parse a config file.
    pub fn from_file(path: &Path) -> AuroResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
            .map_err(|e| AuroError::Config(format!("{}: {}", path.display(), e)))
    }

    /// Parse config text.
    pub fn from_toml(content: &str) -> AuroResult<Self> {
        toml::from_str(content).map_err(|e| AuroError::Config(e.to_string()))
    }

    fn locate() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("auro").join(CONFIG_FILE))
            .filter(|path| path.exists())
    }

    fn apply_env(&mut self) {
        if let Some(schema) = non_empty_env(SCHEMA_ENV) {
            self.schema = schema;
        }
        if let Some(url) = non_empty_env(DATABASE_URL_ENV) {
            self.database_url = Some(url);
        }
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// The process-wide schema name, resolved on first use.
pub fn schema() -> &'static str {
    static SCHEMA: OnceLock<String> = OnceLock::new();
    SCHEMA.get_or_init(|| {
        non_empty_env(SCHEMA_ENV).unwrap_or_else(|| match Config::load() {
            Ok(config) => config.schema,
            Err(e) => {
                tracing::warn!(error = %e, "falling back to default schema");
                default_schema()
            }
        })
    })
}

/// Static configuration shared by every query built against one database:
/// the schema namespace and the generated join table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    schema: String,
    joins: Joins,
}

impl Catalog {
    pub fn new(schema: impl Into<String>, joins: Joins) -> Self {
        Self {
            schema: schema.into(),
            joins,
        }
    }

    /// A catalog for the process-wide schema.
    pub fn with_joins(joins: Joins) -> Self {
        Self::new(schema(), joins)
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    pub fn joins(&self) -> &Joins {
        &self.joins
    }

    /// Join definitions owned by `table`, if any were generated.
    pub fn joins_for(&self, table: &str) -> Option<&[JoinDefinition]> {
        self.joins.get(table).map(Vec::as_slice)
    }
}
