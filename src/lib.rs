//! # auro
//!
//! A schema-driven query layer. `auro generate` reads a PostgreSQL schema
//! and writes typed table declarations plus a runtime join table; at run
//! time the generated client turns caller parameters into a query IR and
//! hands it to an [`Engine`](engine::Engine).
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use auro::prelude::*;
//!
//! let catalog = Catalog::new("public", joins());
//! let params = QueryParams::from_value(json!({
//!     "where": { "name": { "startsWith": "Al" } },
//!     "include": { "teams": { "name": true } },
//!     "take": 10,
//! }))?;
//!
//! let ir = QueryBuilder::new("users", "findmany", &catalog)
//!     .fill(&params)
//!     .build();
//! ```
//!
//! ## Modules
//!
//! | Module       | Role                                          |
//! |--------------|-----------------------------------------------|
//! | `builder`    | Parameters → fields and options               |
//! | `arguments`  | Scalars and filter operators → arguments      |
//! | `joins`      | Relation includes → join definitions          |
//! | `introspect` | Schema → generated declarations and runtime   |
//! | `client`     | Typed per-table operations                    |

pub mod arguments;
pub mod ast;
pub mod builder;
pub mod client;
pub mod codegen;
pub mod config;
pub mod engine;
pub mod error;
pub mod fields;
pub mod introspect;
pub mod joins;
pub mod params;
pub mod schema;
pub mod writer;

pub mod prelude {
    pub use crate::ast::*;
    pub use crate::builder::QueryBuilder;
    pub use crate::client::{Connections, Model, Query, Shape, raw};
    pub use crate::config::Catalog;
    pub use crate::engine::{Engine, Introspector};
    pub use crate::error::*;
    pub use crate::fields::{DateField, DateFilter, StringField, StringFilter, Unknown};
    pub use crate::params::{Aggregate, Direction, QueryParams, Return};
}

pub use builder::QueryBuilder;
pub use config::Catalog;
pub use error::{AuroError, AuroResult};
pub use introspect::{generate, introspect_database};
