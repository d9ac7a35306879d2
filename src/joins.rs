//! Join resolution for relation includes.

use std::collections::HashSet;

use tracing::error;

use crate::ast::{Include, JoinDefinition};
use crate::config::Catalog;

/// Join definitions of `table` whose joining table was requested.
///
/// A table with no generated joins is a configuration miss: it is reported
/// and resolves to no joins rather than failing the query.
pub fn resolve(catalog: &Catalog, table: &str, requested: &[String]) -> Vec<JoinDefinition> {
    let Some(table_joins) = catalog.joins_for(table) else {
        error!(table, "Joins for table {} not found.", table);
        return Vec::new();
    };

    table_joins
        .iter()
        .filter(|join| requested.contains(&join.joining_table))
        .cloned()
        .collect()
}

/// Union `incoming` into `include.joins`, keeping first occurrences in order.
pub fn merge_unique(include: &mut Include, incoming: impl IntoIterator<Item = JoinDefinition>) {
    let mut seen: HashSet<JoinDefinition> = include.joins.iter().cloned().collect();
    for join in incoming {
        if seen.insert(join.clone()) {
            include.joins.push(join);
        }
    }
}
