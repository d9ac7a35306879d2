//! The introspection pipeline.
//!
//! One forward pass: read column rows, declare a type per table, declare the
//! client, fetch foreign keys for every table at once, then render. Any
//! collaborator failure aborts the run before anything is written.

use futures::future::try_join_all;
use tracing::{debug, info};

use crate::ast::Joins;
use crate::codegen::{self, Artifacts, ConnectionDecl, Document, Node};
use crate::engine::Introspector;
use crate::error::AuroResult;
use crate::schema::{Table, fold_foreign_keys, parse_tables};
use crate::writer::ArtifactWriter;

/// Introspect `schema` and render the generated artifacts.
pub async fn generate(introspector: &dyn Introspector, schema: &str) -> AuroResult<Artifacts> {
    let document = build_document(introspector, schema).await?;
    Ok(codegen::render(&document))
}

/// Run the pipeline and hand the artifacts to `writer`.
pub async fn introspect_database(
    introspector: &dyn Introspector,
    writer: &dyn ArtifactWriter,
    schema: &str,
) -> AuroResult<Artifacts> {
    let artifacts = generate(introspector, schema).await?;
    writer.write(&artifacts)?;
    Ok(artifacts)
}

/// Introspect `schema` into a document model.
pub async fn build_document(introspector: &dyn Introspector, schema: &str) -> AuroResult<Document> {
    let raw = introspector.introspect().await?;
    let tables = parse_tables(&raw)?;
    info!(schema, tables = tables.len(), "introspected schema");

    let mut document = Document::new(schema);
    document.declare_tables(&tables);

    let joins = resolve_joins(introspector, &tables).await?;
    if joins.is_empty() {
        info!("no foreign keys found");
        document.push(Node::NoJoins);
    } else {
        let connections = connections(&document, &joins);
        document.push(Node::Joins(joins));
        document.extend(connections.into_iter().map(Node::Connection));
    }

    Ok(document)
}

/// Fetch foreign-key rows for every table concurrently and fold them in
/// table order.
async fn resolve_joins(introspector: &dyn Introspector, tables: &[Table]) -> AuroResult<Joins> {
    let rows = try_join_all(
        tables
            .iter()
            .map(|table| introspector.foreign_keys(&table.table_name)),
    )
    .await?;

    let mut joins = Joins::new();
    for (table, rows) in tables.iter().zip(rows) {
        let Some(rows) = rows else {
            continue;
        };
        let added = fold_foreign_keys(&rows, &mut joins)?;
        debug!(table = %table.table_name, added, "folded foreign keys");
    }

    Ok(joins)
}

/// One connection per joined table, pointing at its first joining table.
///
/// Skipped when either side has no generated type.
fn connections(document: &Document, joins: &Joins) -> Vec<ConnectionDecl> {
    let type_of = |table: &str| {
        document
            .types()
            .find(|decl| decl.table == table)
            .map(|decl| decl.name.clone())
    };

    joins
        .iter()
        .filter_map(|(table, definitions)| {
            let first = definitions.first()?;
            Some(ConnectionDecl {
                type_name: type_of(table)?,
                related: type_of(&first.joining_table)?,
            })
        })
        .collect()
}
