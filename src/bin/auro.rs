//! auro: schema code generation and query inspection.
//!
//! # Usage
//!
//! ```bash
//! # Generate types.rs and runtime.rs from a database
//! auro generate --database-url postgres://localhost/app --out src/db
//!
//! # Show the IR a query would produce
//! auro explain users findmany '{"where": {"name": {"contains": "al"}}, "take": 5}'
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use colored::*;
use tracing_subscriber::EnvFilter;

use auro::codegen::{Artifacts, render};
use auro::config::{Config, DATABASE_URL_ENV, SCHEMA_ENV};
use auro::engine::PgIntrospector;
use auro::prelude::*;
use auro::writer::FsWriter;

#[derive(Parser)]
#[command(name = "auro")]
#[command(version)]
#[command(about = "Schema-driven query layer", long_about = None)]
#[command(after_help = "EXAMPLES:
    auro generate --database-url postgres://localhost/app
    auro explain users findmany '{\"take\": 10}' --joins joins.json")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Introspect a database and write the generated declarations
    Generate {
        /// Database connection URL
        #[arg(long, env = DATABASE_URL_ENV)]
        database_url: Option<String>,

        /// Schema to introspect
        #[arg(long, env = SCHEMA_ENV)]
        schema: Option<String>,

        /// Output directory for types.rs and runtime.rs
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Print the IR built for an operation as JSON
    Explain {
        /// Table name
        table: String,

        /// Operation (findmany, insertone, ...)
        operation: String,

        /// Query parameters as JSON
        params: String,

        /// JSON file holding the join table
        #[arg(long)]
        joins: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            database_url,
            schema,
            out,
        } => generate(database_url, schema, out).await,
        Commands::Explain {
            table,
            operation,
            params,
            joins,
        } => explain(&table, &operation, &params, joins),
    };

    if let Err(e) = result {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

async fn generate(
    database_url: Option<String>,
    schema: Option<String>,
    out: Option<PathBuf>,
) -> Result<()> {
    let mut config = Config::load().context("loading auro.toml")?;
    if let Some(url) = database_url {
        config.database_url = Some(url);
    }
    if let Some(schema) = schema {
        config.schema = schema;
    }
    if let Some(out) = out {
        config.output_dir = out;
    }

    let Some(url) = config.database_url.as_deref() else {
        bail!("no database URL. Use --database-url or set {}", DATABASE_URL_ENV);
    };

    println!(
        "{} schema {}",
        "Introspecting".cyan().bold(),
        config.schema.yellow()
    );

    let introspector = PgIntrospector::connect(url, config.schema.clone()).await?;
    let writer = FsWriter::new(&config.output_dir);
    let artifacts = auro::introspect_database(&introspector, &writer, &config.schema).await?;

    summarize(&artifacts);
    println!(
        "{} Wrote {} and {}",
        "✓".green(),
        writer.declarations_path().display().to_string().cyan(),
        writer.runtime_path().display().to_string().cyan()
    );
    Ok(())
}

fn summarize(artifacts: &Artifacts) {
    let count = |prefix: String| {
        artifacts
            .declarations
            .lines()
            .filter(|line| line.starts_with(&prefix))
            .count()
    };
    let models = count(render::model_impl_prefix());
    let connections = count(render::connection_impl_prefix());
    println!(
        "  {} {}  {} {}",
        "Tables:".dimmed(),
        models.to_string().white(),
        "Connections:".dimmed(),
        connections.to_string().white()
    );
}

fn explain(table: &str, operation: &str, params: &str, joins: Option<PathBuf>) -> Result<()> {
    let joins: Joins = match joins {
        Some(path) => {
            let text = std::fs::read_to_string(&path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => Joins::new(),
    };

    let params = QueryParams::from_json(params).context("parsing query parameters")?;
    let catalog = Catalog::with_joins(joins);
    let ir = QueryBuilder::new(table, operation, &catalog)
        .fill(&params)
        .build();

    println!("{}", serde_json::to_string_pretty(&ir)?);
    Ok(())
}
