//! Command-line surface: argument parsing, config overrides and command dispatch.

pub mod batch;
pub mod health;
pub mod shell;

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::debug;

use crate::config::LookupConfig;
use crate::entities::{Resolution, ResolveOptions, resolve};
use crate::error::LookupError;
use crate::render;
use crate::sources::ReferenceStore;
use crate::sources::ingest::ingest_directory;
use crate::sources::sqlite::SqliteStore;
use crate::transform::merge::EmptyRowPolicy;

#[derive(Parser, Debug)]
#[command(
    name = "pgx-lookup",
    version,
    about = "Look up a gene, drug, or phenotype in a local PharmGKB database"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Emit JSON instead of markdown
    #[arg(long, global = true)]
    pub json: bool,

    /// SQLite database built by `pgx-lookup ingest` [env: PGX_LOOKUP_DB]
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Maximum allele annotation texts per genetic profile
    #[arg(long, global = true, value_name = "N", value_parser = clap::value_parser!(u64).range(1..))]
    pub annotation_limit: Option<u64>,

    /// What an empty annotation row does to a merge: stop or skip
    #[arg(long, global = true, value_name = "POLICY", value_parser = parse_empty_rows)]
    pub empty_rows: Option<EmptyRowPolicy>,

    /// Per-query timeout in seconds
    #[arg(long = "timeout", global = true, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a term and print its report
    Get {
        /// Gene symbol, drug name, or phenotype text
        #[arg(required = true, num_args = 1..)]
        term: Vec<String>,
    },
    /// Look up every term in a file, one per line
    Batch {
        file: PathBuf,
        /// Lookups in flight at once
        #[arg(long, default_value_t = batch::DEFAULT_CONCURRENCY)]
        concurrency: usize,
    },
    /// Interactive prompt, one lookup per line
    Shell,
    /// Load PharmGKB .tsv exports from a directory into the database
    Ingest { dir: PathBuf },
    /// Check that the database has every table lookups need
    Health,
}

fn parse_empty_rows(raw: &str) -> Result<EmptyRowPolicy, String> {
    EmptyRowPolicy::parse(raw).ok_or_else(|| format!("expected `stop` or `skip`, got `{raw}`"))
}

impl Cli {
    /// Applies command-line flags on top of `base`.
    pub fn apply_overrides(&self, base: LookupConfig) -> LookupConfig {
        let mut config = base;
        if let Some(db) = &self.db {
            config.database = db.clone();
        }
        if let Some(limit) = self.annotation_limit {
            config.annotation_limit = usize::try_from(limit).unwrap_or(usize::MAX);
        }
        if let Some(policy) = self.empty_rows {
            config.empty_rows = policy;
        }
        if let Some(secs) = self.timeout_secs {
            config.query_timeout = Duration::from_secs(secs);
        }
        config
    }

    pub fn config(&self) -> LookupConfig {
        self.apply_overrides(LookupConfig::from_env())
    }
}

pub(crate) async fn open_store(config: &LookupConfig) -> Result<SqliteStore, LookupError> {
    SqliteStore::open(&config.database, config.query_timeout).await
}

pub(crate) fn render_resolution(resolution: &Resolution, json: bool) -> Result<String, LookupError> {
    if json {
        render::json::to_pretty(resolution)
    } else {
        render::markdown::resolution_markdown(resolution)
    }
}

/// Resolves one term and renders it in the requested format.
pub async fn lookup(
    store: &dyn ReferenceStore,
    term: &str,
    options: &ResolveOptions,
    json: bool,
) -> Result<String, LookupError> {
    let resolution = resolve(store, term, options).await?;
    render_resolution(&resolution, json)
}

/// Runs a parsed command and returns what should be printed on stdout.
///
/// `shell` writes to stdout itself and returns an empty string.
///
/// # Errors
///
/// Returns an error when the store cannot be opened or queried, input files cannot be read, or
/// `health` finds a required table missing.
pub async fn run(cli: Cli) -> anyhow::Result<String> {
    let config = cli.config();
    let options = ResolveOptions::from(&config);
    let json = cli.json;
    debug!(
        database = %config.database.display(),
        annotation_limit = config.annotation_limit,
        empty_rows = config.empty_rows.as_str(),
        "configuration loaded"
    );

    match cli.command {
        Commands::Get { term } => {
            let term = term.join(" ");
            let store = open_store(&config).await?;
            Ok(lookup(&store, &term, &options, json).await?)
        }
        Commands::Batch { file, concurrency } => {
            let content = tokio::fs::read_to_string(&file).await?;
            let terms = batch::parse_terms(&content);
            let store = open_store(&config).await?;
            let entries = batch::run(&store, &options, terms, concurrency).await;
            if json {
                Ok(batch::to_json(&entries)?)
            } else {
                Ok(batch::to_markdown(&entries)?)
            }
        }
        Commands::Shell => {
            shell::run_stdio(&config, json).await?;
            Ok(String::new())
        }
        Commands::Ingest { dir } => {
            let summary = ingest_directory(&dir, &config.database).await?;
            if json {
                Ok(render::json::to_pretty(&summary)?)
            } else {
                Ok(summary.to_markdown())
            }
        }
        Commands::Health => {
            let report = health::check(&config).await?;
            let output = if json {
                render::json::to_pretty(&report)?
            } else {
                report.to_markdown()
            };
            if !report.all_present() {
                anyhow::bail!(
                    "{} of {} required tables missing\n\n{output}",
                    report.missing(),
                    report.rows.len()
                );
            }
            Ok(output)
        }
    }
}
