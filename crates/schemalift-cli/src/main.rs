use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use schemalift_api::{ExtractRequest, Extractor};
use schemalift_catalog::{ConnectionInfo, WarehouseClient};
use schemalift_core::{Config, ProgressEvent, ProgressSink, SchemaRef};

/// Schemalift - warehouse schema and sample extraction
#[derive(Parser)]
#[command(name = "schemalift")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: schemalift.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check that the warehouse is reachable with the configured credentials
    TestConnection,

    /// List schemas and their tables and views without fetching data
    Collections,

    /// Extract packages (DDL, sampled rows, inferred schemas) for the
    /// selected schemas
    Extract {
        /// Output file for the package list
        #[arg(short, long, default_value = "packages.json")]
        output: PathBuf,

        /// Schemas to extract as database.schema pairs (all when omitted)
        schemas: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else if std::path::Path::new("schemalift.toml").exists() {
        Config::from_file(std::path::Path::new("schemalift.toml"))?
    } else {
        if cli.verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    match cli.command {
        Commands::TestConnection => test_connection_command(&config, cli.verbose).await,
        Commands::Collections => collections_command(&config, cli.verbose).await,
        Commands::Extract { output, schemas } => {
            extract_command(&config, &output, &schemas, cli.verbose).await
        }
    }
}

/// Progress sink printing one line per milestone
struct CliProgress;

impl ProgressSink for CliProgress {
    fn progress(&self, event: ProgressEvent) {
        eprintln!(
            "  {} {} ({} / {})",
            "→".cyan(),
            event.message,
            event.container_name,
            event.entity_name
        );
    }
}

/// Open the configured warehouse client
async fn build_client(config: &Config, verbose: bool) -> Result<Arc<dyn WarehouseClient>> {
    let warehouse_config = config.warehouse.as_ref().ok_or_else(|| {
        anyhow::anyhow!(
            "No warehouse configuration found in schemalift.toml. \
             Add a [warehouse] section with type and connection settings."
        )
    })?;

    let info = ConnectionInfo::new(warehouse_config.settings.clone())
        .with_hidden_keys(warehouse_config.hidden_keys.clone());

    // Only the redacted view is ever logged
    tracing::info!(connection = %info.redacted(), "connecting to {}", warehouse_config.warehouse_type);

    if verbose {
        eprintln!(
            "{} {}...",
            "Connecting to".cyan(),
            warehouse_config.warehouse_type
        );
    }

    match warehouse_config.warehouse_type.to_lowercase().as_str() {
        "bigquery" => {
            #[cfg(feature = "bigquery")]
            {
                let client = schemalift_catalog::BigQueryWarehouse::connect(&info).await?;
                Ok(Arc::new(client) as Arc<dyn WarehouseClient>)
            }
            #[cfg(not(feature = "bigquery"))]
            {
                anyhow::bail!(
                    "BigQuery support not compiled. Rebuild with: cargo build --features bigquery"
                )
            }
        }
        "snowflake" => {
            #[cfg(feature = "snowflake")]
            {
                let client = schemalift_catalog::SnowflakeWarehouse::connect(&info)?;
                Ok(Arc::new(client) as Arc<dyn WarehouseClient>)
            }
            #[cfg(not(feature = "snowflake"))]
            {
                anyhow::bail!(
                    "Snowflake support not compiled. Rebuild with: cargo build --features snowflake"
                )
            }
        }
        other => Err(anyhow::anyhow!(
            "Unsupported warehouse type '{}'. Supported: bigquery, snowflake",
            other
        )),
    }
}

async fn test_connection_command(config: &Config, verbose: bool) -> Result<()> {
    let client = build_client(config, verbose).await?;
    let extractor = Extractor::new(client);

    match extractor.test_connection().await {
        Ok(()) => {
            println!("{}", "✓ Connection successful".green());
            Ok(())
        }
        Err(err) => {
            let report = err.to_report();
            eprintln!("{} {}", format!("[{}]", report.kind).red().bold(), report.message);
            std::process::exit(1);
        }
    }
}

async fn collections_command(config: &Config, verbose: bool) -> Result<()> {
    let client = build_client(config, verbose).await?;
    let extractor = Extractor::new(client);

    let collections = match extractor.collection_names().await {
        Ok(collections) => collections,
        Err(err) => {
            let report = err.to_report();
            eprintln!("{} {}", format!("[{}]", report.kind).red().bold(), report.message);
            std::process::exit(1);
        }
    };

    for schema in &collections {
        if schema.is_empty {
            println!("{} {}", schema.db_name.bold(), "(empty)".yellow());
            continue;
        }

        println!("{}", schema.db_name.bold());
        for name in &schema.db_collections {
            println!("  {}", name);
        }
    }

    if verbose {
        eprintln!();
        eprintln!("{} schemas listed", collections.len());
    }

    Ok(())
}

async fn extract_command(
    config: &Config,
    output: &PathBuf,
    schemas: &[String],
    verbose: bool,
) -> Result<()> {
    let client = build_client(config, verbose).await?;
    let mut extractor = Extractor::new(client);
    if verbose {
        extractor = extractor.with_progress(Arc::new(CliProgress));
    }

    let mut request = ExtractRequest::all(config.sampling.clone());
    request.schemas = schemas
        .iter()
        .map(|pair| parse_schema_ref(pair))
        .collect::<Result<Vec<_>>>()?;

    let outcome = match extractor.collections_data(&request).await {
        Ok(outcome) => outcome,
        Err(err) => {
            let report = err.to_report();
            eprintln!("{} {}", format!("[{}]", report.kind).red().bold(), report.message);
            std::process::exit(1);
        }
    };

    let json = serde_json::to_string_pretty(&outcome.packages)?;
    std::fs::write(output, json)?;

    println!(
        "{} {} packages written to {}",
        "✓".green(),
        outcome.packages.len(),
        output.display()
    );

    if !outcome.warnings.is_empty() {
        println!(
            "{} {} entities skipped:",
            "⚠".yellow(),
            outcome.warnings.len()
        );
        for warning in &outcome.warnings {
            println!(
                "  {} {}.{}: {}",
                "-".yellow(),
                warning.container,
                warning.entity,
                warning.error.message
            );
        }
    }

    Ok(())
}

/// Parse a `database.schema` pair
fn parse_schema_ref(pair: &str) -> Result<SchemaRef> {
    pair.split_once('.')
        .map(|(database, schema)| SchemaRef::new(database, schema))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "Invalid schema '{}': expected database.schema",
                pair
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn schema_pair_parsing() {
        let schema = parse_schema_ref("analytics.raw_events").unwrap();
        assert_eq!(schema.database, "analytics");
        assert_eq!(schema.schema, "raw_events");

        assert!(parse_schema_ref("no-dot").is_err());
    }
}
