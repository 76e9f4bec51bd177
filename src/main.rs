use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use pubmed_fetcher::config::{find_config_file, get_config, load_config, Config};
use pubmed_fetcher::models::ResultRow;
use pubmed_fetcher::output::{render_json, render_plain, render_table, write_csv_file};
use pubmed_fetcher::utils::is_terminal;
use pubmed_fetcher::{Pipeline, PubMedSource, VERSION};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Fetch PubMed papers and identify non-academic authors
#[derive(Parser, Debug)]
#[command(name = "pubmed-fetcher")]
#[command(version = VERSION)]
#[command(about = "Fetch PubMed papers with at least one non-academic author", long_about = None)]
struct Cli {
    /// PubMed query (supports the full PubMed query syntax)
    query: String,

    /// Write results to this CSV file instead of printing them
    #[arg(long, short)]
    file: Option<PathBuf>,

    /// Report progress while fetching and filtering
    #[arg(long, short)]
    debug: bool,

    /// Enable verbose logging (can be used multiple times: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, conflicts_with = "debug")]
    quiet: bool,

    /// Output format when printing to stdout
    #[arg(long, short, value_enum, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of PubMed IDs to request (overrides configuration)
    #[arg(long)]
    max_results: Option<usize>,

    /// Request timeout in seconds (overrides configuration)
    #[arg(long)]
    timeout: Option<u64>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// One "Field: value" block per paper
    Plain,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("pubmed_fetcher={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = resolve_config(&cli)?;
    tracing::debug!(?config, "Resolved configuration");

    let source = PubMedSource::new(&config.eutils).context("Failed to create HTTP client")?;
    let pipeline =
        Pipeline::new(source.clone(), source).with_classifier(config.classifier.classifier());

    let rows = pipeline
        .run(&cli.query, cli.debug)
        .await
        .with_context(|| format!("PubMed query failed: {}", cli.query))?;

    if let Some(path) = &cli.file {
        write_csv_file(path, &rows)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        if rows.is_empty() {
            tracing::warn!("No papers with non-academic authors found, wrote header only");
        }
        if !cli.quiet {
            eprintln!("Results written to {}", path.display());
        }
    } else {
        print_rows(&rows, cli.output)?;
    }

    Ok(())
}

/// Defaults, then config file, then environment, then command-line flags
fn resolve_config(cli: &Cli) -> Result<Config> {
    let config = match cli.config.as_deref() {
        Some(path) => load_from(path)?,
        None => match find_config_file() {
            Some(path) => {
                tracing::info!("Using config file: {}", path.display());
                load_from(&path)?
            }
            None => get_config().context("Invalid configuration")?,
        },
    };
    Ok(apply_overrides(cli, config))
}

fn apply_overrides(cli: &Cli, mut config: Config) -> Config {
    if let Some(max_results) = cli.max_results {
        config.eutils.retmax = max_results;
    }
    if let Some(timeout) = cli.timeout {
        config.eutils.timeout_secs = timeout;
    }
    config
}

fn load_from(path: &Path) -> Result<Config> {
    load_config(path).with_context(|| format!("Failed to load config file {}", path.display()))
}

fn print_rows(rows: &[ResultRow], format: OutputFormat) -> Result<()> {
    let actual_format = if format == OutputFormat::Auto {
        if is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    };

    match actual_format {
        OutputFormat::Json => println!("{}", render_json(rows)?),
        OutputFormat::Plain => print!("{}", render_plain(rows)),
        OutputFormat::Table => {
            if rows.is_empty() {
                eprintln!("No papers with non-academic authors found.");
            } else {
                println!("{}", render_table(rows));
            }
        }
        OutputFormat::Auto => unreachable!(),
    }
    Ok(())
}
