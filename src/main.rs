//! Costume Atlas main entry point
//!
//! This is the command-line interface for the Costume Atlas catalog crawler.

use anyhow::Context;
use clap::{Parser, Subcommand};
use costume_atlas::catalog::Category;
use costume_atlas::config::{load_config_with_hash, Config};
use costume_atlas::crawler::run_crawl;
use costume_atlas::output::{
    check_images, check_names, load_links, load_records, print_image_check, print_name_check,
    print_report, ArtifactPaths,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Costume Atlas: a two-phase catalog crawler
///
/// Crawls one catalog category (body, face or hair) through its paginated
/// index into a name→link map, then fetches every item page for a structured
/// record and its image. The `check` subcommand audits the persisted
/// artifacts against each other and the downloaded images.
#[derive(Parser, Debug)]
#[command(name = "costume-atlas")]
#[command(version = "1.0.0")]
#[command(about = "A two-phase catalog crawler", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Path to TOML configuration file
    #[arg(short, long, value_name = "CONFIG", default_value = "config.toml")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl one catalog category end to end
    Crawl {
        /// Catalog category: body, face or hair
        #[arg(value_parser = parse_category)]
        category: Category,
    },

    /// Check persisted artifacts for consistency
    Check {
        /// Catalog category: body, face or hair
        #[arg(value_parser = parse_category)]
        category: Category,
    },
}

fn parse_category(s: &str) -> Result<Category, String> {
    s.parse()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    match cli.command {
        Command::Crawl { category } => handle_crawl(config, category).await,
        Command::Check { category } => handle_check(&config, category),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("costume_atlas=info,warn"),
            1 => EnvFilter::new("costume_atlas=debug,info"),
            2 => EnvFilter::new("costume_atlas=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the crawl subcommand
async fn handle_crawl(config: Config, category: Category) -> anyhow::Result<()> {
    tracing::info!("Starting crawl of category: {}", category);

    let report = run_crawl(config, category)
        .await
        .with_context(|| format!("crawl of category {} failed", category))?;

    print_report(&report);
    Ok(())
}

/// Handles the check subcommand
fn handle_check(config: &Config, category: Category) -> anyhow::Result<()> {
    let paths = ArtifactPaths::new(&config.output.database_dir, category);

    let records = load_records(&paths.data_json)
        .with_context(|| format!("failed to load {}", paths.data_json.display()))?;

    let image_report = check_images(&records, &paths.pics_dir);
    print_image_check(&image_report);
    println!();

    let links = load_links(&paths.list_json)
        .with_context(|| format!("failed to load {}", paths.list_json.display()))?;

    let name_report = check_names(&links, &records);
    print_name_check(&name_report);

    Ok(())
}
