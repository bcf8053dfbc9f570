//! Storefront CLI - command-line front end for hybrid product search.
//!
//! # Usage
//!
//! ```bash
//! # Search a catalog snapshot
//! storefront-search "wireless mouse" --catalog catalog.json
//!
//! # Include recorded semantic hits and filter by brand
//! storefront-search "wireless mouse" --catalog catalog.json \
//!     --semantic hits.json --brand logitech -n 5
//!
//! # JSON output for scripting
//! storefront-search "usb-c hub" --json
//! ```

mod config;
mod output;
mod search;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Storefront hybrid product search.
///
/// Ranks catalog products against a query with keyword scoring and, when
/// recorded vector hits are provided, semantic retrieval fused by weighted
/// reciprocal rank fusion.
#[derive(Parser)]
#[command(name = "storefront-search", version, about)]
struct Cli {
    /// Search query
    query: Option<String>,

    /// Catalog JSON file (default: $STOREFRONT_CATALOG, then the data directory)
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Recorded vector hits: JSON object mapping query -> hits
    #[arg(long)]
    semantic: Option<PathBuf>,

    /// Maximum number of results to return (0 uses the configured default)
    #[arg(short = 'n', long, default_value = "10")]
    limit: usize,

    /// Output results as JSON
    #[arg(long)]
    json: bool,

    /// Search configuration JSON file (weights, cutoffs, timeouts)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Only products in this category
    #[arg(long)]
    category: Option<String>,

    /// Only products of this brand
    #[arg(long)]
    brand: Option<String>,

    /// Minimum price (inclusive)
    #[arg(long)]
    min_price: Option<f64>,

    /// Maximum price (inclusive)
    #[arg(long)]
    max_price: Option<f64>,

    /// Also return products that are out of stock
    #[arg(long)]
    include_out_of_stock: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let Some(query) = &cli.query else {
        eprintln!("No search query provided. Use --help for usage information.");
        std::process::exit(1);
    };

    let filters = search::build_filters(
        cli.category.clone(),
        cli.brand.clone(),
        cli.min_price,
        cli.max_price,
        cli.include_out_of_stock,
    );
    let inputs = search::SearchInputs {
        catalog: cli.catalog.clone(),
        semantic: cli.semantic.clone(),
        config: cli.config.clone(),
    };

    let results = search::execute_search(query, cli.limit, filters.as_ref(), &inputs).await?;

    let output = if cli.json {
        output::format_json(query, &results)
    } else {
        output::format_human(query, &results)
    };
    println!("{}", output);

    Ok(())
}
