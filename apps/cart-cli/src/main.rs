//! # storefront-cart CLI
//!
//! Command-line host for the cart engine. Every invocation restores the
//! persisted cart, applies at most one operation and prints the result.
//!
//! ## Commands
//! ```text
//! storefront-cart show
//! storefront-cart add --product 10 --variant 1 --price 100.00 --name Shirt [--qty 2]
//! storefront-cart add-from-catalog --catalog products.json --product 10 --variant 1
//! storefront-cart update --variant 1 --qty 3
//! storefront-cart remove --variant 1
//! storefront-cart clear
//! ```
//!
//! ## Module Organization
//! ```text
//! storefront-cli/
//! ├── main.rs      ◄─── You are here (argument parsing, logging, startup)
//! ├── commands.rs  ◄─── One function per subcommand
//! └── output.rs    ◄─── Text and JSON rendering of the cart
//! ```

mod commands;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use storefront_cart::CartConfig;

/// Storefront cart - inspect and modify the locally persisted cart
#[derive(Debug, Parser)]
#[command(name = "storefront-cart")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (defaults to the platform config dir)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Print the persisted snapshot JSON instead of a table
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print lines and totals
    Show,

    /// Add a variant described on the command line
    Add(AddArgs),

    /// Add a variant looked up in a catalog export (JSON array of products)
    AddFromCatalog(CatalogArgs),

    /// Set a line's quantity (0 or less removes it)
    Update(UpdateArgs),

    /// Remove a line
    Remove(RemoveArgs),

    /// Empty the cart
    Clear,
}

#[derive(Debug, Args)]
pub struct AddArgs {
    #[arg(long)]
    pub product: u64,

    #[arg(long)]
    pub variant: u64,

    /// Regular price, e.g. 100.00
    #[arg(long)]
    pub price: String,

    /// Promotional price; used instead of the regular price when set
    #[arg(long)]
    pub promo: Option<String>,

    /// Compare-at ("was") price
    #[arg(long)]
    pub compare: Option<String>,

    #[arg(long)]
    pub name: String,

    #[arg(long)]
    pub image: Option<String>,

    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub qty: i64,
}

#[derive(Debug, Args)]
pub struct CatalogArgs {
    #[arg(long)]
    pub catalog: PathBuf,

    #[arg(long)]
    pub product: u64,

    #[arg(long)]
    pub variant: u64,

    #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
    pub qty: i64,

    /// Language used to resolve the product name
    #[arg(long, default_value = "es")]
    pub lang: String,
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    #[arg(long)]
    pub variant: u64,

    #[arg(long, allow_negative_numbers = true)]
    pub qty: i64,
}

#[derive(Debug, Args)]
pub struct RemoveArgs {
    #[arg(long)]
    pub variant: u64,
}

fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    debug!(?cli, "Parsed arguments");

    let config = CartConfig::load_or_default(cli.config.clone());
    commands::run(cli.command, &config, cli.json)
}

/// Initializes the tracing subscriber. Logs go to stderr so stdout stays
/// parseable with `--json`.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=storefront_cart=trace` - Engine internals only
/// - Default: warnings, plus info from the storefront crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,storefront=info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
