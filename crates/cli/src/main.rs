//! Boutique CLI - database migrations and product tooling.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! boutique-cli migrate
//!
//! # Insert products from a YAML file
//! boutique-cli seed products.yaml
//!
//! # Print the current product collection as JSON lines
//! boutique-cli products list
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `seed` - Insert validated products from YAML
//! - `products list` - Dump the product collection

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "boutique-cli")]
#[command(author, version, about = "Boutique admin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run admin database migrations
    Migrate,
    /// Insert products from a YAML file
    Seed {
        /// Path to a YAML list of products (name, price, details, image)
        file: String,
    },
    /// Inspect the product collection
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// Print every product as one JSON object per line
    List,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::admin().await?,
        Commands::Seed { file } => {
            let inserted = commands::seed::products(&file).await?;
            tracing::info!(inserted, "Seeding complete");
        }
        Commands::Products { action } => match action {
            ProductsAction::List => commands::products::list().await?,
        },
    }
    Ok(())
}
