//! relations CLI - relational modelling demo over SQLite
//!
//! Subcommands:
//! - `serve`: run migrations, then the HTTP API (`POST /users/`)
//! - `migrate`: upgrade, downgrade and inspect the schema revision
//! - `demo`: run the relationship-loading walkthroughs

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use relations_core::RelationsConfig;

mod commands;
mod tracing_setup;

use tracing_setup::TracingConfig;

#[derive(Parser, Debug)]
#[command(
    name = "relations",
    author,
    version,
    about = "One-to-one, one-to-many and many-to-many modelling over SQLite",
    long_about = "Users with profiles and posts, orders with products. Migrate the schema, \
                  run the loading-strategy demos, or serve the users API."
)]
struct Cli {
    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, global = true)]
    debug: bool,

    /// Config file (default: ./relations.toml if present)
    #[arg(long, short = 'c', global = true, env = "RELATIONS_CONFIG")]
    config: Option<PathBuf>,

    /// Database URL (overrides config and DATABASE_URL)
    #[arg(long, global = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the HTTP API server
    Serve(commands::serve::ServeArgs),
    /// Manage schema migrations (up, down, current, history)
    Migrate(commands::migrate::MigrateArgs),
    /// Run a relationship demo (relations, m2m)
    Demo(commands::demo::DemoArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    tracing_setup::init(&TracingConfig { debug: cli.debug })?;

    let mut config = RelationsConfig::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(url) = cli.database_url {
        config.database.url = url;
    }

    match cli.command {
        Commands::Serve(args) => commands::run_serve(args, config).await,
        Commands::Migrate(args) => commands::run_migrate(args, &config).await,
        Commands::Demo(args) => commands::run_demo(args, config).await,
    }
}
