//! HTTP server command

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;
use relations_core::RelationsConfig;
use relations_server::db::{create_pool, migrations, Target};
use relations_server::http::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Address to bind to (default: config server.bind, 127.0.0.1:8000)
    #[arg(long, short = 'b')]
    pub bind: Option<SocketAddr>,

    /// Allow permissive CORS (all origins) - use with caution
    #[arg(long)]
    pub cors_permissive: bool,

    /// Skip upgrading the schema to head before serving
    #[arg(long)]
    pub no_migrate: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs, config: RelationsConfig) -> Result<()> {
    let pool = create_pool(&config.database)
        .await
        .with_context(|| format!("Failed to open database {}", config.database.url))?;

    if !args.no_migrate {
        let applied = migrations::upgrade(&pool, Target::Head)
            .await
            .context("Failed to migrate database")?;
        tracing::info!(applied = applied.len(), "Schema at head");
    }

    let mut server = ServerConfig::from(config.server);
    if let Some(bind) = args.bind {
        server.bind_addr = bind;
    }
    server.cors_permissive |= args.cors_permissive;

    tracing::info!("Starting relations server on {}", server.bind_addr);

    // Run server (blocks until shutdown)
    run_server(pool, server).await.context("Server error")?;

    Ok(())
}
