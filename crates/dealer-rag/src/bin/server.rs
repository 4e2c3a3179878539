//! Dealer RAG server binary
//!
//! Run with: cargo run -p dealer-rag --bin dealer-rag-server -- --config dealer-rag.toml

use clap::Parser;
use dealer_rag::{config::RagConfig, server::RagServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Dealer RAG - question answering over the dealer database
#[derive(Parser)]
#[command(name = "dealer-rag-server")]
#[command(version)]
struct Cli {
    /// TOML configuration file; defaults are used when omitted
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Override the listen port
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "dealer_rag=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    println!(
        r#"
╔═══════════════════════════════════════════════════════════╗
║                     Dealer RAG System                     ║
║      Products, Inventory, Sales, Claims and Dealers       ║
╚═══════════════════════════════════════════════════════════╝
"#
    );

    // Load configuration
    let mut config = RagConfig::load(cli.config.as_deref())?;
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    tracing::info!("Configuration loaded");
    tracing::info!("  - Data source: {:?}", config.data_source.backend);
    tracing::info!("  - Embedding model: {}", config.embeddings.model);
    tracing::info!("  - Embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!("  - Model chain: {}", config.llm.models.join(" -> "));
    tracing::info!(
        "  - Rate limit: {} requests per {}s",
        config.rate_limit.max_requests,
        config.rate_limit.window_secs
    );

    // Create and start server
    let server = RagServer::new(config).await?;

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  POST /ask     - Ask a question");
    println!("  GET  /health  - Data source and index status");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
