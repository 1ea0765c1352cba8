//! CLI entry point for the taggraph HTTP service.

use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use taggraph_graph::{GraphClient, GraphStore, MemoryGraph};

use taggraph_server::config::{ServiceConfig, StoreBackend};
use taggraph_server::AppState;

#[derive(Parser)]
#[command(name = "taggraph-server")]
#[command(about = "Tag graph service: persons, tags, projects and recommendations")]
struct Cli {
    /// Config file prefix (default: taggraph).
    #[arg(short, long, default_value = "taggraph")]
    config: String,

    /// Override the listen address (e.g., 0.0.0.0:5000).
    #[arg(short, long)]
    bind: Option<String>,

    /// Override the store backend: memory, neo4j.
    #[arg(long)]
    backend: Option<String>,

    /// Human-readable logs instead of JSON.
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if cli.pretty {
        fmt().with_env_filter(filter).init();
    } else {
        fmt().with_env_filter(filter).json().init();
    }

    let mut config = ServiceConfig::load(&cli.config)?;
    if let Some(bind) = cli.bind {
        config.server.bind = bind;
    }
    if let Some(backend) = cli.backend.as_deref() {
        config.store.backend = parse_backend(backend)?;
    }

    let store = open_store(&config).await?;
    let state = AppState::new(store, config.server.default_limit);

    taggraph_server::serve(&config.server.bind, state).await?;
    Ok(())
}

async fn open_store(config: &ServiceConfig) -> anyhow::Result<Arc<dyn GraphStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            tracing::warn!("Using in-memory store; data is lost on restart");
            Ok(Arc::new(MemoryGraph::new()))
        }
        StoreBackend::Neo4j => {
            let client = GraphClient::connect(&config.neo4j.graph_config()).await?;
            client.ensure_schema().await?;
            tracing::info!(uri = %config.neo4j.uri, "Connected to Neo4j");
            Ok(Arc::new(client))
        }
    }
}

fn parse_backend(s: &str) -> anyhow::Result<StoreBackend> {
    match s.to_lowercase().as_str() {
        "memory" => Ok(StoreBackend::Memory),
        "neo4j" => Ok(StoreBackend::Neo4j),
        _ => anyhow::bail!("Invalid backend: {s}. Choose: memory, neo4j"),
    }
}
