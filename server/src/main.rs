use anyhow::Result;
use clap::Parser;
use faq_core::{Engine, EngineConfig, MemoryTopicStore, ScoringStrategy, SledTopicStore, TopicStore};
use faq_server::{build_app, AppConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// sled database directory; topics are kept in memory when omitted
    #[arg(long)]
    db: Option<String>,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 5000)]
    port: u16,
    /// Scoring strategy: set-overlap or sequence-ratio
    #[arg(long, default_value = "set-overlap")]
    scoring: ScoringStrategy,
    /// Stemmer language, or `none` for plain whitespace tokens
    #[arg(long, default_value = "greek")]
    language: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let store: Box<dyn TopicStore> = match &args.db {
        Some(path) => Box::new(SledTopicStore::open(path)?),
        None => {
            tracing::warn!("no --db given, topics will not survive a restart");
            Box::new(MemoryTopicStore::new())
        }
    };
    let config = EngineConfig { strategy: args.scoring, language: args.language };
    let engine = Arc::new(Engine::from_config(store, &config)?);
    let app = build_app(engine, AppConfig::from_env());

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, strategy = %config.strategy, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
