//! Novelty service binary - composition root.
//!
//! Ties together the workspace crates into a single executable:
//! 1. Parse CLI args and load configuration from TOML
//! 2. Open storage (SQLite corpus database)
//! 3. Construct the embedding provider once and share it
//! 4. Build the scoring pipeline and API state
//! 5. Start the axum REST API server

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use novelty_api::state::AppState;
use novelty_core::config::NoveltyConfig;
use novelty_embed::embedding::{DynEmbeddingService, MockEmbedding, OnnxEmbeddingService};
use novelty_engine::pipeline::NoveltyPipeline;
use novelty_store::{Database, ProposalRepository};

mod cli;

/// Expand ~ to home directory in a path string.
fn resolve_home_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Construct the configured embedding backend.
///
/// The model is loaded here, exactly once per process; every request shares
/// this instance. A missing ONNX model fails startup rather than surfacing
/// on the first request.
fn build_embedder(
    config: &NoveltyConfig,
) -> Result<Arc<dyn DynEmbeddingService>, novelty_core::NoveltyError> {
    match config.embedding.backend.as_str() {
        "onnx" => {
            let model_dir = resolve_home_path(&config.embedding.model_dir);
            let service = OnnxEmbeddingService::from_directory(&model_dir)?;
            Ok(Arc::new(service))
        }
        other => {
            if other != "mock" {
                tracing::warn!(backend = other, "Unknown embedding backend, using mock");
            }
            tracing::info!(
                dimensions = config.embedding.dimensions,
                "Mock embedding backend ready"
            );
            Ok(Arc::new(MockEmbedding::with_dimensions(
                config.embedding.dimensions,
            )))
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = cli::CliArgs::parse();

    // Config.
    let config_file = args.resolve_config_path();
    let mut config = NoveltyConfig::load_or_default(&config_file);
    if let Some(data_dir) = args.resolve_data_dir() {
        config.general.data_dir = data_dir;
    }
    if let Some(log_level) = args.resolve_log_level() {
        config.general.log_level = log_level;
    }

    // Tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.general.log_level)),
        )
        .init();

    tracing::info!("Starting novelty service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // Storage.
    let data_dir = resolve_home_path(&config.general.data_dir);
    let db_path = data_dir.join("novelty.db");
    let db = Arc::new(Database::new(&db_path)?);
    tracing::info!(path = %db_path.display(), "SQLite corpus database opened");

    // Embedding provider (loaded once, shared).
    let embedder = build_embedder(&config)?;

    // The repository is bound to the provider's dimension, so a model swap
    // against an existing corpus fails loudly instead of comparing garbage.
    let repository = Arc::new(ProposalRepository::new(
        Arc::clone(&db),
        embedder.dimensions(),
        config.corpus.identity_mode,
    ));
    let total = repository.count()?;
    tracing::info!(mode = ?config.corpus.identity_mode, proposals = total, "Corpus ready");

    let pipeline = NoveltyPipeline::new(
        embedder,
        Arc::clone(&repository),
        config.corpus.neighbor_limit,
        config.corpus.min_text_chars,
    );

    let port = args.resolve_port(config.general.port);
    let state = AppState::new(config, repository, pipeline);

    if let Err(e) = novelty_api::start_server(port, state).await {
        tracing::error!(port, error = %e, "Server failed — is another instance running?");
        return Err(e.into());
    }

    Ok(())
}
