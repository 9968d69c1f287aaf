use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use lmchat_api::{
    build_router,
    config::{Config, StorageBackend},
    state::AppState,
};
use lmchat_llm::ClientFactory;
use lmchat_media::{AudioClient, OcrClient, TextExtractor, Transcriber};
use lmchat_persist::{InMemoryPersistenceClient, MongoPersistenceClient, PersistenceClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = Config::load()
        .map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;

    // Initialize logging
    init_logging(&config);

    tracing::info!("Starting lmchat API server");
    tracing::info!("Config loaded: {}:{}", config.server.host, config.server.port);

    // Initialize persistence
    let persist: Arc<dyn PersistenceClient> = match config.storage.backend {
        StorageBackend::Mongodb => {
            tracing::info!("Connecting to MongoDB");
            let mongo_client = MongoPersistenceClient::connect(
                &config.mongodb_uri,
                &config.storage.database,
            ).await?;
            mongo_client.ensure_indexes().await?;
            tracing::info!("MongoDB connected");
            Arc::new(mongo_client)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, data is lost on restart");
            Arc::new(InMemoryPersistenceClient::new())
        }
    };

    // Initialize model and media clients
    tracing::info!(base_url = %config.llm.base_url, model = %config.llm.model, "Initializing LLM client");
    let llm_client = ClientFactory::create_client(&config.llm)?;
    let ocr: Arc<dyn TextExtractor> = Arc::new(OcrClient::new(&config.media.ocr_base_url)?);
    let transcriber: Arc<dyn Transcriber> = Arc::new(AudioClient::new(&config.media.audio_base_url)?);

    if !llm_client.health().await {
        tracing::warn!("Model server is not reachable yet, turns will fail until it is");
    }

    // Create application state
    let state = Arc::new(AppState::new(
        config.clone(),
        persist,
        llm_client,
        ocr,
        transcriber,
    ));

    // Build router
    let app = build_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!("Server listening on {}", addr);
    tracing::info!("Health check: http://{}/health", addr);
    tracing::info!("API docs: http://{}/api/docs", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match config.logging.format.as_str() {
        "json" => {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            registry
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
    }
}
