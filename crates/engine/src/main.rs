//! Sessioncraft Engine - Main entry point.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::http::{HeaderValue, Method};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use sessioncraft_engine::api;
use sessioncraft_engine::infrastructure::{
    clock::SystemClock,
    config::EngineConfig,
    drafts::SqliteDraftRepo,
    ollama::OllamaClient,
    ports::{ClockPort, RagPort},
    rag::{DisabledRag, HttpRagClient},
    resilient_llm::{ResilientLlmClient, RetryConfig},
    topics::SqliteTopicRepo,
};
use sessioncraft_engine::App;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment from repo root (the engine is usually run from `crates/engine`).
    load_dotenv_from_repo_root();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sessioncraft_engine=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Sessioncraft Engine");

    let config = EngineConfig::from_env();
    let clock: Arc<dyn ClockPort> = Arc::new(SystemClock::new());

    // SQLite stores
    tracing::info!(path = %config.database_path, "Opening SQLite database");
    let topics = Arc::new(SqliteTopicRepo::new(&config.database_path).await?);
    if let Some(seed) = &config.topics_seed_path {
        let imported = topics.seed_from_file(std::path::Path::new(seed)).await?;
        tracing::info!(path = %seed, imported, "Seeded topic store");
    }
    let drafts = Arc::new(SqliteDraftRepo::new(&config.database_path, clock.clone()).await?);

    // LLM client
    let ollama_client = Arc::new(OllamaClient::new(
        &config.ollama_base_url,
        &config.ollama_model,
        config.llm_timeout,
    ));
    let retry_config = RetryConfig::default().with_max_retries(config.llm_max_retries);
    tracing::info!(
        base_url = %config.ollama_base_url,
        model = %config.ollama_model,
        max_retries = retry_config.max_retries,
        base_delay_ms = retry_config.base_delay.as_millis() as u64,
        "LLM client configured with retry"
    );
    let llm = Arc::new(ResilientLlmClient::new(ollama_client, retry_config));

    // Retrieval is optional
    let rag: Arc<dyn RagPort> = match &config.rag_base_url {
        Some(url) => {
            tracing::info!(base_url = %url, "Retrieval service enabled");
            Arc::new(HttpRagClient::new(url, config.rag_timeout))
        }
        None => {
            tracing::info!("RAG_BASE_URL not set, retrieval disabled");
            Arc::new(DisabledRag)
        }
    };

    let app = Arc::new(App::new(
        topics,
        drafts,
        rag,
        llm,
        clock,
        config.generation_config(),
    ));

    let mut router = api::routes()
        .with_state(app)
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = build_cors_layer(config.cors_allowed_origins.as_deref()) {
        router = router.layer(cors);
    }

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.server_host, config.server_port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}

fn load_dotenv_from_repo_root() {
    let repo_root = std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join("..");

    // Prefer local overrides.
    for filename in [".env.local", ".env"] {
        let path = repo_root.join(filename);
        if path.exists() {
            let _ = dotenvy::from_path(path);
        }
    }
}

fn build_cors_layer(allowed_origins: Option<&str>) -> Option<CorsLayer> {
    let allowed_origins = allowed_origins?;

    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([axum::http::header::CONTENT_TYPE]);

    if allowed_origins == "*" {
        cors = cors.allow_origin(Any);
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .filter_map(|s| HeaderValue::from_str(s).ok())
            .collect();

        if origins.is_empty() {
            return None;
        }

        cors = cors.allow_origin(origins);
    }

    Some(cors)
}
