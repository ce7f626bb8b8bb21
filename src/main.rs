mod config;

use anyhow::Result;
use chrono::Utc;
use config::AppConfig;
use sharp_api::{create_routes, AppState};
use sharp_db::{DatabaseConnection, KeyValueStore, PredictionStore, SqliteStore};
use sharp_services::{build_provider, PredictionEngine, PredictorService};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sharp_rs=debug,sharp_services=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("🚀 Starting Sharp-RS adaptive prediction engine");

    // Load configuration
    let config = AppConfig::new()?;
    let default_sport = config.default_sport()?;
    info!("✅ Configuration loaded successfully");
    info!("📊 Database: {}", config.database_url());
    info!("🌐 Server will bind to: {}", config.server_addr());

    // Persistence
    let db = DatabaseConnection::new(config.database_url()).await?;
    db.run_migrations().await?;
    let backend: Arc<dyn KeyValueStore> = Arc::new(SqliteStore::new(db.pool().clone()));
    let store = PredictionStore::load(backend, Utc::now().date_naive()).await;

    // Schedule provider and scoring
    let provider = build_provider(&config.feed_config())?;
    let predictor = PredictorService::new(config.model.seed);
    info!("🧠 Scoring model: {}", predictor.model_name());

    let engine = PredictionEngine::new(store, provider, predictor);
    let state = AppState::new(engine, default_sport);

    let app = create_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.server_addr()).await?;
    info!("✅ Listening on {}", listener.local_addr()?);
    info!("⌨️  Press Ctrl+C to stop");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Shutting down gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("❌ Failed to listen for shutdown signal: {}", e);
    }
}
