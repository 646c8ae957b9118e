use dotenv::dotenv;
use std::{net::SocketAddr, sync::Arc};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use comman_chatbot::{
    create_router,
    db::{
        init_db, run_migrations,
        store::{MemoryStore, PgStore, Store},
    },
    services::{auth::ensure_admin, gemini::GeminiService},
    utils::config::{AppState, Config},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env
    dotenv().ok();

    // Setup tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting chatbot server...");

    let config = Config::from_env()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(database_url) => {
            tracing::info!("Connecting to database...");
            let pool = init_db(database_url).await?;
            tracing::info!("✅ Database connected successfully");

            run_migrations(&pool).await?;
            Arc::new(PgStore::new(pool))
        }
        None => {
            tracing::warn!("⚠️ DATABASE_URL not set, using in-memory storage; data is lost on restart");
            Arc::new(MemoryStore::new())
        }
    };

    if let Some(seed) = &config.admin_seed {
        ensure_admin(store.as_ref(), seed).await?;
    }

    let api_key = config
        .gemini_api_key
        .clone()
        .ok_or_else(|| anyhow::anyhow!("GEMINI_API_KEY must be set in .env"))?;
    let generator = Arc::new(GeminiService::new(&api_key)?);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    // Shared application state
    let app_state = AppState::new(store, generator, config);
    let app = create_router(app_state);

    tracing::info!("🌐 Server running on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
