//! Backend and typed clients for the Comman chatbot.
//!
//! The server half (`routes`, `services`, `db`) exposes the HTTP API used by
//! the admin console and the embeddable widget. The `client` module holds the
//! behaviour of those two clients: the admin auth gate and CRUD panels, and
//! the widget's session-aware chat transcript.

use axum::{http::HeaderValue, response::Json, routing::get, Router};
use serde_json::{json, Value};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

pub mod client;
pub mod db;
pub mod errors;
pub mod routes;
pub mod services;
pub mod utils;

use utils::config::AppState;

async fn root_handler() -> Json<Value> {
    Json(json!({
        "message": "Comman Chatbot API",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health_handler() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "message": "Chatbot server is running",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(Any)
        .allow_headers(Any)
}

pub fn create_router(app_state: AppState) -> Router {
    let cors = cors_layer(&app_state.config.allowed_origins);

    let api = Router::new()
        .merge(routes::auth::create_auth_router())
        .merge(routes::faqs::create_faq_router())
        .merge(routes::documents::create_document_router())
        .merge(routes::history::create_history_router())
        .merge(routes::chat::create_chat_router());

    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .nest("/api", api)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
