use axum::{extract::State, response::Json, routing::post, Router};

use crate::db::models::{ChatRequest, ChatResponse};
use crate::errors::AppResult;
use crate::services::chatbot;
use crate::utils::config::AppState;

// Public endpoint used by the embeddable widget; no authentication.
pub async fn chat_handler(
    State(app_state): State<AppState>,
    Json(payload): Json<ChatRequest>,
) -> AppResult<Json<ChatResponse>> {
    tracing::info!("Processing chat request: {}", payload.message);

    let response = chatbot::handle_turn(&app_state, payload).await.map_err(|e| {
        tracing::error!("❌ Chat request failed: {}", e);
        e
    })?;

    tracing::info!("✅ Chat request processed for session {}", response.session_id);
    Ok(Json(response))
}

pub fn create_chat_router() -> Router<AppState> {
    Router::new().route("/chat", post(chat_handler))
}
