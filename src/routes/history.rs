use axum::{
    extract::{Query, State},
    response::Json,
    routing::get,
    Router,
};

use crate::db::models::{ChatRecord, HistoryParams, Page};
use crate::errors::AppResult;
use crate::services::auth::AdminUser;
use crate::utils::config::AppState;

// Newest first; `session_id` narrows the listing to one conversation.
pub async fn list_chat_history_handler(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<HistoryParams>,
) -> AppResult<Json<Vec<ChatRecord>>> {
    let session_id = params.session_id.as_deref().filter(|s| !s.is_empty());
    let page = Page::new(params.skip, params.limit);

    let records = app_state.store.list_chat_records(session_id, page).await?;

    tracing::info!("✅ Retrieved {} chat records", records.len());
    Ok(Json(records))
}

pub fn create_history_router() -> Router<AppState> {
    Router::new().route("/admin/chat-history", get(list_chat_history_handler))
}
