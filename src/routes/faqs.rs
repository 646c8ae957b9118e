use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, put},
    Router,
};

use crate::db::models::{Faq, FaqCreate, FaqUpdate, ListParams, MessageResponse, Page};
use crate::errors::{AppError, AppResult};
use crate::services::auth::AdminUser;
use crate::utils::config::AppState;

fn not_found(faq_id: i64) -> AppError {
    tracing::error!("❌ FAQ not found: {}", faq_id);
    AppError::NotFound("FAQ not found".to_string())
}

pub async fn list_faqs_handler(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<Faq>>> {
    let faqs = app_state.store.list_faqs(Page::from(&params)).await?;

    tracing::info!("✅ Retrieved {} FAQs", faqs.len());
    Ok(Json(faqs))
}

pub async fn create_faq_handler(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<FaqCreate>,
) -> AppResult<Json<Faq>> {
    tracing::info!("Creating FAQ: {}", payload.question);

    let faq = app_state.store.create_faq(payload.validated()?).await?;

    tracing::info!("✅ FAQ created successfully: {}", faq.id);
    Ok(Json(faq))
}

pub async fn update_faq_handler(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(faq_id): Path<i64>,
    Json(payload): Json<FaqUpdate>,
) -> AppResult<Json<Faq>> {
    tracing::info!("Updating FAQ: {}", faq_id);

    let faq = app_state
        .store
        .update_faq(faq_id, payload.validated()?)
        .await?
        .ok_or_else(|| not_found(faq_id))?;

    tracing::info!("✅ FAQ updated successfully: {}", faq.id);
    Ok(Json(faq))
}

pub async fn delete_faq_handler(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(faq_id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    tracing::info!("Deleting FAQ: {}", faq_id);

    if !app_state.store.delete_faq(faq_id).await? {
        return Err(not_found(faq_id));
    }

    tracing::info!("✅ FAQ deleted successfully: {}", faq_id);
    Ok(Json(MessageResponse {
        message: "FAQ deleted".to_string(),
    }))
}

pub fn create_faq_router() -> Router<AppState> {
    Router::new()
        .route("/admin/faqs", get(list_faqs_handler).post(create_faq_handler))
        .route(
            "/admin/faqs/{faq_id}",
            put(update_faq_handler).delete(delete_faq_handler),
        )
}
