use axum::{
    extract::{Path, Query, State},
    response::Json,
    routing::{get, put},
    Router,
};

use crate::db::models::{
    Document, DocumentCreate, DocumentUpdate, ListParams, MessageResponse, Page,
};
use crate::errors::{AppError, AppResult};
use crate::services::auth::AdminUser;
use crate::utils::config::AppState;

fn not_found(document_id: i64) -> AppError {
    tracing::error!("❌ Document not found: {}", document_id);
    AppError::NotFound("Document not found".to_string())
}

pub async fn list_documents_handler(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<ListParams>,
) -> AppResult<Json<Vec<Document>>> {
    let documents = app_state.store.list_documents(Page::from(&params)).await?;

    tracing::info!("✅ Retrieved {} documents", documents.len());
    Ok(Json(documents))
}

pub async fn create_document_handler(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<DocumentCreate>,
) -> AppResult<Json<Document>> {
    tracing::info!("Creating document: {}", payload.title);

    let document = app_state.store.create_document(payload.validated()?).await?;

    tracing::info!("✅ Document created successfully: {}", document.id);
    Ok(Json(document))
}

pub async fn update_document_handler(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(document_id): Path<i64>,
    Json(payload): Json<DocumentUpdate>,
) -> AppResult<Json<Document>> {
    tracing::info!("Updating document: {}", document_id);

    let document = app_state
        .store
        .update_document(document_id, payload.validated()?)
        .await?
        .ok_or_else(|| not_found(document_id))?;

    tracing::info!("✅ Document updated successfully: {}", document.id);
    Ok(Json(document))
}

pub async fn delete_document_handler(
    State(app_state): State<AppState>,
    _admin: AdminUser,
    Path(document_id): Path<i64>,
) -> AppResult<Json<MessageResponse>> {
    tracing::info!("Deleting document: {}", document_id);

    if !app_state.store.delete_document(document_id).await? {
        return Err(not_found(document_id));
    }

    tracing::info!("✅ Document deleted successfully: {}", document_id);
    Ok(Json(MessageResponse {
        message: "Document deleted".to_string(),
    }))
}

pub fn create_document_router() -> Router<AppState> {
    Router::new()
        .route(
            "/admin/documents",
            get(list_documents_handler).post(create_document_handler),
        )
        .route(
            "/admin/documents/{document_id}",
            put(update_document_handler).delete(delete_document_handler),
        )
}
