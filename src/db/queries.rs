use crate::db::models::*;
use crate::errors::{AppError, AppResult};
use sqlx::PgPool;

// User queries
pub async fn create_user(pool: &PgPool, user: NewUser) -> AppResult<User> {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (username, email, hashed_password, is_admin) VALUES ($1, $2, $3, $4) RETURNING *"
    )
    .bind(user.username)
    .bind(user.email)
    .bind(user.hashed_password)
    .bind(user.is_admin)
    .fetch_one(pool)
    .await
    .map_err(|e| match e.as_database_error() {
        Some(db) if db.is_unique_violation() => {
            AppError::Conflict("Username or email is already registered".to_string())
        }
        _ => AppError::Database(e),
    })?;

    Ok(user)
}

pub async fn get_user_by_username(pool: &PgPool, username: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = $1")
        .bind(username)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

pub async fn get_user_by_email(pool: &PgPool, email: &str) -> AppResult<Option<User>> {
    let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
        .bind(email)
        .fetch_optional(pool)
        .await?;

    Ok(user)
}

// FAQ queries
pub async fn list_faqs(pool: &PgPool, page: Page) -> AppResult<Vec<Faq>> {
    let faqs = sqlx::query_as::<_, Faq>("SELECT * FROM faqs ORDER BY id ASC OFFSET $1 LIMIT $2")
        .bind(page.skip)
        .bind(page.limit)
        .fetch_all(pool)
        .await?;

    Ok(faqs)
}

pub async fn list_active_faqs(pool: &PgPool) -> AppResult<Vec<Faq>> {
    let faqs = sqlx::query_as::<_, Faq>("SELECT * FROM faqs WHERE is_active ORDER BY id ASC")
        .fetch_all(pool)
        .await?;

    Ok(faqs)
}

pub async fn get_faq(pool: &PgPool, faq_id: i64) -> AppResult<Option<Faq>> {
    let faq = sqlx::query_as::<_, Faq>("SELECT * FROM faqs WHERE id = $1")
        .bind(faq_id)
        .fetch_optional(pool)
        .await?;

    Ok(faq)
}

pub async fn create_faq(pool: &PgPool, faq: FaqCreate) -> AppResult<Faq> {
    let faq = sqlx::query_as::<_, Faq>(
        "INSERT INTO faqs (question, answer, category, tags, is_active) VALUES ($1, $2, $3, $4, $5) RETURNING *"
    )
    .bind(faq.question)
    .bind(faq.answer)
    .bind(faq.category)
    .bind(faq.tags)
    .bind(faq.is_active)
    .fetch_one(pool)
    .await?;

    Ok(faq)
}

pub async fn update_faq(pool: &PgPool, faq_id: i64, update: FaqUpdate) -> AppResult<Option<Faq>> {
    let Some(mut faq) = get_faq(pool, faq_id).await? else {
        return Ok(None);
    };
    faq.apply(update);

    let faq = sqlx::query_as::<_, Faq>(
        "UPDATE faqs SET question = $1, answer = $2, category = $3, tags = $4, is_active = $5, updated_at = NOW()
         WHERE id = $6 RETURNING *"
    )
    .bind(faq.question)
    .bind(faq.answer)
    .bind(faq.category)
    .bind(faq.tags)
    .bind(faq.is_active)
    .bind(faq_id)
    .fetch_optional(pool)
    .await?;

    Ok(faq)
}

pub async fn delete_faq(pool: &PgPool, faq_id: i64) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM faqs WHERE id = $1")
        .bind(faq_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// Document queries
pub async fn list_documents(pool: &PgPool, page: Page) -> AppResult<Vec<Document>> {
    let documents =
        sqlx::query_as::<_, Document>("SELECT * FROM documents ORDER BY id ASC OFFSET $1 LIMIT $2")
            .bind(page.skip)
            .bind(page.limit)
            .fetch_all(pool)
            .await?;

    Ok(documents)
}

pub async fn list_active_documents(pool: &PgPool) -> AppResult<Vec<Document>> {
    let documents =
        sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE is_active ORDER BY id ASC")
            .fetch_all(pool)
            .await?;

    Ok(documents)
}

pub async fn get_document(pool: &PgPool, document_id: i64) -> AppResult<Option<Document>> {
    let document = sqlx::query_as::<_, Document>("SELECT * FROM documents WHERE id = $1")
        .bind(document_id)
        .fetch_optional(pool)
        .await?;

    Ok(document)
}

pub async fn create_document(pool: &PgPool, document: DocumentCreate) -> AppResult<Document> {
    let document = sqlx::query_as::<_, Document>(
        "INSERT INTO documents (title, content, category, is_active) VALUES ($1, $2, $3, $4) RETURNING *"
    )
    .bind(document.title)
    .bind(document.content)
    .bind(document.category)
    .bind(document.is_active)
    .fetch_one(pool)
    .await?;

    Ok(document)
}

pub async fn update_document(
    pool: &PgPool,
    document_id: i64,
    update: DocumentUpdate,
) -> AppResult<Option<Document>> {
    let Some(mut document) = get_document(pool, document_id).await? else {
        return Ok(None);
    };
    document.apply(update);

    let document = sqlx::query_as::<_, Document>(
        "UPDATE documents SET title = $1, content = $2, category = $3, is_active = $4, updated_at = NOW()
         WHERE id = $5 RETURNING *"
    )
    .bind(document.title)
    .bind(document.content)
    .bind(document.category)
    .bind(document.is_active)
    .bind(document_id)
    .fetch_optional(pool)
    .await?;

    Ok(document)
}

pub async fn delete_document(pool: &PgPool, document_id: i64) -> AppResult<bool> {
    let result = sqlx::query("DELETE FROM documents WHERE id = $1")
        .bind(document_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

// Chat history queries
pub async fn create_chat_record(pool: &PgPool, record: NewChatRecord) -> AppResult<ChatRecord> {
    let record = sqlx::query_as::<_, ChatRecord>(
        "INSERT INTO chat_history (session_id, user_message, bot_response, context_used) VALUES ($1, $2, $3, $4) RETURNING *"
    )
    .bind(record.session_id)
    .bind(record.user_message)
    .bind(record.bot_response)
    .bind(record.context_used)
    .fetch_one(pool)
    .await?;

    Ok(record)
}

/// Newest first, optionally restricted to one session.
pub async fn list_chat_records(
    pool: &PgPool,
    session_id: Option<&str>,
    page: Page,
) -> AppResult<Vec<ChatRecord>> {
    let records = sqlx::query_as::<_, ChatRecord>(
        "SELECT * FROM chat_history WHERE ($1::TEXT IS NULL OR session_id = $1)
         ORDER BY created_at DESC, id DESC OFFSET $2 LIMIT $3"
    )
    .bind(session_id)
    .bind(page.skip)
    .bind(page.limit)
    .fetch_all(pool)
    .await?;

    Ok(records)
}
