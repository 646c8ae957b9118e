use anyhow::Result;
use sqlx::{postgres::PgPoolOptions, PgPool};

pub mod models;
pub mod queries;
pub mod store;

pub async fn init_db(database_url: &str) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    tracing::info!("Connected to Postgres successfully");
    Ok(pool)
}

/// Text columns are unbounded `TEXT`; length is never a storage error.
const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id BIGSERIAL PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        email TEXT NOT NULL UNIQUE,
        hashed_password TEXT NOT NULL,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        is_admin BOOLEAN NOT NULL DEFAULT FALSE,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS faqs (
        id BIGSERIAL PRIMARY KEY,
        question TEXT NOT NULL,
        answer TEXT NOT NULL,
        category TEXT,
        tags TEXT[],
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS documents (
        id BIGSERIAL PRIMARY KEY,
        title TEXT NOT NULL,
        content TEXT NOT NULL,
        category TEXT,
        file_path TEXT,
        file_type TEXT,
        is_active BOOLEAN NOT NULL DEFAULT TRUE,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    )",
    "CREATE TABLE IF NOT EXISTS chat_history (
        id BIGSERIAL PRIMARY KEY,
        session_id TEXT NOT NULL,
        user_message TEXT NOT NULL,
        bot_response TEXT NOT NULL,
        context_used JSONB,
        created_at TIMESTAMP WITH TIME ZONE NOT NULL DEFAULT NOW()
    )",
    // Databases created with bounded VARCHAR columns are widened in place.
    "ALTER TABLE users
        ALTER COLUMN username TYPE TEXT,
        ALTER COLUMN email TYPE TEXT,
        ALTER COLUMN hashed_password TYPE TEXT",
    "ALTER TABLE faqs
        ALTER COLUMN question TYPE TEXT,
        ALTER COLUMN category TYPE TEXT",
    "ALTER TABLE documents
        ALTER COLUMN title TYPE TEXT,
        ALTER COLUMN category TYPE TEXT,
        ALTER COLUMN file_path TYPE TEXT,
        ALTER COLUMN file_type TYPE TEXT",
    "ALTER TABLE chat_history ALTER COLUMN session_id TYPE TEXT",
    "CREATE INDEX IF NOT EXISTS idx_chat_history_session_id ON chat_history(session_id)",
    "CREATE INDEX IF NOT EXISTS idx_chat_history_created_at ON chat_history(created_at)",
];

pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    tracing::info!("Running database migrations...");

    for statement in SCHEMA {
        sqlx::query(*statement).execute(pool).await?;
    }

    tracing::info!("✅ Database migrations completed successfully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_has_no_length_limited_columns() {
        for statement in SCHEMA {
            let upper = statement.to_uppercase();
            assert!(
                !upper.contains("VARCHAR(") && !upper.contains("CHAR("),
                "bounded column in: {}",
                statement
            );
        }
    }

    #[test]
    fn schema_widens_session_id() {
        assert!(SCHEMA
            .iter()
            .any(|s| s.contains("chat_history ALTER COLUMN session_id TYPE TEXT")));
    }
}
