//! Storage seam between the HTTP handlers and persistence.
//!
//! `PgStore` delegates to the Postgres queries in [`crate::db::queries`];
//! `MemoryStore` keeps everything in process and backs the test harness and
//! database-less development runs.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use std::collections::BTreeMap;
use tokio::sync::RwLock;

use crate::db::models::*;
use crate::db::queries;
use crate::errors::{AppError, AppResult};

#[async_trait]
pub trait Store: Send + Sync {
    async fn create_user(&self, user: NewUser) -> AppResult<User>;
    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>>;
    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>>;

    async fn list_faqs(&self, page: Page) -> AppResult<Vec<Faq>>;
    async fn list_active_faqs(&self) -> AppResult<Vec<Faq>>;
    async fn create_faq(&self, faq: FaqCreate) -> AppResult<Faq>;
    async fn update_faq(&self, faq_id: i64, update: FaqUpdate) -> AppResult<Option<Faq>>;
    async fn delete_faq(&self, faq_id: i64) -> AppResult<bool>;

    async fn list_documents(&self, page: Page) -> AppResult<Vec<Document>>;
    async fn list_active_documents(&self) -> AppResult<Vec<Document>>;
    async fn create_document(&self, document: DocumentCreate) -> AppResult<Document>;
    async fn update_document(
        &self,
        document_id: i64,
        update: DocumentUpdate,
    ) -> AppResult<Option<Document>>;
    async fn delete_document(&self, document_id: i64) -> AppResult<bool>;

    async fn create_chat_record(&self, record: NewChatRecord) -> AppResult<ChatRecord>;
    async fn list_chat_records(
        &self,
        session_id: Option<&str>,
        page: Page,
    ) -> AppResult<Vec<ChatRecord>>;
}

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        queries::create_user(&self.pool, user).await
    }

    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        queries::get_user_by_username(&self.pool, username).await
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        queries::get_user_by_email(&self.pool, email).await
    }

    async fn list_faqs(&self, page: Page) -> AppResult<Vec<Faq>> {
        queries::list_faqs(&self.pool, page).await
    }

    async fn list_active_faqs(&self) -> AppResult<Vec<Faq>> {
        queries::list_active_faqs(&self.pool).await
    }

    async fn create_faq(&self, faq: FaqCreate) -> AppResult<Faq> {
        queries::create_faq(&self.pool, faq).await
    }

    async fn update_faq(&self, faq_id: i64, update: FaqUpdate) -> AppResult<Option<Faq>> {
        queries::update_faq(&self.pool, faq_id, update).await
    }

    async fn delete_faq(&self, faq_id: i64) -> AppResult<bool> {
        queries::delete_faq(&self.pool, faq_id).await
    }

    async fn list_documents(&self, page: Page) -> AppResult<Vec<Document>> {
        queries::list_documents(&self.pool, page).await
    }

    async fn list_active_documents(&self) -> AppResult<Vec<Document>> {
        queries::list_active_documents(&self.pool).await
    }

    async fn create_document(&self, document: DocumentCreate) -> AppResult<Document> {
        queries::create_document(&self.pool, document).await
    }

    async fn update_document(
        &self,
        document_id: i64,
        update: DocumentUpdate,
    ) -> AppResult<Option<Document>> {
        queries::update_document(&self.pool, document_id, update).await
    }

    async fn delete_document(&self, document_id: i64) -> AppResult<bool> {
        queries::delete_document(&self.pool, document_id).await
    }

    async fn create_chat_record(&self, record: NewChatRecord) -> AppResult<ChatRecord> {
        queries::create_chat_record(&self.pool, record).await
    }

    async fn list_chat_records(
        &self,
        session_id: Option<&str>,
        page: Page,
    ) -> AppResult<Vec<ChatRecord>> {
        queries::list_chat_records(&self.pool, session_id, page).await
    }
}

#[derive(Default)]
struct MemoryTables {
    users: Vec<User>,
    faqs: BTreeMap<i64, Faq>,
    documents: BTreeMap<i64, Document>,
    chat_history: Vec<ChatRecord>,
    next_user_id: i64,
    next_faq_id: i64,
    next_document_id: i64,
    next_record_id: i64,
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

fn window<T: Clone>(items: impl Iterator<Item = T>, page: Page) -> Vec<T> {
    items
        .skip(page.skip as usize)
        .take(page.limit as usize)
        .collect()
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<MemoryTables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.write().await;
        if tables
            .users
            .iter()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::Conflict(
                "Username or email is already registered".to_string(),
            ));
        }
        let user = User {
            id: next_id(&mut tables.next_user_id),
            username: user.username,
            email: user.email,
            hashed_password: user.hashed_password,
            is_active: true,
            is_admin: user.is_admin,
            created_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_user_by_username(&self, username: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_faqs(&self, page: Page) -> AppResult<Vec<Faq>> {
        let tables = self.tables.read().await;
        Ok(window(tables.faqs.values().cloned(), page))
    }

    async fn list_active_faqs(&self) -> AppResult<Vec<Faq>> {
        let tables = self.tables.read().await;
        Ok(tables.faqs.values().filter(|f| f.is_active).cloned().collect())
    }

    async fn create_faq(&self, faq: FaqCreate) -> AppResult<Faq> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let faq = Faq {
            id: next_id(&mut tables.next_faq_id),
            question: faq.question,
            answer: faq.answer,
            category: faq.category,
            tags: faq.tags,
            is_active: faq.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.faqs.insert(faq.id, faq.clone());
        Ok(faq)
    }

    async fn update_faq(&self, faq_id: i64, update: FaqUpdate) -> AppResult<Option<Faq>> {
        let mut tables = self.tables.write().await;
        Ok(tables.faqs.get_mut(&faq_id).map(|faq| {
            faq.apply(update);
            faq.updated_at = Utc::now();
            faq.clone()
        }))
    }

    async fn delete_faq(&self, faq_id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.faqs.remove(&faq_id).is_some())
    }

    async fn list_documents(&self, page: Page) -> AppResult<Vec<Document>> {
        let tables = self.tables.read().await;
        Ok(window(tables.documents.values().cloned(), page))
    }

    async fn list_active_documents(&self) -> AppResult<Vec<Document>> {
        let tables = self.tables.read().await;
        Ok(tables
            .documents
            .values()
            .filter(|d| d.is_active)
            .cloned()
            .collect())
    }

    async fn create_document(&self, document: DocumentCreate) -> AppResult<Document> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();
        let document = Document {
            id: next_id(&mut tables.next_document_id),
            title: document.title,
            content: document.content,
            category: document.category,
            file_path: None,
            file_type: None,
            is_active: document.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.documents.insert(document.id, document.clone());
        Ok(document)
    }

    async fn update_document(
        &self,
        document_id: i64,
        update: DocumentUpdate,
    ) -> AppResult<Option<Document>> {
        let mut tables = self.tables.write().await;
        Ok(tables.documents.get_mut(&document_id).map(|document| {
            document.apply(update);
            document.updated_at = Utc::now();
            document.clone()
        }))
    }

    async fn delete_document(&self, document_id: i64) -> AppResult<bool> {
        let mut tables = self.tables.write().await;
        Ok(tables.documents.remove(&document_id).is_some())
    }

    async fn create_chat_record(&self, record: NewChatRecord) -> AppResult<ChatRecord> {
        let mut tables = self.tables.write().await;
        let record = ChatRecord {
            id: next_id(&mut tables.next_record_id),
            session_id: record.session_id,
            user_message: record.user_message,
            bot_response: record.bot_response,
            context_used: record.context_used,
            created_at: Utc::now(),
        };
        tables.chat_history.push(record.clone());
        Ok(record)
    }

    async fn list_chat_records(
        &self,
        session_id: Option<&str>,
        page: Page,
    ) -> AppResult<Vec<ChatRecord>> {
        let tables = self.tables.read().await;
        // Records are appended in creation order, so reverse iteration is newest first.
        let matching = tables
            .chat_history
            .iter()
            .rev()
            .filter(|r| session_id.is_none_or(|s| r.session_id == s))
            .cloned();
        Ok(window(matching, page))
    }
}
