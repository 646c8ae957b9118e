use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::errors::{AppError, AppResult};

pub const DEFAULT_PAGE_LIMIT: i64 = 100;
pub const MAX_PAGE_LIMIT: i64 = 500;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Faq {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Document {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub category: Option<String>,
    pub file_path: Option<String>,
    pub file_type: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct ChatRecord {
    pub id: i64,
    pub session_id: String,
    pub user_message: String,
    pub bot_response: String,
    pub context_used: Option<serde_json::Value>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

// Request DTOs

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FaqCreate {
    pub question: String,
    pub answer: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaqUpdate {
    pub question: Option<String>,
    pub answer: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentCreate {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentUpdate {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub is_active: Option<bool>,
}

/// A new chat record as produced by the chat endpoint.
#[derive(Debug, Clone)]
pub struct NewChatRecord {
    pub session_id: String,
    pub user_message: String,
    pub bot_response: String,
    pub context_used: Option<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub hashed_password: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub username: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryParams {
    pub skip: Option<i64>,
    pub limit: Option<i64>,
    pub session_id: Option<String>,
}

/// Offset/limit window applied to list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub skip: i64,
    pub limit: i64,
}

impl Page {
    pub fn new(skip: Option<i64>, limit: Option<i64>) -> Self {
        Self {
            skip: skip.unwrap_or(0).max(0),
            limit: limit.unwrap_or(DEFAULT_PAGE_LIMIT).clamp(1, MAX_PAGE_LIMIT),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(None, None)
    }
}

impl From<&ListParams> for Page {
    fn from(params: &ListParams) -> Self {
        Page::new(params.skip, params.limit)
    }
}

// Response DTOs

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeMetadata {
    pub source: String,
    pub category: Option<String>,
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextUsed {
    pub document: String,
    pub metadata: KnowledgeMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    #[serde(default)]
    pub context_used: Option<Vec<ContextUsed>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserResponse {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub is_active: bool,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            username: user.username,
            email: user.email,
            is_active: user.is_active,
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

// Boundary validation

/// Blank categories are stored as `None`; the admin form always sends a string.
pub fn normalize_category(category: Option<String>) -> Option<String> {
    category
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
}

fn require(field: &str, value: &str) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{} must not be empty", field)));
    }
    Ok(())
}

fn require_if_set(field: &str, value: &Option<String>) -> AppResult<()> {
    match value {
        Some(v) => require(field, v),
        None => Ok(()),
    }
}

impl FaqCreate {
    pub fn validated(mut self) -> AppResult<Self> {
        require("question", &self.question)?;
        require("answer", &self.answer)?;
        self.category = normalize_category(self.category);
        Ok(self)
    }
}

impl FaqUpdate {
    pub fn validated(self) -> AppResult<Self> {
        require_if_set("question", &self.question)?;
        require_if_set("answer", &self.answer)?;
        Ok(self)
    }
}

impl DocumentCreate {
    pub fn validated(mut self) -> AppResult<Self> {
        require("title", &self.title)?;
        require("content", &self.content)?;
        self.category = normalize_category(self.category);
        Ok(self)
    }
}

impl DocumentUpdate {
    pub fn validated(self) -> AppResult<Self> {
        require_if_set("title", &self.title)?;
        require_if_set("content", &self.content)?;
        Ok(self)
    }
}

impl Faq {
    /// Applies the fields present in `update`; absent fields are left untouched.
    pub fn apply(&mut self, update: FaqUpdate) {
        if let Some(question) = update.question {
            self.question = question;
        }
        if let Some(answer) = update.answer {
            self.answer = answer;
        }
        if update.category.is_some() {
            self.category = normalize_category(update.category);
        }
        if update.tags.is_some() {
            self.tags = update.tags;
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
    }
}

impl Document {
    pub fn apply(&mut self, update: DocumentUpdate) {
        if let Some(title) = update.title {
            self.title = title;
        }
        if let Some(content) = update.content {
            self.content = content;
        }
        if update.category.is_some() {
            self.category = normalize_category(update.category);
        }
        if let Some(is_active) = update.is_active {
            self.is_active = is_active;
        }
    }
}
