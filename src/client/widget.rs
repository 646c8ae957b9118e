use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use super::storage::KeyValueStorage;
use super::{check, ClientConfig, ClientResult};
use crate::db::models::{ChatRequest, ChatResponse};

pub const SESSION_KEY: &str = "comman_chat_session_id";

pub const GREETING: &str = "Hello! This is the Comman Inc. chatbot. Feel free to ask about \
    generative AI training, website production, system development and more.";

pub const FALLBACK_MESSAGE: &str =
    "Sorry, something went wrong. Please try again in a little while.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: String,
    pub text: String,
    pub sender: Sender,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn new(prefix: &str, text: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: format!("{}_{}", prefix, Uuid::new_v4()),
            text: text.into(),
            sender,
            timestamp: Utc::now(),
        }
    }
}

/// The embeddable chat widget: a transcript plus the cached session id.
pub struct ChatWidget {
    http: reqwest::Client,
    config: ClientConfig,
    storage: Arc<dyn KeyValueStorage>,
    messages: Vec<Message>,
    busy: bool,
    open: bool,
}

impl ChatWidget {
    /// `config.api_url` is the host page's `data-api-url`, or the default.
    pub fn new(config: ClientConfig, storage: Arc<dyn KeyValueStorage>) -> ClientResult<Self> {
        Ok(Self {
            http: config.http_client()?,
            config,
            storage,
            messages: vec![Message::new("greeting", GREETING, Sender::Bot)],
            busy: false,
            open: false,
        })
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn session_id(&self) -> Option<String> {
        self.storage.get(SESSION_KEY)
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn toggle(&mut self) {
        self.open = !self.open;
    }

    async fn request_reply(&self, text: &str) -> ClientResult<ChatResponse> {
        let request = ChatRequest {
            message: text.to_string(),
            session_id: self.session_id(),
        };

        let response = self
            .http
            .post(self.config.url("/api/chat"))
            .json(&request)
            .send()
            .await?;

        Ok(check(response).await?.json().await?)
    }

    /// Sends one turn. Returns `false` when the input was blank or a reply
    /// was still pending; failures become a single fallback bot message.
    pub async fn send(&mut self, text: &str) -> bool {
        if text.trim().is_empty() || self.busy {
            return false;
        }

        self.messages.push(Message::new("user", text, Sender::User));
        self.busy = true;

        match self.request_reply(text).await {
            Ok(reply) => {
                self.messages.push(Message::new("bot", reply.response, Sender::Bot));
                if let Err(e) = self.storage.set(SESSION_KEY, &reply.session_id) {
                    tracing::error!("❌ Failed to store session id: {}", e);
                }
            }
            Err(e) => {
                tracing::error!("❌ Chat error: {}", e);
                self.messages.push(Message::new("error", FALLBACK_MESSAGE, Sender::Bot));
            }
        }

        self.busy = false;
        true
    }
}
