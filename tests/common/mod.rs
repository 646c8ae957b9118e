//! # Common Test Utilities
//!
//! `TestApp` spawns the real router on a random port, backed by a
//! `MemoryStore` and a scripted response generator, with one administrator
//! already registered.

// Not every test file uses every helper.
#![allow(unused)]

use anyhow::Result;
use async_trait::async_trait;
use axum::serve;
use comman_chatbot::{
    create_router,
    db::store::{MemoryStore, Store},
    errors::{AppError, AppResult},
    services::{
        auth::ensure_admin,
        gemini::{Prompt, ResponseGenerator},
    },
    utils::config::{AdminSeed, AppState, Config},
};
use reqwest::Client;
use serde_json::Value;
use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, task::JoinHandle};

pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "comman2024";
pub const SECRET_KEY: &str = "test-secret-key";

/// Replies with a fixed text (or fails) and records every prompt it receives.
#[derive(Default)]
pub struct ScriptedGenerator {
    reply: Mutex<Option<String>>,
    prompts: Mutex<Vec<Prompt>>,
}

impl ScriptedGenerator {
    pub fn replying(text: &str) -> Self {
        let generator = Self::default();
        generator.set_reply(Some(text));
        generator
    }

    /// `None` makes every call fail.
    pub fn set_reply(&self, text: Option<&str>) {
        *self.reply.lock().unwrap() = text.map(str::to_string);
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ResponseGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &Prompt) -> AppResult<String> {
        self.prompts.lock().unwrap().push(prompt.clone());
        self.reply
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| AppError::Generation("scripted failure".to_string()))
    }
}

pub struct TestApp {
    pub address: String,
    pub client: Client,
    pub store: Arc<MemoryStore>,
    pub generator: Arc<ScriptedGenerator>,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestApp {
    pub async fn spawn() -> Result<Self> {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .compact()
            .try_init();

        let store = Arc::new(MemoryStore::new());
        let generator = Arc::new(ScriptedGenerator::replying("Hello from the bot"));

        ensure_admin(
            store.as_ref(),
            &AdminSeed {
                username: ADMIN_USERNAME.to_string(),
                email: "admin@comman.example".to_string(),
                password: ADMIN_PASSWORD.to_string(),
            },
        )
        .await?;

        let app_state = AppState::new(
            store.clone(),
            generator.clone(),
            Config::for_secret(SECRET_KEY),
        );

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let addr: SocketAddr = listener.local_addr()?;
        let address = format!("http://{addr}");

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
        let server_handle = tokio::spawn(async move {
            let app = create_router(app_state);
            let server = serve(listener, app).with_graceful_shutdown(async {
                shutdown_rx.await.ok();
            });
            if let Err(e) = server.await {
                tracing::error!("[TestApp] Server error: {}", e);
            }
        });

        Ok(Self {
            address,
            client: Client::new(),
            store,
            generator,
            _server_handle: server_handle,
            shutdown_tx: Some(shutdown_tx),
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let body: Value = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&serde_json::json!({ "username": username, "password": password }))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(body["access_token"].as_str().unwrap_or_default().to_string())
    }

    pub async fn admin_token(&self) -> Result<String> {
        self.login(ADMIN_USERNAME, ADMIN_PASSWORD).await
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
