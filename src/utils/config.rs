use anyhow::{Context, Result};
use std::{env, sync::Arc};

use crate::db::store::Store;
use crate::services::gemini::ResponseGenerator;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Seed credentials for the first administrator.
#[derive(Debug, Clone)]
pub struct AdminSeed {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Server settings, read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub secret_key: String,
    pub access_token_expire_minutes: i64,
    pub allowed_origins: Vec<String>,
    pub host: String,
    pub port: u16,
    pub gemini_api_key: Option<String>,
    pub admin_seed: Option<AdminSeed>,
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let secret_key = non_empty_var("SECRET_KEY").context("SECRET_KEY must be set in .env")?;

        let access_token_expire_minutes = match non_empty_var("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid ACCESS_TOKEN_EXPIRE_MINUTES: {}", raw))?,
            None => 30,
        };

        let port = match non_empty_var("PORT") {
            Some(raw) => raw
                .parse()
                .with_context(|| format!("Invalid PORT: {}", raw))?,
            None => 8000,
        };

        let admin_seed = match (
            non_empty_var("ADMIN_USERNAME"),
            non_empty_var("ADMIN_PASSWORD"),
        ) {
            (Some(username), Some(password)) => Some(AdminSeed {
                email: non_empty_var("ADMIN_EMAIL")
                    .unwrap_or_else(|| format!("{}@localhost", username)),
                username,
                password,
            }),
            _ => None,
        };

        Ok(Self {
            database_url: non_empty_var("DATABASE_URL"),
            secret_key,
            access_token_expire_minutes,
            allowed_origins: parse_origins(
                &env::var("ALLOWED_ORIGINS").unwrap_or("http://localhost:3000".to_string()),
            ),
            host: env::var("HOST").unwrap_or("0.0.0.0".to_string()),
            port,
            gemini_api_key: non_empty_var("GEMINI_API_KEY"),
            admin_seed,
        })
    }

    /// Settings for tests and embedded use: in-memory storage, no origins.
    pub fn for_secret(secret_key: impl Into<String>) -> Self {
        Self {
            database_url: None,
            secret_key: secret_key.into(),
            access_token_expire_minutes: 30,
            allowed_origins: Vec::new(),
            host: "127.0.0.1".to_string(),
            port: 0,
            gemini_api_key: None,
            admin_seed: None,
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub generator: Arc<dyn ResponseGenerator>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        generator: Arc<dyn ResponseGenerator>,
        config: Config,
    ) -> Self {
        Self {
            store,
            generator,
            config: Arc::new(config),
        }
    }
}
