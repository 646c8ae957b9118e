//! Typed clients for the chatbot API.
//!
//! `admin` models the administrative console (auth gate, CRUD panels, chat
//! history) and `widget` the embeddable chat widget. Both persist their single
//! piece of local state through an injected [`storage::KeyValueStorage`].

use reqwest::{Response, StatusCode};
use serde::Deserialize;
use std::{env, time::Duration};
use thiserror::Error;

pub mod admin;
pub mod storage;
pub mod widget;

use crate::utils::config::DEFAULT_API_URL;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Server returned {status}: {detail}")]
    Status { status: StatusCode, detail: String },

    #[error("Storage error: {0}")]
    Storage(String),
}

pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_url: String,
    pub timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Admin console settings: base URL from `API_URL`, else the local default.
    pub fn from_env() -> Self {
        Self::new(env::var("API_URL").unwrap_or(DEFAULT_API_URL.to_string()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub(crate) fn http_client(&self) -> ClientResult<reqwest::Client> {
        Ok(reqwest::Client::builder().timeout(self.timeout).build()?)
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.api_url, path)
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Turns a non-2xx response into a `ClientError`; 401 maps to `Unauthorized`.
pub(crate) async fn check(response: Response) -> ClientResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED {
        return Err(ClientError::Unauthorized);
    }

    let body = response.text().await.unwrap_or_default();
    let detail = match serde_json::from_str::<ErrorBody>(&body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(s),
        }) => s,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body,
    };

    Err(ClientError::Status { status, detail })
}
