//! Administrative console client.
//!
//! [`AdminClient`] is the HTTP layer: it attaches the cached bearer token to
//! every request and drops the token when the server answers 401.
//! [`AdminConsole`] is the application state on top of it: the auth gate, one
//! [`ResourcePanel`] each for FAQs and documents, and the chat history panel.
//! Panels never patch their lists from mutation responses; every successful
//! mutation is followed by a full re-fetch.

use reqwest::RequestBuilder;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use super::storage::KeyValueStorage;
use super::{check, ClientConfig, ClientError, ClientResult};
use crate::db::models::{ChatRecord, Document, Faq, LoginRequest, TokenResponse, UserResponse};

pub const TOKEN_KEY: &str = "token";

/// An admin-managed collection exposed as list/create/update/delete.
pub trait Resource: DeserializeOwned + Clone + Send {
    type Form: Serialize + Default + Clone + Send + Sync;

    /// Collection path under the API root, e.g. `/api/admin/faqs`.
    const PATH: &'static str;
    const LABEL: &'static str;

    fn id(&self) -> i64;
    fn to_form(&self) -> Self::Form;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FaqForm {
    pub question: String,
    pub answer: String,
    pub category: String,
    pub is_active: bool,
}

impl Default for FaqForm {
    fn default() -> Self {
        Self {
            question: String::new(),
            answer: String::new(),
            category: String::new(),
            is_active: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentForm {
    pub title: String,
    pub content: String,
    pub category: String,
    pub is_active: bool,
}

impl Default for DocumentForm {
    fn default() -> Self {
        Self {
            title: String::new(),
            content: String::new(),
            category: String::new(),
            is_active: true,
        }
    }
}

impl Resource for Faq {
    type Form = FaqForm;
    const PATH: &'static str = "/api/admin/faqs";
    const LABEL: &'static str = "FAQ";

    fn id(&self) -> i64 {
        self.id
    }

    fn to_form(&self) -> FaqForm {
        FaqForm {
            question: self.question.clone(),
            answer: self.answer.clone(),
            category: self.category.clone().unwrap_or_default(),
            is_active: self.is_active,
        }
    }
}

impl Resource for Document {
    type Form = DocumentForm;
    const PATH: &'static str = "/api/admin/documents";
    const LABEL: &'static str = "document";

    fn id(&self) -> i64 {
        self.id
    }

    fn to_form(&self) -> DocumentForm {
        DocumentForm {
            title: self.title.clone(),
            content: self.content.clone(),
            category: self.category.clone().unwrap_or_default(),
            is_active: self.is_active,
        }
    }
}

pub struct AdminClient {
    http: reqwest::Client,
    config: ClientConfig,
    storage: Arc<dyn KeyValueStorage>,
}

impl AdminClient {
    pub fn new(config: ClientConfig, storage: Arc<dyn KeyValueStorage>) -> ClientResult<Self> {
        Ok(Self {
            http: config.http_client()?,
            config,
            storage,
        })
    }

    pub fn token(&self) -> Option<String> {
        self.storage.get(TOKEN_KEY)
    }

    async fn send(&self, builder: RequestBuilder) -> ClientResult<reqwest::Response> {
        let builder = match self.token() {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        };

        match check(builder.send().await?).await {
            Err(ClientError::Unauthorized) => {
                tracing::warn!("Token rejected by server, clearing it");
                self.storage.remove(TOKEN_KEY)?;
                Err(ClientError::Unauthorized)
            }
            other => other,
        }
    }

    pub async fn login(&self, username: &str, password: &str) -> ClientResult<()> {
        let response = self
            .http
            .post(self.config.url("/api/auth/login"))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await?;
        let token: TokenResponse = check(response).await?.json().await?;

        self.storage.set(TOKEN_KEY, &token.access_token)
    }

    pub fn logout(&self) -> ClientResult<()> {
        self.storage.remove(TOKEN_KEY)
    }

    pub async fn me(&self) -> ClientResult<UserResponse> {
        let response = self.send(self.http.get(self.config.url("/api/auth/me"))).await?;
        Ok(response.json().await?)
    }

    pub async fn list<R: Resource>(&self) -> ClientResult<Vec<R>> {
        let response = self.send(self.http.get(self.config.url(R::PATH))).await?;
        Ok(response.json().await?)
    }

    pub async fn create<R: Resource>(&self, form: &R::Form) -> ClientResult<()> {
        self.send(self.http.post(self.config.url(R::PATH)).json(form))
            .await?;
        Ok(())
    }

    pub async fn update<R: Resource>(&self, id: i64, form: &R::Form) -> ClientResult<()> {
        let url = self.config.url(&format!("{}/{}", R::PATH, id));
        self.send(self.http.put(url).json(form)).await?;
        Ok(())
    }

    pub async fn delete<R: Resource>(&self, id: i64) -> ClientResult<()> {
        let url = self.config.url(&format!("{}/{}", R::PATH, id));
        self.send(self.http.delete(url)).await?;
        Ok(())
    }

    pub async fn list_chat_history(&self, session_id: Option<&str>) -> ClientResult<Vec<ChatRecord>> {
        let mut request = self.http.get(self.config.url("/api/admin/chat-history"));
        if let Some(session_id) = session_id {
            request = request.query(&[("session_id", session_id)]);
        }
        let response = self.send(request).await?;
        Ok(response.json().await?)
    }
}

/// List + form state for one resource collection.
pub struct ResourcePanel<R: Resource> {
    pub items: Vec<R>,
    pub form: R::Form,
    pub editing: Option<i64>,
    pub busy: bool,
}

impl<R: Resource> Default for ResourcePanel<R> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            form: R::Form::default(),
            editing: None,
            busy: false,
        }
    }
}

impl<R: Resource> ResourcePanel<R> {
    pub async fn refresh(&mut self, client: &AdminClient) -> ClientResult<()> {
        match client.list::<R>().await {
            Ok(items) => {
                self.items = items;
                Ok(())
            }
            Err(e) => {
                tracing::error!("❌ Failed to fetch {} list: {}", R::LABEL, e);
                Err(e)
            }
        }
    }

    /// Loads `item` into the form; the next submit updates it.
    pub fn edit(&mut self, item: &R) {
        self.form = item.to_form();
        self.editing = Some(item.id());
    }

    pub fn reset(&mut self) {
        self.form = R::Form::default();
        self.editing = None;
    }

    /// PUT when editing, POST otherwise, then re-fetch. Ignored while busy.
    pub async fn submit(&mut self, client: &AdminClient) -> ClientResult<()> {
        if self.busy {
            return Ok(());
        }
        self.busy = true;

        let result = match self.editing {
            Some(id) => client.update::<R>(id, &self.form).await,
            None => client.create::<R>(&self.form).await,
        };

        let result = match result {
            Ok(()) => {
                self.reset();
                self.refresh(client).await
            }
            Err(e) => {
                tracing::error!("❌ Failed to save {}: {}", R::LABEL, e);
                Err(e)
            }
        };

        self.busy = false;
        result
    }

    pub async fn delete(&mut self, client: &AdminClient, id: i64) -> ClientResult<()> {
        if let Err(e) = client.delete::<R>(id).await {
            tracing::error!("❌ Failed to delete {} {}: {}", R::LABEL, id, e);
            return Err(e);
        }
        if self.editing == Some(id) {
            self.reset();
        }
        self.refresh(client).await
    }
}

#[derive(Default)]
pub struct HistoryPanel {
    pub records: Vec<ChatRecord>,
    pub session_filter: Option<String>,
}

impl HistoryPanel {
    pub async fn refresh(&mut self, client: &AdminClient) -> ClientResult<()> {
        match client.list_chat_history(self.session_filter.as_deref()).await {
            Ok(records) => {
                self.records = records;
                Ok(())
            }
            Err(e) => {
                tracing::error!("❌ Failed to fetch chat history: {}", e);
                Err(e)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
    Faqs,
    Documents,
    ChatHistory,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Login,
    Dashboard,
    Faqs,
    Documents,
    ChatHistory,
}

pub struct AdminConsole {
    client: AdminClient,
    authenticated: bool,
    pub faqs: ResourcePanel<Faq>,
    pub documents: ResourcePanel<Document>,
    pub history: HistoryPanel,
}

impl AdminConsole {
    pub fn new(client: AdminClient) -> Self {
        Self {
            client,
            authenticated: false,
            faqs: ResourcePanel::default(),
            documents: ResourcePanel::default(),
            history: HistoryPanel::default(),
        }
    }

    pub fn client(&self) -> &AdminClient {
        &self.client
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Startup auth gate: a cached token counts only once `/api/auth/me` accepts it.
    pub async fn load(&mut self) -> bool {
        self.authenticated = match self.client.token() {
            None => false,
            Some(_) => match self.client.me().await {
                Ok(user) => {
                    tracing::info!("✅ Authenticated as {}", user.username);
                    true
                }
                Err(e) => {
                    tracing::warn!("Stored token is not valid: {}", e);
                    if let Err(e) = self.client.logout() {
                        tracing::error!("❌ Failed to clear token: {}", e);
                    }
                    false
                }
            },
        };
        self.authenticated
    }

    pub async fn login(&mut self, username: &str, password: &str) -> ClientResult<()> {
        self.client.login(username, password).await?;
        self.authenticated = true;
        Ok(())
    }

    pub fn logout(&mut self) -> ClientResult<()> {
        self.authenticated = false;
        self.client.logout()
    }

    /// Every route resolves to the login view until authenticated.
    pub fn view(&self, route: Route) -> View {
        if !self.authenticated {
            return View::Login;
        }
        match route {
            Route::Login | Route::Dashboard => View::Dashboard,
            Route::Faqs => View::Faqs,
            Route::Documents => View::Documents,
            Route::ChatHistory => View::ChatHistory,
        }
    }

    fn observe<T>(&mut self, result: ClientResult<T>) -> ClientResult<T> {
        if matches!(result, Err(ClientError::Unauthorized)) {
            self.authenticated = false;
        }
        result
    }

    /// Resolves the view for `route` and loads its data.
    pub async fn open(&mut self, route: Route) -> ClientResult<View> {
        let view = self.view(route);
        let result = match view {
            View::Faqs => self.faqs.refresh(&self.client).await,
            View::Documents => self.documents.refresh(&self.client).await,
            View::ChatHistory => self.history.refresh(&self.client).await,
            View::Login | View::Dashboard => Ok(()),
        };
        self.observe(result)?;
        Ok(self.view(route))
    }

    pub async fn submit_faq(&mut self) -> ClientResult<()> {
        let result = self.faqs.submit(&self.client).await;
        self.observe(result)
    }

    pub async fn delete_faq(&mut self, id: i64) -> ClientResult<()> {
        let result = self.faqs.delete(&self.client, id).await;
        self.observe(result)
    }

    pub async fn submit_document(&mut self) -> ClientResult<()> {
        let result = self.documents.submit(&self.client).await;
        self.observe(result)
    }

    pub async fn delete_document(&mut self, id: i64) -> ClientResult<()> {
        let result = self.documents.delete(&self.client, id).await;
        self.observe(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::storage::MemoryStorage;

    fn console() -> AdminConsole {
        let client = AdminClient::new(ClientConfig::default(), Arc::new(MemoryStorage::new())).unwrap();
        AdminConsole::new(client)
    }

    #[test]
    fn unauthenticated_console_only_shows_login() {
        let console = console();
        for route in [
            Route::Login,
            Route::Dashboard,
            Route::Faqs,
            Route::Documents,
            Route::ChatHistory,
        ] {
            assert_eq!(console.view(route), View::Login);
        }
    }

    #[test]
    fn new_faq_form_defaults_to_active() {
        let form = FaqForm::default();
        assert!(form.is_active);
        assert!(form.category.is_empty());
    }
}
