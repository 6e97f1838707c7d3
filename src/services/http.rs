use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::{LoginRequest, LoginResponse};
use crate::catalog::CatalogBook;
use crate::config::AdminConfig;
use crate::models::{BookId, BookSummaryEntry, DashboardSummary, PendingSubmission, UserSummary};
use crate::services::{AdminError, AdminService, CatalogService, ServiceResult};

/// `AdminService` over the platform's REST API.
#[derive(Clone, Debug)]
pub struct HttpAdminService {
    client: Client,
    base: String,
    token: Option<String>,
}

impl HttpAdminService {
    pub fn new(base: &str, token: Option<String>, timeout: Duration) -> ServiceResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AdminError::Config(format!("http client init failed: {e}")))?;
        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }

    pub fn from_config(config: &AdminConfig) -> ServiceResult<Self> {
        Self::new(&config.api_base, config.token.clone(), config.request_timeout)
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base, path.trim_start_matches('/'))
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    /// Sends the request and returns the raw body of a 2xx response.
    async fn send_checked(&self, path: &str, req: RequestBuilder) -> ServiceResult<String> {
        let resp = self.authorize(req).send().await.map_err(map_transport)?;
        let status = resp.status();
        let text = resp.text().await.map_err(map_transport)?;
        if !status.is_success() {
            warn!(path, status = status.as_u16(), "admin api returned an error status");
            return Err(AdminError::Status {
                status: status.as_u16(),
                body: text,
            });
        }
        debug!(path, bytes = text.len(), "admin api response");
        Ok(text)
    }

    async fn send<T: DeserializeOwned>(&self, path: &str, req: RequestBuilder) -> ServiceResult<T> {
        let text = self.send_checked(path, req).await?;
        decode_body(&text)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> ServiceResult<T> {
        let req = self.client.get(self.url(path));
        self.send(path, req).await
    }

    async fn post_json<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> ServiceResult<T> {
        let req = self.client.post(self.url(path)).json(body);
        self.send(path, req).await
    }

    async fn post_empty(&self, path: &str) -> ServiceResult<()> {
        // Success is the status alone; servers answer with JSON, text or nothing.
        let req = self.client.post(self.url(path));
        self.send_checked(path, req).await.map(|_| ())
    }

    pub async fn login(&self, user_name: &str, password: &str) -> ServiceResult<LoginResponse> {
        let payload = LoginRequest {
            user_name: user_name.to_string(),
            password: password.to_string(),
        };
        self.post_json("/auth/login", &payload).await
    }
}

fn decode_body<T: DeserializeOwned>(text: &str) -> ServiceResult<T> {
    if text.trim().is_empty() {
        // Empty bodies decode like JSON null.
        return serde_json::from_str("null").map_err(|e| AdminError::Decode(e.to_string()));
    }
    serde_json::from_str(text).map_err(|e| AdminError::Decode(format!("{e}, raw response: {text}")))
}

fn map_transport(err: reqwest::Error) -> AdminError {
    if err.is_timeout() {
        AdminError::Timeout
    } else {
        AdminError::Transport(err.to_string())
    }
}

#[async_trait]
impl AdminService for HttpAdminService {
    async fn get_dashboard_summary(&self) -> ServiceResult<Option<DashboardSummary>> {
        self.get_json("/admin/dashboard").await
    }

    async fn get_pending_submissions(&self) -> ServiceResult<Option<Vec<PendingSubmission>>> {
        self.get_json("/admin/pending-books").await
    }

    async fn get_readers(&self) -> ServiceResult<Option<Vec<UserSummary>>> {
        self.get_json("/admin/readers").await
    }

    async fn get_authors(&self) -> ServiceResult<Option<Vec<UserSummary>>> {
        self.get_json("/admin/authors").await
    }

    async fn get_books_summary(&self) -> ServiceResult<Option<Vec<BookSummaryEntry>>> {
        self.get_json("/admin/books-summary").await
    }

    async fn approve_submission(&self, id: BookId) -> ServiceResult<()> {
        self.post_empty(&format!("/admin/books/{id}/approve")).await
    }

    async fn reject_submission(&self, id: BookId) -> ServiceResult<()> {
        self.post_empty(&format!("/admin/books/{id}/reject")).await
    }
}

#[async_trait]
impl CatalogService for HttpAdminService {
    async fn books_with_files(&self) -> ServiceResult<Vec<CatalogBook>> {
        let books: Option<Vec<CatalogBook>> = self.get_json("/books/with-files").await?;
        Ok(books.unwrap_or_default())
    }

    async fn top_books(&self) -> ServiceResult<Vec<CatalogBook>> {
        let books: Option<Vec<CatalogBook>> = self.get_json("/books/top").await?;
        Ok(books.unwrap_or_default())
    }
}
