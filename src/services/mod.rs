use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::catalog::{BookFile, CatalogAuthor, CatalogBook};
use crate::models::{
    BookCounts, BookId, BookSummaryEntry, DashboardSummary, PendingSubmission, UserCounts,
    UserSummary,
};
use crate::store::{apply_decision, Decision};

pub mod http;

pub use http::HttpAdminService;

pub type ServiceResult<T> = Result<T, AdminError>;

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("decode error: {0}")]
    Decode(String),
    #[error("request timed out")]
    Timeout,
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("internal error: {0}")]
    Internal(String),
}

/// Remote operations the dashboard depends on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Endpoint {
    DashboardSummary,
    PendingSubmissions,
    Readers,
    Authors,
    BooksSummary,
    Approve,
    Reject,
    Catalog,
    TopBooks,
}

impl Endpoint {
    /// The five fetches issued by a dashboard load, in display order.
    pub const LOAD: [Endpoint; 5] = [
        Endpoint::DashboardSummary,
        Endpoint::PendingSubmissions,
        Endpoint::Readers,
        Endpoint::Authors,
        Endpoint::BooksSummary,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::DashboardSummary => "dashboard_summary",
            Endpoint::PendingSubmissions => "pending_submissions",
            Endpoint::Readers => "readers",
            Endpoint::Authors => "authors",
            Endpoint::BooksSummary => "books_summary",
            Endpoint::Approve => "approve",
            Endpoint::Reject => "reject",
            Endpoint::Catalog => "catalog",
            Endpoint::TopBooks => "top_books",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait AdminService: Send + Sync {
    async fn get_dashboard_summary(&self) -> ServiceResult<Option<DashboardSummary>>;
    async fn get_pending_submissions(&self) -> ServiceResult<Option<Vec<PendingSubmission>>>;
    async fn get_readers(&self) -> ServiceResult<Option<Vec<UserSummary>>>;
    async fn get_authors(&self) -> ServiceResult<Option<Vec<UserSummary>>>;
    async fn get_books_summary(&self) -> ServiceResult<Option<Vec<BookSummaryEntry>>>;
    async fn approve_submission(&self, id: BookId) -> ServiceResult<()>;
    async fn reject_submission(&self, id: BookId) -> ServiceResult<()>;
}

#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn books_with_files(&self) -> ServiceResult<Vec<CatalogBook>>;
    async fn top_books(&self) -> ServiceResult<Vec<CatalogBook>>;
}

#[async_trait]
impl<T: AdminService + ?Sized> AdminService for Arc<T> {
    async fn get_dashboard_summary(&self) -> ServiceResult<Option<DashboardSummary>> {
        (**self).get_dashboard_summary().await
    }

    async fn get_pending_submissions(&self) -> ServiceResult<Option<Vec<PendingSubmission>>> {
        (**self).get_pending_submissions().await
    }

    async fn get_readers(&self) -> ServiceResult<Option<Vec<UserSummary>>> {
        (**self).get_readers().await
    }

    async fn get_authors(&self) -> ServiceResult<Option<Vec<UserSummary>>> {
        (**self).get_authors().await
    }

    async fn get_books_summary(&self) -> ServiceResult<Option<Vec<BookSummaryEntry>>> {
        (**self).get_books_summary().await
    }

    async fn approve_submission(&self, id: BookId) -> ServiceResult<()> {
        (**self).approve_submission(id).await
    }

    async fn reject_submission(&self, id: BookId) -> ServiceResult<()> {
        (**self).reject_submission(id).await
    }
}

#[derive(Default)]
struct InMemoryState {
    summary: Option<DashboardSummary>,
    pending: Vec<PendingSubmission>,
    readers: Vec<UserSummary>,
    authors: Vec<UserSummary>,
    books_summary: Vec<BookSummaryEntry>,
    catalog: Vec<CatalogBook>,
    top_books: Vec<CatalogBook>,
    failing: HashSet<Endpoint>,
    latency: HashMap<Endpoint, Duration>,
    calls: HashMap<Endpoint, usize>,
}

/// Process-local admin API for tests.
///
/// Approve/reject mutate the stored counts the way the real server does, so a
/// reload after a moderation action reflects it.
#[derive(Clone, Default)]
pub struct InMemoryService {
    state: Arc<Mutex<InMemoryState>>,
}

impl InMemoryService {
    pub fn new_with_sample() -> Self {
        let service = Self::default();
        {
            let mut state = service.lock();
            state.summary = Some(DashboardSummary {
                books: Some(BookCounts {
                    total: Some(10),
                    approved: Some(6),
                    pending: Some(3),
                    rejected: Some(1),
                }),
                users: Some(UserCounts {
                    authors: Some(2),
                    readers: Some(3),
                    subscribed_readers: Some(1),
                }),
            });
            state.pending = vec![
                sample_submission(1, "The Salt Road", "Mira Okafor", Some("Fiction")),
                sample_submission(2, "Quiet Engines", "Tomas Reyes", Some("Science")),
                sample_submission(3, "Letters to Nobody", "Ilse Brandt", None),
            ];
            state.readers = vec![
                UserSummary {
                    id: Some(11),
                    first_name: Some("Ana".into()),
                    last_name: Some("Silva".into()),
                    email: Some("ana@example.com".into()),
                    is_active: Some(true),
                    ..Default::default()
                },
                UserSummary {
                    id: Some(12),
                    name: Some("Karl".into()),
                    email: Some("karl@example.com".into()),
                    status: Some("active".into()),
                    ..Default::default()
                },
                UserSummary {
                    id: Some(13),
                    name: Some("Lea".into()),
                    is_active: Some(false),
                    ..Default::default()
                },
            ];
            state.authors = vec![
                UserSummary {
                    id: Some(21),
                    name: Some("Mira Okafor".into()),
                    email: Some("mira@example.com".into()),
                    status: Some("active".into()),
                    ..Default::default()
                },
                UserSummary {
                    id: Some(22),
                    name: Some("Tomas Reyes".into()),
                    email: Some("tomas@example.com".into()),
                    ..Default::default()
                },
            ];
            state.books_summary = vec![
                BookSummaryEntry {
                    id: Some(100),
                    title: Some("Harbor Lights".into()),
                    description: Some("A coastal mystery".into()),
                    status: Some("approved".into()),
                    ..Default::default()
                },
                BookSummaryEntry {
                    id: Some(101),
                    title: Some("Field Notes".into()),
                    is_active: Some(true),
                    ..Default::default()
                },
            ];
            state.catalog = vec![
                CatalogBook {
                    id: 100,
                    title: "Harbor Lights".into(),
                    author: Some(CatalogAuthor {
                        name: Some("Mira Okafor".into()),
                    }),
                    upload_date: crate::models::parse_timestamp("2024-05-02"),
                    is_free: Some(true),
                    price: Some(0.0),
                    book_files: vec![BookFile {
                        audio_path: Some("/audio/100.mp3".into()),
                        ..Default::default()
                    }],
                    ..Default::default()
                },
                CatalogBook {
                    id: 101,
                    title: "Field Notes".into(),
                    author: Some(CatalogAuthor {
                        name: Some("Tomas Reyes".into()),
                    }),
                    created_at: crate::models::parse_timestamp("2024-06-10"),
                    price: Some(4.99),
                    ..Default::default()
                },
            ];
            state.top_books = vec![state.catalog[1].clone()];
        }
        service
    }

    fn lock(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn set_summary(&self, summary: Option<DashboardSummary>) {
        self.lock().summary = summary;
    }

    pub fn set_pending(&self, pending: Vec<PendingSubmission>) {
        self.lock().pending = pending;
    }

    pub fn set_readers(&self, readers: Vec<UserSummary>) {
        self.lock().readers = readers;
    }

    pub fn set_catalog(&self, catalog: Vec<CatalogBook>, top: Vec<CatalogBook>) {
        let mut state = self.lock();
        state.catalog = catalog;
        state.top_books = top;
    }

    /// Make every call to `endpoint` fail until `restore` is called.
    pub fn fail(&self, endpoint: Endpoint) {
        self.lock().failing.insert(endpoint);
    }

    pub fn restore(&self, endpoint: Endpoint) {
        self.lock().failing.remove(&endpoint);
    }

    pub fn set_latency(&self, endpoint: Endpoint, delay: Duration) {
        self.lock().latency.insert(endpoint, delay);
    }

    pub fn calls(&self, endpoint: Endpoint) -> usize {
        self.lock().calls.get(&endpoint).copied().unwrap_or(0)
    }

    async fn enter(&self, endpoint: Endpoint) -> ServiceResult<()> {
        let delay = {
            let mut state = self.lock();
            *state.calls.entry(endpoint).or_insert(0) += 1;
            state.latency.get(&endpoint).copied()
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        debug!(endpoint = %endpoint, "in-memory admin call");
        if self.lock().failing.contains(&endpoint) {
            return Err(AdminError::Status {
                status: 503,
                body: format!("{endpoint} unavailable"),
            });
        }
        Ok(())
    }

    fn decide(&self, id: BookId, decision: Decision) -> ServiceResult<()> {
        let mut state = self.lock();
        let before = state.pending.len();
        state.pending.retain(|submission| submission.id != id);
        if state.pending.len() == before {
            return Err(AdminError::Status {
                status: 404,
                body: format!("book {id} is not pending"),
            });
        }
        if let Some(books) = state.summary.as_mut().and_then(|s| s.books.as_mut()) {
            apply_decision(books, decision);
        }
        Ok(())
    }
}

fn sample_submission(
    id: BookId,
    title: &str,
    author: &str,
    category: Option<&str>,
) -> PendingSubmission {
    PendingSubmission {
        id,
        title: title.into(),
        author: author.into(),
        description: Some(format!("{title}, submitted for review")),
        category: category.map(str::to_string),
        submitted_date: crate::models::parse_timestamp("2024-06-01T09:30:00Z"),
    }
}

#[async_trait]
impl AdminService for InMemoryService {
    async fn get_dashboard_summary(&self) -> ServiceResult<Option<DashboardSummary>> {
        self.enter(Endpoint::DashboardSummary).await?;
        Ok(self.lock().summary.clone())
    }

    async fn get_pending_submissions(&self) -> ServiceResult<Option<Vec<PendingSubmission>>> {
        self.enter(Endpoint::PendingSubmissions).await?;
        Ok(Some(self.lock().pending.clone()))
    }

    async fn get_readers(&self) -> ServiceResult<Option<Vec<UserSummary>>> {
        self.enter(Endpoint::Readers).await?;
        Ok(Some(self.lock().readers.clone()))
    }

    async fn get_authors(&self) -> ServiceResult<Option<Vec<UserSummary>>> {
        self.enter(Endpoint::Authors).await?;
        Ok(Some(self.lock().authors.clone()))
    }

    async fn get_books_summary(&self) -> ServiceResult<Option<Vec<BookSummaryEntry>>> {
        self.enter(Endpoint::BooksSummary).await?;
        Ok(Some(self.lock().books_summary.clone()))
    }

    async fn approve_submission(&self, id: BookId) -> ServiceResult<()> {
        self.enter(Endpoint::Approve).await?;
        self.decide(id, Decision::Approve)
    }

    async fn reject_submission(&self, id: BookId) -> ServiceResult<()> {
        self.enter(Endpoint::Reject).await?;
        self.decide(id, Decision::Reject)
    }
}

#[async_trait]
impl CatalogService for InMemoryService {
    async fn books_with_files(&self) -> ServiceResult<Vec<CatalogBook>> {
        self.enter(Endpoint::Catalog).await?;
        Ok(self.lock().catalog.clone())
    }

    async fn top_books(&self) -> ServiceResult<Vec<CatalogBook>> {
        self.enter(Endpoint::TopBooks).await?;
        Ok(self.lock().top_books.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sample_service_serves_every_slice() {
        let service = InMemoryService::new_with_sample();
        let summary = service.get_dashboard_summary().await.unwrap().unwrap();
        assert_eq!(summary.books.unwrap().pending, Some(3));
        assert_eq!(service.get_pending_submissions().await.unwrap().unwrap().len(), 3);
        assert_eq!(service.get_readers().await.unwrap().unwrap().len(), 3);
        assert_eq!(service.get_authors().await.unwrap().unwrap().len(), 2);
        assert_eq!(service.get_books_summary().await.unwrap().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn injected_failures_are_per_endpoint() {
        let service = InMemoryService::new_with_sample();
        service.fail(Endpoint::Readers);
        assert!(service.get_readers().await.is_err());
        assert!(service.get_authors().await.is_ok());
        service.restore(Endpoint::Readers);
        assert!(service.get_readers().await.is_ok());
        assert_eq!(service.calls(Endpoint::Readers), 2);
    }

    #[tokio::test]
    async fn server_side_decision_updates_counts() {
        let service = InMemoryService::new_with_sample();
        service.reject_submission(3).await.unwrap();
        let books = service
            .get_dashboard_summary()
            .await
            .unwrap()
            .unwrap()
            .books
            .unwrap();
        assert_eq!(books.pending, Some(2));
        assert_eq!(books.rejected, Some(2));
        assert!(service.approve_submission(3).await.is_err());
    }
}
