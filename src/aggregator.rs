use std::future::Future;
use std::time::Duration;

use tracing::{info, warn};

use crate::models::{BookSummaryEntry, DashboardSummary, PendingSubmission, UserSummary};
use crate::services::{AdminError, AdminService, Endpoint, ServiceResult};

/// Settled outcome of every dashboard fetch, one slot per endpoint.
#[derive(Debug)]
pub struct LoadResults {
    pub summary: ServiceResult<Option<DashboardSummary>>,
    pub pending: ServiceResult<Vec<PendingSubmission>>,
    pub readers: ServiceResult<Vec<UserSummary>>,
    pub authors: ServiceResult<Vec<UserSummary>>,
    pub books_summary: ServiceResult<Vec<BookSummaryEntry>>,
}

impl LoadResults {
    pub fn failures(&self) -> Vec<(Endpoint, &AdminError)> {
        let slots = [
            (Endpoint::DashboardSummary, self.summary.as_ref().err()),
            (Endpoint::PendingSubmissions, self.pending.as_ref().err()),
            (Endpoint::Readers, self.readers.as_ref().err()),
            (Endpoint::Authors, self.authors.as_ref().err()),
            (Endpoint::BooksSummary, self.books_summary.as_ref().err()),
        ];
        slots
            .into_iter()
            .filter_map(|(endpoint, err)| err.map(|err| (endpoint, err)))
            .collect()
    }

    pub fn failed_endpoints(&self) -> Vec<Endpoint> {
        self.failures().into_iter().map(|(endpoint, _)| endpoint).collect()
    }

    pub fn all_failed(&self) -> bool {
        self.failures().len() == Endpoint::LOAD.len()
    }
}

/// Fans out the five dashboard fetches and waits for every one to settle.
/// A failing fetch never cancels its siblings.
pub async fn load_all<S>(service: &S, timeout: Duration) -> LoadResults
where
    S: AdminService + ?Sized,
{
    info!("loading admin dashboard");
    let (summary, pending, readers, authors, books_summary) = tokio::join!(
        bounded(timeout, service.get_dashboard_summary()),
        bounded(timeout, service.get_pending_submissions()),
        bounded(timeout, service.get_readers()),
        bounded(timeout, service.get_authors()),
        bounded(timeout, service.get_books_summary()),
    );

    let results = LoadResults {
        summary,
        pending: pending.map(Option::unwrap_or_default),
        readers: readers.map(Option::unwrap_or_default),
        authors: authors.map(Option::unwrap_or_default),
        books_summary: books_summary.map(Option::unwrap_or_default),
    };

    let failures = results.failures();
    for (endpoint, err) in &failures {
        warn!(endpoint = %endpoint, error = %err, "dashboard fetch failed");
    }
    info!(failed = failures.len(), "admin dashboard load settled");
    results
}

async fn bounded<T, F>(timeout: Duration, fut: F) -> ServiceResult<T>
where
    F: Future<Output = ServiceResult<T>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result,
        Err(_) => Err(AdminError::Timeout),
    }
}
