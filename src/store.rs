use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use tracing::debug;

use crate::aggregator::LoadResults;
use crate::models::{
    BookCounts, BookId, BookSummaryEntry, DashboardSummary, PendingSubmission, UserSummary,
};
use crate::services::Endpoint;
use crate::tabs::DashboardTab;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Approve,
    Reject,
}

impl Decision {
    pub fn verb(&self) -> &'static str {
        match self {
            Decision::Approve => "approve",
            Decision::Reject => "reject",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            Decision::Approve => "approved",
            Decision::Reject => "rejected",
        }
    }
}

/// Endpoints that failed in the most recent settled load.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadError {
    pub failed: Vec<Endpoint>,
}

impl LoadError {
    pub fn count(&self) -> usize {
        self.failed.len()
    }
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} API endpoints failed to load", self.failed.len())
    }
}

#[derive(Clone, Debug, Default)]
pub struct DashboardState {
    pub summary: Option<DashboardSummary>,
    pub pending: Vec<PendingSubmission>,
    pub readers: Vec<UserSummary>,
    pub authors: Vec<UserSummary>,
    pub books_summary: Vec<BookSummaryEntry>,
    pub active_tab: DashboardTab,
    pub load_error: Option<LoadError>,
    /// Load cycles started but not yet settled.
    pub in_flight: usize,
    /// Set once any fetch has ever succeeded.
    pub has_data: bool,
    pub last_load_failed_entirely: bool,
}

pub enum DashboardAction {
    LoadStarted,
    LoadSettled(LoadResults),
    Moderated { id: BookId, decision: Decision },
    SelectTab(DashboardTab),
}

impl DashboardState {
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    /// Full-failure state: nothing has ever loaded and the last cycle failed on
    /// every endpoint.
    pub fn is_failed(&self) -> bool {
        !self.has_data && self.in_flight == 0 && self.last_load_failed_entirely
    }

    pub fn apply(&mut self, action: DashboardAction) -> bool {
        match action {
            DashboardAction::LoadStarted => {
                self.in_flight += 1;
                self.load_error = None;
                true
            }
            DashboardAction::LoadSettled(results) => {
                self.settle(results);
                true
            }
            DashboardAction::Moderated { id, decision } => self.moderate(id, decision),
            DashboardAction::SelectTab(tab) => {
                let changed = self.active_tab != tab;
                self.active_tab = tab;
                changed
            }
        }
    }

    fn settle(&mut self, results: LoadResults) {
        self.in_flight = self.in_flight.saturating_sub(1);
        let failed = results.failed_endpoints();
        self.last_load_failed_entirely = results.all_failed();

        let LoadResults {
            summary,
            pending,
            readers,
            authors,
            books_summary,
        } = results;
        let mut any_ok = false;
        if let Ok(summary) = summary {
            self.summary = summary;
            any_ok = true;
        }
        if let Ok(pending) = pending {
            self.pending = pending;
            any_ok = true;
        }
        if let Ok(readers) = readers {
            self.readers = readers;
            any_ok = true;
        }
        if let Ok(authors) = authors {
            self.authors = authors;
            any_ok = true;
        }
        if let Ok(books_summary) = books_summary {
            self.books_summary = books_summary;
            any_ok = true;
        }
        self.has_data |= any_ok;
        self.load_error = if failed.is_empty() {
            None
        } else {
            Some(LoadError { failed })
        };
    }

    /// Removes `id` from the pending set and moves one count out of `pending`.
    /// Returns false, touching nothing, when `id` is not pending.
    pub fn moderate(&mut self, id: BookId, decision: Decision) -> bool {
        let before = self.pending.len();
        self.pending.retain(|submission| submission.id != id);
        if self.pending.len() == before {
            debug!(id, "moderated book was not in the local pending set");
            return false;
        }
        if let Some(books) = self.summary.as_mut().and_then(|s| s.books.as_mut()) {
            apply_decision(books, decision);
        }
        true
    }
}

/// `pending - 1` (floor 0) and `approved + 1` or `rejected + 1`.
pub fn apply_decision(books: &mut BookCounts, decision: Decision) {
    books.pending = Some(books.pending.unwrap_or(0).saturating_sub(1));
    let target = match decision {
        Decision::Approve => &mut books.approved,
        Decision::Reject => &mut books.rejected,
    };
    *target = Some(target.unwrap_or(0) + 1);
}

/// The single mutation path for dashboard state. The lock is only held for
/// the duration of one reducer step, never across an await.
#[derive(Clone, Default)]
pub struct DashboardStore {
    state: Arc<Mutex<DashboardState>>,
}

impl DashboardStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, DashboardState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn dispatch(&self, action: DashboardAction) -> bool {
        self.lock().apply(action)
    }

    pub fn read<R>(&self, f: impl FnOnce(&DashboardState) -> R) -> R {
        f(&self.lock())
    }

    pub fn snapshot(&self) -> DashboardState {
        self.lock().clone()
    }
}
