use serde::Serialize;

use crate::models::{BookSummaryEntry, DashboardSummary, PendingSubmission, UserSummary};
use crate::store::DashboardState;
use crate::tabs::{tab_labels, DashboardTab, TabLabel};

/// What the dashboard should show right now, derived from state on demand.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum DashboardView {
    Loading,
    Failed { message: String },
    Ready(ReadyView),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadyView {
    pub tabs: Vec<TabLabel>,
    pub active_tab: DashboardTab,
    /// Partial-failure banner, e.g. "2 API endpoints failed to load".
    pub banner: Option<String>,
    pub refreshing: bool,
    pub content: TabContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "tab", content = "data", rename_all = "lowercase")]
pub enum TabContent {
    Dashboard(Option<DashboardSummary>),
    Pending(Vec<PendingSubmission>),
    Authors(Vec<UserSummary>),
    Readers(Vec<UserSummary>),
    Summary(Vec<BookSummaryEntry>),
}

impl DashboardView {
    pub fn from_state(state: &DashboardState) -> Self {
        if !state.has_data {
            if state.is_failed() {
                let message = state
                    .load_error
                    .as_ref()
                    .map(ToString::to_string)
                    .unwrap_or_else(|| "Failed to load data".to_string());
                return DashboardView::Failed { message };
            }
            return DashboardView::Loading;
        }

        let content = match state.active_tab {
            DashboardTab::Dashboard => TabContent::Dashboard(state.summary.clone()),
            DashboardTab::Pending => TabContent::Pending(state.pending.clone()),
            DashboardTab::Authors => TabContent::Authors(state.authors.clone()),
            DashboardTab::Readers => TabContent::Readers(state.readers.clone()),
            DashboardTab::Summary => TabContent::Summary(state.books_summary.clone()),
        };
        DashboardView::Ready(ReadyView {
            tabs: tab_labels(state),
            active_tab: state.active_tab,
            banner: state.load_error.as_ref().map(ToString::to_string),
            refreshing: state.is_loading(),
            content,
        })
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, DashboardView::Ready(_))
    }
}
