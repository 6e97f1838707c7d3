use std::time::Duration;

use tracing::{error, info};

use crate::aggregator::load_all;
use crate::config::AdminConfig;
use crate::models::{BookId, Notification};
use crate::notify::Notifier;
use crate::services::{AdminService, ServiceResult};
use crate::store::{DashboardAction, DashboardState, DashboardStore, Decision, LoadError};
use crate::tabs::DashboardTab;
use crate::view::DashboardView;

/// Outcome of one load cycle as seen by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub error: Option<LoadError>,
    pub failed_entirely: bool,
}

pub struct DashboardController<S: AdminService> {
    service: S,
    store: DashboardStore,
    notifier: Notifier,
    fetch_timeout: Duration,
}

impl<S: AdminService> DashboardController<S> {
    pub fn new(service: S, config: &AdminConfig) -> Self {
        Self {
            service,
            store: DashboardStore::new(),
            notifier: Notifier::new(config.notification_ttl),
            fetch_timeout: config.request_timeout,
        }
    }

    pub fn service(&self) -> &S {
        &self.service
    }

    /// Fetches every dashboard slice. Never fails: failures are folded into
    /// state and reported through the returned outcome.
    pub async fn load_all(&self) -> LoadOutcome {
        self.store.dispatch(DashboardAction::LoadStarted);
        let results = load_all(&self.service, self.fetch_timeout).await;
        let failed_entirely = results.all_failed();
        let error = (!results.failures().is_empty()).then(|| LoadError {
            failed: results.failed_endpoints(),
        });
        self.store.dispatch(DashboardAction::LoadSettled(results));
        LoadOutcome {
            error,
            failed_entirely,
        }
    }

    /// Same as `load_all`; may overlap an in-flight load, in which case each
    /// slice ends up with whichever cycle settled last.
    pub async fn refresh(&self) -> LoadOutcome {
        info!(in_flight = self.store.read(|s| s.in_flight), "dashboard refresh requested");
        self.load_all().await
    }

    pub async fn approve(&self, id: BookId) -> ServiceResult<()> {
        self.moderate(id, Decision::Approve).await
    }

    pub async fn reject(&self, id: BookId) -> ServiceResult<()> {
        self.moderate(id, Decision::Reject).await
    }

    async fn moderate(&self, id: BookId, decision: Decision) -> ServiceResult<()> {
        let result = match decision {
            Decision::Approve => self.service.approve_submission(id).await,
            Decision::Reject => self.service.reject_submission(id).await,
        };
        match result {
            Ok(()) => {
                let removed = self.store.dispatch(DashboardAction::Moderated { id, decision });
                info!(id, action = decision.verb(), removed, "book moderated");
                self.notifier
                    .success(format!("Book {} successfully", decision.past_tense()));
                Ok(())
            }
            Err(err) => {
                error!(id, action = decision.verb(), error = %err, "moderation failed");
                self.notifier
                    .error(format!("Failed to {} book: {err}", decision.verb()));
                Err(err)
            }
        }
    }

    pub fn select_tab(&self, tab: DashboardTab) {
        self.store.dispatch(DashboardAction::SelectTab(tab));
    }

    pub fn active_tab(&self) -> DashboardTab {
        self.store.read(|s| s.active_tab)
    }

    pub fn snapshot(&self) -> DashboardState {
        self.store.snapshot()
    }

    pub fn view(&self) -> DashboardView {
        self.store.read(DashboardView::from_state)
    }

    pub fn notification(&self) -> Option<Notification> {
        self.notifier.current()
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }
}
