use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::models::{Notification, NotificationKind};

#[derive(Default)]
struct NotifierState {
    current: Option<Notification>,
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

/// Single-slot transient notification with a fixed display time.
///
/// `show` replaces whatever is visible and restarts the countdown; nothing is
/// queued. Must be used from within a tokio runtime.
#[derive(Clone)]
pub struct Notifier {
    ttl: Duration,
    state: Arc<Mutex<NotifierState>>,
}

impl Notifier {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            state: Arc::new(Mutex::new(NotifierState::default())),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, NotifierState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn show(&self, text: impl Into<String>, kind: NotificationKind) {
        let text = text.into();
        debug!(?kind, %text, "notification");
        let mut state = self.lock();
        state.generation += 1;
        let generation = state.generation;
        state.current = Some(Notification { text, kind });
        if let Some(previous) = state.timer.take() {
            previous.abort();
        }

        let shared = Arc::clone(&self.state);
        let ttl = self.ttl;
        state.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(ttl).await;
            let mut state = shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
            if state.generation == generation {
                state.current = None;
                state.timer = None;
            }
        }));
    }

    pub fn success(&self, text: impl Into<String>) {
        self.show(text, NotificationKind::Success);
    }

    pub fn error(&self, text: impl Into<String>) {
        self.show(text, NotificationKind::Error);
    }

    pub fn info(&self, text: impl Into<String>) {
        self.show(text, NotificationKind::Info);
    }

    pub fn current(&self) -> Option<Notification> {
        self.lock().current.clone()
    }

    pub fn dismiss(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.current = None;
        if let Some(timer) = state.timer.take() {
            timer.abort();
        }
    }
}
