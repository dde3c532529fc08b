// Summary store: accumulated summary text and a loading flag for the bookmark
// whose summary is being generated. One session is active at a time.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use bookmemory_common::protocol::summary::StreamError;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::stream::{stream_summary, StreamOutcome, SummaryEvents, SummaryRequest, SummaryTransport};
use crate::error::ApiError;

/// Reloads a bookmark once its summary has been persisted server-side.
pub trait BookmarkRefresher: Send + Sync + 'static {
    fn refresh(&self, bookmark_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SummaryState {
    pub is_loading: bool,
    pub summary: String,
}

pub struct SummaryStore<T: SummaryTransport, R: BookmarkRefresher> {
    inner: Arc<StoreInner<T, R>>,
}

impl<T: SummaryTransport, R: BookmarkRefresher> Clone for SummaryStore<T, R> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

struct StoreInner<T, R> {
    transport: Arc<T>,
    refresher: R,
    state_tx: watch::Sender<SummaryState>,
    active: Mutex<Option<ActiveSession>>,
    next_session: AtomicU64,
}

struct ActiveSession {
    id: u64,
    cancel: CancellationToken,
}

impl<T: SummaryTransport, R: BookmarkRefresher> SummaryStore<T, R> {
    pub fn new(transport: Arc<T>, refresher: R) -> Self {
        let (state_tx, _) = watch::channel(SummaryState::default());
        Self {
            inner: Arc::new(StoreInner {
                transport,
                refresher,
                state_tx,
                active: Mutex::new(None),
                next_session: AtomicU64::new(1),
            }),
        }
    }

    pub fn snapshot(&self) -> SummaryState {
        self.inner.state_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SummaryState> {
        self.inner.state_tx.subscribe()
    }

    /// Overwrite the summary text, e.g. with an already persisted summary.
    pub fn set(&self, summary: impl Into<String>) {
        let summary = summary.into();
        self.inner.state_tx.send_modify(|state| state.summary = summary);
    }

    /// Start generating a summary for `bookmark_id`, cancelling any session
    /// already running. The returned handle resolves when the session ends.
    pub fn start(&self, bookmark_id: impl Into<String>) -> JoinHandle<StreamOutcome> {
        self.start_with(bookmark_id, SummaryRequest::default())
    }

    pub fn start_with(
        &self,
        bookmark_id: impl Into<String>,
        request: SummaryRequest,
    ) -> JoinHandle<StreamOutcome> {
        let bookmark_id = bookmark_id.into();
        let session_id = self.inner.next_session.fetch_add(1, Ordering::SeqCst);
        let cancel = CancellationToken::new();

        {
            let mut active = self.inner.lock_active();
            if let Some(previous) = active.replace(ActiveSession { id: session_id, cancel: cancel.clone() }) {
                debug!(session = previous.id, "cancelling previous summary session");
                previous.cancel.cancel();
            }
            self.inner.state_tx.send_modify(|state| {
                state.summary.clear();
                state.is_loading = true;
            });
        }

        info!(bookmark = %bookmark_id, session = session_id, "summary session started");
        let inner = self.inner.clone();
        tokio::spawn(async move { inner.run(session_id, bookmark_id, request, cancel).await })
    }

    /// Cancel the active session, if any. Accumulated text is kept.
    pub fn stop(&self) {
        let mut active = self.inner.lock_active();
        if let Some(session) = active.take() {
            debug!(session = session.id, "summary session stopped");
            session.cancel.cancel();
        }
        self.inner.state_tx.send_modify(|state| state.is_loading = false);
    }

    pub fn is_active(&self) -> bool {
        self.inner.lock_active().is_some()
    }
}

impl<T: SummaryTransport, R: BookmarkRefresher> StoreInner<T, R> {
    fn lock_active(&self) -> std::sync::MutexGuard<'_, Option<ActiveSession>> {
        self.active.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Apply `f` only while `session_id` is still the active session.
    fn update(&self, session_id: u64, f: impl FnOnce(&mut SummaryState)) {
        let active = self.lock_active();
        if active.as_ref().is_some_and(|session| session.id == session_id) {
            self.state_tx.send_modify(f);
        }
    }

    fn finish(&self, session_id: u64) {
        let mut active = self.lock_active();
        if active.as_ref().is_some_and(|session| session.id == session_id) {
            *active = None;
        }
    }

    async fn run(
        &self,
        session_id: u64,
        bookmark_id: String,
        request: SummaryRequest,
        cancel: CancellationToken,
    ) -> StreamOutcome {
        let mut events = SessionEvents { inner: self, session_id };
        let outcome =
            stream_summary(self.transport.as_ref(), &bookmark_id, &request, &cancel, &mut events)
                .await;

        match &outcome {
            StreamOutcome::Completed if !cancel.is_cancelled() => {
                info!(bookmark = %bookmark_id, session = session_id, "summary session completed");
                if let Err(err) = self.refresher.refresh(&bookmark_id).await {
                    warn!(bookmark = %bookmark_id, error = %err, "failed to refresh bookmark after summary");
                }
            }
            StreamOutcome::Failed(err) => {
                warn!(bookmark = %bookmark_id, session = session_id, code = %err.code, error = %err.message, "summary session failed");
            }
            _ => {
                debug!(bookmark = %bookmark_id, session = session_id, "summary session ended without completion");
            }
        }

        self.finish(session_id);
        outcome
    }
}

struct SessionEvents<'a, T, R> {
    inner: &'a StoreInner<T, R>,
    session_id: u64,
}

impl<T: SummaryTransport, R: BookmarkRefresher> SummaryEvents for SessionEvents<'_, T, R> {
    fn on_chunk(&mut self, chunk: &str) {
        self.inner.update(self.session_id, |state| state.summary.push_str(chunk));
    }

    fn on_complete(&mut self) {
        self.inner.update(self.session_id, |state| state.is_loading = false);
    }

    fn on_error(&mut self, _error: StreamError) {
        // Partial text stays visible.
        self.inner.update(self.session_id, |state| state.is_loading = false);
    }
}
