// Bookmark sync: keeps the local collection consistent with the service.
//
// Fetches (list, search, related, tags) report failures through the
// notifier and never return errors. Mutations live in `mutations` and also
// return their error to the caller.
//
// Every request that replaces the sequence (first page, search) takes a new
// generation; a response is applied only while its generation is current,
// so the latest replacement wins regardless of arrival order.

mod mutations;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use bookmemory_common::protocol::api::{RelatedQuery, SearchRequest};
use bookmemory_common::query::QueryParams;
use bookmemory_common::types::{Bookmark, Sort, TagMode};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::api::BookmarkApi;
use crate::error::ApiError;
use crate::notify::{Notifier, TracingNotifier};
use crate::store::{Action, CollectionState, PendingRequests};
use crate::summary::BookmarkRefresher;

/// Result of a fetch. Failures were already notified.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchOutcome {
    Applied,
    /// An identical list request was already in flight; nothing was sent.
    Duplicate,
    /// The response arrived after a newer replacement and was dropped.
    Stale,
    Failed(ApiError),
}

impl FetchOutcome {
    pub fn error(&self) -> Option<&ApiError> {
        match self {
            Self::Failed(err) => Some(err),
            _ => None,
        }
    }
}

/// Parameters for the search path. Unset fields fall back to the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchParams {
    pub search: String,
    pub tags: Option<Vec<String>>,
    pub tag_mode: Option<TagMode>,
    pub limit: Option<u32>,
}

impl SearchParams {
    pub fn new(search: impl Into<String>) -> Self {
        Self { search: search.into(), ..Self::default() }
    }
}

struct SyncState {
    collection: CollectionState,
    pending: PendingRequests,
    generation: u64,
}

struct SyncInner<A> {
    api: Arc<A>,
    notifier: Arc<dyn Notifier>,
    state: Mutex<SyncState>,
    /// Detached work started by mutations (content loads).
    background: Mutex<Vec<JoinHandle<()>>>,
}

/// Owns the collection state and drives it from the remote service.
///
/// Cheap to clone; clones share state.
pub struct BookmarkSync<A: BookmarkApi> {
    inner: Arc<SyncInner<A>>,
}

impl<A: BookmarkApi> Clone for BookmarkSync<A> {
    fn clone(&self) -> Self {
        Self { inner: self.inner.clone() }
    }
}

impl<A: BookmarkApi> BookmarkSync<A> {
    pub fn new(api: Arc<A>, notifier: Arc<dyn Notifier>, initial: CollectionState) -> Self {
        Self {
            inner: Arc::new(SyncInner {
                api,
                notifier,
                state: Mutex::new(SyncState {
                    collection: initial,
                    pending: PendingRequests::new(),
                    generation: 0,
                }),
                background: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Empty collection, notifications routed to `tracing`.
    pub fn with_defaults(api: Arc<A>) -> Self {
        Self::new(api, Arc::new(TracingNotifier), CollectionState::default())
    }

    pub fn api(&self) -> Arc<A> {
        self.inner.api.clone()
    }

    pub fn snapshot(&self) -> CollectionState {
        self.lock().collection.clone()
    }

    /// Number of list requests currently marked in flight.
    pub fn pending_requests(&self) -> usize {
        self.lock().pending.len()
    }

    fn lock(&self) -> MutexGuard<'_, SyncState> {
        self.inner.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn track_background(&self, handle: JoinHandle<()>) {
        let mut background = self.inner.background.lock().unwrap_or_else(PoisonError::into_inner);
        background.retain(|task| !task.is_finished());
        background.push(handle);
    }

    /// Number of detached tasks that have not finished yet.
    pub fn background_tasks(&self) -> usize {
        let background = self.inner.background.lock().unwrap_or_else(PoisonError::into_inner);
        background.iter().filter(|task| !task.is_finished()).count()
    }

    /// Wait up to `limit` for detached work to finish. Returns false if some
    /// of it was still running; those tasks keep running on the runtime.
    ///
    /// Callers about to drop the runtime use this so background loads are
    /// not cancelled mid-request.
    pub async fn drain_background(&self, limit: Duration) -> bool {
        let handles =
            std::mem::take(&mut *self.inner.background.lock().unwrap_or_else(PoisonError::into_inner));
        if handles.is_empty() {
            return true;
        }
        let count = handles.len();
        match tokio::time::timeout(limit, futures_util::future::join_all(handles)).await {
            Ok(_) => {
                debug!(count, "background work finished");
                true
            }
            Err(_) => {
                warn!(count, ?limit, "background work still running");
                false
            }
        }
    }

    fn dispatch(&self, action: Action) {
        self.lock().collection.reduce(action);
    }

    fn notify(&self, err: &ApiError) {
        self.inner.notifier.error(&err.user_message());
    }

    // ── Setters ────────────────────────────────────────────────────

    pub fn set_sort(&self, sort: Sort) {
        self.dispatch(Action::SortSet(sort));
    }

    pub fn set_search(&self, search: impl Into<String>) {
        self.dispatch(Action::SearchSet(search.into()));
    }

    pub fn set_selected_tags(&self, tags: Vec<String>) {
        self.dispatch(Action::SelectedTagsSet(tags));
    }

    pub fn set_selected_tag_mode(&self, mode: TagMode) {
        self.dispatch(Action::SelectedTagModeSet(mode));
    }

    pub fn set_focus(&self, bookmark: Bookmark) {
        self.dispatch(Action::FocusSet(bookmark));
    }

    // ── Fetch orchestration ────────────────────────────────────────

    /// First page plus the tag list.
    pub async fn initialize(&self) -> FetchOutcome {
        let outcome = self.list_page(QueryParams::first_page()).await;
        self.load_tags().await;
        outcome
    }

    /// Load a page of the collection. Params override the store's current
    /// filters; a non-empty search goes to [`BookmarkSync::search_page`].
    ///
    /// At most one request per canonical query is in flight.
    pub async fn list_page(&self, params: QueryParams) -> FetchOutcome {
        let query = params.resolve(&self.snapshot().query());

        if let Some(search) = query.search_text() {
            let search = SearchParams {
                search: search.to_string(),
                tags: params.tags,
                tag_mode: params.tag_mode,
                limit: params.limit,
            };
            return self.search_page(search).await;
        }

        let key = query.canonical_key();
        let unfiltered = query.is_unfiltered();
        let (generation, token) = {
            let mut state = self.lock();
            let Some(token) = state.pending.begin(&key) else {
                debug!(%key, "list request already in flight");
                return FetchOutcome::Duplicate;
            };
            if query.offset == 0 {
                state.generation += 1;
            }
            state.collection.reduce(Action::SetLoading(true));
            (state.generation, token)
        };

        debug!(offset = query.offset, limit = query.limit, %key, "listing bookmarks");
        let result = self.inner.api.list(&query).await;

        let outcome = {
            let mut state = self.lock();
            let outcome = match result {
                Ok(page) if state.generation == generation => {
                    state.collection.reduce(Action::PageReceived { page, unfiltered });
                    FetchOutcome::Applied
                }
                Ok(_) => {
                    debug!(%key, generation, current = state.generation, "dropping stale page");
                    FetchOutcome::Stale
                }
                Err(err) => FetchOutcome::Failed(err),
            };
            state.collection.reduce(Action::SetLoading(false));
            state.pending.end(&key, token);
            outcome
        };

        if let FetchOutcome::Failed(err) = &outcome {
            self.notify(err);
        }
        outcome
    }

    /// Ranked search. Replaces the sequence; not deduplicated.
    pub async fn search_page(&self, params: SearchParams) -> FetchOutcome {
        let (request, generation) = {
            let mut state = self.lock();
            let collection = &state.collection;
            let request = SearchRequest {
                search: params.search.trim().to_string(),
                tags: Some(params.tags.unwrap_or_else(|| collection.selected_tags.clone())),
                tag_mode: Some(params.tag_mode.unwrap_or(collection.selected_tag_mode)),
                limit: Some(params.limit.filter(|limit| *limit > 0).unwrap_or(collection.limit)),
            };
            state.generation += 1;
            state.collection.reduce(Action::SetLoading(true));
            (request, state.generation)
        };

        debug!(search = %request.search, "searching bookmarks");
        let result = self.inner.api.search(&request).await;

        let outcome = {
            let mut state = self.lock();
            let outcome = match result {
                Ok(bookmarks) if state.generation == generation => {
                    state.collection.reduce(Action::SearchResultsReceived(bookmarks));
                    FetchOutcome::Applied
                }
                Ok(_) => {
                    debug!(generation, current = state.generation, "dropping stale search results");
                    FetchOutcome::Stale
                }
                Err(err) => FetchOutcome::Failed(err),
            };
            state.collection.reduce(Action::SetLoading(false));
            outcome
        };

        if let FetchOutcome::Failed(err) = &outcome {
            self.notify(err);
        }
        outcome
    }

    /// Bookmarks related to one target. Independent of the list cursor.
    pub async fn related_bookmarks(&self, bookmark_id: &str, query: RelatedQuery) -> FetchOutcome {
        self.dispatch(Action::SetLoading(true));
        let result = self.inner.api.related(bookmark_id, query).await;
        let outcome = match result {
            Ok(related) => {
                self.dispatch(Action::RelatedReceived(related));
                FetchOutcome::Applied
            }
            Err(err) => {
                self.notify(&err);
                FetchOutcome::Failed(err)
            }
        };
        self.dispatch(Action::SetLoading(false));
        outcome
    }

    /// Tag names with usage counts.
    pub async fn load_tags(&self) -> FetchOutcome {
        match self.inner.api.tags().await {
            Ok(tags) => {
                self.dispatch(Action::TagsReceived(tags));
                FetchOutcome::Applied
            }
            Err(err) => {
                self.notify(&err);
                FetchOutcome::Failed(err)
            }
        }
    }

    /// Reload one bookmark and focus the fresh copy.
    pub async fn refresh_bookmark(&self, bookmark_id: &str) -> Result<Bookmark, ApiError> {
        let bookmark = self.inner.api.get(bookmark_id).await?;
        info!(bookmark = %bookmark.id, "bookmark refreshed");
        self.dispatch(Action::FocusSet(bookmark.clone()));
        Ok(bookmark)
    }
}

impl<A: BookmarkApi> BookmarkRefresher for BookmarkSync<A> {
    async fn refresh(&self, bookmark_id: &str) -> Result<(), ApiError> {
        self.refresh_bookmark(bookmark_id).await.map(|_| ())
    }
}
