// Mutation pipeline: preview, create, update, delete.
//
// Failures are notified and returned. Every persisting mutation ends by
// clearing the in-flight tracker and refetching the first page, whatever its
// outcome.

use bookmemory_common::protocol::api::{CreateBookmarkRequest, PreviewRequest, UpdateBookmarkRequest};
use bookmemory_common::query::QueryParams;
use bookmemory_common::types::Bookmark;
use tracing::{debug, info, warn};

use super::BookmarkSync;
use crate::api::BookmarkApi;
use crate::error::ApiError;
use crate::store::Action;

impl<A: BookmarkApi> BookmarkSync<A> {
    /// Inspect a URL and focus the unsaved result. Nothing is persisted, so
    /// nothing is refetched.
    pub async fn preview(&self, request: PreviewRequest) -> Result<Bookmark, ApiError> {
        self.dispatch(Action::SetLoading(true));
        let result = self.inner.api.preview(&request).await;
        match &result {
            Ok(bookmark) => self.dispatch(Action::FocusSet(bookmark.clone())),
            Err(err) => self.notify(err),
        }
        self.dispatch(Action::SetLoading(false));
        result
    }

    /// Create a bookmark, focus it, and start indexing it in the background.
    pub async fn create(&self, request: CreateBookmarkRequest) -> Result<Bookmark, ApiError> {
        self.dispatch(Action::SetLoading(true));
        let result = self.inner.api.create(&request).await;
        match &result {
            Ok(bookmark) => {
                info!(bookmark = %bookmark.id, "bookmark created");
                self.spawn_load(bookmark.id.clone());
                self.dispatch(Action::FocusSet(bookmark.clone()));
            }
            Err(err) => self.notify(err),
        }
        self.resync().await;
        result
    }

    pub async fn update(
        &self,
        bookmark_id: &str,
        request: UpdateBookmarkRequest,
    ) -> Result<Bookmark, ApiError> {
        self.dispatch(Action::SetLoading(true));
        let result = self.inner.api.update(bookmark_id, &request).await;
        match &result {
            Ok(bookmark) => {
                info!(bookmark = %bookmark.id, "bookmark updated");
                self.dispatch(Action::FocusSet(bookmark.clone()));
            }
            Err(err) => self.notify(err),
        }
        self.resync().await;
        result
    }

    pub async fn delete(&self, bookmark_id: &str) -> Result<(), ApiError> {
        self.dispatch(Action::SetLoading(true));
        let result = self.inner.api.delete(bookmark_id).await;
        match &result {
            Ok(()) => info!(bookmark = %bookmark_id, "bookmark deleted"),
            Err(err) => self.notify(err),
        }
        self.resync().await;
        result
    }

    async fn resync(&self) {
        {
            let mut state = self.lock();
            state.collection.reduce(Action::SetLoading(false));
            state.pending.clear();
        }
        debug!("refetching first page after mutation");
        self.list_page(QueryParams::first_page()).await;
    }

    /// Detached: the load's outcome never reaches the mutation's caller. The
    /// handle is kept for [`BookmarkSync::drain_background`].
    fn spawn_load(&self, bookmark_id: String) {
        let api = self.inner.api.clone();
        let handle = tokio::spawn(async move {
            match api.load(&bookmark_id).await {
                Ok(()) => debug!(bookmark = %bookmark_id, "bookmark content loaded"),
                Err(err) => {
                    warn!(bookmark = %bookmark_id, error = %err, "background bookmark load failed");
                }
            }
        });
        self.track_background(handle);
    }
}
