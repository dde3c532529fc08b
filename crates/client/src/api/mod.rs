// Remote bookmark service seam.
//
// `BookmarkApi` abstracts every JSON endpoint the sync core calls so the
// orchestrator can be driven by an in-process mock in tests. The reqwest
// implementation lives in `http`.

pub mod http;
#[cfg(test)]
pub(crate) mod mock;

use std::future::Future;

use bookmemory_common::protocol::api::{
    BookmarkPage, CreateBookmarkRequest, PreviewRequest, RelatedQuery, SearchRequest,
    UpdateBookmarkRequest,
};
use bookmemory_common::query::Query;
use bookmemory_common::types::{Bookmark, CurrentUser, Tag};

use crate::error::ApiError;

pub use http::HttpBookmarkApi;

/// Abstraction over the bookmark service's JSON endpoints.
///
/// All methods return `Send` futures so callers can spawn them on a
/// multi-threaded runtime.
pub trait BookmarkApi: Send + Sync + 'static {
    /// `GET /api/v1/bookmarks/` with tag, mode, sort and pagination params.
    fn list(
        &self,
        query: &Query,
    ) -> impl Future<Output = Result<BookmarkPage, ApiError>> + Send;

    /// `POST /api/v1/bookmarks/search`. Hits are flattened into bookmarks.
    fn search(
        &self,
        request: &SearchRequest,
    ) -> impl Future<Output = Result<Vec<Bookmark>, ApiError>> + Send;

    fn get(&self, bookmark_id: &str) -> impl Future<Output = Result<Bookmark, ApiError>> + Send;

    fn create(
        &self,
        request: &CreateBookmarkRequest,
    ) -> impl Future<Output = Result<Bookmark, ApiError>> + Send;

    /// Inspect a URL without storing anything. The result has the preview marker.
    fn preview(
        &self,
        request: &PreviewRequest,
    ) -> impl Future<Output = Result<Bookmark, ApiError>> + Send;

    fn update(
        &self,
        bookmark_id: &str,
        request: &UpdateBookmarkRequest,
    ) -> impl Future<Output = Result<Bookmark, ApiError>> + Send;

    fn delete(&self, bookmark_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn related(
        &self,
        bookmark_id: &str,
        query: RelatedQuery,
    ) -> impl Future<Output = Result<Vec<Bookmark>, ApiError>> + Send;

    /// Ask the service to fetch content and compute embeddings for a bookmark.
    fn load(&self, bookmark_id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    fn tags(&self) -> impl Future<Output = Result<Vec<Tag>, ApiError>> + Send;

    fn current_user(&self) -> impl Future<Output = Result<CurrentUser, ApiError>> + Send;
}

/// Reject empty ids before anything reaches the wire.
pub(crate) fn require_id(bookmark_id: &str) -> Result<&str, ApiError> {
    let trimmed = bookmark_id.trim();
    if trimmed.is_empty() {
        Err(ApiError::InvalidArgument("bookmark id is required"))
    } else {
        Ok(trimmed)
    }
}
