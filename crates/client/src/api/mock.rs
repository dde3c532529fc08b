// Scripted in-process `BookmarkApi` for unit tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bookmemory_common::protocol::api::{
    BookmarkPage, CreateBookmarkRequest, PreviewRequest, RelatedQuery, SearchRequest,
    UpdateBookmarkRequest,
};
use bookmemory_common::query::Query;
use bookmemory_common::types::{Bookmark, BookmarkType, CurrentUser, PreviewDetails, Tag};
use tokio::sync::{oneshot, Notify};

use super::BookmarkApi;
use crate::error::ApiError;

/// One recorded call.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Call {
    List(Query),
    Search(SearchRequest),
    Get(String),
    Create(CreateBookmarkRequest),
    Preview(PreviewRequest),
    Update(String, UpdateBookmarkRequest),
    Delete(String),
    Related(String, RelatedQuery),
    Load(String),
    Tags,
    CurrentUser,
}

impl Call {
    pub(crate) fn is_list(&self) -> bool {
        matches!(self, Self::List(_))
    }

    pub(crate) fn is_search(&self) -> bool {
        matches!(self, Self::Search(_))
    }
}

pub(crate) enum Scripted<T> {
    Ready(Result<T, ApiError>),
    /// Resolved when the test sends on the paired sender.
    Deferred(oneshot::Receiver<Result<T, ApiError>>),
}

type Script<T> = Arc<Mutex<VecDeque<Scripted<T>>>>;

/// Mock API: returns scripted responses in order, falls back to a benign
/// default when a script runs dry, and records every call.
#[derive(Clone, Default)]
pub(crate) struct MockApi {
    calls: Arc<Mutex<Vec<Call>>>,
    loads_seen: Arc<Notify>,
    lists: Script<BookmarkPage>,
    searches: Script<Vec<Bookmark>>,
    gets: Script<Bookmark>,
    creates: Script<Bookmark>,
    previews: Script<Bookmark>,
    updates: Script<Bookmark>,
    deletes: Script<()>,
    related: Script<Vec<Bookmark>>,
    loads: Script<()>,
    tags: Script<Vec<Tag>>,
    users: Script<CurrentUser>,
}

pub(crate) fn bookmark(id: &str) -> Bookmark {
    Bookmark {
        id: id.into(),
        title: format!("Bookmark {id}"),
        description: Some(format!("About {id}")),
        summary: None,
        url: Some(format!("https://example.com/{id}")),
        kind: BookmarkType::Link,
        tags: Vec::new(),
        status: None,
        created_at: None,
        updated_at: None,
        snippet: None,
        preview: None,
    }
}

pub(crate) fn page(ids: &[&str], total: u32, offset: u32) -> BookmarkPage {
    BookmarkPage { items: ids.iter().map(|id| bookmark(id)).collect(), total, limit: 10, offset }
}

fn push<T>(script: &Script<T>, scripted: Scripted<T>) {
    script.lock().unwrap().push_back(scripted);
}

fn defer<T>(script: &Script<T>) -> oneshot::Sender<Result<T, ApiError>> {
    let (tx, rx) = oneshot::channel();
    push(script, Scripted::Deferred(rx));
    tx
}

async fn resolve<T>(script: &Script<T>, fallback: impl FnOnce() -> Result<T, ApiError>) -> Result<T, ApiError> {
    let next = script.lock().unwrap().pop_front();
    match next {
        Some(Scripted::Ready(result)) => result,
        Some(Scripted::Deferred(rx)) => {
            rx.await.unwrap_or_else(|_| Err(ApiError::Network("response dropped".into())))
        }
        None => fallback(),
    }
}

impl MockApi {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub(crate) fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|call| pred(call)).count()
    }

    pub(crate) fn list_queries(&self) -> Vec<Query> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::List(query) => Some(query),
                _ => None,
            })
            .collect()
    }

    pub(crate) fn push_list(&self, result: Result<BookmarkPage, ApiError>) {
        push(&self.lists, Scripted::Ready(result));
    }

    pub(crate) fn defer_list(&self) -> oneshot::Sender<Result<BookmarkPage, ApiError>> {
        defer(&self.lists)
    }

    pub(crate) fn push_search(&self, result: Result<Vec<Bookmark>, ApiError>) {
        push(&self.searches, Scripted::Ready(result));
    }

    pub(crate) fn defer_search(&self) -> oneshot::Sender<Result<Vec<Bookmark>, ApiError>> {
        defer(&self.searches)
    }

    pub(crate) fn push_get(&self, result: Result<Bookmark, ApiError>) {
        push(&self.gets, Scripted::Ready(result));
    }

    pub(crate) fn push_create(&self, result: Result<Bookmark, ApiError>) {
        push(&self.creates, Scripted::Ready(result));
    }

    pub(crate) fn push_preview(&self, result: Result<Bookmark, ApiError>) {
        push(&self.previews, Scripted::Ready(result));
    }

    pub(crate) fn push_update(&self, result: Result<Bookmark, ApiError>) {
        push(&self.updates, Scripted::Ready(result));
    }

    pub(crate) fn push_delete(&self, result: Result<(), ApiError>) {
        push(&self.deletes, Scripted::Ready(result));
    }

    pub(crate) fn push_related(&self, result: Result<Vec<Bookmark>, ApiError>) {
        push(&self.related, Scripted::Ready(result));
    }

    pub(crate) fn push_load(&self, result: Result<(), ApiError>) {
        push(&self.loads, Scripted::Ready(result));
    }

    pub(crate) fn defer_load(&self) -> oneshot::Sender<Result<(), ApiError>> {
        defer(&self.loads)
    }

    pub(crate) fn push_tags(&self, result: Result<Vec<Tag>, ApiError>) {
        push(&self.tags, Scripted::Ready(result));
    }

    pub(crate) fn push_user(&self, result: Result<CurrentUser, ApiError>) {
        push(&self.users, Scripted::Ready(result));
    }

    /// Resolves once a `load` call has been recorded.
    pub(crate) async fn load_called(&self) {
        let notified = self.loads_seen.notified();
        if self.count(|call| matches!(call, Call::Load(_))) > 0 {
            return;
        }
        notified.await;
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

impl BookmarkApi for MockApi {
    async fn list(&self, query: &Query) -> Result<BookmarkPage, ApiError> {
        self.record(Call::List(query.clone()));
        let (limit, offset) = (query.limit, query.offset);
        resolve(&self.lists, || Ok(BookmarkPage { items: Vec::new(), total: 0, limit, offset })).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Bookmark>, ApiError> {
        self.record(Call::Search(request.clone()));
        resolve(&self.searches, || Ok(Vec::new())).await
    }

    async fn get(&self, bookmark_id: &str) -> Result<Bookmark, ApiError> {
        self.record(Call::Get(bookmark_id.to_string()));
        resolve(&self.gets, || Ok(bookmark(bookmark_id))).await
    }

    async fn create(&self, request: &CreateBookmarkRequest) -> Result<Bookmark, ApiError> {
        self.record(Call::Create(request.clone()));
        let title = request.title.clone();
        resolve(&self.creates, || Ok(Bookmark { title, ..bookmark("created") })).await
    }

    async fn preview(&self, request: &PreviewRequest) -> Result<Bookmark, ApiError> {
        self.record(Call::Preview(request.clone()));
        let url = request.url.clone();
        resolve(&self.previews, || {
            Ok(Bookmark {
                id: String::new(),
                url: Some(url),
                preview: Some(PreviewDetails::default()),
                ..bookmark("")
            })
        })
        .await
    }

    async fn update(
        &self,
        bookmark_id: &str,
        request: &UpdateBookmarkRequest,
    ) -> Result<Bookmark, ApiError> {
        self.record(Call::Update(bookmark_id.to_string(), request.clone()));
        let mut updated = bookmark(bookmark_id);
        if let Some(title) = &request.title {
            updated.title = title.clone();
        }
        resolve(&self.updates, || Ok(updated)).await
    }

    async fn delete(&self, bookmark_id: &str) -> Result<(), ApiError> {
        self.record(Call::Delete(bookmark_id.to_string()));
        resolve(&self.deletes, || Ok(())).await
    }

    async fn related(
        &self,
        bookmark_id: &str,
        query: RelatedQuery,
    ) -> Result<Vec<Bookmark>, ApiError> {
        self.record(Call::Related(bookmark_id.to_string(), query));
        resolve(&self.related, || Ok(Vec::new())).await
    }

    async fn load(&self, bookmark_id: &str) -> Result<(), ApiError> {
        self.record(Call::Load(bookmark_id.to_string()));
        self.loads_seen.notify_waiters();
        resolve(&self.loads, || Ok(())).await
    }

    async fn tags(&self) -> Result<Vec<Tag>, ApiError> {
        self.record(Call::Tags);
        resolve(&self.tags, || Ok(Vec::new())).await
    }

    async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.record(Call::CurrentUser);
        resolve(&self.users, || Err(ApiError::from_response(401, ""))).await
    }
}
