// reqwest implementation of the bookmark service and summary stream.

use bookmemory_common::protocol::api::{
    self as wire, BookmarkPage, BookmarkPreview, CreateBookmarkRequest, PreviewRequest,
    RelatedQuery, SearchHit, SearchRequest, UpdateBookmarkRequest,
};
use bookmemory_common::query::Query;
use bookmemory_common::types::{Bookmark, CurrentUser, Tag};
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::{Client, Method, RequestBuilder};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::{require_id, BookmarkApi};
use crate::config::SESSION_COOKIE_NAME;
use crate::error::ApiError;
use crate::summary::stream::{
    ByteStream, SummaryRequest, SummaryResponse, SummaryTransport, TransportError,
};

/// HTTP client for the bookmemory service. Requests carry the session cookie
/// and a cookie store, so cookies set by the service are sent back.
#[derive(Debug, Clone)]
pub struct HttpBookmarkApi {
    client: Client,
    base_url: Url,
    session: Option<String>,
}

impl HttpBookmarkApi {
    pub fn new(base_url: Url, session: Option<String>) -> Result<Self, ApiError> {
        let client = Client::builder()
            .cookie_store(true)
            .build()
            .map_err(|e| ApiError::Network(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client, base_url, session })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Absolute URLs are used verbatim; paths are joined onto the base
    /// without doubling slashes.
    pub fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        let lowered = path.to_ascii_lowercase();
        let raw = if lowered.starts_with("http://") || lowered.starts_with("https://") {
            path.to_string()
        } else {
            let base = self.base_url.as_str().trim_end_matches('/');
            let path = path.trim_start_matches('/');
            format!("{base}/{path}")
        };
        Url::parse(&raw).map_err(|_| ApiError::InvalidArgument("invalid request URL"))
    }

    /// Builder with the session cookie attached and no `Accept` header.
    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        let url = self.endpoint(path)?;
        debug!(%method, %url, "request");
        let mut builder = self.client.request(method, url);
        if let Some(session) = &self.session {
            builder = builder.header(COOKIE, format!("{SESSION_COOKIE_NAME}={session}"));
        }
        Ok(builder)
    }

    fn json_request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.request(method, path)?.header(ACCEPT, wire::JSON_CONTENT_TYPE))
    }
}

/// Send and decode a JSON body, mapping non-2xx to `ApiError::Http`.
async fn send_json<T: DeserializeOwned>(builder: RequestBuilder) -> Result<T, ApiError> {
    let response = checked(builder).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Send and discard the body.
async fn send_empty(builder: RequestBuilder) -> Result<(), ApiError> {
    checked(builder).await.map(|_| ())
}

async fn checked(builder: RequestBuilder) -> Result<reqwest::Response, ApiError> {
    let response = builder.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ApiError::from_response(status.as_u16(), &body))
}

fn list_params(query: &Query) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> =
        query.tags.iter().map(|tag| ("tag", tag.clone())).collect();
    params.push(("tag_mode", query.tag_mode.as_str().to_string()));
    params.push(("sort", query.sort.as_str().to_string()));
    params.push(("limit", query.limit.to_string()));
    params.push(("offset", query.offset.to_string()));
    params
}

impl BookmarkApi for HttpBookmarkApi {
    async fn list(&self, query: &Query) -> Result<BookmarkPage, ApiError> {
        let builder = self.json_request(Method::GET, wire::BOOKMARKS_PATH)?.query(&list_params(query));
        send_json(builder).await
    }

    async fn search(&self, request: &SearchRequest) -> Result<Vec<Bookmark>, ApiError> {
        let builder = self.json_request(Method::POST, wire::SEARCH_PATH)?.json(request);
        let hits: Vec<SearchHit> = send_json(builder).await?;
        Ok(hits.into_iter().map(SearchHit::into_bookmark).collect())
    }

    async fn get(&self, bookmark_id: &str) -> Result<Bookmark, ApiError> {
        let path = wire::bookmark_path(require_id(bookmark_id)?);
        send_json(self.json_request(Method::GET, &path)?).await
    }

    async fn create(&self, request: &CreateBookmarkRequest) -> Result<Bookmark, ApiError> {
        send_json(self.json_request(Method::POST, wire::BOOKMARKS_PATH)?.json(request)).await
    }

    async fn preview(&self, request: &PreviewRequest) -> Result<Bookmark, ApiError> {
        let builder = self.json_request(Method::POST, wire::PREVIEW_PATH)?.json(request);
        let preview: BookmarkPreview = send_json(builder).await?;
        Ok(preview.into())
    }

    async fn update(
        &self,
        bookmark_id: &str,
        request: &UpdateBookmarkRequest,
    ) -> Result<Bookmark, ApiError> {
        let path = wire::bookmark_path(require_id(bookmark_id)?);
        send_json(self.json_request(Method::PATCH, &path)?.json(request)).await
    }

    async fn delete(&self, bookmark_id: &str) -> Result<(), ApiError> {
        let path = wire::bookmark_path(require_id(bookmark_id)?);
        send_empty(self.json_request(Method::DELETE, &path)?).await
    }

    async fn related(
        &self,
        bookmark_id: &str,
        query: RelatedQuery,
    ) -> Result<Vec<Bookmark>, ApiError> {
        let path = wire::related_path(require_id(bookmark_id)?);
        let builder = self.json_request(Method::GET, &path)?.query(&query);
        let hits: Vec<SearchHit> = send_json(builder).await?;
        Ok(hits.into_iter().map(SearchHit::into_bookmark).collect())
    }

    async fn load(&self, bookmark_id: &str) -> Result<(), ApiError> {
        let path = wire::load_path(require_id(bookmark_id)?);
        send_empty(self.json_request(Method::POST, &path)?).await
    }

    async fn tags(&self) -> Result<Vec<Tag>, ApiError> {
        send_json(self.json_request(Method::GET, wire::TAGS_PATH)?).await
    }

    async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        send_json(self.json_request(Method::GET, wire::CURRENT_USER_PATH)?).await
    }
}

impl SummaryTransport for HttpBookmarkApi {
    async fn open(
        &self,
        bookmark_id: &str,
        request: &SummaryRequest,
    ) -> Result<SummaryResponse, TransportError> {
        let bookmark_id = require_id(bookmark_id).map_err(|e| TransportError(e.to_string()))?;
        let path = wire::summary_path(bookmark_id);

        let mut builder =
            self.request(request.method(), &path).map_err(|e| TransportError(e.to_string()))?;
        let caller_accept =
            request.headers.iter().any(|(name, _)| name.eq_ignore_ascii_case(ACCEPT.as_str()));
        if !caller_accept {
            builder = builder.header(ACCEPT, wire::NDJSON_CONTENT_TYPE);
        }
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body: ByteStream =
            response.bytes_stream().map(|chunk| chunk.map_err(TransportError::from)).boxed();
        Ok(SummaryResponse { status, body: Some(body) })
    }
}
