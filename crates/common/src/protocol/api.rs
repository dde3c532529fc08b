// REST request/response envelopes and paths for the bookmemory service.

use serde::{Deserialize, Serialize};

use crate::types::{Bookmark, BookmarkType, PreviewDetails, TagMode};

pub const BOOKMARKS_PATH: &str = "/api/v1/bookmarks/";
pub const SEARCH_PATH: &str = "/api/v1/bookmarks/search";
pub const PREVIEW_PATH: &str = "/api/v1/bookmarks/preview";
pub const TAGS_PATH: &str = "/api/v1/tags";
pub const CURRENT_USER_PATH: &str = "/api/v1/users/me";

pub const JSON_CONTENT_TYPE: &str = "application/json";
pub const NDJSON_CONTENT_TYPE: &str = "application/x-ndjson";

/// `/api/v1/bookmarks/{id}`
pub fn bookmark_path(bookmark_id: &str) -> String {
    format!("/api/v1/bookmarks/{bookmark_id}")
}

/// `/api/v1/bookmarks/{id}/related`
pub fn related_path(bookmark_id: &str) -> String {
    format!("/api/v1/bookmarks/{bookmark_id}/related")
}

/// `/api/v1/bookmarks/{id}/load`
pub fn load_path(bookmark_id: &str) -> String {
    format!("/api/v1/bookmarks/{bookmark_id}/load")
}

/// `/api/v1/bookmarks/{id}/summary`
pub fn summary_path(bookmark_id: &str) -> String {
    format!("/api/v1/bookmarks/{bookmark_id}/summary")
}

/// Limit/offset page returned by the list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BookmarkPage {
    #[serde(default)]
    pub items: Vec<Bookmark>,
    pub total: u32,
    pub limit: u32,
    pub offset: u32,
}

/// One ranked hit from the search or related endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchHit {
    pub bookmark: Bookmark,
    #[serde(default)]
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
}

impl SearchHit {
    /// Flatten the hit into a bookmark carrying its snippet.
    pub fn into_bookmark(self) -> Bookmark {
        let mut bookmark = self.bookmark;
        if !self.snippet.is_empty() {
            bookmark.snippet = Some(self.snippet);
        }
        bookmark
    }
}

/// Body of `POST /api/v1/bookmarks/search`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchRequest {
    pub search: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_mode: Option<TagMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Query string of `GET /api/v1/bookmarks/{id}/related`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RelatedQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_mode: Option<TagMode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

/// Body of `POST /api/v1/bookmarks/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateBookmarkRequest {
    #[serde(rename = "type", default)]
    pub kind: BookmarkType,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Body of `POST /api/v1/bookmarks/preview`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreviewRequest {
    #[serde(rename = "type", default)]
    pub kind: BookmarkType,
    pub url: String,
}

/// Body of `PATCH /api/v1/bookmarks/{id}`. Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateBookmarkRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
}

/// Response of `POST /api/v1/bookmarks/preview`. Has no id: nothing is stored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookmarkPreview {
    #[serde(rename = "type", default)]
    pub kind: BookmarkType,
    pub url: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub load_method: Option<String>,
    #[serde(default)]
    pub content_preview: Option<String>,
}

impl From<BookmarkPreview> for Bookmark {
    fn from(preview: BookmarkPreview) -> Self {
        Bookmark {
            id: String::new(),
            title: preview.title,
            description: preview.description,
            summary: None,
            url: Some(preview.url),
            kind: preview.kind,
            tags: Vec::new(),
            status: None,
            created_at: None,
            updated_at: None,
            snippet: None,
            preview: Some(PreviewDetails {
                load_method: preview.load_method,
                content_preview: preview.content_preview,
            }),
        }
    }
}
