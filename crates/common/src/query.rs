// Query normalization: effective list/search parameters and their canonical key.

use serde::{Deserialize, Serialize};

use crate::types::{Sort, TagMode};

/// Fully resolved list query.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Query {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub tag_mode: TagMode,
    #[serde(default)]
    pub sort: Sort,
    pub limit: u32,
    pub offset: u32,
}

/// Caller-supplied overrides. Unset fields fall back to the store's state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParams {
    pub search: Option<String>,
    pub tags: Option<Vec<String>>,
    pub tag_mode: Option<TagMode>,
    pub sort: Option<Sort>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

impl QueryParams {
    /// First page of whatever the store currently shows.
    pub fn first_page() -> Self {
        Self { offset: Some(0), ..Self::default() }
    }

    pub fn with_search(mut self, search: impl Into<String>) -> Self {
        self.search = Some(search.into());
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>, mode: TagMode) -> Self {
        self.tags = Some(tags);
        self.tag_mode = Some(mode);
        self
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn with_limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    /// Merge over `base`; explicit params win. A zero limit is treated as unset.
    pub fn resolve(&self, base: &Query) -> Query {
        Query {
            search: self.search.clone().or_else(|| base.search.clone()),
            tags: self.tags.clone().unwrap_or_else(|| base.tags.clone()),
            tag_mode: self.tag_mode.unwrap_or(base.tag_mode),
            sort: self.sort.unwrap_or(base.sort),
            limit: self.limit.filter(|limit| *limit > 0).unwrap_or(base.limit),
            offset: self.offset.unwrap_or(base.offset),
        }
    }
}

impl Query {
    /// Trimmed search text, or `None` when the query belongs on the list path.
    pub fn search_text(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|text| !text.is_empty())
    }

    /// True when the tag filter actually restricts results.
    pub fn has_tag_filter(&self) -> bool {
        !self.tags.is_empty() && self.tag_mode != TagMode::Ignore
    }

    /// Unfiltered queries see the whole collection: no search, no active tag
    /// filter, first page.
    pub fn is_unfiltered(&self) -> bool {
        self.search_text().is_none() && !self.has_tag_filter() && self.offset == 0
    }

    /// Deterministic identity for deduplicating in-flight requests.
    ///
    /// JSON of the query with tags sorted, so tag order never changes the key.
    pub fn canonical_key(&self) -> String {
        let mut tags = self.tags.clone();
        tags.sort();
        serde_json::json!({
            "search": self.search_text(),
            "tags": tags,
            "tag_mode": self.tag_mode,
            "sort": self.sort,
            "limit": self.limit,
            "offset": self.offset,
        })
        .to_string()
    }
}
