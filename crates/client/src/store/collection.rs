// Bookmark collection state machine.
//
// State changes only through `CollectionState::reduce`, which handles every
// `Action`. The sync layer owns one instance behind a lock and reads it by
// snapshot.

use bookmemory_common::protocol::api::BookmarkPage;
use bookmemory_common::query::Query;
use bookmemory_common::types::{Bookmark, Sort, Tag, TagMode};

use crate::config::{ClientConfig, DEFAULT_PAGE_LIMIT};

#[derive(Debug, Clone, PartialEq)]
pub struct CollectionState {
    pub is_loading: bool,
    pub bookmarks: Vec<Bookmark>,
    pub total: u32,
    pub limit: u32,
    /// Next offset to request: received offset plus items actually received.
    pub offset: u32,
    pub sort: Sort,
    pub search: String,
    pub selected_tags: Vec<String>,
    pub selected_tag_mode: TagMode,
    /// Whether the unfiltered collection is non-empty.
    pub user_has_bookmarks: bool,
    /// The bookmark being viewed or edited. Replaced wholesale.
    pub focused: Option<Bookmark>,
    pub related: Vec<Bookmark>,
    pub tags: Vec<Tag>,
}

impl Default for CollectionState {
    fn default() -> Self {
        Self {
            is_loading: false,
            bookmarks: Vec::new(),
            total: 0,
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
            sort: Sort::default(),
            search: String::new(),
            selected_tags: Vec::new(),
            selected_tag_mode: TagMode::default(),
            user_has_bookmarks: false,
            focused: None,
            related: Vec::new(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SetLoading(bool),
    /// A list page arrived. `unfiltered` marks responses that may update
    /// `user_has_bookmarks`.
    PageReceived { page: BookmarkPage, unfiltered: bool },
    SearchResultsReceived(Vec<Bookmark>),
    RelatedReceived(Vec<Bookmark>),
    TagsReceived(Vec<Tag>),
    FocusSet(Bookmark),
    SortSet(Sort),
    SearchSet(String),
    SelectedTagsSet(Vec<String>),
    SelectedTagModeSet(TagMode),
}

impl CollectionState {
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            limit: config.page_limit.max(1),
            sort: config.sort,
            selected_tag_mode: config.tag_mode,
            ..Self::default()
        }
    }

    pub fn reduce(&mut self, action: Action) {
        match action {
            Action::SetLoading(is_loading) => self.is_loading = is_loading,
            Action::PageReceived { page, unfiltered } => {
                let received = u32::try_from(page.items.len()).unwrap_or(u32::MAX);
                if page.offset == 0 {
                    self.bookmarks = page.items;
                } else {
                    self.bookmarks.extend(page.items);
                }
                if unfiltered {
                    self.user_has_bookmarks = page.total > 0;
                }
                self.total = page.total;
                self.limit = page.limit;
                self.offset = page.offset.saturating_add(received);
            }
            Action::SearchResultsReceived(bookmarks) => {
                let count = u32::try_from(bookmarks.len()).unwrap_or(u32::MAX);
                self.bookmarks = bookmarks;
                self.total = count;
                self.offset = count;
            }
            Action::RelatedReceived(related) => self.related = related,
            Action::TagsReceived(tags) => self.tags = tags,
            Action::FocusSet(bookmark) => self.focused = Some(bookmark),
            Action::SortSet(sort) => self.sort = sort,
            Action::SearchSet(search) => self.search = search,
            Action::SelectedTagsSet(tags) => self.selected_tags = tags,
            Action::SelectedTagModeSet(mode) => self.selected_tag_mode = mode,
        }
    }

    /// The query the current state represents, used as the base for request
    /// parameters.
    pub fn query(&self) -> Query {
        Query {
            search: Some(self.search.clone()).filter(|search| !search.is_empty()),
            tags: self.selected_tags.clone(),
            tag_mode: self.selected_tag_mode,
            sort: self.sort,
            limit: self.limit,
            offset: self.offset,
        }
    }

    /// More pages are available on the list path.
    pub fn has_more(&self) -> bool {
        self.offset < self.total
    }
}
