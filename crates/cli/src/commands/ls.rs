// `bookmemory ls`: list bookmarks page by page, optionally filtered by tag.

use bookmemory_client::api::BookmarkApi;
use bookmemory_client::sync::BookmarkSync;
use bookmemory_common::query::QueryParams;
use bookmemory_common::types::{Bookmark, Sort, TagMode};
use clap::Args;
use serde::Serialize;

use crate::context::{self, Context};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct LsArgs {
    /// Only bookmarks carrying this tag (repeatable).
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// How several tags combine: any, all or ignore. Defaults to `any` when
    /// tags are given.
    #[arg(long)]
    mode: Option<TagMode>,

    /// recent or alphabetical.
    #[arg(long)]
    sort: Option<Sort>,

    /// Page size; falls back to the configured page limit.
    #[arg(long)]
    limit: Option<u32>,

    #[arg(long, default_value_t = 0)]
    offset: u32,

    /// Follow the cursor for this many pages.
    #[arg(long, default_value_t = 1)]
    pages: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct LsResult {
    pub bookmarks: Vec<Bookmark>,
    pub total: u32,
    pub next_offset: u32,
    pub has_more: bool,
    pub has_bookmarks: bool,
}

pub fn run(args: LsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load(format)?;
    let result = context::block_on(list(&ctx.sync, args))??;
    output::print_output(format, &result, format_human)?;
    Ok(())
}

async fn list<A: BookmarkApi>(sync: &BookmarkSync<A>, args: LsArgs) -> anyhow::Result<LsResult> {
    if let Some(sort) = args.sort {
        sync.set_sort(sort);
    }
    if !args.tags.is_empty() {
        sync.set_selected_tags(args.tags);
        sync.set_selected_tag_mode(args.mode.unwrap_or(TagMode::Any));
    } else if let Some(mode) = args.mode {
        sync.set_selected_tag_mode(mode);
    }

    let mut params = QueryParams::first_page().with_offset(args.offset);
    if let Some(limit) = args.limit {
        params = params.with_limit(limit);
    }
    context::fetched(sync.list_page(params).await)?;

    for _ in 1..args.pages {
        if !sync.snapshot().has_more() {
            break;
        }
        context::fetched(sync.list_page(QueryParams::default()).await)?;
    }

    let state = sync.snapshot();
    Ok(LsResult {
        has_more: state.has_more(),
        bookmarks: state.bookmarks,
        total: state.total,
        next_offset: state.offset,
        has_bookmarks: state.user_has_bookmarks,
    })
}

fn format_human(result: &LsResult) -> String {
    if result.bookmarks.is_empty() {
        return if result.total == 0 && !result.has_bookmarks {
            "No bookmarks yet. Add one with: bookmemory add".into()
        } else {
            "No bookmarks match.".into()
        };
    }

    let mut lines = vec![output::bookmark_list(&result.bookmarks)];
    lines.push(format!("{} of {} bookmark(s)", result.next_offset, result.total));
    if result.has_more {
        lines.push(format!("more: bookmemory ls --offset {}", result.next_offset));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmemory_common::types::BookmarkType;

    fn bookmark(id: &str) -> Bookmark {
        Bookmark {
            id: id.into(),
            title: format!("Bookmark {id}"),
            description: None,
            summary: None,
            url: None,
            kind: BookmarkType::Link,
            tags: Vec::new(),
            status: None,
            created_at: None,
            updated_at: None,
            snippet: None,
            preview: None,
        }
    }

    #[test]
    fn human_format_shows_progress_and_next_offset() {
        let result = LsResult {
            bookmarks: vec![bookmark("1"), bookmark("2")],
            total: 5,
            next_offset: 2,
            has_more: true,
            has_bookmarks: true,
        };
        let output = format_human(&result);
        assert!(output.contains("1  Bookmark 1"));
        assert!(output.contains("2 of 5 bookmark(s)"));
        assert!(output.contains("--offset 2"));
    }

    #[test]
    fn empty_collection_and_empty_filter_differ() {
        let mut result = LsResult {
            bookmarks: Vec::new(),
            total: 0,
            next_offset: 0,
            has_more: false,
            has_bookmarks: false,
        };
        assert!(format_human(&result).contains("No bookmarks yet"));

        result.has_bookmarks = true;
        assert_eq!(format_human(&result), "No bookmarks match.");
    }
}
