// `bookmemory show`: one bookmark in full, optionally with related ones.

use bookmemory_common::protocol::api::RelatedQuery;
use bookmemory_common::types::Bookmark;
use clap::Args;
use serde::Serialize;

use crate::context::{self, Context};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct ShowArgs {
    id: String,

    /// Also list related bookmarks.
    #[arg(long)]
    related: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShowResult {
    pub bookmark: Bookmark,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related: Option<Vec<Bookmark>>,
}

pub fn run(args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load(format)?;
    let result = context::block_on(async {
        let bookmark = ctx.sync.refresh_bookmark(&args.id).await?;
        let related = if args.related {
            context::fetched(ctx.sync.related_bookmarks(&args.id, RelatedQuery::default()).await)?;
            Some(ctx.sync.snapshot().related)
        } else {
            None
        };
        anyhow::Ok(ShowResult { bookmark, related })
    })??;

    output::print_output(format, &result, format_human)?;
    Ok(())
}

/// Title, metadata block, then free text.
pub fn format_bookmark(bookmark: &Bookmark) -> String {
    let mut lines = vec![bookmark.title.clone()];
    if !bookmark.id.is_empty() {
        lines.push(format!("  id:      {}", bookmark.id));
    }
    lines.push(format!("  type:    {}", bookmark.kind.as_str()));
    if let Some(url) = &bookmark.url {
        lines.push(format!("  url:     {url}"));
    }
    if !bookmark.tags.is_empty() {
        lines.push(format!("  tags:    {}", bookmark.tags.join(", ")));
    }
    if let Some(status) = &bookmark.status {
        lines.push(format!("  status:  {status}"));
    }
    if let Some(created_at) = bookmark.created_at {
        lines.push(format!("  created: {}", created_at.format("%Y-%m-%d %H:%M")));
    }
    if let Some(description) = bookmark.description.as_deref().filter(|d| !d.is_empty()) {
        lines.push(String::new());
        lines.push(description.to_string());
    }
    if let Some(summary) = bookmark.summary.as_deref().filter(|s| !s.is_empty()) {
        lines.push(String::new());
        lines.push("Summary:".into());
        lines.push(summary.to_string());
    }
    if let Some(content) =
        bookmark.preview.as_ref().and_then(|preview| preview.content_preview.as_deref())
    {
        lines.push(String::new());
        lines.push(content.to_string());
    }
    lines.join("\n")
}

fn format_human(result: &ShowResult) -> String {
    let mut out = format_bookmark(&result.bookmark);
    if let Some(related) = &result.related {
        out.push_str("\n\nRelated:\n");
        if related.is_empty() {
            out.push_str("  none");
        } else {
            out.push_str(&output::bookmark_list(related));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmemory_common::types::{BookmarkType, PreviewDetails};

    fn bookmark() -> Bookmark {
        Bookmark {
            id: "b1".into(),
            title: "Tokio".into(),
            description: Some("Async runtime".into()),
            summary: Some("Tokio schedules tasks.".into()),
            url: Some("https://tokio.rs".into()),
            kind: BookmarkType::Link,
            tags: vec!["rust".into()],
            status: Some("loaded".into()),
            created_at: None,
            updated_at: None,
            snippet: None,
            preview: None,
        }
    }

    #[test]
    fn detail_view_lists_metadata_then_text() {
        let out = format_bookmark(&bookmark());
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Tokio");
        assert!(out.contains("  url:     https://tokio.rs"));
        assert!(out.contains("  tags:    rust"));
        assert!(out.contains("Summary:\nTokio schedules tasks."));
    }

    #[test]
    fn preview_has_no_id_line_but_shows_content() {
        let preview = Bookmark {
            id: String::new(),
            summary: None,
            preview: Some(PreviewDetails {
                load_method: Some("http".into()),
                content_preview: Some("Tokio is a runtime".into()),
            }),
            ..bookmark()
        };
        let out = format_bookmark(&preview);
        assert!(!out.contains("id:"));
        assert!(out.ends_with("Tokio is a runtime"));
    }

    #[test]
    fn related_section_only_when_requested() {
        let result = ShowResult { bookmark: bookmark(), related: None };
        assert!(!format_human(&result).contains("Related:"));

        let result = ShowResult { bookmark: bookmark(), related: Some(Vec::new()) };
        assert!(format_human(&result).ends_with("Related:\n  none"));
    }
}
