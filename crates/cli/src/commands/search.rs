// `bookmemory search`: ranked semantic search.

use bookmemory_client::sync::SearchParams;
use bookmemory_common::types::{Bookmark, TagMode};
use clap::Args;

use crate::context::{self, Context};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Free-text query.
    query: String,

    /// Restrict to bookmarks carrying this tag (repeatable).
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// any, all or ignore.
    #[arg(long)]
    mode: Option<TagMode>,

    #[arg(long)]
    limit: Option<u32>,
}

pub fn run(args: SearchArgs, format: OutputFormat) -> anyhow::Result<()> {
    if args.query.trim().is_empty() {
        anyhow::bail!("search query must not be empty");
    }
    let ctx = Context::load(format)?;

    let params = SearchParams {
        tags: (!args.tags.is_empty()).then_some(args.tags),
        tag_mode: args.mode,
        limit: args.limit,
        ..SearchParams::new(args.query)
    };
    let bookmarks = context::block_on(async {
        context::fetched(ctx.sync.search_page(params).await)?;
        anyhow::Ok(ctx.sync.snapshot().bookmarks)
    })??;

    output::print_output(format, &bookmarks, |bookmarks| format_human(bookmarks))?;
    Ok(())
}

fn format_human(bookmarks: &[Bookmark]) -> String {
    if bookmarks.is_empty() {
        return "No results.".into();
    }
    format!("{}\n{} result(s)", output::bookmark_list(bookmarks), bookmarks.len())
}
