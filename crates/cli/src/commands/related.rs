// `bookmemory related`: bookmarks sharing tags or meaning with one bookmark.

use bookmemory_common::protocol::api::RelatedQuery;
use bookmemory_common::types::TagMode;
use clap::Args;

use crate::context::{self, Context};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct RelatedArgs {
    id: String,

    /// any, all or ignore.
    #[arg(long)]
    mode: Option<TagMode>,

    #[arg(long)]
    limit: Option<u32>,
}

pub fn run(args: RelatedArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load(format)?;
    let query = RelatedQuery { tag_mode: args.mode, limit: args.limit };
    let related = context::block_on(async {
        context::fetched(ctx.sync.related_bookmarks(&args.id, query).await)?;
        anyhow::Ok(ctx.sync.snapshot().related)
    })??;

    output::print_output(format, &related, |related| {
        if related.is_empty() {
            "No related bookmarks.".to_string()
        } else {
            output::bookmark_list(related)
        }
    })?;
    Ok(())
}
