// `bookmemory add`: save a bookmark and start indexing it.

use std::time::Duration;

use bookmemory_common::protocol::api::CreateBookmarkRequest;
use bookmemory_common::types::BookmarkType;
use clap::Args;

use crate::commands::show::format_bookmark;
use crate::context::{self, Context};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct AddArgs {
    /// URL to save. Required for links.
    url: Option<String>,

    #[arg(long)]
    title: String,

    #[arg(long, default_value = "")]
    description: String,

    /// link, note or file.
    #[arg(long = "type", default_value = "link")]
    kind: BookmarkType,

    /// Tag to attach (repeatable).
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,
}

impl AddArgs {
    fn into_request(self) -> anyhow::Result<CreateBookmarkRequest> {
        if self.title.trim().is_empty() {
            anyhow::bail!("--title must not be empty");
        }
        if self.kind == BookmarkType::Link && self.url.as_deref().is_none_or(str::is_empty) {
            anyhow::bail!("a link bookmark needs a URL");
        }
        Ok(CreateBookmarkRequest {
            kind: self.kind,
            title: self.title,
            description: self.description,
            url: self.url,
            tags: self.tags,
        })
    }
}

/// How long to wait for the content load before the runtime shuts down.
const LOAD_GRACE: Duration = Duration::from_secs(5);

pub fn run(args: AddArgs, format: OutputFormat) -> anyhow::Result<()> {
    let request = args.into_request()?;
    let ctx = Context::load(format)?;
    context::block_on(async {
        let created = context::mutated(ctx.sync.create(request).await)?;
        output::print_output(format, &created, format_bookmark)?;
        // Spawned tasks die with the runtime.
        ctx.sync.drain_background(LOAD_GRACE).await;
        anyhow::Ok(())
    })?
}
