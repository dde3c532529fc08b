// `bookmemory preview`: fetch title and content for a URL without saving.

use bookmemory_common::protocol::api::PreviewRequest;
use bookmemory_common::types::BookmarkType;
use clap::Args;

use crate::commands::show::format_bookmark;
use crate::context::{self, Context};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct PreviewArgs {
    url: String,

    /// link, note or file.
    #[arg(long = "type", default_value = "link")]
    kind: BookmarkType,
}

pub fn run(args: PreviewArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load(format)?;
    let request = PreviewRequest { kind: args.kind, url: args.url };
    let preview = context::block_on(async { context::mutated(ctx.sync.preview(request).await) })??;
    output::print_output(format, &preview, format_bookmark)?;
    Ok(())
}
