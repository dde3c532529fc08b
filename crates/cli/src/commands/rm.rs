// `bookmemory rm`: delete a bookmark.

use clap::Args;
use serde_json::json;

use crate::context::{self, Context};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct RmArgs {
    id: String,
}

pub fn run(args: RmArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load(format)?;
    let remaining = context::block_on(async {
        context::mutated(ctx.sync.delete(&args.id).await)?;
        anyhow::Ok(ctx.sync.snapshot().total)
    })??;

    let result = json!({ "deleted": &args.id, "remaining": remaining });
    output::print_output(format, &result, |_| {
        format!("Deleted {}. {remaining} bookmark(s) left.", args.id)
    })?;
    Ok(())
}
