// `bookmemory edit`: change selected fields of a bookmark.

use bookmemory_common::protocol::api::UpdateBookmarkRequest;
use clap::Args;

use crate::commands::show::format_bookmark;
use crate::context::{self, Context};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct EditArgs {
    id: String,

    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    url: Option<String>,

    #[arg(long)]
    description: Option<String>,

    #[arg(long)]
    summary: Option<String>,

    /// Replace the tag set (repeatable).
    #[arg(long = "tag", value_name = "TAG")]
    tags: Vec<String>,

    /// Remove every tag.
    #[arg(long, conflicts_with = "tags")]
    clear_tags: bool,
}

impl EditArgs {
    fn request(&self) -> UpdateBookmarkRequest {
        let tags = if self.clear_tags {
            Some(Vec::new())
        } else {
            (!self.tags.is_empty()).then(|| self.tags.clone())
        };
        UpdateBookmarkRequest {
            title: self.title.clone(),
            url: self.url.clone(),
            description: self.description.clone(),
            summary: self.summary.clone(),
            tags,
        }
    }
}

pub fn run(args: EditArgs, format: OutputFormat) -> anyhow::Result<()> {
    let request = args.request();
    if request == UpdateBookmarkRequest::default() {
        anyhow::bail!("nothing to change; pass at least one field");
    }
    let ctx = Context::load(format)?;
    let updated =
        context::block_on(async { context::mutated(ctx.sync.update(&args.id, request).await) })??;
    output::print_output(format, &updated, format_bookmark)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> EditArgs {
        EditArgs {
            id: "b1".into(),
            title: None,
            url: None,
            description: None,
            summary: None,
            tags: Vec::new(),
            clear_tags: false,
        }
    }

    #[test]
    fn only_given_fields_are_sent() {
        let request = EditArgs { title: Some("Renamed".into()), ..args() }.request();
        assert_eq!(request, UpdateBookmarkRequest { title: Some("Renamed".into()), ..Default::default() });
    }

    #[test]
    fn clear_tags_sends_empty_set() {
        let request = EditArgs { clear_tags: true, ..args() }.request();
        assert_eq!(request.tags, Some(Vec::new()));
    }

    #[test]
    fn no_flags_is_an_empty_update() {
        assert_eq!(args().request(), UpdateBookmarkRequest::default());
    }
}
