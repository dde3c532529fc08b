// `bookmemory tags`: every tag with its usage count.

use bookmemory_common::types::Tag;
use clap::Args;

use crate::context::{self, Context};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct TagsArgs {}

pub fn run(_args: TagsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load(format)?;
    let tags = context::block_on(async {
        context::fetched(ctx.sync.load_tags().await)?;
        anyhow::Ok(ctx.sync.snapshot().tags)
    })??;

    output::print_output(format, &tags, |tags| format_human(tags))?;
    Ok(())
}

fn format_human(tags: &[Tag]) -> String {
    if tags.is_empty() {
        return "No tags.".into();
    }
    let width = tags.iter().map(|tag| tag.name.len()).max().unwrap_or(0);
    tags.iter()
        .map(|tag| format!("{:width$}  {}", tag.name, tag.count))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn human_format_aligns_counts() {
        let tags = vec![
            Tag { name: "rust".into(), count: 12 },
            Tag { name: "databases".into(), count: 3 },
        ];
        assert_eq!(format_human(&tags), "rust       12\ndatabases  3");
    }

    #[test]
    fn human_format_empty() {
        assert_eq!(format_human(&[]), "No tags.");
    }
}
