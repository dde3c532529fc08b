// CLI subcommand dispatch.

use clap::Subcommand;

use crate::output::OutputFormat;

pub mod add;
pub mod edit;
pub mod ls;
pub mod preview;
pub mod related;
pub mod rm;
pub mod search;
pub mod show;
pub mod summary;
pub mod tags;
pub mod whoami;

#[derive(Subcommand)]
pub enum Command {
    /// List bookmarks, one page at a time
    Ls(ls::LsArgs),
    /// Semantic search across bookmarks
    Search(search::SearchArgs),
    /// Show one bookmark
    Show(show::ShowArgs),
    /// Bookmarks related to one bookmark
    Related(related::RelatedArgs),
    /// List tags with usage counts
    Tags(tags::TagsArgs),
    /// Inspect a URL without saving it
    Preview(preview::PreviewArgs),
    /// Save a new bookmark
    Add(add::AddArgs),
    /// Change a bookmark's fields
    Edit(edit::EditArgs),
    /// Delete a bookmark
    Rm(rm::RmArgs),
    /// Stream an AI summary for a bookmark
    Summary(summary::SummaryArgs),
    /// Show the signed-in user
    Whoami(whoami::WhoamiArgs),
}

pub fn run(cmd: Command, format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        Command::Ls(args) => ls::run(args, format),
        Command::Search(args) => search::run(args, format),
        Command::Show(args) => show::run(args, format),
        Command::Related(args) => related::run(args, format),
        Command::Tags(args) => tags::run(args, format),
        Command::Preview(args) => preview::run(args, format),
        Command::Add(args) => add::run(args, format),
        Command::Edit(args) => edit::run(args, format),
        Command::Rm(args) => rm::run(args, format),
        Command::Summary(args) => summary::run(args, format),
        Command::Whoami(args) => whoami::run(args, format),
    }
}
