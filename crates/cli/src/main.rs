// bookmemory CLI entry point.

use std::process;

use clap::Parser;

mod commands;
mod context;
mod exit_code;
mod output;

use exit_code::ExitCode;
use output::OutputFormat;

#[derive(Parser)]
#[command(name = "bookmemory", about = "Bookmarks with semantic search and AI summaries")]
struct Cli {
    /// Force JSON output.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: commands::Command,
}

fn main() -> process::ExitCode {
    // Logs go to stderr so stdout stays parseable.
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let format = OutputFormat::detect(cli.json);
    match commands::run(cli.command, format) {
        Ok(()) => ExitCode::Success.into(),
        Err(err) => {
            output::print_anyhow_error(format, &err);
            ExitCode::from_error(&err).into()
        }
    }
}
