// `bookmemory summary`: stream an AI summary for a bookmark to stdout.

use std::io::{self, Write};

use anyhow::Context as _;
use bookmemory_client::summary::{StreamOutcome, SummaryStore};
use clap::Args;
use serde_json::json;

use crate::context::{self, Context};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct SummaryArgs {
    id: String,
}

pub fn run(args: SummaryArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load(format)?;
    let store = SummaryStore::new(ctx.api.clone(), ctx.sync.clone());
    let live = format == OutputFormat::Human;

    let (outcome, summary) = context::block_on(async {
        let mut updates = store.subscribe();
        let mut handle = store.start(args.id.clone());
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);
        let mut interrupted = false;
        let mut printed = 0;

        let outcome = loop {
            tokio::select! {
                biased;
                _ = &mut ctrl_c, if !interrupted => {
                    interrupted = true;
                    store.stop();
                }
                changed = updates.changed() => {
                    if changed.is_err() {
                        break (&mut handle).await;
                    }
                    if live {
                        let text = updates.borrow_and_update().summary.clone();
                        printed = print_delta(&text, printed)?;
                    }
                }
                outcome = &mut handle => break outcome,
            }
        };
        let outcome = outcome.context("summary task failed")?;

        let summary = store.snapshot().summary;
        if live {
            print_delta(&summary, printed)?;
            println!();
        }
        anyhow::Ok((outcome, summary))
    })??;

    match outcome {
        StreamOutcome::Completed => {
            if !live {
                let result = json!({ "id": args.id, "summary": summary });
                output::print_output(format, &result, |_| String::new())?;
            }
            Ok(())
        }
        StreamOutcome::Failed(err) => {
            Err(anyhow::anyhow!("summary failed ({}): {}", err.code, err.message))
        }
        StreamOutcome::Aborted => Err(anyhow::anyhow!("summary cancelled")),
    }
}

/// Write the part of `text` not yet printed; returns the new printed length.
fn print_delta(text: &str, printed: usize) -> io::Result<usize> {
    let Some(delta) = text.get(printed..) else {
        return Ok(printed);
    };
    if !delta.is_empty() {
        let mut out = io::stdout().lock();
        out.write_all(delta.as_bytes())?;
        out.flush()?;
    }
    Ok(text.len())
}
