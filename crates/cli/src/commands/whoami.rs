// `bookmemory whoami`: resolve the session cookie to a user.

use bookmemory_client::error::ApiError;
use bookmemory_client::session::{current_session, SessionStatus};
use bookmemory_common::types::CurrentUser;
use clap::Args;

use crate::context::{self, Context};
use crate::output::{self, OutputFormat};

#[derive(Debug, Args)]
pub struct WhoamiArgs {}

pub fn run(_args: WhoamiArgs, format: OutputFormat) -> anyhow::Result<()> {
    let ctx = Context::load(format)?;
    let status = context::block_on(current_session(ctx.api.as_ref()))?;
    let user = signed_in(status)?;
    output::print_output(format, &user, format_human)?;
    Ok(())
}

fn signed_in(status: SessionStatus) -> anyhow::Result<CurrentUser> {
    match status {
        SessionStatus::SignedIn(user) => Ok(user),
        SessionStatus::SignedOut => Err(ApiError::from_response(401, "").into()),
        SessionStatus::Error(message) => Err(anyhow::anyhow!(message)),
        SessionStatus::Loading => Err(anyhow::anyhow!("session not resolved")),
    }
}

fn format_human(user: &CurrentUser) -> String {
    match &user.name {
        Some(name) if !name.is_empty() => format!("{name} <{}>", user.email),
        _ => user.email.clone(),
    }
}
