// Shared command plumbing: configuration, the sync core and a runtime.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use anyhow::Context as _;
use bookmemory_client::api::HttpBookmarkApi;
use bookmemory_client::config::ClientConfig;
use bookmemory_client::error::ApiError;
use bookmemory_client::notify::Notifier;
use bookmemory_client::store::CollectionState;
use bookmemory_client::sync::{BookmarkSync, FetchOutcome};
use tracing::debug;

use crate::output::{self, OutputFormat};

/// Everything a command needs to talk to the service.
pub struct Context {
    pub api: Arc<HttpBookmarkApi>,
    pub sync: BookmarkSync<HttpBookmarkApi>,
}

impl Context {
    pub fn load(format: OutputFormat) -> anyhow::Result<Self> {
        let config = ClientConfig::load();
        let base_url = config.base_url().context("invalid api_url")?;
        debug!(api_url = %base_url, signed_in = config.session.is_some(), "client configured");
        let api = Arc::new(HttpBookmarkApi::new(base_url, config.session.clone())?);
        let sync = BookmarkSync::new(
            api.clone(),
            Arc::new(StderrNotifier { format }),
            CollectionState::from_config(&config),
        );
        Ok(Self { api, sync })
    }
}

/// Run a command body on a fresh current-thread runtime.
pub fn block_on<F: Future>(future: F) -> anyhow::Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    Ok(runtime.block_on(future))
}

/// Prints notifications as they happen.
struct StderrNotifier {
    format: OutputFormat,
}

impl Notifier for StderrNotifier {
    fn error(&self, message: &str) {
        output::print_error(self.format, "REQUEST_FAILED", message);
    }
}

/// An API failure already shown to the user by the notifier.
#[derive(Debug)]
pub struct Reported(pub ApiError);

impl fmt::Display for Reported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::error::Error for Reported {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.0)
    }
}

/// Turn a fetch outcome into a command result. Failures were notified.
pub fn fetched(outcome: FetchOutcome) -> anyhow::Result<()> {
    match outcome {
        FetchOutcome::Failed(err) => Err(Reported(err).into()),
        FetchOutcome::Applied | FetchOutcome::Duplicate | FetchOutcome::Stale => Ok(()),
    }
}

/// Mutations notify and return their error.
pub fn mutated<T>(result: Result<T, ApiError>) -> anyhow::Result<T> {
    result.map_err(|err| Reported(err).into())
}
