// bookmemory-client: remote API seam, collection sync core and live summaries

pub mod api;
pub mod config;
pub mod error;
pub mod notify;
pub mod session;
pub mod store;
pub mod summary;
pub mod sync;

pub use api::{BookmarkApi, HttpBookmarkApi};
pub use config::ClientConfig;
pub use error::ApiError;
pub use notify::{Notifier, TracingNotifier};
pub use session::SessionStatus;
pub use store::CollectionState;
pub use summary::SummaryStore;
pub use sync::{BookmarkSync, FetchOutcome, SearchParams};
