// Signed-in status of the current user.

use bookmemory_common::types::CurrentUser;
use tracing::debug;

use crate::api::BookmarkApi;
use crate::error::ApiError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionStatus {
    /// Not resolved yet.
    #[default]
    Loading,
    SignedOut,
    SignedIn(CurrentUser),
    Error(String),
}

impl SessionStatus {
    /// A 401 means signed out, not failure.
    pub fn from_result(result: Result<CurrentUser, ApiError>) -> Self {
        match result {
            Ok(user) => Self::SignedIn(user),
            Err(err) if err.is_unauthorized() => Self::SignedOut,
            Err(ApiError::Http { status, .. }) => Self::Error(format!("Request failed: {status}")),
            Err(_) => Self::Error("Network error".into()),
        }
    }

    pub fn user(&self) -> Option<&CurrentUser> {
        match self {
            Self::SignedIn(user) => Some(user),
            _ => None,
        }
    }
}

/// Resolve the session by asking the service who we are.
pub async fn current_session<A: BookmarkApi>(api: &A) -> SessionStatus {
    let status = SessionStatus::from_result(api.current_user().await);
    debug!(?status, "resolved session");
    status
}
