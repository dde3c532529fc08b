// Local state owned by the sync layer.

pub mod collection;
pub mod pending;

pub use collection::{Action, CollectionState};
pub use pending::PendingRequests;
