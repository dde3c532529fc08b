// Wire protocol for the bookmemory HTTP service.

pub mod api;
pub mod summary;
