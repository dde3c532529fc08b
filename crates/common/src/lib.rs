// bookmemory-common: wire types, query normalization and the summary stream protocol

pub mod protocol;
pub mod query;
pub mod types;
