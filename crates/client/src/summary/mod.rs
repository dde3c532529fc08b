// Live AI summary: NDJSON stream consumer and the store it feeds.

pub mod store;
pub mod stream;

pub use store::{BookmarkRefresher, SummaryState, SummaryStore};
pub use stream::{
    stream_summary, ByteStream, StreamOutcome, SummaryEvents, SummaryRequest, SummaryResponse,
    SummaryTransport, TransportError,
};
