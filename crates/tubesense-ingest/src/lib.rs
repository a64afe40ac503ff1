//! Ingest layer: remote API client with retry/backoff, typed wire records, and
//! the paginated comment collector.

pub mod client;
pub mod collector;
pub mod error;
pub mod quota;
pub mod target;
pub mod transport;
mod wire;

#[cfg(test)]
mod testing;

pub use client::{RemoteClient, RetryPolicy, YOUTUBE_API_BASE};
pub use collector::{
    Collection, CollectRequest, CollectorConfig, CommentCollector, FailurePolicy, StopReason,
};
pub use error::{CollectError, MalformedRecord, RemoteError, RemoteErrorKind};
pub use quota::QuotaMeter;
pub use target::CollectionTarget;
pub use transport::{HttpResponse, Transport, TransportError};

#[cfg(feature = "http")]
pub use transport::ReqwestTransport;
