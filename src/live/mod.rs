//! Live-Update Subscriber
//!
//! Server-pushed updates for displayed resources.
//!
//! ## Architecture
//!
//! - **LiveView**: owns the displayed value and one subscription task
//! - **Merge rules**: how a pushed representation changes an item or a page
//! - **SseDecoder**: incremental `text/event-stream` decoding
//!
//! ## Protocol
//!
//! The hub URL comes from the `Link` header of the fetch that produced the
//! displayed data. The view opens `GET {hub}?topic={iri}&topic=...` with one
//! topic per displayed resource IRI, made absolute against the entrypoint,
//! and treats each `message` event as a JSON-LD representation.

mod merge;
mod sse;
mod subscriber;

pub use merge::LiveState;
pub use sse::{SseDecoder, SseEvent};
pub use subscriber::{subscription_url, LivePhase, LiveView, UrlParseError};
