//! `factlog` — append-only event streams with optimistic concurrency and
//! aggregate replay.
//!
//! State is never stored directly. An [`Aggregate`] derives it by folding
//! its stream through a pure transition function, validates commands
//! against that derived state, and records new events into an
//! uncommitted buffer. An [`EventStore`] owns the committed history: it
//! assigns every sequence number and commits each batch atomically, or
//! rejects it with a version conflict when the caller's view of the
//! stream is stale.
//!
//! The store port lives here; `factlog-memory` provides the in-memory
//! implementation and `factlog-examples` a complete banking domain.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod aggregate;
pub mod errors;
pub mod projection;
pub mod store;
pub mod types;

pub use aggregate::{Aggregate, AggregateRoot};
pub use errors::{EventStoreError, EventStoreResult};
pub use projection::Projection;
pub use store::{EventStore, StoredEvent};
pub use types::{EventId, EventVersion, StreamId, Timestamp};
