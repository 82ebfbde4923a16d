//! Error types for the persistence layer.
//!
//! Two failure kinds exist in this system and they are deliberately kept
//! apart: domain validation failures are each aggregate's own `Error`
//! associated type, raised before any event is produced, while
//! [`EventStoreError`] covers the store side. A caller that sees
//! [`EventStoreError::VersionConflict`] must re-read the stream, replay,
//! re-validate, and retry; the store never retries on its own.
//!
//! Reading an unknown stream is not an error anywhere in this crate — it
//! yields an empty history.

use crate::types::{EventVersion, StreamId};
use thiserror::Error;

/// Result alias for event store operations.
pub type EventStoreResult<T> = Result<T, EventStoreError>;

/// Failures surfaced by an [`EventStore`](crate::store::EventStore)
/// implementation.
#[derive(Debug, Error)]
pub enum EventStoreError {
    /// The optimistic concurrency check failed: the stream moved past the
    /// version the caller observed. Nothing was written.
    #[error(
        "version conflict on stream '{stream}': expected {expected}, but current is {current}"
    )]
    VersionConflict {
        /// The stream the append targeted.
        stream: StreamId,
        /// The version the caller expected to find.
        expected: EventVersion,
        /// The version the stream actually had.
        current: EventVersion,
    },

    /// An I/O failure in a durable store implementation. The in-memory
    /// store never produces this.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
