//! The event store port.
//!
//! An event store keeps one append-only stream per [`StreamId`] and is
//! the sole authority for sequence numbers: callers hand it bare domain
//! events, and the store wraps them into [`StoredEvent`]s at commit time.
//! Optimistic concurrency is the only consistency mechanism — there is no
//! locking across a caller's read-modify-append cycle.
//!
//! The trait is backend-independent. This workspace ships an in-memory
//! implementation (`factlog-memory`); a durable backend would implement
//! the same contract plus a serialization for its event type.

use crate::errors::EventStoreResult;
use crate::types::{EventId, EventVersion, StreamId, Timestamp};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// An event as it exists in a stream: the domain payload plus the
/// metadata the store assigned when it committed the append.
///
/// Stored events are immutable. The sequence number ([`version`]) is
/// assigned exactly once, by the store, and never changes afterwards.
///
/// [`version`]: StoredEvent::version
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent<E> {
    /// Globally unique identifier for this event.
    pub event_id: EventId,
    /// The stream this event belongs to.
    pub stream_id: StreamId,
    /// Sequence number within the stream, starting at 1.
    pub version: EventVersion,
    /// When the store committed this event. Informational; ordering is by
    /// `version` only.
    pub timestamp: Timestamp,
    /// The domain event itself.
    pub payload: E,
}

impl<E> StoredEvent<E> {
    /// Creates a stored event. Called by store implementations at append
    /// time; domain code never builds these directly.
    pub const fn new(
        event_id: EventId,
        stream_id: StreamId,
        version: EventVersion,
        timestamp: Timestamp,
        payload: E,
    ) -> Self {
        Self {
            event_id,
            stream_id,
            version,
            payload,
            timestamp,
        }
    }
}

/// Keeper of per-identity event streams.
///
/// Implementations must guarantee, for every stream:
///
/// - versions are gapless and strictly increasing from 1, so a stream's
///   version always equals its length;
/// - an append is all-or-nothing — a failed concurrency check writes
///   nothing;
/// - appends to the same stream serialize, while different streams never
///   contend;
/// - readers observe a consistent snapshot, never a half-appended batch.
///
/// The methods are async so that durable backends can do real I/O, but an
/// implementation's critical section must run to completion without
/// suspension: cancellation of the returned future is advisory and must
/// not corrupt the store.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// The domain event type this store holds.
    type Event: Send + Sync;

    /// Appends a batch of events to one stream.
    ///
    /// `expected_version` is the stream version the caller observed when
    /// it last read the stream (0 for a stream it believes does not exist
    /// yet). If it matches the current version, the events receive
    /// sequence numbers `expected_version + 1 ..= expected_version + n`
    /// in input order and the whole batch commits atomically. Streams are
    /// created lazily on their first successful append.
    ///
    /// An empty batch succeeds trivially: no version check, no mutation.
    ///
    /// # Errors
    ///
    /// [`EventStoreError::VersionConflict`] when `expected_version` does
    /// not match; the stream is left untouched and the caller should
    /// re-read, replay, and retry.
    ///
    /// [`EventStoreError::VersionConflict`]: crate::errors::EventStoreError::VersionConflict
    async fn append(
        &self,
        stream_id: &StreamId,
        events: Vec<Self::Event>,
        expected_version: EventVersion,
    ) -> EventStoreResult<()>;

    /// Reads the full history of one stream, ordered by ascending
    /// sequence number.
    ///
    /// An unknown stream yields an empty vec, not an error.
    async fn read_stream(&self, stream_id: &StreamId)
        -> EventStoreResult<Vec<StoredEvent<Self::Event>>>;

    /// The current version of a stream: its length, or 0 if the stream
    /// has never been appended to.
    async fn stream_version(&self, stream_id: &StreamId) -> EventStoreResult<EventVersion>;
}
