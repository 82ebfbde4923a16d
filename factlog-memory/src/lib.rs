//! In-memory event store for `factlog`.
//!
//! Keeps every stream in process memory for the lifetime of the store.
//! Useful for demos and tests, and as the reference for what a durable
//! implementation must guarantee: atomic batch appends, store-assigned
//! sequence numbers, and an optimistic version check as the only
//! consistency mechanism.
//!
//! Locking is per stream. The outer map is touched only to look up or
//! create a stream's cell; the append critical section and snapshot reads
//! take that one stream's mutex, so writers to different streams never
//! contend and readers never observe a half-appended batch.

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![allow(clippy::significant_drop_tightening)]

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use factlog::errors::{EventStoreError, EventStoreResult};
use factlog::store::{EventStore, StoredEvent};
use factlog::types::{EventId, EventVersion, StreamId, Timestamp};
use parking_lot::{Mutex, RwLock};

/// One stream's committed history behind its own lock.
type StreamCell<E> = Arc<Mutex<Vec<StoredEvent<E>>>>;

/// Thread-safe in-memory event store.
///
/// `Clone` is cheap and shares storage: clones are handles onto the same
/// streams, which is how one store is given to many concurrent callers.
#[derive(Clone)]
pub struct InMemoryEventStore<E> {
    streams: Arc<RwLock<HashMap<StreamId, StreamCell<E>>>>,
}

impl<E> InMemoryEventStore<E> {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self {
            streams: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Looks up a stream's cell without creating it.
    fn cell(&self, stream_id: &StreamId) -> Option<StreamCell<E>> {
        self.streams.read().get(stream_id).cloned()
    }

    /// Looks up a stream's cell, creating an empty one if absent.
    ///
    /// An empty cell left behind by a rejected first append is
    /// indistinguishable from an absent stream: version 0, empty history.
    fn cell_or_insert(&self, stream_id: &StreamId) -> StreamCell<E> {
        if let Some(cell) = self.cell(stream_id) {
            return cell;
        }
        self.streams
            .write()
            .entry(stream_id.clone())
            .or_default()
            .clone()
    }
}

impl<E> Default for InMemoryEventStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> std::fmt::Debug for InMemoryEventStore<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryEventStore")
            .field("streams", &self.streams.read().len())
            .finish()
    }
}

#[async_trait]
impl<E> EventStore for InMemoryEventStore<E>
where
    E: Send + Sync + Clone + 'static,
{
    type Event = E;

    async fn append(
        &self,
        stream_id: &StreamId,
        events: Vec<Self::Event>,
        expected_version: EventVersion,
    ) -> EventStoreResult<()> {
        // Contract: an empty batch commits nothing and checks nothing.
        if events.is_empty() {
            return Ok(());
        }

        let cell = self.cell_or_insert(stream_id);
        let mut stream = cell.lock();

        let current = EventVersion::initial().advance(stream.len() as u64);
        if current != expected_version {
            tracing::warn!(
                stream = %stream_id,
                expected = %expected_version,
                %current,
                "append rejected: version conflict"
            );
            return Err(EventStoreError::VersionConflict {
                stream: stream_id.clone(),
                expected: expected_version,
                current,
            });
        }

        let batch = events.len();
        let mut version = current;
        for payload in events {
            version = version.next();
            stream.push(StoredEvent::new(
                EventId::new(),
                stream_id.clone(),
                version,
                Timestamp::now(),
                payload,
            ));
        }

        tracing::debug!(stream = %stream_id, events = batch, version = %version, "appended");
        Ok(())
    }

    async fn read_stream(
        &self,
        stream_id: &StreamId,
    ) -> EventStoreResult<Vec<StoredEvent<Self::Event>>> {
        // Events are stored in append order, which is ascending sequence
        // order. The clone under the stream lock is the read snapshot.
        match self.cell(stream_id) {
            Some(cell) => Ok(cell.lock().clone()),
            None => Ok(Vec::new()),
        }
    }

    async fn stream_version(&self, stream_id: &StreamId) -> EventStoreResult<EventVersion> {
        match self.cell(stream_id) {
            Some(cell) => Ok(EventVersion::initial().advance(cell.lock().len() as u64)),
            None => Ok(EventVersion::initial()),
        }
    }
}
