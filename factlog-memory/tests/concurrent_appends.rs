//! Concurrency behaviour of the in-memory store under real contention.
//!
//! The optimistic check is the only consistency mechanism: callers race
//! freely between reading a stream and appending to it, and the store
//! must serialize same-stream appends while letting exactly one of any
//! pair of conflicting writers win.

use std::sync::Arc;

use factlog::errors::EventStoreError;
use factlog::store::EventStore;
use factlog::types::{EventVersion, StreamId};
use factlog_memory::InMemoryEventStore;
use tokio::sync::Barrier;

fn stream(name: &str) -> StreamId {
    StreamId::try_new(name).unwrap()
}

fn version(v: u64) -> EventVersion {
    EventVersion::try_new(v).unwrap()
}

/// Two writers both observe version 1 and both append one event
/// expecting 1. Exactly one must win; the other gets a version conflict
/// and the stream ends at version 2.
#[tokio::test]
async fn exactly_one_of_two_racing_writers_wins() {
    let store: Arc<InMemoryEventStore<String>> = Arc::new(InMemoryEventStore::new());
    let id = stream("acct-contended");

    store
        .append(&id, vec!["opened".to_string()], version(0))
        .await
        .unwrap();

    let barrier = Arc::new(Barrier::new(2));
    let mut handles = Vec::new();
    for writer in 0..2 {
        let store = Arc::clone(&store);
        let id = id.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            store
                .append(&id, vec![format!("deposit from writer {writer}")], version(1))
                .await
        }));
    }

    let mut wins = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(()) => wins += 1,
            Err(EventStoreError::VersionConflict { .. }) => conflicts += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    assert_eq!(wins, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(store.stream_version(&id).await.unwrap(), version(2));
}

/// Many writers hammer one stream, each retrying by re-reading the
/// current version after a conflict. Every event lands exactly once and
/// the final history is gapless.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn conflicted_writers_converge_by_rereading() {
    const WRITERS: usize = 8;
    const EVENTS_PER_WRITER: usize = 5;

    let store: Arc<InMemoryEventStore<String>> = Arc::new(InMemoryEventStore::new());
    let id = stream("acct-hammered");
    let barrier = Arc::new(Barrier::new(WRITERS));

    let mut handles = Vec::new();
    for writer in 0..WRITERS {
        let store = Arc::clone(&store);
        let id = id.clone();
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            barrier.wait().await;
            for n in 0..EVENTS_PER_WRITER {
                // Caller-level retry policy: re-read, then append again.
                loop {
                    let observed = store.stream_version(&id).await.unwrap();
                    let attempt = store
                        .append(&id, vec![format!("writer {writer} event {n}")], observed)
                        .await;
                    match attempt {
                        Ok(()) => break,
                        Err(EventStoreError::VersionConflict { .. }) => continue,
                        Err(other) => panic!("unexpected error: {other}"),
                    }
                }
            }
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let events = store.read_stream(&id).await.unwrap();
    assert_eq!(events.len(), WRITERS * EVENTS_PER_WRITER);
    for (i, event) in events.iter().enumerate() {
        assert_eq!(event.version, version(i as u64 + 1));
    }
}

/// Writers to different streams never conflict with each other even
/// without retries.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn writers_on_distinct_streams_never_conflict() {
    const STREAMS: usize = 16;

    let store: Arc<InMemoryEventStore<String>> = Arc::new(InMemoryEventStore::new());
    let barrier = Arc::new(Barrier::new(STREAMS));

    let mut handles = Vec::new();
    for n in 0..STREAMS {
        let store = Arc::clone(&store);
        let barrier = Arc::clone(&barrier);
        handles.push(tokio::spawn(async move {
            let id = stream(&format!("acct-{n}"));
            barrier.wait().await;
            store
                .append(&id, vec!["opened".to_string()], version(0))
                .await
        }));
    }
    for handle in handles {
        assert!(handle.await.unwrap().is_ok());
    }

    for n in 0..STREAMS {
        let id = stream(&format!("acct-{n}"));
        assert_eq!(store.stream_version(&id).await.unwrap(), version(1));
    }
}

/// A reader racing in-flight appends must only ever see a consistent
/// snapshot: a contiguous prefix with sequence numbers 1..=len.
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn readers_never_observe_a_partial_append() {
    const BATCHES: u64 = 50;
    const BATCH_LEN: u64 = 4;

    let store: Arc<InMemoryEventStore<u64>> = Arc::new(InMemoryEventStore::new());
    let id = stream("acct-watched");

    let writer = {
        let store = Arc::clone(&store);
        let id = id.clone();
        tokio::spawn(async move {
            for batch in 0..BATCHES {
                let events = (0..BATCH_LEN).map(|i| batch * BATCH_LEN + i).collect();
                store
                    .append(&id, events, version(batch * BATCH_LEN))
                    .await
                    .unwrap();
            }
        })
    };

    let reader = {
        let store = Arc::clone(&store);
        let id = id.clone();
        tokio::spawn(async move {
            loop {
                let events = store.read_stream(&id).await.unwrap();
                // Whatever instant the snapshot was taken at, it must be a
                // whole number of batches with gapless sequence numbers.
                assert_eq!(events.len() as u64 % BATCH_LEN, 0);
                for (i, event) in events.iter().enumerate() {
                    assert_eq!(event.version, version(i as u64 + 1));
                    assert_eq!(event.payload, i as u64);
                }
                if events.len() as u64 == BATCHES * BATCH_LEN {
                    break;
                }
                tokio::task::yield_now().await;
            }
        })
    };

    writer.await.unwrap();
    reader.await.unwrap();
}
