//! Aggregate replay and apply engine.
//!
//! An aggregate never stores its state; it derives it by folding its
//! event stream through a pure transition function, then records new
//! facts for whatever the store has not seen yet. The domain supplies the
//! decision and transition logic via [`Aggregate`]; [`AggregateRoot`]
//! owns the session bookkeeping — derived state, the committed version,
//! and the buffer of uncommitted events.

use crate::errors::EventStoreResult;
use crate::store::{EventStore, StoredEvent};
use crate::types::{EventVersion, StreamId};

/// Domain contract for an event-sourced entity.
///
/// The two methods split decision from transition:
///
/// - [`handle`](Aggregate::handle) is the pure decision function. It
///   checks the command's guard conditions against current state and
///   either produces the events that capture the command's effect or
///   rejects it with a domain error. It must not mutate anything.
/// - [`apply`](Aggregate::apply) is the single place state transitions
///   are defined. It must be total and deterministic: for any well-formed
///   event it updates the state and cannot fail. Commands change state
///   only by producing events that pass through `apply`, which is what
///   makes replay equivalent to live execution.
pub trait Aggregate: Default + Send + Sync {
    /// Commands this aggregate accepts.
    type Command;
    /// Events this aggregate emits and replays. Cloned when a buffer is
    /// handed to the store while the session keeps running.
    type Event: Send + Sync + Clone;
    /// Rejection returned when a command's guard condition fails.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Validates `command` against current state and returns the events
    /// capturing its effect, without mutating state.
    fn handle(&self, command: Self::Command) -> Result<Vec<Self::Event>, Self::Error>;

    /// Applies one event to the state. Total, pure, and deterministic.
    fn apply(&mut self, event: &Self::Event);
}

/// One in-memory session of an aggregate: derived state, the stream
/// version it was derived from, and the events produced since.
///
/// The committed history stays owned by the store; this type only ever
/// owns the uncommitted tail. After a successful [`save`] the buffer is
/// cleared and the version advances — the store has taken ownership of
/// those facts and assigned their sequence numbers.
///
/// Sessions are not shared between concurrent commands. Two sessions for
/// the same stream may race at the store, where exactly one append wins;
/// the loser re-reads and replays.
///
/// [`save`]: AggregateRoot::save
pub struct AggregateRoot<A: Aggregate> {
    state: A,
    version: EventVersion,
    uncommitted: Vec<A::Event>,
}

// Manual `Debug`: event types are not required to be `Debug`, and the
// buffer's contents are not interesting in logs anyway.
impl<A: Aggregate> std::fmt::Debug for AggregateRoot<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregateRoot")
            .field("version", &self.version)
            .field("uncommitted", &self.uncommitted.len())
            .finish()
    }
}

impl<A: Aggregate> Default for AggregateRoot<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Aggregate> AggregateRoot<A> {
    /// Starts a fresh aggregate with no history.
    ///
    /// The initiating command (the one that produces the first event)
    /// goes through [`execute`](AggregateRoot::execute) like any other.
    pub fn new() -> Self {
        Self {
            state: A::default(),
            version: EventVersion::initial(),
            uncommitted: Vec::new(),
        }
    }

    /// Rebuilds an aggregate from previously committed history.
    ///
    /// Events are folded in the order given, which must be ascending
    /// sequence order as returned by
    /// [`EventStore::read_stream`]. Nothing is marked uncommitted: this
    /// path reconstructs committed history only. Replaying the same
    /// history twice yields identical state.
    pub fn replay(history: &[StoredEvent<A::Event>]) -> Self {
        let mut state = A::default();
        for stored in history {
            state.apply(&stored.payload);
        }
        Self {
            state,
            version: EventVersion::initial().advance(history.len() as u64),
            uncommitted: Vec::new(),
        }
    }

    /// Runs one command: guard check, then event production, then
    /// synchronous application and buffering.
    ///
    /// On rejection the error is returned as-is; no event is produced and
    /// state is unchanged. On success every produced event has been
    /// applied to the in-memory state and appended to the uncommitted
    /// buffer, in order.
    pub fn execute(&mut self, command: A::Command) -> Result<(), A::Error> {
        let events = self.state.handle(command)?;
        for event in events {
            self.state.apply(&event);
            self.uncommitted.push(event);
        }
        Ok(())
    }

    /// The derived state.
    pub const fn state(&self) -> &A {
        &self.state
    }

    /// The version of the committed history this session was built from.
    /// Uncommitted events do not count until [`save`](AggregateRoot::save)
    /// succeeds.
    pub const fn version(&self) -> EventVersion {
        self.version
    }

    /// Events produced by this session that the store has not seen yet.
    pub fn uncommitted_events(&self) -> &[A::Event] {
        &self.uncommitted
    }

    /// Reads the full stream for `stream_id` and replays it.
    ///
    /// An unknown stream replays to a default-state aggregate at version
    /// 0, which is exactly the fresh-session starting point.
    pub async fn load<S>(store: &S, stream_id: &StreamId) -> EventStoreResult<Self>
    where
        S: EventStore<Event = A::Event>,
    {
        let history = store.read_stream(stream_id).await?;
        Ok(Self::replay(&history))
    }

    /// Hands the uncommitted buffer to the store, expecting the version
    /// this session was built from.
    ///
    /// With an empty buffer this is a no-op. On success the store has
    /// assigned sequence numbers, the local version advances past the
    /// batch, and the buffer is cleared. On a version conflict the buffer
    /// is retained untouched so the caller can re-read, replay onto a new
    /// session, and retry — retry is caller policy, never done here.
    pub async fn save<S>(&mut self, store: &S, stream_id: &StreamId) -> EventStoreResult<()>
    where
        S: EventStore<Event = A::Event>,
    {
        if self.uncommitted.is_empty() {
            return Ok(());
        }
        let batch = self.uncommitted.len() as u64;
        store
            .append(stream_id, self.uncommitted.clone(), self.version)
            .await?;
        self.version = self.version.advance(batch);
        self.uncommitted.clear();
        tracing::debug!(stream = %stream_id, events = batch, version = %self.version, "session committed");
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::test_fixtures::{Tally, TallyCommand, TallyError, TallyEvent};
    use super::*;
    use crate::types::{EventId, Timestamp};
    use proptest::prelude::*;

    fn stored(version: u64, payload: TallyEvent) -> StoredEvent<TallyEvent> {
        StoredEvent::new(
            EventId::new(),
            StreamId::try_new("tally-1").unwrap(),
            EventVersion::try_new(version).unwrap(),
            Timestamp::now(),
            payload,
        )
    }

    #[test]
    fn fresh_session_starts_at_version_zero() {
        let root = AggregateRoot::<Tally>::new();
        assert_eq!(root.version(), EventVersion::initial());
        assert!(root.uncommitted_events().is_empty());
        assert_eq!(root.state(), &Tally::default());
    }

    #[test]
    fn execute_applies_and_buffers() {
        let mut root = AggregateRoot::<Tally>::new();
        root.execute(TallyCommand::Add(5)).unwrap();
        root.execute(TallyCommand::Add(7)).unwrap();

        assert_eq!(root.state().total, 12);
        assert_eq!(
            root.uncommitted_events(),
            &[
                TallyEvent::Added { amount: 5 },
                TallyEvent::Added { amount: 7 }
            ]
        );
        // The committed version is untouched until a save succeeds.
        assert_eq!(root.version(), EventVersion::initial());
    }

    #[test]
    fn rejected_command_changes_nothing() {
        let mut root = AggregateRoot::<Tally>::new();
        root.execute(TallyCommand::Add(3)).unwrap();

        let err = root.execute(TallyCommand::Add(0)).unwrap_err();
        assert_eq!(err, TallyError::ZeroAddition);
        assert_eq!(root.state().total, 3);
        assert_eq!(root.uncommitted_events().len(), 1);
    }

    #[test]
    fn guard_reads_derived_state() {
        let mut root = AggregateRoot::<Tally>::new();
        assert_eq!(
            root.execute(TallyCommand::Clear).unwrap_err(),
            TallyError::NothingToClear
        );

        root.execute(TallyCommand::Add(4)).unwrap();
        root.execute(TallyCommand::Clear).unwrap();
        assert_eq!(root.state().total, 0);
        assert!(root.state().cleared);
    }

    #[test]
    fn replay_rebuilds_state_and_version() {
        let history = vec![
            stored(1, TallyEvent::Added { amount: 10 }),
            stored(2, TallyEvent::Added { amount: 2 }),
            stored(3, TallyEvent::Cleared),
        ];

        let root = AggregateRoot::<Tally>::replay(&history);
        assert_eq!(root.version(), EventVersion::try_new(3).unwrap());
        assert!(root.uncommitted_events().is_empty());
        assert_eq!(root.state().total, 0);
        assert!(root.state().cleared);
    }

    #[test]
    fn replay_of_empty_history_equals_fresh_session() {
        let replayed = AggregateRoot::<Tally>::replay(&[]);
        let fresh = AggregateRoot::<Tally>::new();
        assert_eq!(replayed.state(), fresh.state());
        assert_eq!(replayed.version(), fresh.version());
    }

    proptest! {
        #[test]
        fn replay_is_deterministic(amounts in prop::collection::vec(1u64..1000, 0..40)) {
            let history: Vec<_> = amounts
                .iter()
                .enumerate()
                .map(|(i, &amount)| stored(i as u64 + 1, TallyEvent::Added { amount }))
                .collect();

            let first = AggregateRoot::<Tally>::replay(&history);
            let second = AggregateRoot::<Tally>::replay(&history);
            prop_assert_eq!(first.state(), second.state());
            prop_assert_eq!(first.version(), second.version());
            prop_assert_eq!(first.state().total, amounts.iter().sum::<u64>());
        }

        #[test]
        fn live_execution_matches_replay(amounts in prop::collection::vec(1u64..1000, 0..40)) {
            // Applying commands live and replaying the produced events
            // must land on the same state.
            let mut live = AggregateRoot::<Tally>::new();
            for &amount in &amounts {
                live.execute(TallyCommand::Add(amount)).unwrap();
            }

            let history: Vec<_> = live
                .uncommitted_events()
                .iter()
                .enumerate()
                .map(|(i, event)| stored(i as u64 + 1, event.clone()))
                .collect();
            let replayed = AggregateRoot::<Tally>::replay(&history);
            prop_assert_eq!(replayed.state(), live.state());
        }
    }
}
