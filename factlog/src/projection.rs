//! Read models folded from event streams.
//!
//! A projection consumes committed events and derives a display-friendly
//! view. It never participates in writes and holds no authority over
//! state — throwing it away and re-folding the full history must always
//! reproduce it.

use crate::store::StoredEvent;

/// A read model derived by folding an event stream.
///
/// Implementations apply the same closed event set as their aggregate's
/// transition function, but are free to keep only what the view needs.
/// `apply` must be pure with respect to the event sequence so that
/// re-running the fold from scratch is idempotent.
pub trait Projection: Default {
    /// The domain event type this projection folds.
    type Event;

    /// Folds one committed event into the view.
    fn apply(&mut self, event: &StoredEvent<Self::Event>);

    /// Builds the view from scratch over a full, ordered history.
    fn from_history<'a, I>(events: I) -> Self
    where
        Self::Event: 'a,
        I: IntoIterator<Item = &'a StoredEvent<Self::Event>>,
    {
        let mut view = Self::default();
        for event in events {
            view.apply(event);
        }
        view
    }
}
