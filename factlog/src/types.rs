//! Value types shared by the store and the aggregate engine.
//!
//! Every type here uses a smart constructor: once a value exists it is
//! valid, and nothing downstream re-checks it.

use chrono::{DateTime, Utc};
use nutype::nutype;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identity of one aggregate instance and, equivalently, of its event
/// stream.
///
/// A `StreamId` is opaque to the store: it is only ever compared and
/// hashed. Values are trimmed, non-empty, and at most 255 characters.
#[nutype(
    sanitize(trim),
    validate(not_empty, len_char_max = 255),
    derive(
        Debug,
        Clone,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct StreamId(String);

/// Globally unique identifier stamped on every stored event.
///
/// Always a UUIDv7, so ids created in sequence sort in creation order.
/// Ordering within a stream is still by sequence number; the id exists
/// for global identification, not for ordering.
#[nutype(
    validate(predicate = |id: &Uuid| id.get_version() == Some(uuid::Version::SortRand)),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        AsRef,
        Deref,
        Display,
        Serialize,
        Deserialize
    )
)]
pub struct EventId(Uuid);

impl EventId {
    /// Creates a fresh `EventId` from the current timestamp.
    pub fn new() -> Self {
        Self::try_new(Uuid::now_v7()).expect("Uuid::now_v7() always yields a v7 UUID")
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

/// Position of an event within its stream, and by extension the version
/// of a stream.
///
/// A stream's version equals its length: an unseen stream has version 0,
/// and the first appended event carries sequence number 1. Sequence
/// numbers are assigned exclusively by the store at append time.
#[nutype(
    validate(greater_or_equal = 0),
    derive(
        Debug,
        Clone,
        Copy,
        PartialEq,
        Eq,
        PartialOrd,
        Ord,
        Hash,
        Display,
        Into,
        Serialize,
        Deserialize
    )
)]
pub struct EventVersion(u64);

impl EventVersion {
    /// The version of a stream that has never been appended to.
    pub fn initial() -> Self {
        Self::try_new(0).expect("0 is always a valid version")
    }

    /// The version directly after this one.
    #[must_use]
    pub fn next(self) -> Self {
        self.advance(1)
    }

    /// The version `count` appends after this one. Used when a whole
    /// batch is committed at once.
    #[must_use]
    pub fn advance(self, count: u64) -> Self {
        let current: u64 = self.into();
        Self::try_new(current + count).expect("advanced version is always valid")
    }
}

/// Moment an event was committed, in UTC.
///
/// Informational only: replay and concurrency control order by sequence
/// number, never by timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(DateTime<Utc>);

impl Timestamp {
    /// Wraps an existing UTC `DateTime`.
    pub const fn new(datetime: DateTime<Utc>) -> Self {
        Self(datetime)
    }

    /// The current moment.
    pub fn now() -> Self {
        Self(Utc::now())
    }

    /// Borrows the underlying `DateTime`.
    pub const fn as_datetime(&self) -> &DateTime<Utc> {
        &self.0
    }
}

impl From<DateTime<Utc>> for Timestamp {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::new(datetime)
    }
}

impl From<Timestamp> for DateTime<Utc> {
    fn from(timestamp: Timestamp) -> Self {
        timestamp.0
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}
