//! Bank-account domain: the classic event-sourcing example.
//!
//! The aggregate ([`account::BankAccount`]) validates commands against
//! state replayed from its stream and emits exactly one event per
//! accepted command. The projection ([`projections::BalanceProjection`])
//! folds the same event set into a display-friendly balance. Run the
//! demo with `cargo run --example banking`.

pub mod account;
pub mod events;
pub mod projections;
pub mod types;
