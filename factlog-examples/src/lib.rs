//! Example domains for `factlog`.
//!
//! Currently one domain: a bank account whose whole life — opening,
//! deposits, withdrawals, transfers, closing — exists only as events.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod banking;
