//! The closed set of facts that can happen to a bank account.
//!
//! Each variant carries only what is needed to re-derive state. Adding a
//! variant forces every match over `AccountEvent` — the transition
//! function, the projection — to handle it before the crate compiles
//! again; there is no silent default case.

use crate::banking::types::{AccountId, HolderId, Money};
use serde::{Deserialize, Serialize};

/// Everything that can be recorded on an account's stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum AccountEvent {
    /// The account came into existence.
    AccountOpened {
        /// Identity of the new account.
        account_id: AccountId,
        /// Customer the account belongs to.
        holder_id: HolderId,
        /// Opening balance; may be zero.
        initial_deposit: Money,
        /// Currency the account is denominated in.
        currency: String,
    },
    /// Money came in.
    MoneyDeposited {
        /// Amount deposited.
        amount: Money,
        /// Caller-supplied reference.
        description: String,
    },
    /// Money went out.
    MoneyWithdrawn {
        /// Amount withdrawn.
        amount: Money,
        /// Caller-supplied reference.
        description: String,
    },
    /// Money went out to another account.
    MoneyTransferred {
        /// Amount transferred.
        amount: Money,
        /// Receiving account.
        to_account: AccountId,
        /// Caller-supplied reference.
        description: String,
    },
    /// The account was closed. Terminal.
    AccountClosed {
        /// Why the account was closed.
        reason: String,
    },
}

impl AccountEvent {
    /// Short human-readable label, used by the demo's event log printout.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::AccountOpened { .. } => "AccountOpened",
            Self::MoneyDeposited { .. } => "MoneyDeposited",
            Self::MoneyWithdrawn { .. } => "MoneyWithdrawn",
            Self::MoneyTransferred { .. } => "MoneyTransferred",
            Self::AccountClosed { .. } => "AccountClosed",
        }
    }
}
