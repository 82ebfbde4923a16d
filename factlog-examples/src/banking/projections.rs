//! Read models for the banking domain.

use factlog::{Projection, StoredEvent};

use crate::banking::events::AccountEvent;
use crate::banking::types::Money;

/// Display-friendly view of one account's stream: the running balance
/// plus a count of money movements.
///
/// Folds the same closed event set as the aggregate's transition
/// function, but keeps only what the view needs. Rebuilding from scratch
/// over the full history always reproduces the same view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceProjection {
    /// Current balance derived from the stream.
    pub balance: Money,
    /// Currency taken from the opening event.
    pub currency: Option<String>,
    /// Number of deposits, withdrawals and transfers seen.
    pub transactions: u64,
}

impl Projection for BalanceProjection {
    type Event = AccountEvent;

    fn apply(&mut self, event: &StoredEvent<Self::Event>) {
        match &event.payload {
            AccountEvent::AccountOpened {
                initial_deposit,
                currency,
                ..
            } => {
                self.balance = *initial_deposit;
                self.currency = Some(currency.clone());
            }
            AccountEvent::MoneyDeposited { amount, .. } => {
                self.balance = self.balance.saturating_add(*amount);
                self.transactions += 1;
            }
            AccountEvent::MoneyWithdrawn { amount, .. }
            | AccountEvent::MoneyTransferred { amount, .. } => {
                self.balance = self.balance.saturating_sub(*amount);
                self.transactions += 1;
            }
            AccountEvent::AccountClosed { .. } => {}
        }
    }
}
