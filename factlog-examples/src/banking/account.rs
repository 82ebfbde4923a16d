//! The bank-account aggregate.
//!
//! `BankAccount` is pure domain logic: guard conditions in
//! [`Aggregate::handle`], state transitions in [`Aggregate::apply`], and
//! nothing else. Persistence and versioning live entirely in
//! `factlog::AggregateRoot` and the event store.

use factlog::Aggregate;
use thiserror::Error;

use crate::banking::events::AccountEvent;
use crate::banking::types::{AccountId, HolderId, Money, DEFAULT_CURRENCY};

/// Lifecycle of an account.
///
/// `Closed` is terminal: every command fails there, including another
/// close.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AccountStatus {
    /// No opening event replayed yet.
    #[default]
    Unopened,
    /// Open for business.
    Active,
    /// Closed for good.
    Closed,
}

/// Commands a caller can issue against an account.
#[derive(Debug, Clone)]
pub enum AccountCommand {
    /// Bring a new account into existence. Must be the first command.
    Open {
        /// Identity for the new account.
        account_id: AccountId,
        /// Owning customer.
        holder_id: HolderId,
        /// Opening balance; zero is allowed, negative amounts are
        /// unrepresentable in [`Money`].
        initial_deposit: Money,
    },
    /// Add money to the account.
    Deposit {
        /// Amount to add; must be positive.
        amount: Money,
        /// Reference recorded on the event.
        description: String,
    },
    /// Take money out of the account.
    Withdraw {
        /// Amount to remove; must be positive and covered.
        amount: Money,
        /// Reference recorded on the event.
        description: String,
    },
    /// Send money to another account.
    Transfer {
        /// Receiving account.
        to_account: AccountId,
        /// Amount to send; must be positive and covered.
        amount: Money,
        /// Reference recorded on the event.
        description: String,
    },
    /// Close the account. Requires a zero balance.
    Close {
        /// Why the account is being closed.
        reason: String,
    },
}

/// Guard-condition violations. Raised before any event is produced;
/// the account's state is unchanged when one of these comes back.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// `Open` was issued against an account that already has history.
    #[error("account is already open")]
    AlreadyOpen,

    /// A command other than `Open` was issued while the account is not
    /// active (never opened, or closed).
    #[error("account is not active")]
    NotActive,

    /// Deposits, withdrawals and transfers must move a positive amount.
    #[error("amount must be positive")]
    NonPositiveAmount,

    /// The balance does not cover the requested amount.
    #[error("insufficient balance: have {balance}, need {requested}")]
    InsufficientBalance {
        /// Current balance.
        balance: Money,
        /// Amount the command asked for.
        requested: Money,
    },

    /// Closing requires the balance to be exactly zero.
    #[error("cannot close an account with a non-zero balance of {balance}")]
    NonZeroBalance {
        /// Current balance.
        balance: Money,
    },
}

/// State of one bank account, derived purely from its event stream.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BankAccount {
    account_id: Option<AccountId>,
    holder_id: Option<HolderId>,
    balance: Money,
    currency: Option<String>,
    status: AccountStatus,
}

impl BankAccount {
    /// Current balance.
    pub const fn balance(&self) -> Money {
        self.balance
    }

    /// Lifecycle status.
    pub const fn status(&self) -> AccountStatus {
        self.status
    }

    /// Whether commands other than `Open` can currently succeed.
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// The account's identity, once opened.
    pub const fn account_id(&self) -> Option<&AccountId> {
        self.account_id.as_ref()
    }

    /// The owning customer, once opened.
    pub const fn holder_id(&self) -> Option<HolderId> {
        self.holder_id
    }

    /// The account's currency, once opened.
    pub fn currency(&self) -> Option<&str> {
        self.currency.as_deref()
    }

    fn require_active(&self) -> Result<(), AccountError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(AccountError::NotActive)
        }
    }

    fn require_positive(amount: Money) -> Result<(), AccountError> {
        if amount.is_zero() {
            Err(AccountError::NonPositiveAmount)
        } else {
            Ok(())
        }
    }

    fn require_covered(&self, requested: Money) -> Result<(), AccountError> {
        if requested > self.balance {
            Err(AccountError::InsufficientBalance {
                balance: self.balance,
                requested,
            })
        } else {
            Ok(())
        }
    }
}

impl Aggregate for BankAccount {
    type Command = AccountCommand;
    type Event = AccountEvent;
    type Error = AccountError;

    fn handle(&self, command: Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            AccountCommand::Open {
                account_id,
                holder_id,
                initial_deposit,
            } => {
                if self.status != AccountStatus::Unopened {
                    return Err(AccountError::AlreadyOpen);
                }
                Ok(vec![AccountEvent::AccountOpened {
                    account_id,
                    holder_id,
                    initial_deposit,
                    currency: DEFAULT_CURRENCY.to_string(),
                }])
            }
            AccountCommand::Deposit {
                amount,
                description,
            } => {
                self.require_active()?;
                Self::require_positive(amount)?;
                Ok(vec![AccountEvent::MoneyDeposited {
                    amount,
                    description,
                }])
            }
            AccountCommand::Withdraw {
                amount,
                description,
            } => {
                self.require_active()?;
                Self::require_positive(amount)?;
                self.require_covered(amount)?;
                Ok(vec![AccountEvent::MoneyWithdrawn {
                    amount,
                    description,
                }])
            }
            AccountCommand::Transfer {
                to_account,
                amount,
                description,
            } => {
                self.require_active()?;
                Self::require_positive(amount)?;
                self.require_covered(amount)?;
                Ok(vec![AccountEvent::MoneyTransferred {
                    amount,
                    to_account,
                    description,
                }])
            }
            AccountCommand::Close { reason } => {
                self.require_active()?;
                if !self.balance.is_zero() {
                    return Err(AccountError::NonZeroBalance {
                        balance: self.balance,
                    });
                }
                Ok(vec![AccountEvent::AccountClosed { reason }])
            }
        }
    }

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccountEvent::AccountOpened {
                account_id,
                holder_id,
                initial_deposit,
                currency,
            } => {
                self.account_id = Some(account_id.clone());
                self.holder_id = Some(*holder_id);
                self.balance = *initial_deposit;
                self.currency = Some(currency.clone());
                self.status = AccountStatus::Active;
            }
            AccountEvent::MoneyDeposited { amount, .. } => {
                self.balance = self.balance.saturating_add(*amount);
            }
            AccountEvent::MoneyWithdrawn { amount, .. }
            | AccountEvent::MoneyTransferred { amount, .. } => {
                self.balance = self.balance.saturating_sub(*amount);
            }
            AccountEvent::AccountClosed { .. } => {
                self.status = AccountStatus::Closed;
            }
        }
    }
}
