//! Banking demo: one account's life as an event stream.
//!
//! Walks the full event-sourcing loop — open an account, persist the
//! opening event, reload by replay, make deposits, persist again, fold a
//! projection over the history, and finally watch a guard condition
//! reject an invalid close.

use anyhow::Result;
use factlog::{AggregateRoot, EventStore, Projection, StreamId};
use factlog_examples::banking::{
    account::{AccountCommand, BankAccount},
    events::AccountEvent,
    projections::BalanceProjection,
    types::{AccountId, HolderId, Money},
};
use factlog_memory::InMemoryEventStore;
use rust_decimal_macros::dec;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let store: InMemoryEventStore<AccountEvent> = InMemoryEventStore::new();

    // Open an account and persist the opening event (expected version 0).
    let account_id = AccountId::generate();
    let stream_id = StreamId::try_new(account_id.to_string())?;

    let mut account = AggregateRoot::<BankAccount>::new();
    account.execute(AccountCommand::Open {
        account_id: account_id.clone(),
        holder_id: HolderId::generate(),
        initial_deposit: Money::new(dec!(1000))?,
    })?;
    account.save(&store, &stream_id).await?;
    info!("account opened with an initial balance of 1000 EUR");

    // Reload from history: replay, then make two deposits and persist
    // them as one batch against the version we replayed to.
    let mut account = AggregateRoot::<BankAccount>::load(&store, &stream_id).await?;
    account.execute(AccountCommand::Deposit {
        amount: Money::new(dec!(500))?,
        description: "Salary deposit".to_string(),
    })?;
    account.execute(AccountCommand::Deposit {
        amount: Money::new(dec!(200))?,
        description: "Bonus payment".to_string(),
    })?;
    account.save(&store, &stream_id).await?;
    info!("made two deposits, stream is now at version {}", account.version());

    // Fold the projection over the full history, narrating each event.
    info!("event stream:");
    let history = store.read_stream(&stream_id).await?;
    let mut projection = BalanceProjection::default();
    for event in &history {
        projection.apply(event);
        info!("  version {}: {}", event.version, event.payload.label());
        match &event.payload {
            AccountEvent::AccountOpened {
                initial_deposit,
                currency,
                ..
            } => info!("    initial deposit: {initial_deposit} {currency}"),
            AccountEvent::MoneyDeposited {
                amount,
                description,
            } => info!("    amount: {amount}, description: {description}"),
            _ => {}
        }
        info!(
            "    current balance: {} {}",
            projection.balance,
            projection.currency.as_deref().unwrap_or("?")
        );
    }

    // A guard condition in action: closing needs a zero balance.
    info!("trying to close the account with a non-zero balance...");
    match account.execute(AccountCommand::Close {
        reason: "customer request".to_string(),
    }) {
        Ok(()) => anyhow::bail!("close should have been rejected"),
        Err(e) => info!("close correctly rejected: {e}"),
    }

    Ok(())
}
