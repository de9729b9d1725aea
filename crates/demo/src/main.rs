//! Console demonstration driver.
//!
//! A thin caller exercising the account ledger API in a fixed sequence; it is
//! not part of the library contract. Rejected operations are logged and never
//! abort the run.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use uuid::Uuid;

use minibank_accounts::{
    AccountCommand, AccountEvent, AccountId, AccountKind, ApplyYield, BankAccount, Deposit,
    OpenAccount, Withdraw, YieldRate,
};
use minibank_core::{Aggregate, AggregateId, AggregateRoot, Money};
use minibank_events::{Event, EventBus, EventEnvelope, InMemoryEventBus};

type DemoBus = Arc<InMemoryEventBus<EventEnvelope<AccountEvent>>>;

fn number_of(account: &BankAccount) -> &str {
    account
        .account_number()
        .map(|number| number.as_str())
        .unwrap_or("?")
}

/// Handle one command; on success apply + publish the emitted events, on
/// rejection log and carry on.
fn execute(account: &mut BankAccount, bus: &DemoBus, label: &str, cmd: AccountCommand) {
    match account.handle(&cmd) {
        Ok(events) if events.is_empty() => {
            tracing::info!(account = number_of(account), "{label}: nothing to apply");
        }
        Ok(events) => {
            for event in events {
                account.apply(&event);
                let envelope = EventEnvelope::new(
                    Uuid::now_v7(),
                    account.id_typed().0,
                    "BankAccount",
                    account.version(),
                    event,
                );
                if let Err(err) = bus.publish(envelope) {
                    tracing::warn!(error = %err, "event publish failed");
                }
            }
            tracing::info!(
                account = number_of(account),
                balance = %account.balance(),
                "{label}: ok"
            );
        }
        Err(err) => {
            tracing::warn!(
                account = number_of(account),
                balance = %account.balance(),
                error = %err,
                "{label}: rejected"
            );
        }
    }
}

fn open(bus: &DemoBus, holder: &str, number: &str, kind: AccountKind) -> BankAccount {
    let id = AccountId::new(AggregateId::new());
    let mut account = BankAccount::empty(id);
    execute(
        &mut account,
        bus,
        "open",
        AccountCommand::Open(OpenAccount {
            account_id: id,
            holder_name: holder.to_string(),
            account_number: number.to_string(),
            kind,
            occurred_at: Utc::now(),
        }),
    );
    account
}

fn deposit(account: &mut BankAccount, bus: &DemoBus, cents: i64) {
    let cmd = AccountCommand::Deposit(Deposit {
        account_id: account.id_typed(),
        amount: Money::from_cents(cents),
        occurred_at: Utc::now(),
    });
    execute(account, bus, "deposit", cmd);
}

fn withdraw(account: &mut BankAccount, bus: &DemoBus, cents: i64) {
    let cmd = AccountCommand::Withdraw(Withdraw {
        account_id: account.id_typed(),
        amount: Money::from_cents(cents),
        occurred_at: Utc::now(),
    });
    execute(account, bus, "withdraw", cmd);
}

fn main() -> Result<()> {
    minibank_observability::init();

    let bus: DemoBus = Arc::new(InMemoryEventBus::new());
    let notifications = bus.subscribe();

    // One account type, three withdrawal policies.

    // Checking with a zero limit follows the standard policy.
    let mut standard = open(
        &bus,
        "João",
        "100-1",
        AccountKind::Checking {
            overdraft_limit: Money::ZERO,
        },
    );
    deposit(&mut standard, &bus, 10_000);
    withdraw(&mut standard, &bus, 40_000); // rejected: no overdraft to lean on

    // With a 500.00 limit the same withdrawal clears, landing at -300.00.
    let mut checking = open(
        &bus,
        "Ana",
        "101-2",
        AccountKind::Checking {
            overdraft_limit: Money::from_cents(50_000),
        },
    );
    deposit(&mut checking, &bus, 10_000);
    withdraw(&mut checking, &bus, 40_000);

    // Savings: base policy on withdrawals, plus yield accrual.
    let mut savings = open(
        &bus,
        "Pedro",
        "102-3",
        AccountKind::Savings {
            yield_rate: YieldRate::from_basis_points(50),
        },
    );
    withdraw(&mut savings, &bus, 40_000); // rejected: balance is 0
    deposit(&mut savings, &bus, 200_000);
    let apply_yield = AccountCommand::ApplyYield(ApplyYield {
        account_id: savings.id_typed(),
        occurred_at: Utc::now(),
    });
    execute(&mut savings, &bus, "apply yield", apply_yield);

    tracing::info!(balance = %savings.balance(), "final savings balance");

    // Everything the collaborator observed, in publish order.
    while let Ok(envelope) = notifications.try_recv() {
        let payload = serde_json::to_string(envelope.payload()).unwrap_or_default();
        tracing::info!(
            event = envelope.payload().event_type(),
            aggregate = %envelope.aggregate_id(),
            seq = envelope.sequence_number(),
            payload = %payload,
            "notification"
        );
    }

    Ok(())
}
