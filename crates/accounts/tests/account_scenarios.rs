//! Black-box run of the full demonstration sequence through the public API,
//! including the event-notification surface (bus + envelopes).

use std::sync::Arc;

use chrono::Utc;
use minibank_accounts::{
    AccountCommand, AccountEvent, AccountId, AccountKind, ApplyYield, BankAccount, Deposit,
    OpenAccount, Withdraw, YieldRate,
};
use minibank_core::{Aggregate, AggregateId, AggregateRoot, DomainError, Money};
use minibank_events::{Event, EventBus, EventEnvelope, InMemoryEventBus};

type Bus = Arc<InMemoryEventBus<EventEnvelope<AccountEvent>>>;

/// Handle a command, apply and publish whatever it emitted.
fn execute(
    account: &mut BankAccount,
    bus: &Bus,
    cmd: AccountCommand,
) -> Result<(), DomainError> {
    let events = account.handle(&cmd)?;
    for event in events {
        account.apply(&event);
        let envelope = EventEnvelope::new(
            uuid::Uuid::now_v7(),
            account.id_typed().0,
            "BankAccount",
            account.version(),
            event,
        );
        bus.publish(envelope).expect("in-memory publish");
    }
    Ok(())
}

fn open(bus: &Bus, holder: &str, number: &str, kind: AccountKind) -> BankAccount {
    let id = AccountId::new(AggregateId::new());
    let mut account = BankAccount::empty(id);
    execute(
        &mut account,
        bus,
        AccountCommand::Open(OpenAccount {
            account_id: id,
            holder_name: holder.to_string(),
            account_number: number.to_string(),
            kind,
            occurred_at: Utc::now(),
        }),
    )
    .expect("open account");
    account
}

fn deposit(account: &mut BankAccount, bus: &Bus, cents: i64) -> Result<(), DomainError> {
    execute(
        account,
        bus,
        AccountCommand::Deposit(Deposit {
            account_id: account.id_typed(),
            amount: Money::from_cents(cents),
            occurred_at: Utc::now(),
        }),
    )
}

fn withdraw(account: &mut BankAccount, bus: &Bus, cents: i64) -> Result<(), DomainError> {
    execute(
        account,
        bus,
        AccountCommand::Withdraw(Withdraw {
            account_id: account.id_typed(),
            amount: Money::from_cents(cents),
            occurred_at: Utc::now(),
        }),
    )
}

#[test]
fn demonstration_sequence_end_to_end() {
    let bus: Bus = Arc::new(InMemoryEventBus::new());
    let subscription = bus.subscribe();

    // A checking account with a zero limit follows the standard policy
    // through the one common account type.
    let mut standard = open(
        &bus,
        "João",
        "100-1",
        AccountKind::Checking {
            overdraft_limit: Money::ZERO,
        },
    );
    deposit(&mut standard, &bus, 10_000).unwrap();
    let err = withdraw(&mut standard, &bus, 40_000).unwrap_err();
    assert!(matches!(err, DomainError::InvariantViolation(_)));
    assert_eq!(standard.balance(), Money::from_cents(10_000));

    // The overdraft variant admits the same withdrawal.
    let mut checking = open(
        &bus,
        "Ana",
        "101-2",
        AccountKind::Checking {
            overdraft_limit: Money::from_cents(50_000),
        },
    );
    deposit(&mut checking, &bus, 10_000).unwrap();
    withdraw(&mut checking, &bus, 40_000).unwrap();
    assert_eq!(checking.balance(), Money::from_cents(-30_000));

    // Savings: no overdraft, but yield accrual.
    let mut savings = open(
        &bus,
        "Pedro",
        "102-3",
        AccountKind::Savings {
            yield_rate: YieldRate::from_basis_points(50),
        },
    );
    let err = withdraw(&mut savings, &bus, 40_000).unwrap_err();
    assert!(matches!(err, DomainError::InvariantViolation(_)));
    assert_eq!(savings.balance(), Money::ZERO);

    deposit(&mut savings, &bus, 200_000).unwrap();
    let apply_yield = AccountCommand::ApplyYield(ApplyYield {
        account_id: savings.id_typed(),
        occurred_at: Utc::now(),
    });
    execute(&mut savings, &bus, apply_yield).unwrap();
    assert_eq!(savings.balance(), Money::from_cents(201_000));
    assert_eq!(savings.balance().to_string(), "2010.00");

    // Only successful operations were observable on the bus, in order.
    let mut observed = Vec::new();
    while let Ok(envelope) = subscription.try_recv() {
        observed.push((
            envelope.aggregate_id(),
            envelope.sequence_number(),
            envelope.payload().event_type(),
        ));
    }

    let types: Vec<&str> = observed.iter().map(|(_, _, t)| *t).collect();
    assert_eq!(
        types,
        vec![
            "accounts.account.opened",
            "accounts.account.deposited",
            "accounts.account.opened",
            "accounts.account.deposited",
            "accounts.account.withdrawn",
            "accounts.account.opened",
            "accounts.account.deposited",
            "accounts.account.yield_applied",
        ]
    );

    // Sequence numbers increase monotonically per aggregate stream.
    for account in [&standard, &checking, &savings] {
        let stream: Vec<u64> = observed
            .iter()
            .filter(|(id, _, _)| *id == account.id_typed().0)
            .map(|(_, seq, _)| *seq)
            .collect();
        assert!(stream.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(stream.last().copied(), Some(account.version()));
    }
}
