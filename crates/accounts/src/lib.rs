//! Account ledger domain (balances, withdrawal policies, yield accrual).
//!
//! Pure domain logic only: no IO, no persistence concerns.

pub mod account;

pub use account::{
    AccountCommand, AccountEvent, AccountId, AccountKind, AccountNumber, AccountOpened,
    ApplyYield, BankAccount, Deposit, Deposited, HolderName, OpenAccount, Withdraw, Withdrawn,
    YieldApplied, YieldRate,
};
