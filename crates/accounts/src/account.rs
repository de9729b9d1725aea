use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use minibank_core::{
    Aggregate, AggregateId, AggregateRoot, DomainError, DomainResult, Money, ValueObject,
};
use minibank_events::Event;

/// Bank account identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(pub AggregateId);

impl AccountId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for AccountId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Name of the account owner. Non-blank, immutable after opening.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HolderName(String);

impl HolderName {
    pub fn new(name: impl Into<String>) -> DomainResult<Self> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(DomainError::validation("holder name cannot be blank"));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for HolderName {}

impl core::fmt::Display for HolderName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Account number, e.g. "101-2". Non-blank, unique per account, immutable
/// after opening.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountNumber(String);

impl AccountNumber {
    pub fn new(number: impl Into<String>) -> DomainResult<Self> {
        let number = number.into();
        if number.trim().is_empty() {
            return Err(DomainError::validation("account number cannot be blank"));
        }
        Ok(Self(number))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ValueObject for AccountNumber {}

impl core::fmt::Display for AccountNumber {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Yield accrual rate in basis points (1 bp = 0.01% = 0.0001).
///
/// Kept integral so accrual on an integral cents balance stays exact; the
/// canonical 0.005 fraction is 50 bp.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct YieldRate(u32);

impl YieldRate {
    pub const fn from_basis_points(bp: u32) -> Self {
        Self(bp)
    }

    pub const fn basis_points(self) -> u32 {
        self.0
    }

    /// Balance-proportional yield, truncated toward zero and saturated at
    /// the `Money` range.
    pub fn of(self, amount: Money) -> Money {
        let cents = amount.cents() as i128 * self.0 as i128 / 10_000;
        Money::from_cents(cents.clamp(i64::MIN as i128, i64::MAX as i128) as i64)
    }
}

impl ValueObject for YieldRate {}

/// Account kind. The withdrawal eligibility arithmetic is dispatched on this
/// tag: one `withdraw` operation, per-kind spendable ceiling.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    /// No specialization: withdrawals are capped by the balance itself.
    Standard,
    /// May overdraw down to `-overdraft_limit`.
    Checking { overdraft_limit: Money },
    /// Base withdrawal policy, plus yield accrual.
    Savings { yield_rate: YieldRate },
}

impl AccountKind {
    /// Lowest balance this kind of account may reach.
    pub fn balance_floor(self) -> Money {
        match self {
            AccountKind::Checking { overdraft_limit } => -overdraft_limit,
            AccountKind::Standard | AccountKind::Savings { .. } => Money::ZERO,
        }
    }

    pub fn accrues_yield(self) -> bool {
        matches!(self, AccountKind::Savings { .. })
    }
}

/// Aggregate root: BankAccount.
///
/// Balance is private and evolves only through applied events; there is no
/// public setter. Commands never mutate: `handle` decides, `apply` evolves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAccount {
    id: AccountId,
    holder_name: Option<HolderName>,
    account_number: Option<AccountNumber>,
    kind: Option<AccountKind>,
    balance: Money,
    version: u64,
    opened: bool,
}

impl BankAccount {
    /// Create an empty, not-yet-opened aggregate instance for rehydration.
    pub fn empty(id: AccountId) -> Self {
        Self {
            id,
            holder_name: None,
            account_number: None,
            kind: None,
            balance: Money::ZERO,
            version: 0,
            opened: false,
        }
    }

    pub fn id_typed(&self) -> AccountId {
        self.id
    }

    pub fn holder_name(&self) -> Option<&HolderName> {
        self.holder_name.as_ref()
    }

    pub fn account_number(&self) -> Option<&AccountNumber> {
        self.account_number.as_ref()
    }

    pub fn kind(&self) -> Option<AccountKind> {
        self.kind
    }

    pub fn balance(&self) -> Money {
        self.balance
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    /// Maximum withdrawable amount: the balance for standard/savings
    /// accounts, balance plus overdraft limit for checking accounts.
    ///
    /// Saturates rather than wrapping: a sum past the `Money` range already
    /// exceeds every representable withdrawal amount.
    pub fn spendable_ceiling(&self) -> Money {
        match self.kind {
            Some(AccountKind::Checking { overdraft_limit }) => {
                self.balance.saturating_add(overdraft_limit)
            }
            _ => self.balance,
        }
    }
}

impl AggregateRoot for BankAccount {
    type Id = AccountId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: OpenAccount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAccount {
    pub account_id: AccountId,
    pub holder_name: String,
    pub account_number: String,
    pub kind: AccountKind,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposit {
    pub account_id: AccountId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: Withdraw.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdraw {
    pub account_id: AccountId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Command: ApplyYield (savings accounts only).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyYield {
    pub account_id: AccountId,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountCommand {
    Open(OpenAccount),
    Deposit(Deposit),
    Withdraw(Withdraw),
    ApplyYield(ApplyYield),
}

/// Event: AccountOpened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountOpened {
    pub account_id: AccountId,
    pub holder_name: HolderName,
    pub account_number: AccountNumber,
    pub kind: AccountKind,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Deposited.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deposited {
    pub account_id: AccountId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: Withdrawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Withdrawn {
    pub account_id: AccountId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

/// Event: YieldApplied. Applied to the balance exactly like a deposit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YieldApplied {
    pub account_id: AccountId,
    pub amount: Money,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountEvent {
    Opened(AccountOpened),
    Deposited(Deposited),
    Withdrawn(Withdrawn),
    YieldApplied(YieldApplied),
}

impl Event for AccountEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AccountEvent::Opened(_) => "accounts.account.opened",
            AccountEvent::Deposited(_) => "accounts.account.deposited",
            AccountEvent::Withdrawn(_) => "accounts.account.withdrawn",
            AccountEvent::YieldApplied(_) => "accounts.account.yield_applied",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            AccountEvent::Opened(e) => e.occurred_at,
            AccountEvent::Deposited(e) => e.occurred_at,
            AccountEvent::Withdrawn(e) => e.occurred_at,
            AccountEvent::YieldApplied(e) => e.occurred_at,
        }
    }
}

impl Aggregate for BankAccount {
    type Command = AccountCommand;
    type Event = AccountEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            AccountEvent::Opened(e) => {
                self.id = e.account_id;
                self.holder_name = Some(e.holder_name.clone());
                self.account_number = Some(e.account_number.clone());
                self.kind = Some(e.kind);
                self.balance = Money::ZERO;
                self.opened = true;
            }
            AccountEvent::Deposited(e) => {
                self.balance = self.balance + e.amount;
            }
            AccountEvent::Withdrawn(e) => {
                self.balance = self.balance - e.amount;
            }
            // Yield lands on the balance the same way a deposit does.
            AccountEvent::YieldApplied(e) => {
                self.balance = self.balance + e.amount;
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            AccountCommand::Open(cmd) => self.handle_open(cmd),
            AccountCommand::Deposit(cmd) => self.handle_deposit(cmd),
            AccountCommand::Withdraw(cmd) => self.handle_withdraw(cmd),
            AccountCommand::ApplyYield(cmd) => self.handle_apply_yield(cmd),
        }
    }
}

impl BankAccount {
    fn ensure_open(&self) -> DomainResult<()> {
        if !self.opened {
            return Err(DomainError::not_found());
        }
        Ok(())
    }

    fn ensure_account_id(&self, account_id: AccountId) -> DomainResult<()> {
        if self.id != account_id {
            return Err(DomainError::invariant("account_id mismatch"));
        }
        Ok(())
    }

    /// Shared deposit eligibility check; yield accrual funnels through the
    /// same path as a regular deposit.
    fn ensure_depositable(&self, amount: Money) -> DomainResult<()> {
        if !amount.is_positive() {
            return Err(DomainError::validation("deposit amount must be positive"));
        }
        if self.balance.checked_add(amount).is_none() {
            return Err(DomainError::validation("deposit amount too large"));
        }
        Ok(())
    }

    fn handle_open(&self, cmd: &OpenAccount) -> DomainResult<Vec<AccountEvent>> {
        if self.opened {
            return Err(DomainError::conflict("account already open"));
        }
        self.ensure_account_id(cmd.account_id)?;

        let holder_name = HolderName::new(cmd.holder_name.clone())?;
        let account_number = AccountNumber::new(cmd.account_number.clone())?;

        if let AccountKind::Checking { overdraft_limit } = cmd.kind {
            if overdraft_limit.is_negative() {
                return Err(DomainError::validation(
                    "overdraft limit cannot be negative",
                ));
            }
        }

        Ok(vec![AccountEvent::Opened(AccountOpened {
            account_id: cmd.account_id,
            holder_name,
            account_number,
            kind: cmd.kind,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_deposit(&self, cmd: &Deposit) -> DomainResult<Vec<AccountEvent>> {
        self.ensure_open()?;
        self.ensure_account_id(cmd.account_id)?;
        self.ensure_depositable(cmd.amount)?;

        Ok(vec![AccountEvent::Deposited(Deposited {
            account_id: cmd.account_id,
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_withdraw(&self, cmd: &Withdraw) -> DomainResult<Vec<AccountEvent>> {
        self.ensure_open()?;
        self.ensure_account_id(cmd.account_id)?;

        if !cmd.amount.is_positive() {
            return Err(DomainError::validation(
                "withdrawal amount must be positive",
            ));
        }
        if cmd.amount > self.spendable_ceiling() {
            return Err(DomainError::invariant(
                "balance cannot drop below the account floor",
            ));
        }

        Ok(vec![AccountEvent::Withdrawn(Withdrawn {
            account_id: cmd.account_id,
            amount: cmd.amount,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_apply_yield(&self, cmd: &ApplyYield) -> DomainResult<Vec<AccountEvent>> {
        self.ensure_open()?;
        self.ensure_account_id(cmd.account_id)?;

        let Some(AccountKind::Savings { yield_rate }) = self.kind else {
            return Err(DomainError::validation("account does not accrue yield"));
        };

        // A non-positive yield (balance <= 0) fails the deposit check and is
        // silently dropped: no event, no state change, no error. Any other
        // rejection (a yield the balance cannot absorb) surfaces as usual.
        let amount = yield_rate.of(self.balance);
        if let Err(err) = self.ensure_depositable(amount) {
            if amount.is_positive() {
                return Err(err);
            }
            return Ok(Vec::new());
        }

        Ok(vec![AccountEvent::YieldApplied(YieldApplied {
            account_id: cmd.account_id,
            amount,
            occurred_at: cmd.occurred_at,
        })])
    }
}
