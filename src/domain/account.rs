use crate::error::{LedgerError, Result};
use serde::Serialize;
use std::fmt;

/// Position of an account in the ledger.
///
/// Only constructed through [`AccountId::new`], which checks the index against
/// the number of accounts, so holding one means the index is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(usize);

impl AccountId {
    pub fn new(index: i64, accounts: usize) -> Result<Self> {
        match usize::try_from(index) {
            Ok(i) if i < accounts => Ok(Self(i)),
            _ => Err(LedgerError::InvalidAccount { index, accounts }),
        }
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A strictly positive amount of money moved by an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Amount(i64);

impl Amount {
    pub fn new(value: i64) -> Result<Self> {
        if value > 0 {
            Ok(Self(value))
        } else {
            Err(LedgerError::InvalidAmount(value))
        }
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A single balance cell. The balance never goes below zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    id: AccountId,
    balance: i64,
}

impl Account {
    pub fn new(id: AccountId, balance: i64) -> Self {
        debug_assert!(balance >= 0);
        Self { id, balance }
    }

    pub fn id(&self) -> AccountId {
        self.id
    }

    pub fn balance(&self) -> i64 {
        self.balance
    }

    /// Adds `amount` and returns the new balance.
    pub fn credit(&mut self, amount: Amount) -> Result<i64> {
        self.balance = self
            .balance
            .checked_add(amount.value())
            .ok_or(LedgerError::BalanceOverflow {
                account: self.id.index(),
                amount: amount.value(),
            })?;
        Ok(self.balance)
    }

    /// Subtracts `amount` only if the balance covers it.
    pub fn try_debit(&mut self, amount: Amount) -> bool {
        if self.balance >= amount.value() {
            self.balance -= amount.value();
            true
        } else {
            false
        }
    }

    /// Whether `amount` could be credited without overflowing.
    pub fn can_credit(&self, amount: Amount) -> bool {
        self.balance.checked_add(amount.value()).is_some()
    }
}

/// Point-in-time view of one account, as written to the shutdown report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccountSnapshot {
    pub account: usize,
    pub balance: i64,
}
