use super::account::{AccountId, Amount};
use crate::error::{LedgerError, ParseError, Result};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpKind {
    Deposit,
    Withdraw,
    View,
    Transfer,
}

impl OpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OpKind::Deposit => "deposit",
            OpKind::Withdraw => "withdraw",
            OpKind::View => "view",
            OpKind::Transfer => "transfer",
        }
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A decoded but not yet validated request.
///
/// Indices and amounts are kept as read off the wire so that range and sign
/// problems surface as validation errors rather than parse errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Request {
    pub op: OpKind,
    pub source: i64,
    pub amount: i64,
    pub target: Option<i64>,
}

impl Request {
    pub fn deposit(account: i64, amount: i64) -> Self {
        Self {
            op: OpKind::Deposit,
            source: account,
            amount,
            target: None,
        }
    }

    pub fn withdraw(account: i64, amount: i64) -> Self {
        Self {
            op: OpKind::Withdraw,
            source: account,
            amount,
            target: None,
        }
    }

    pub fn view(account: i64) -> Self {
        Self {
            op: OpKind::View,
            source: account,
            amount: 0,
            target: None,
        }
    }

    pub fn transfer(from: i64, amount: i64, to: i64) -> Self {
        Self {
            op: OpKind::Transfer,
            source: from,
            amount,
            target: Some(to),
        }
    }

    /// Checks indices against a ledger of `accounts` entries and the amount
    /// sign. Nothing here touches the ledger itself.
    pub fn validate(&self, accounts: usize) -> Result<Operation> {
        let account = AccountId::new(self.source, accounts)?;
        match self.op {
            OpKind::Deposit => Ok(Operation::Deposit {
                account,
                amount: Amount::new(self.amount)?,
            }),
            OpKind::Withdraw => Ok(Operation::Withdraw {
                account,
                amount: Amount::new(self.amount)?,
            }),
            OpKind::View => Ok(Operation::View { account }),
            OpKind::Transfer => {
                let target = self.target.ok_or(ParseError::FieldCount {
                    op: "transfer",
                    expected: "4",
                    got: 3,
                })?;
                let to = AccountId::new(target, accounts)?;
                if to == account {
                    return Err(LedgerError::SelfTransfer(account.index()));
                }
                Ok(Operation::Transfer {
                    from: account,
                    to,
                    amount: Amount::new(self.amount)?,
                })
            }
        }
    }
}

/// Formats the request in its wire form.
impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.source, self.op, self.amount)?;
        if let Some(target) = self.target {
            write!(f, " {target}")?;
        }
        Ok(())
    }
}

/// A request whose indices and amount have been checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Deposit { account: AccountId, amount: Amount },
    Withdraw { account: AccountId, amount: Amount },
    View { account: AccountId },
    Transfer {
        from: AccountId,
        to: AccountId,
        amount: Amount,
    },
}
