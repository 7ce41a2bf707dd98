use crate::domain::account::{AccountId, Amount};
use crate::domain::ledger::Ledger;
use crate::domain::request::{Operation, Request};
use crate::error::{LedgerError, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Result of a successfully applied operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Deposited {
        account: AccountId,
        amount: Amount,
        balance: i64,
    },
    Withdrew {
        account: AccountId,
        amount: Amount,
        balance: i64,
    },
    Balance {
        account: AccountId,
        balance: i64,
    },
    Transferred {
        from: AccountId,
        to: AccountId,
        amount: Amount,
        from_balance: i64,
        to_balance: i64,
    },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Deposited {
                account,
                amount,
                balance,
            } => write!(
                f,
                "deposited {amount} into account {account}, new balance {balance}"
            ),
            Outcome::Withdrew {
                account,
                amount,
                balance,
            } => write!(
                f,
                "withdrew {amount} from account {account}, new balance {balance}"
            ),
            Outcome::Balance { account, balance } => {
                write!(f, "account {account} balance {balance}")
            }
            Outcome::Transferred {
                from,
                to,
                amount,
                from_balance,
                to_balance,
            } => write!(
                f,
                "transferred {amount} from account {from} to account {to}, balances {from_balance} and {to_balance}"
            ),
        }
    }
}

/// Applies operations to the ledger.
///
/// Every operation takes the per-account lock of each account it touches.
/// Transfers take both locks in ascending index order, whatever the direction
/// of the transfer, so two transfers can never wait on each other in a cycle.
pub struct TransactionProcessor {
    ledger: Arc<Ledger>,
    transfer_delay: Duration,
}

impl TransactionProcessor {
    pub fn new(ledger: Arc<Ledger>) -> Self {
        Self {
            ledger,
            transfer_delay: Duration::ZERO,
        }
    }

    /// Sleeps for `delay` between taking the two locks of every transfer.
    ///
    /// Widens the window in which lock-ordering mistakes would deadlock;
    /// meant for tests.
    pub fn with_transfer_delay(mut self, delay: Duration) -> Self {
        self.transfer_delay = delay;
        self
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        &self.ledger
    }

    /// Validates the request against this ledger, then applies it.
    ///
    /// Validation failures are returned before any lock is taken.
    pub async fn process(&self, request: Request) -> Result<Outcome> {
        let operation = request.validate(self.ledger.len())?;
        self.execute(operation).await
    }

    pub async fn execute(&self, operation: Operation) -> Result<Outcome> {
        match operation {
            Operation::Deposit { account, amount } => self.deposit(account, amount).await,
            Operation::Withdraw { account, amount } => self.withdraw(account, amount).await,
            Operation::View { account } => self.view(account).await,
            Operation::Transfer { from, to, amount } => self.transfer(from, to, amount).await,
        }
    }

    async fn deposit(&self, account: AccountId, amount: Amount) -> Result<Outcome> {
        let balance = self.ledger.credit(account, amount).await?;
        Ok(Outcome::Deposited {
            account,
            amount,
            balance,
        })
    }

    async fn withdraw(&self, account: AccountId, amount: Amount) -> Result<Outcome> {
        match self.ledger.try_debit(account, amount).await? {
            Some(balance) => Ok(Outcome::Withdrew {
                account,
                amount,
                balance,
            }),
            None => Err(LedgerError::InsufficientFunds {
                account: account.index(),
                requested: amount.value(),
            }),
        }
    }

    async fn view(&self, account: AccountId) -> Result<Outcome> {
        let balance = self.ledger.read_balance(account).await?;
        Ok(Outcome::Balance { account, balance })
    }

    async fn transfer(&self, from: AccountId, to: AccountId, amount: Amount) -> Result<Outcome> {
        if from == to {
            return Err(LedgerError::SelfTransfer(from.index()));
        }

        let (lo, hi) = if from < to { (from, to) } else { (to, from) };
        let mut first = self.ledger.lock(lo).await?;
        if !self.transfer_delay.is_zero() {
            tokio::time::sleep(self.transfer_delay).await;
        }
        let mut second = self.ledger.lock(hi).await?;

        let (source, target) = if from == lo {
            (&mut first, &mut second)
        } else {
            (&mut second, &mut first)
        };

        if !target.can_credit(amount) {
            return Err(LedgerError::BalanceOverflow {
                account: to.index(),
                amount: amount.value(),
            });
        }
        if !source.try_debit(amount) {
            return Err(LedgerError::InsufficientFunds {
                account: from.index(),
                requested: amount.value(),
            });
        }
        let to_balance = target.credit(amount)?;

        Ok(Outcome::Transferred {
            from,
            to,
            amount,
            from_balance: source.balance(),
            to_balance,
        })
    }
}
