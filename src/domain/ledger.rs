use super::account::{Account, AccountId, AccountSnapshot, Amount};
use crate::config::{check_accounts, check_initial_balance};
use crate::error::{LedgerError, Result};
use std::ops::{Deref, DerefMut};
use tokio::sync::{Mutex, MutexGuard};

/// The fixed table of accounts, each guarded by its own lock.
///
/// Every accessor goes through the per-account lock of the index it touches.
/// There is no table-wide lock: callers that need more than one account must
/// take the locks themselves, in ascending index order, via [`Ledger::lock`].
#[derive(Debug)]
pub struct Ledger {
    accounts: Box<[Mutex<Account>]>,
}

/// Exclusive hold on one account, released on drop.
pub struct AccountGuard<'a> {
    inner: MutexGuard<'a, Account>,
}

impl Deref for AccountGuard<'_> {
    type Target = Account;

    fn deref(&self) -> &Account {
        &self.inner
    }
}

impl DerefMut for AccountGuard<'_> {
    fn deref_mut(&mut self) -> &mut Account {
        &mut self.inner
    }
}

impl Ledger {
    /// Creates `accounts` accounts, each starting at `initial_balance`.
    pub fn new(accounts: usize, initial_balance: i64) -> Result<Self> {
        check_accounts(accounts)?;
        check_initial_balance(initial_balance)?;

        let accounts = (0..accounts)
            .map(|i| {
                let id = AccountId::new(i as i64, accounts)?;
                Ok(Mutex::new(Account::new(id, initial_balance)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            accounts: accounts.into_boxed_slice(),
        })
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Validates a raw index against this ledger.
    pub fn account_id(&self, index: i64) -> Result<AccountId> {
        AccountId::new(index, self.len())
    }

    /// Waits for exclusive access to one account.
    pub async fn lock(&self, id: AccountId) -> Result<AccountGuard<'_>> {
        let slot = self
            .accounts
            .get(id.index())
            .ok_or(LedgerError::InvalidAccount {
                index: id.index() as i64,
                accounts: self.len(),
            })?;
        Ok(AccountGuard {
            inner: slot.lock().await,
        })
    }

    pub async fn read_balance(&self, id: AccountId) -> Result<i64> {
        Ok(self.lock(id).await?.balance())
    }

    /// Credits the account and returns its new balance.
    pub async fn credit(&self, id: AccountId, amount: Amount) -> Result<i64> {
        self.lock(id).await?.credit(amount)
    }

    /// Debits the account if it holds at least `amount`.
    ///
    /// Returns the new balance on success and `None` when the balance was
    /// insufficient, in which case nothing changed.
    pub async fn try_debit(&self, id: AccountId, amount: Amount) -> Result<Option<i64>> {
        let mut account = self.lock(id).await?;
        Ok(account.try_debit(amount).then(|| account.balance()))
    }

    /// Reads every account in ascending index order, one lock at a time.
    pub async fn snapshot(&self) -> Vec<AccountSnapshot> {
        let mut balances = Vec::with_capacity(self.len());
        for slot in self.accounts.iter() {
            let account = slot.lock().await;
            balances.push(AccountSnapshot {
                account: account.id().index(),
                balance: account.balance(),
            });
        }
        balances
    }

    /// Sum of all balances. Only consistent when no operation is in flight.
    pub async fn total(&self) -> i128 {
        self.snapshot()
            .await
            .iter()
            .map(|s| i128::from(s.balance))
            .sum()
    }
}
