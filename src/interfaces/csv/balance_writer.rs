use crate::domain::account::AccountSnapshot;
use crate::error::Result;
use std::io::Write;

/// Writes final account balances as CSV.
///
/// Output has an `account,balance` header followed by one row per account.
pub struct BalanceWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> BalanceWriter<W> {
    /// Creates a new `BalanceWriter` over any `Write` sink (e.g., Stdout, File).
    pub fn new(dest: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(dest),
        }
    }

    pub fn write_balances<I>(&mut self, balances: I) -> Result<()>
    where
        I: IntoIterator<Item = AccountSnapshot>,
    {
        for balance in balances {
            self.writer.serialize(balance)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
