use crate::error::{LedgerError, Result};
use std::time::Duration;

pub const DEFAULT_ACCOUNTS: usize = 5;
pub const DEFAULT_INITIAL_BALANCE: i64 = 1000;
pub const DEFAULT_RECV_BACKOFF: Duration = Duration::from_secs(1);

/// Upper bound on `max_in_flight`, well inside what a tokio semaphore allows.
pub const MAX_IN_FLIGHT_LIMIT: usize = 1 << 16;

/// Startup configuration for the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Number of accounts in the ledger.
    pub accounts: usize,
    /// Balance every account starts with.
    pub initial_balance: i64,
    /// Maximum number of requests processed at the same time.
    pub max_in_flight: usize,
    /// Pause between taking the first and second lock of a transfer.
    /// Test instrumentation only; zero in normal operation.
    pub transfer_delay: Duration,
    /// Wait before retrying after a failed receive.
    pub recv_backoff: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            accounts: DEFAULT_ACCOUNTS,
            initial_balance: DEFAULT_INITIAL_BALANCE,
            max_in_flight: default_parallelism(),
            transfer_delay: Duration::ZERO,
            recv_backoff: DEFAULT_RECV_BACKOFF,
        }
    }
}

/// Available parallelism of the host, or 1 if it cannot be determined.
pub fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

impl ServerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accounts(mut self, accounts: usize) -> Self {
        self.accounts = accounts;
        self
    }

    pub fn with_initial_balance(mut self, balance: i64) -> Self {
        self.initial_balance = balance;
        self
    }

    pub fn with_max_in_flight(mut self, max: usize) -> Self {
        self.max_in_flight = max;
        self
    }

    pub fn with_transfer_delay(mut self, delay: Duration) -> Self {
        self.transfer_delay = delay;
        self
    }

    pub fn with_recv_backoff(mut self, backoff: Duration) -> Self {
        self.recv_backoff = backoff;
        self
    }

    /// Checks every field. The ledger and dispatcher constructors apply the
    /// same checks to the parts they own.
    pub fn validate(&self) -> Result<()> {
        check_accounts(self.accounts)?;
        check_initial_balance(self.initial_balance)?;
        check_max_in_flight(self.max_in_flight)?;
        Ok(())
    }
}

pub(crate) fn check_accounts(accounts: usize) -> Result<()> {
    if accounts == 0 {
        return Err(LedgerError::Config("accounts must be at least 1".to_string()));
    }
    Ok(())
}

pub(crate) fn check_initial_balance(balance: i64) -> Result<()> {
    if balance < 0 {
        return Err(LedgerError::Config(format!(
            "initial balance must not be negative, got {balance}"
        )));
    }
    Ok(())
}

/// Returns the bound as a semaphore permit count.
pub(crate) fn check_max_in_flight(max: usize) -> Result<u32> {
    u32::try_from(max)
        .ok()
        .filter(|_| (1..=MAX_IN_FLIGHT_LIMIT).contains(&max))
        .ok_or_else(|| {
            LedgerError::Config(format!(
                "max in-flight requests must be between 1 and {MAX_IN_FLIGHT_LIMIT}, got {max}"
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert_eq!(config.accounts, 5);
        assert_eq!(config.initial_balance, 1000);
        assert_eq!(config.transfer_delay, Duration::ZERO);
        assert!(config.max_in_flight >= 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        assert!(ServerConfig::new().with_accounts(0).validate().is_err());
        assert!(ServerConfig::new().with_initial_balance(-1).validate().is_err());
        assert!(ServerConfig::new().with_max_in_flight(0).validate().is_err());
        assert!(
            ServerConfig::new()
                .with_max_in_flight(MAX_IN_FLIGHT_LIMIT + 1)
                .validate()
                .is_err()
        );
        assert!(
            ServerConfig::new()
                .with_accounts(1)
                .with_initial_balance(0)
                .with_max_in_flight(1)
                .validate()
                .is_ok()
        );
    }

    #[test]
    fn test_constructor_checks_share_messages() {
        let err = check_accounts(0).unwrap_err();
        assert_eq!(
            err.to_string(),
            ServerConfig::new().with_accounts(0).validate().unwrap_err().to_string()
        );
        assert_eq!(check_max_in_flight(MAX_IN_FLIGHT_LIMIT).unwrap(), 1 << 16);
        assert!(check_max_in_flight(0).is_err());
    }
}
