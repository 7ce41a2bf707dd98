use thiserror::Error;

pub type Result<T> = std::result::Result<T, LedgerError>;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Malformed request: {0}")]
    Parse(#[from] ParseError),
    #[error("Invalid account index {index}: ledger has {accounts} accounts")]
    InvalidAccount { index: i64, accounts: usize },
    #[error("Amount must be positive, got {0}")]
    InvalidAmount(i64),
    #[error("Cannot transfer from account {0} to itself")]
    SelfTransfer(usize),
    #[error("Insufficient funds in account {account} for {requested}")]
    InsufficientFunds { account: usize, requested: i64 },
    #[error("Crediting {amount} to account {account} would overflow its balance")]
    BalanceOverflow { account: usize, amount: i64 },
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl LedgerError {
    /// Rejections that are part of normal operation rather than bad input.
    pub fn is_business_rejection(&self) -> bool {
        matches!(self, Self::InsufficientFunds { .. })
    }
}

/// Reasons an inbound message could not be decoded into a request.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ParseError {
    #[error("message exceeds {max} bytes")]
    TooLarge { max: usize },
    #[error("message is not valid UTF-8")]
    InvalidUtf8,
    #[error("message is empty")]
    Empty,
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
    #[error("{op} expects {expected} fields, got {got}")]
    FieldCount {
        op: &'static str,
        expected: &'static str,
        got: usize,
    },
    #[error("{field} is not an integer: '{value}'")]
    NotAnInteger { field: &'static str, value: String },
}
