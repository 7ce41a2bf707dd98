#![allow(dead_code)]

use async_trait::async_trait;
use bank_server::application::processor::TransactionProcessor;
use bank_server::domain::ledger::Ledger;
use bank_server::domain::ports::MessageSource;
use std::collections::VecDeque;
use std::io;
use std::sync::Arc;
use std::time::Duration;

/// Five accounts of 1000 each, like the stock server.
pub fn processor() -> Arc<TransactionProcessor> {
    processor_with(5, 1000, Duration::ZERO)
}

pub fn processor_with(
    accounts: usize,
    initial_balance: i64,
    transfer_delay: Duration,
) -> Arc<TransactionProcessor> {
    let ledger = Arc::new(Ledger::new(accounts, initial_balance).unwrap());
    Arc::new(TransactionProcessor::new(ledger).with_transfer_delay(transfer_delay))
}

pub async fn balance(ledger: &Ledger, index: i64) -> i64 {
    ledger
        .read_balance(ledger.account_id(index).unwrap())
        .await
        .unwrap()
}

/// Replays a fixed script of receive results, then reports the source closed.
pub struct ScriptedSource {
    script: VecDeque<io::Result<Vec<u8>>>,
    pub receives: usize,
}

impl ScriptedSource {
    pub fn new(script: impl IntoIterator<Item = io::Result<Vec<u8>>>) -> Self {
        Self {
            script: script.into_iter().collect(),
            receives: 0,
        }
    }
}

#[async_trait]
impl MessageSource for ScriptedSource {
    async fn recv(&mut self) -> io::Result<Option<Vec<u8>>> {
        self.receives += 1;
        self.script.pop_front().transpose()
    }
}

pub fn message(text: &str) -> io::Result<Vec<u8>> {
    Ok(text.as_bytes().to_vec())
}

pub fn receive_error() -> io::Result<Vec<u8>> {
    Err(io::Error::other("queue unavailable"))
}
