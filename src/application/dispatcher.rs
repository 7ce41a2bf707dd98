use super::processor::TransactionProcessor;
use crate::config::{ServerConfig, check_max_in_flight};
use crate::domain::ledger::Ledger;
use crate::domain::ports::MessageSource;
use crate::error::Result;
use crate::interfaces::wire;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, error, info, warn};

/// Why [`Dispatcher::run`] returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The shutdown sentinel was received.
    Shutdown,
    /// The message source closed.
    SourceClosed,
}

/// Turns inbound messages into concurrent processing tasks.
///
/// Each message becomes one detached tokio task. A semaphore caps how many
/// of them run at once; the receive loop waits for a free permit before it
/// spawns the next task. Results are only logged.
pub struct Dispatcher {
    processor: Arc<TransactionProcessor>,
    limiter: Arc<Semaphore>,
    max_in_flight: u32,
    recv_backoff: Duration,
}

impl Dispatcher {
    pub fn new(
        processor: Arc<TransactionProcessor>,
        max_in_flight: usize,
        recv_backoff: Duration,
    ) -> Result<Self> {
        let max_in_flight = check_max_in_flight(max_in_flight)?;

        Ok(Self {
            processor,
            limiter: Arc::new(Semaphore::new(max_in_flight as usize)),
            max_in_flight,
            recv_backoff,
        })
    }

    /// Builds the ledger, processor and dispatcher described by `config`.
    pub fn from_config(config: &ServerConfig) -> Result<Self> {
        config.validate()?;
        let ledger = Arc::new(Ledger::new(config.accounts, config.initial_balance)?);
        let processor =
            TransactionProcessor::new(ledger).with_transfer_delay(config.transfer_delay);
        Self::new(
            Arc::new(processor),
            config.max_in_flight,
            config.recv_backoff,
        )
    }

    pub fn ledger(&self) -> &Arc<Ledger> {
        self.processor.ledger()
    }

    /// Number of requests currently being processed.
    pub fn in_flight(&self) -> usize {
        self.max_in_flight as usize - self.limiter.available_permits()
    }

    /// Receives messages until shutdown or until the source closes, then waits
    /// for every in-flight request to finish.
    ///
    /// Receive failures are logged and retried after the configured backoff.
    pub async fn run<S>(&self, source: &mut S) -> StopReason
    where
        S: MessageSource + ?Sized,
    {
        let reason = loop {
            let payload = match source.recv().await {
                Ok(Some(payload)) => payload,
                Ok(None) => {
                    info!("message source closed");
                    break StopReason::SourceClosed;
                }
                Err(e) => {
                    error!(error = %e, backoff = ?self.recv_backoff, "failed to receive message");
                    tokio::time::sleep(self.recv_backoff).await;
                    continue;
                }
            };

            if wire::is_shutdown(&payload) {
                info!("shutdown requested");
                break StopReason::Shutdown;
            }

            self.dispatch(payload).await;
        };

        self.drain().await;
        reason
    }

    /// Spawns a task for one message once a permit is free.
    pub async fn dispatch(&self, payload: Vec<u8>) {
        let permit = match Arc::clone(&self.limiter).acquire_owned().await {
            Ok(permit) => permit,
            Err(e) => {
                error!(error = %e, "request limiter closed, dropping message");
                return;
            }
        };

        let processor = Arc::clone(&self.processor);
        tokio::spawn(async move {
            handle_message(&processor, &payload).await;
            drop(permit);
        });
    }

    /// Waits until no request is in flight.
    pub async fn drain(&self) {
        debug!(in_flight = self.in_flight(), "draining in-flight requests");
        match self.limiter.acquire_many(self.max_in_flight).await {
            Ok(permits) => drop(permits),
            Err(e) => error!(error = %e, "request limiter closed while draining"),
        }
    }
}

async fn handle_message(processor: &TransactionProcessor, payload: &[u8]) {
    let request = match wire::decode_request(payload) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "rejected malformed message");
            return;
        }
    };

    match processor.process(request).await {
        Ok(outcome) => info!(op = %request.op, "{outcome}"),
        Err(e) if e.is_business_rejection() => info!(op = %request.op, "rejected: {e}"),
        Err(e) => warn!(op = %request.op, %request, "rejected: {e}"),
    }
}
