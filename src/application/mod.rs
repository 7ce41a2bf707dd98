//! Application layer: operation semantics and request dispatch.
//!
//! `TransactionProcessor` applies validated operations to the ledger under
//! per-account locks. `Dispatcher` pulls messages from a `MessageSource` and
//! runs each one as its own tokio task, bounded by a semaphore.

pub mod dispatcher;
pub mod processor;
