//! Domain layer: accounts, the ledger that owns them, requests and the ports
//! through which requests arrive.

pub mod account;
pub mod ledger;
pub mod ports;
pub mod request;
