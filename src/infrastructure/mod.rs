//! Message sources the dispatcher can read from.

pub mod channel;
#[cfg(unix)]
pub mod datagram;
pub mod lines;
