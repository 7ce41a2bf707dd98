//! Wire and report formats at the edge of the server.

pub mod csv;
pub mod wire;
