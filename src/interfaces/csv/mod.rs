pub mod balance_writer;

pub use balance_writer::BalanceWriter;
