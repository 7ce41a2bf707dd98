use async_trait::async_trait;
use std::io;

/// Where inbound request messages come from.
///
/// `Ok(None)` means the source is closed and will yield nothing more. An
/// `Err` is a failed receive; the caller may retry.
///
/// Implementations return an owned copy of each payload, so any receive
/// buffer they keep can be reused as soon as `recv` returns.
#[async_trait]
pub trait MessageSource: Send {
    async fn recv(&mut self) -> io::Result<Option<Vec<u8>>>;
}

pub type MessageSourceBox = Box<dyn MessageSource>;

