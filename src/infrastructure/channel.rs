use crate::domain::ports::MessageSource;
use async_trait::async_trait;
use std::io;
use tokio::sync::mpsc;

/// In-process message source backed by a bounded tokio channel.
///
/// The source closes once every sender has been dropped and the channel has
/// been drained.
pub struct ChannelSource {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl ChannelSource {
    /// Creates a source together with the sender producers push messages into.
    pub fn new(capacity: usize) -> (mpsc::Sender<Vec<u8>>, Self) {
        let (tx, rx) = mpsc::channel(capacity);
        (tx, Self { rx })
    }
}

#[async_trait]
impl MessageSource for ChannelSource {
    async fn recv(&mut self) -> io::Result<Option<Vec<u8>>> {
        Ok(self.rx.recv().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_channel_source_delivers_then_closes() {
        let (tx, mut source) = ChannelSource::new(2);
        tx.send(b"0 view 0".to_vec()).await.unwrap();
        drop(tx);

        assert_eq!(source.recv().await.unwrap(), Some(b"0 view 0".to_vec()));
        assert_eq!(source.recv().await.unwrap(), None);
    }
}
