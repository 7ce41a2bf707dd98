use crate::domain::ports::MessageSource;
use crate::interfaces::wire::MAX_MESSAGE_SIZE;
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use tokio::net::UnixDatagram;
use tracing::{debug, warn};

/// Receives one message per datagram on a Unix socket.
///
/// Datagrams are read into a single reused buffer one byte larger than the
/// message limit, so an oversize datagram arrives truncated to
/// `MAX_MESSAGE_SIZE + 1` bytes and is rejected by the decoder.
///
/// The socket file is removed when the source is dropped.
pub struct DatagramSource {
    socket: UnixDatagram,
    path: PathBuf,
    buf: [u8; MAX_MESSAGE_SIZE + 1],
}

impl DatagramSource {
    /// Binds `path`, replacing a stale socket file left by a previous run.
    pub fn bind<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        match std::fs::remove_file(&path) {
            Ok(()) => debug!(path = %path.display(), "removed stale socket file"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(e),
        }

        let socket = UnixDatagram::bind(&path)?;
        Ok(Self {
            socket,
            path,
            buf: [0; MAX_MESSAGE_SIZE + 1],
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl MessageSource for DatagramSource {
    async fn recv(&mut self) -> io::Result<Option<Vec<u8>>> {
        let len = self.socket.recv(&mut self.buf).await?;
        Ok(Some(self.buf[..len].to_vec()))
    }
}

impl Drop for DatagramSource {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove socket file");
        }
    }
}
