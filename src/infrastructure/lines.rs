use crate::domain::ports::MessageSource;
use crate::interfaces::wire::MAX_MESSAGE_SIZE;
use async_trait::async_trait;
use std::io;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

/// Reads one message per line from a buffered async reader, e.g. stdin.
///
/// At most `MAX_MESSAGE_SIZE + 1` bytes of a line are kept; the rest of an
/// overlong line is discarded, so the decoder still sees it as oversize
/// without the buffer growing with the input.
pub struct LineSource<R> {
    reader: R,
    buf: Vec<u8>,
}

impl<R: AsyncBufRead + Unpin + Send> LineSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::with_capacity(MAX_MESSAGE_SIZE + 1),
        }
    }
}

#[async_trait]
impl<R: AsyncBufRead + Unpin + Send> MessageSource for LineSource<R> {
    async fn recv(&mut self) -> io::Result<Option<Vec<u8>>> {
        const LIMIT: usize = MAX_MESSAGE_SIZE + 1;
        self.buf.clear();
        let mut seen_any = false;

        loop {
            let (consumed, end_of_line) = {
                let available = self.reader.fill_buf().await?;
                if available.is_empty() {
                    if !seen_any {
                        return Ok(None);
                    }
                    break;
                }
                seen_any = true;

                let (line, consumed, end_of_line) =
                    match available.iter().position(|b| *b == b'\n') {
                        Some(pos) => (&available[..pos], pos + 1, true),
                        None => (available, available.len(), false),
                    };
                let room = LIMIT.saturating_sub(self.buf.len());
                self.buf.extend_from_slice(&line[..line.len().min(room)]);
                (consumed, end_of_line)
            };
            self.reader.consume(consumed);
            if end_of_line {
                break;
            }
        }

        if self.buf.last() == Some(&b'\r') {
            self.buf.pop();
        }
        Ok(Some(self.buf.clone()))
    }
}
