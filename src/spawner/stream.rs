//! Diagnostic relay for AI stderr
//!
//! Drains the stream line by line and publishes each non-empty line on the
//! owning session's broadcast channel.

use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use super::types::LogEvent;
use crate::session::SessionId;

/// Forwards diagnostic lines from one child to one session channel
pub struct LogRelay {
    session_id: SessionId,
    tx: broadcast::Sender<LogEvent>,
}

impl LogRelay {
    pub fn new(session_id: SessionId, tx: broadcast::Sender<LogEvent>) -> Self {
        Self { session_id, tx }
    }

    /// Spawn a task draining `reader` until end-of-stream or a read error
    pub fn spawn<R>(self, reader: R) -> JoinHandle<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        tokio::spawn(async move {
            self.run(reader).await;
        })
    }

    async fn run<R>(self, reader: R)
    where
        R: AsyncRead + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();

        debug!(session_id = %self.session_id, "Log relay started");

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    let text = String::from_utf8_lossy(&buf);
                    let line = text.trim();
                    if line.is_empty() {
                        continue;
                    }
                    trace!(session_id = %self.session_id, line, "Relaying AI log");
                    // No subscribers is fine
                    let _ = self.tx.send(LogEvent {
                        session_id: self.session_id,
                        log: line.to_string(),
                    });
                }
                Err(e) => {
                    debug!(session_id = %self.session_id, error = %e, "Log relay read failed");
                    break;
                }
            }
        }

        debug!(session_id = %self.session_id, "Log relay finished");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_relay_trims_and_skips_blank_lines() {
        let (tx, mut rx) = broadcast::channel(16);
        let id = SessionId::new();
        let input: &'static [u8] = b"  depth 3 \n\n   \nscore=+12\r\nlast line without newline";

        LogRelay::new(id, tx).spawn(input).await.unwrap();

        let mut lines = Vec::new();
        while let Ok(event) = rx.try_recv() {
            assert_eq!(event.session_id, id);
            lines.push(event.log);
        }
        assert_eq!(lines, vec!["depth 3", "score=+12", "last line without newline"]);
    }

    #[tokio::test]
    async fn test_relay_tolerates_invalid_utf8() {
        let (tx, mut rx) = broadcast::channel(16);
        let input: &'static [u8] = b"ok\n\xff\xfe bad\nafter\n";

        LogRelay::new(SessionId::new(), tx).spawn(input).await.unwrap();

        let logs: Vec<String> = std::iter::from_fn(|| rx.try_recv().ok()).map(|e| e.log).collect();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0], "ok");
        assert!(logs[1].ends_with("bad"));
        assert_eq!(logs[2], "after");
    }

    #[tokio::test]
    async fn test_relay_without_subscribers_finishes() {
        let (tx, rx) = broadcast::channel(4);
        drop(rx);
        let input: &'static [u8] = b"nobody listening\n";
        LogRelay::new(SessionId::new(), tx).spawn(input).await.unwrap();
    }
}
