//! Async stream readers (non-UTF8-safe).
//!
//! Worker scripts can emit non-UTF8 bytes (printer names from USB
//! descriptors, tracebacks with local paths). `BufReader::lines()` would end
//! the reader on invalid UTF-8, so lines are read as bytes and decoded
//! lossily.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::types::{OutputLine, StreamKind};

/// Forward each line of `stream` to `tx` until EOF, a read error, or the
/// receiver going away.
pub(crate) fn spawn_line_reader(
    stream: impl AsyncRead + Unpin + Send + 'static,
    pid: Option<u32>,
    kind: StreamKind,
    tx: mpsc::UnboundedSender<OutputLine>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf: Vec<u8> = Vec::with_capacity(1024);

        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                        if buf.last() == Some(&b'\r') {
                            buf.pop();
                        }
                    }

                    let text = String::from_utf8_lossy(&buf).into_owned();
                    if tx.send(OutputLine { stream: kind, text }).is_err() {
                        debug!(?pid, stream = kind.as_str(), "line receiver dropped");
                        break;
                    }
                }
                Err(e) => {
                    debug!(?pid, stream = kind.as_str(), error = %e, "stream reader exiting due to read error");
                    break;
                }
            }
        }

        debug!(?pid, stream = kind.as_str(), "stream reader task exiting");
    })
}

/// Read `stream` to EOF and return everything, lossily decoded.
pub(crate) fn spawn_capture(
    stream: impl AsyncRead + Unpin + Send + 'static,
    pid: Option<u32>,
    kind: StreamKind,
) -> JoinHandle<String> {
    tokio::spawn(async move {
        let mut reader = BufReader::new(stream);
        let mut buf = Vec::new();
        if let Err(e) = reader.read_to_end(&mut buf).await {
            debug!(?pid, stream = kind.as_str(), error = %e, "capture ended early");
        }
        String::from_utf8_lossy(&buf).into_owned()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn splits_lines_and_strips_crlf() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let input: &[u8] = b"first\r\nsecond\nlast-without-newline";
        spawn_line_reader(input, None, StreamKind::Stdout, tx)
            .await
            .unwrap();

        let mut lines = Vec::new();
        while let Some(line) = rx.recv().await {
            lines.push(line.text);
        }
        assert_eq!(lines, vec!["first", "second", "last-without-newline"]);
    }

    #[tokio::test]
    async fn invalid_utf8_does_not_stop_the_reader() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let input: &[u8] = b"bad \xff byte\nnext\n";
        spawn_line_reader(input, None, StreamKind::Stderr, tx)
            .await
            .unwrap();

        let first = rx.recv().await.unwrap();
        assert_eq!(first.stream, StreamKind::Stderr);
        assert!(first.text.starts_with("bad "));
        assert_eq!(rx.recv().await.unwrap().text, "next");
    }

    #[tokio::test]
    async fn capture_reads_everything() {
        let input: &[u8] = b"line one\nline two\n";
        let text = spawn_capture(input, None, StreamKind::Stdout).await.unwrap();
        assert_eq!(text, "line one\nline two\n");
    }
}
