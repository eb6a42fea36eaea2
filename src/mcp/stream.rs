//! Newline-delimited JSON-RPC over an async reader/writer pair.
//!
//! Each inbound line is dispatched on its own task. Responses funnel through
//! one writer task so lines never interleave. At end of input the transport
//! waits for every in-flight call to answer before returning.

use std::sync::Arc;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::dispatcher::McpDispatcher;
use super::models::{JsonRpcError, JsonRpcResponse};
use super::validation::parse_message;
use crate::error::TransportError;
use crate::rate_limit::{Admission, RateLimiter};

/// Maximum bytes per JSON-RPC message (1 MiB).
pub const MAX_MESSAGE_BYTES: usize = 1024 * 1024;

const OUTBOUND_BUFFER: usize = 64;

/// Serves one connection's worth of newline-delimited JSON-RPC.
pub struct StreamTransport {
    dispatcher: Arc<McpDispatcher>,
    admission: Option<(Arc<RateLimiter>, String)>,
}

impl StreamTransport {
    pub fn new(dispatcher: Arc<McpDispatcher>) -> Self {
        Self {
            dispatcher,
            admission: None,
        }
    }

    /// Gates every inbound message on `limiter` under a fixed `key`.
    pub fn with_admission(mut self, limiter: Arc<RateLimiter>, key: impl Into<String>) -> Self {
        self.admission = Some((limiter, key.into()));
        self
    }

    /// Reads until EOF, then drains in-flight calls and closes `writer`.
    pub async fn serve<R, W>(&self, reader: R, writer: W) -> Result<(), TransportError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (tx, rx) = mpsc::channel(OUTBOUND_BUFFER);
        let writer_task = tokio::spawn(write_responses(writer, rx));

        let read_result = self.read_loop(reader, &tx).await;

        // The writer finishes once this and every task-held sender is gone.
        drop(tx);
        let write_result = writer_task.await?;

        read_result?;
        write_result?;
        info!("Stream transport closed");
        Ok(())
    }

    async fn read_loop<R>(
        &self,
        mut reader: R,
        tx: &mpsc::Sender<JsonRpcResponse>,
    ) -> Result<(), TransportError>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut raw = Vec::new();

        loop {
            raw.clear();
            // Never buffer more than one byte past the limit.
            let n = (&mut reader)
                .take(MAX_MESSAGE_BYTES as u64 + 1)
                .read_until(b'\n', &mut raw)
                .await?;
            if n == 0 {
                return Ok(());
            }
            if tx.is_closed() {
                warn!("Output closed; no longer reading input");
                return Ok(());
            }

            if n > MAX_MESSAGE_BYTES {
                if raw.last() != Some(&b'\n') {
                    skip_line(&mut reader).await?;
                }
                warn!(limit = MAX_MESSAGE_BYTES, "Message too large");
                let detail = format!("Message too large: exceeds {MAX_MESSAGE_BYTES} bytes");
                send(tx, parse_failure(detail)).await;
                continue;
            }

            let line = match std::str::from_utf8(&raw) {
                Ok(s) => s.trim(),
                Err(e) => {
                    send(tx, parse_failure(format!("Invalid UTF-8: {e}"))).await;
                    continue;
                }
            };
            if line.is_empty() {
                continue;
            }

            self.handle_line(line, tx).await;
        }
    }

    async fn handle_line(&self, line: &str, tx: &mpsc::Sender<JsonRpcResponse>) {
        let request = match parse_message(line) {
            Ok(request) => request,
            Err(invalid) => {
                debug!(details = ?invalid.details, "Rejected stream message");
                send(tx, invalid.into_response()).await;
                return;
            }
        };

        if let Some((limiter, key)) = &self.admission {
            if let Admission::Denied { retry_after_secs } = limiter.check(key) {
                warn!(client = %key, method = %request.method, retry_after_secs, "Rate limited message");
                match request.id {
                    Some(id) => {
                        let err = JsonRpcError::rate_limited(retry_after_secs);
                        send(tx, JsonRpcResponse::error(Some(id), err)).await;
                    }
                    None => debug!("Dropped rate limited notification"),
                }
                return;
            }
        }

        let dispatcher = Arc::clone(&self.dispatcher);
        let tx = tx.clone();
        tokio::spawn(async move {
            if let Some(response) = dispatcher.dispatch(request).await {
                send(&tx, response).await;
            }
        });
    }
}

/// Consumes input up to and including the next newline without buffering it.
async fn skip_line<R>(reader: &mut R) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
{
    loop {
        let buf = reader.fill_buf().await?;
        if buf.is_empty() {
            return Ok(());
        }
        let (used, done) = match buf.iter().position(|&b| b == b'\n') {
            Some(pos) => (pos + 1, true),
            None => (buf.len(), false),
        };
        reader.consume(used);
        if done {
            return Ok(());
        }
    }
}

fn parse_failure(detail: String) -> JsonRpcResponse {
    JsonRpcResponse::error(None, JsonRpcError::parse_error(vec![detail]))
}

async fn send(tx: &mpsc::Sender<JsonRpcResponse>, response: JsonRpcResponse) {
    if tx.send(response).await.is_err() {
        warn!("Response dropped: output closed");
    }
}

async fn write_responses<W>(
    mut writer: W,
    mut rx: mpsc::Receiver<JsonRpcResponse>,
) -> Result<(), TransportError>
where
    W: AsyncWrite + Unpin,
{
    while let Some(response) = rx.recv().await {
        let mut line = serde_json::to_vec(&response)?;
        line.push(b'\n');
        writer.write_all(&line).await?;
        writer.flush().await?;
    }
    writer.shutdown().await?;
    Ok(())
}
