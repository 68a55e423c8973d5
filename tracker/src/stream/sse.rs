//! SSE client for the orchestration log stream
//!
//! The control plane pushes each log line as one `data: <line>` event and
//! emits `: keep-alive` comments while idle. Payloads are forwarded verbatim;
//! framing lines (comments, blank event separators) are dropped here.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use futures::StreamExt;
use reqwest::{header, Client};
use tracing::debug;
use url::Url;

use crate::errors::TrackerError;

/// One physical connection yielding decoded log lines
#[async_trait]
pub trait LogStream: Send {
    /// Next line from the stream; `Ok(None)` on server-initiated close
    async fn next_line(&mut self) -> Result<Option<String>, TrackerError>;
}

/// Factory for physical connection attempts to the streaming endpoint
#[async_trait]
pub trait StreamConnector: Send + Sync {
    type Stream: LogStream;

    /// Open one connection
    async fn open(&self) -> Result<Self::Stream, TrackerError>;
}

/// SSE connector for the control plane's log stream endpoint
pub struct SseConnector {
    client: Client,
    endpoint: Url,
}

impl SseConnector {
    pub fn new(base_url: &str, stream_path: &str) -> Result<Self, TrackerError> {
        // Connect timeout only: the stream itself stays open indefinitely
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let endpoint = Url::parse(base_url)?.join(stream_path)?;

        Ok(Self { client, endpoint })
    }

    /// The resolved streaming endpoint
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

#[async_trait]
impl StreamConnector for SseConnector {
    type Stream = SseStream;

    async fn open(&self) -> Result<SseStream, TrackerError> {
        debug!("GET {} (log stream)", self.endpoint);

        let response = self
            .client
            .get(self.endpoint.clone())
            .header(header::ACCEPT, "text/event-stream")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(TrackerError::StreamError(format!(
                "stream endpoint returned {}",
                response.status()
            )));
        }

        Ok(SseStream {
            body: response.bytes_stream().boxed(),
            buf: Vec::new(),
        })
    }
}

/// Decoded SSE line stream over a response body
pub struct SseStream {
    body: BoxStream<'static, reqwest::Result<Bytes>>,
    buf: Vec<u8>,
}

#[async_trait]
impl LogStream for SseStream {
    async fn next_line(&mut self) -> Result<Option<String>, TrackerError> {
        loop {
            // Drain complete lines already buffered
            while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
                let raw: Vec<u8> = self.buf.drain(..=pos).collect();
                let text = String::from_utf8_lossy(&raw[..raw.len() - 1]);
                if let Some(payload) = decode_event_line(text.trim_end_matches('\r')) {
                    return Ok(Some(payload.to_string()));
                }
            }

            match self.body.next().await {
                Some(Ok(chunk)) => self.buf.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(TrackerError::HttpError(e)),
                None => return Ok(None),
            }
        }
    }
}

/// Decode one SSE line into its log payload, if it carries one.
///
/// `data:` fields are payloads, `:` comments are keep-alives, blank lines
/// separate events; everything else (event/id/retry fields) is ignored.
fn decode_event_line(line: &str) -> Option<&str> {
    if line.is_empty() || line.starts_with(':') {
        return None;
    }
    let payload = line.strip_prefix("data:")?;
    Some(payload.strip_prefix(' ').unwrap_or(payload))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_line() {
        assert_eq!(
            decode_event_line("data: TASK [galera : install]"),
            Some("TASK [galera : install]")
        );
    }

    #[test]
    fn test_decode_data_line_without_space() {
        assert_eq!(decode_event_line("data:ok: [db-node-01]"), Some("ok: [db-node-01]"));
    }

    #[test]
    fn test_decode_ignores_keep_alive_comment() {
        assert_eq!(decode_event_line(": keep-alive"), None);
    }

    #[test]
    fn test_decode_ignores_blank_separator() {
        assert_eq!(decode_event_line(""), None);
    }

    #[test]
    fn test_decode_ignores_other_fields() {
        assert_eq!(decode_event_line("event: message"), None);
        assert_eq!(decode_event_line("retry: 3000"), None);
    }

    #[test]
    fn test_payload_kept_verbatim() {
        // Inner colons and markers must survive untouched
        assert_eq!(
            decode_event_line("data: fatal: [db-node-02]: FAILED! => {}"),
            Some("fatal: [db-node-02]: FAILED! => {}")
        );
    }
}
