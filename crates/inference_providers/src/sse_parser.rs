use crate::{ChatCompletionChunk, CompletionError};
use bytes::Bytes;
use futures_util::Stream;
use std::collections::VecDeque;
use std::fmt::Display;
use std::pin::Pin;
use std::task::{Context, Poll};

/// Represents a single SSE event with both raw bytes and parsed content
#[derive(Debug, Clone)]
pub struct SSEEvent {
    /// The raw bytes of this SSE line (including "data: " prefix and newline)
    pub raw_bytes: Bytes,
    /// The parsed chunk
    pub chunk: ChatCompletionChunk,
}

/// SSE (Server-Sent Events) stream parser that buffers incomplete lines
/// across HTTP chunks.
///
/// Chunk boundaries from the transport do not line up with event boundaries,
/// so bytes are held until a full line is available. Decoding to UTF-8 happens
/// per complete line, which keeps multi-byte characters intact when they are
/// split between two chunks.
///
/// Each `data:` line yields one item:
/// - `Ok(SSEEvent)` for a well-formed completion chunk
/// - `Err(CompletionError::InvalidResponse)` for a payload that is not a chunk;
///   the parser keeps going afterwards
/// - `Err(CompletionError::StreamInterrupted)` for an in-band provider error or
///   a transport failure; the stream ends after it
pub struct SSEParser<S> {
    inner: S,
    buffer: Vec<u8>,
    pending: VecDeque<Result<SSEEvent, CompletionError>>,
    finished: bool,
}

/// Wrap a byte stream in an [`SSEParser`]
pub fn new_sse_parser<S, E>(stream: S) -> SSEParser<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    SSEParser::new(stream)
}

impl<S, E> SSEParser<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    pub fn new(stream: S) -> Self {
        Self {
            inner: stream,
            buffer: Vec::new(),
            pending: VecDeque::new(),
            finished: false,
        }
    }

    fn parse_sse_data(data: &str) -> Option<Result<ChatCompletionChunk, CompletionError>> {
        // Handle end-of-stream marker
        if data == "[DONE]" {
            return None;
        }

        let json = match serde_json::from_str::<serde_json::Value>(data) {
            Ok(json) => json,
            Err(e) => {
                return Some(Err(CompletionError::InvalidResponse(format!(
                    "Invalid JSON in SSE event: {e}"
                ))))
            }
        };

        // Providers report failures after the 200 status as an `error` payload
        if let Some(error) = json.get("error") {
            let message = error
                .get("message")
                .and_then(|m| m.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| error.to_string());
            return Some(Err(CompletionError::StreamInterrupted(message)));
        }

        Some(
            serde_json::from_value::<ChatCompletionChunk>(json).map_err(|e| {
                CompletionError::InvalidResponse(format!("Invalid chat chunk: {e}"))
            }),
        )
    }

    fn process_line(&mut self, raw: &[u8]) {
        let raw_bytes = Bytes::copy_from_slice(raw);

        let mut line = raw;
        if let Some(stripped) = line.strip_suffix(b"\n") {
            line = stripped;
        }
        if let Some(stripped) = line.strip_suffix(b"\r") {
            line = stripped;
        }

        let line = match std::str::from_utf8(line) {
            Ok(line) => line,
            Err(e) => {
                self.pending
                    .push_back(Err(CompletionError::InvalidResponse(format!(
                        "SSE line is not valid UTF-8: {e}"
                    ))));
                return;
            }
        };

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with(':') {
            return;
        }

        // Only data lines carry payloads; event/id/retry fields are ignored
        let Some(data) = line.strip_prefix("data:") else {
            return;
        };
        let data = data.strip_prefix(' ').unwrap_or(data);

        match Self::parse_sse_data(data) {
            Some(Ok(chunk)) => self.pending.push_back(Ok(SSEEvent { raw_bytes, chunk })),
            Some(Err(e)) => {
                let fatal = matches!(e, CompletionError::StreamInterrupted(_));
                self.pending.push_back(Err(e));
                if fatal {
                    self.finished = true;
                    self.buffer.clear();
                }
            }
            None => {} // [DONE] marker
        }
    }

    fn process_buffer(&mut self) {
        // Process complete lines in the buffer
        while !self.finished {
            let Some(newline_pos) = self.buffer.iter().position(|b| *b == b'\n') else {
                break;
            };
            let line: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            self.process_line(&line);
        }
    }

    fn process_remainder(&mut self) {
        if self.buffer.iter().all(u8::is_ascii_whitespace) {
            self.buffer.clear();
            return;
        }
        tracing::debug!(
            bytes = self.buffer.len(),
            "SSE stream ended without a trailing newline; processing final line"
        );
        let line = std::mem::take(&mut self.buffer);
        self.process_line(&line);
    }
}

impl<S, E> Stream for SSEParser<S>
where
    S: Stream<Item = Result<Bytes, E>> + Unpin,
    E: Display,
{
    type Item = Result<SSEEvent, CompletionError>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = &mut *self;

        loop {
            // Deliver everything already decoded before touching the transport
            if let Some(item) = this.pending.pop_front() {
                return Poll::Ready(Some(item));
            }
            if this.finished {
                return Poll::Ready(None);
            }

            match Pin::new(&mut this.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(bytes))) => {
                    this.buffer.extend_from_slice(&bytes);
                    this.process_buffer();
                }
                Poll::Ready(Some(Err(e))) => {
                    this.finished = true;
                    this.buffer.clear();
                    return Poll::Ready(Some(Err(CompletionError::StreamInterrupted(
                        e.to_string(),
                    ))));
                }
                Poll::Ready(None) => {
                    this.process_remainder();
                    this.finished = true;
                }
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
