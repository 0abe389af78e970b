//! Server-Sent Events (SSE) parsing for chat-completion streams.
//!
//! The upstream gateway streams OpenAI-style completion chunks:
//! ```text
//! data: {"choices":[{"delta":{"content":"Hel"}}]}
//!
//! : keep-alive
//!
//! data: {"choices":[{"delta":{"content":"lo"}}]}
//!
//! data: [DONE]
//! ```
//!
//! [`StreamAssembler`] turns arbitrarily chunked body bytes into the ordered
//! text deltas carried by those records. [`SSEResponseExt`] wires it to a
//! `reqwest::Response`.

use std::borrow::Cow;
use std::collections::VecDeque;
use std::ops::ControlFlow;

use futures::stream::{self, Stream, StreamExt};
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::ClientError;
use crate::utf8::Utf8Decoder;

/// Literal prefix of a data line, including the single space.
pub const DATA_PREFIX: &str = "data: ";

/// Payload that ends the stream.
pub const DONE_MARKER: &str = "[DONE]";

/// Classification of one complete line of the event stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SseLine<'a> {
    /// Empty or whitespace only; separates records.
    Blank,
    /// Starts with `:`, used for keep-alives.
    Comment(&'a str),
    /// Trimmed payload of a `data: ` line.
    Data(&'a str),
    /// Any other field (`event:`, `id:`, `retry:`, garbage).
    Unrecognized(&'a str),
}

/// Classify a line with its line feed already removed.
///
/// One trailing carriage return is tolerated.
///
/// # Example
/// ```
/// use sbke::sse::{classify_line, SseLine};
///
/// assert_eq!(classify_line("data: [DONE]\r"), SseLine::Data("[DONE]"));
/// assert_eq!(classify_line(": ping"), SseLine::Comment(" ping"));
/// assert_eq!(classify_line("   "), SseLine::Blank);
/// assert_eq!(classify_line("event: message"), SseLine::Unrecognized("event: message"));
/// ```
pub fn classify_line(line: &str) -> SseLine<'_> {
    let line = line.strip_suffix('\r').unwrap_or(line);

    if line.trim().is_empty() {
        SseLine::Blank
    } else if let Some(comment) = line.strip_prefix(':') {
        SseLine::Comment(comment)
    } else if let Some(data) = parse_sse_line(line) {
        SseLine::Data(data)
    } else {
        SseLine::Unrecognized(line)
    }
}

/// Parse an SSE line to extract the data portion.
///
/// # Example
/// ```
/// use sbke::sse::parse_sse_line;
///
/// let line = "data: {\"key\": \"value\"}";
/// assert_eq!(parse_sse_line(line), Some("{\"key\": \"value\"}"));
///
/// assert_eq!(parse_sse_line("data:no-space"), None);
/// ```
pub fn parse_sse_line(line: &str) -> Option<&str> {
    line.strip_prefix(DATA_PREFIX).map(|s| s.trim())
}

/// Check if an SSE data payload is the termination sentinel.
///
/// # Example
/// ```
/// use sbke::sse::is_done_marker;
///
/// assert!(is_done_marker("[DONE]"));
/// assert!(!is_done_marker(""));
/// assert!(!is_done_marker("{\"data\": \"value\"}"));
/// ```
pub fn is_done_marker(data: &str) -> bool {
    data == DONE_MARKER
}

/// Pull `choices[0].delta.content` out of a completion chunk.
///
/// Returns `None` for any other shape and for empty content.
pub fn extract_delta(chunk: &Value) -> Option<&str> {
    chunk["choices"][0]["delta"]["content"]
        .as_str()
        .filter(|content| !content.is_empty())
}

/// A line can only continue a carried record if it does not itself open a
/// new one.
fn starts_record(line: &str) -> bool {
    line.trim().is_empty() || line.starts_with(':') || line.starts_with(DATA_PREFIX)
}

/// Incremental assembler for one streamed completion.
///
/// Feed it the body chunks in arrival order and it returns the text deltas
/// each chunk completes. Chunk boundaries may fall anywhere, including inside
/// a line, a JSON payload or a multi-byte character.
///
/// A `data:` record whose JSON does not parse is held back and joined with
/// the next line when one arrives, which recovers payloads broken by a stray
/// line feed. The record gets one such retry. It is dropped, without an
/// error, if the retry fails, if the next line opens a new record, or if the
/// stream ends first.
///
/// Once `data: [DONE]` is seen, everything else is ignored.
///
/// # Example
/// ```
/// use sbke::sse::StreamAssembler;
///
/// let mut assembler = StreamAssembler::new();
/// let mut text = String::new();
///
/// for chunk in [
///     &b"data: {\"choices\":[{\"delta\":{\"content\":\"Hel"[..],
///     &b"\"}}]}\n\ndata: {\"choices\":[{\"delta\":{\"content\":\"lo\"}}]}\n"[..],
///     &b"data: [DONE]\n"[..],
/// ] {
///     for delta in assembler.feed(chunk) {
///         text.push_str(&delta);
///     }
/// }
///
/// assert!(assembler.is_done());
/// assert_eq!(text, "Hello");
/// ```
#[derive(Debug, Default)]
pub struct StreamAssembler {
    decoder: Utf8Decoder,
    pending: String,
    carried: Option<String>,
    done: bool,
}

impl StreamAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// True once the `[DONE]` sentinel has been processed.
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Process the next chunk of the body and return the deltas it completes.
    pub fn feed(&mut self, chunk: &[u8]) -> Vec<String> {
        let mut deltas = Vec::new();
        if self.done {
            return deltas;
        }

        let text = self.decoder.decode(chunk);
        self.pending.push_str(&text);

        while let Some(line) = self.next_line() {
            if self.process_line(&line, &mut deltas).is_break() {
                break;
            }
        }

        deltas
    }

    /// Flush everything still buffered once the body has ended.
    ///
    /// An unterminated final line counts as complete. A held-back record
    /// that still does not parse is discarded.
    pub fn finish(&mut self) -> Vec<String> {
        let mut deltas = Vec::new();
        if self.done {
            return deltas;
        }

        let dropped = self.decoder.finish();
        if dropped > 0 {
            debug!(dropped, "stream ended inside a UTF-8 sequence");
        }

        // No more bytes can arrive, so a held-back record does not stop the
        // remaining lines here.
        while let Some(line) = self.next_line() {
            if self.process_line(&line, &mut deltas).is_break() && self.done {
                return deltas;
            }
        }

        let tail = std::mem::take(&mut self.pending);
        if !tail.is_empty() {
            let _ = self.process_line(&tail, &mut deltas);
        }

        if let Some(record) = self.carried.take() {
            warn!(
                len = record.len(),
                "discarding unparsable data record at end of stream"
            );
        }

        deltas
    }

    fn next_line(&mut self) -> Option<String> {
        let pos = self.pending.find('\n')?;
        let mut line: String = self.pending.drain(..=pos).collect();
        line.pop();
        Some(line)
    }

    /// Handle one complete line. `Break` means stop reading lines for this
    /// call.
    fn process_line(&mut self, raw: &str, deltas: &mut Vec<String>) -> ControlFlow<()> {
        let raw = raw.strip_suffix('\r').unwrap_or(raw);

        let (line, retried) = match self.carried.take() {
            Some(mut record) if !starts_record(raw) => {
                record.push_str(raw);
                (Cow::Owned(record), true)
            }
            Some(record) => {
                warn!(
                    len = record.len(),
                    "dropping unparsable data record superseded by a new line"
                );
                (Cow::Borrowed(raw), false)
            }
            None => (Cow::Borrowed(raw), false),
        };

        match classify_line(&line) {
            SseLine::Blank | SseLine::Comment(_) => ControlFlow::Continue(()),
            SseLine::Unrecognized(other) => {
                debug!(line = %other, "skipping unrecognized SSE line");
                ControlFlow::Continue(())
            }
            SseLine::Data(payload) if is_done_marker(payload) => {
                self.done = true;
                self.pending.clear();
                ControlFlow::Break(())
            }
            SseLine::Data("") => ControlFlow::Continue(()),
            SseLine::Data(payload) => match serde_json::from_str::<Value>(payload) {
                Ok(chunk) => {
                    if let Some(content) = extract_delta(&chunk) {
                        deltas.push(content.to_string());
                    }
                    ControlFlow::Continue(())
                }
                Err(e) if retried => {
                    warn!(error = %e, "dropping data record that stayed unparsable");
                    ControlFlow::Continue(())
                }
                Err(_) => {
                    self.carried = Some(line.to_string());
                    ControlFlow::Break(())
                }
            },
        }
    }
}

/// Turn a body byte stream into a stream of text deltas.
///
/// Ends after the `[DONE]` sentinel or when the body ends. A transport error
/// is yielded once and ends the stream.
pub fn delta_stream<S, B, E>(byte_stream: S) -> impl Stream<Item = Result<String, ClientError>> + Send
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send,
    E: Into<ClientError> + Send,
{
    stream::unfold(
        (
            Box::pin(byte_stream),
            StreamAssembler::new(),
            VecDeque::new(),
            false,
        ),
        |(mut byte_stream, mut assembler, mut ready, mut stream_ended)| async move {
            loop {
                if let Some(delta) = ready.pop_front() {
                    return Some((Ok(delta), (byte_stream, assembler, ready, stream_ended)));
                }

                if stream_ended || assembler.is_done() {
                    return None;
                }

                match byte_stream.next().await {
                    Some(Ok(chunk)) => ready.extend(assembler.feed(chunk.as_ref())),
                    Some(Err(e)) => {
                        stream_ended = true;
                        return Some((Err(e.into()), (byte_stream, assembler, ready, stream_ended)));
                    }
                    None => {
                        stream_ended = true;
                        ready.extend(assembler.finish());
                    }
                }
            }
        },
    )
}

/// Extension trait for `reqwest::Response` to read a completion stream.
///
/// # Example
/// ```ignore
/// use futures::StreamExt;
/// use sbke::sse::SSEResponseExt;
///
/// let response = client.post(url).json(&body).send().await?;
/// let mut deltas = response.deltas();
/// while let Some(delta) = deltas.next().await {
///     print!("{}", delta?);
/// }
/// ```
pub trait SSEResponseExt {
    /// Convert the response body into a stream of text deltas.
    fn deltas(self) -> impl Stream<Item = Result<String, ClientError>> + Send;
}

impl SSEResponseExt for reqwest::Response {
    fn deltas(self) -> impl Stream<Item = Result<String, ClientError>> + Send {
        delta_stream(self.bytes_stream())
    }
}
