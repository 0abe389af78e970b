//! Driving a body byte stream into a [`Sink`].

use futures::{Stream, StreamExt};
use tracing::debug;

use crate::sink::Sink;
use crate::sse::StreamAssembler;

pub use crate::sse::{is_done_marker, parse_sse_line};

/// Why a stream stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `data: [DONE]` was received.
    Sentinel,
    /// The body ended without a sentinel.
    EndOfStream,
}

/// Outcome of a fully consumed stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    /// Deltas handed to the sink.
    pub deltas: usize,
    pub terminated_by: Termination,
}

/// Read `byte_stream` to completion, appending every delta to `sink`.
///
/// Each chunk's deltas reach the sink before the next chunk is requested.
/// Reading stops as soon as the sentinel is seen; the rest of the body is
/// left unread. A transport error is returned unchanged and whatever the
/// sink already received is left for the caller to roll back.
pub async fn pump<S, B, E, K>(byte_stream: S, sink: &mut K) -> Result<StreamSummary, E>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    K: Sink + ?Sized,
{
    let mut assembler = StreamAssembler::new();
    let mut count = 0;
    futures::pin_mut!(byte_stream);

    while let Some(chunk) = byte_stream.next().await {
        for delta in assembler.feed(chunk?.as_ref()) {
            sink.append(&delta);
            count += 1;
        }

        if assembler.is_done() {
            debug!(deltas = count, "stream terminated by sentinel");
            return Ok(StreamSummary {
                deltas: count,
                terminated_by: Termination::Sentinel,
            });
        }
    }

    for delta in assembler.finish() {
        sink.append(&delta);
        count += 1;
    }

    debug!(deltas = count, "stream ended without sentinel");
    Ok(StreamSummary {
        deltas: count,
        terminated_by: Termination::EndOfStream,
    })
}
