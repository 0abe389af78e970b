//! # sbke - streaming chat core of the Space Biology Knowledge Engine
//!
//! The assistant page streams its answers from an OpenAI-compatible chat
//! completions gateway. This crate turns that Server-Sent Events body into
//! text deltas and feeds them to whatever renders the reply.
//!
//! ## Features
//! - Chunk-agnostic SSE assembly: lines, JSON payloads and UTF-8 code points
//!   may be split anywhere across body chunks
//! - Tolerant parsing: keep-alives, unknown fields and control frames are
//!   skipped, a payload broken by a stray line feed is rejoined
//! - Explicit [`Sink`] for the assembled text
//! - Async-first, tokio compatible gateway client
//!
//! ### Core Types
//!
//! - **[`StreamAssembler`]**: `feed` / `finish` / `is_done` over raw body bytes
//! - **[`stream::pump`]**: drives a byte stream into a [`Sink`]
//! - **[`Conversation`]**: chat history that grows a reply delta by delta
//! - **[`CompletionsClient`]**: starts a streamed completion
//!
//! ## Example
//! ```no_run
//! use sbke::{CompletionsClient, Conversation, StreamingClient};
//! use sbke::prompt::Publication;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = CompletionsClient::from_env()?;
//!
//!     let mut conversation = Conversation::new();
//!     conversation.push_user("How does the immune system change in space?");
//!
//!     let publications = vec![Publication::new(
//!         "Immune dysregulation during spaceflight",
//!         "https://example.org/immune",
//!     )];
//!
//!     let deltas = client
//!         .chat_stream(conversation.history(), &publications)
//!         .await?;
//!     let reply = conversation.stream_reply(deltas).await?;
//!     println!("{}", reply.content);
//!     Ok(())
//! }
//! ```

pub mod chat;
pub mod client;
pub mod http;
pub mod model;
pub mod options;
pub mod prompt;
pub mod providers;
pub mod sink;
pub mod sse;
pub mod stream;
pub mod utf8;

// Re-exports for convenience
pub use chat::Conversation;
pub use client::{ClientError, DeltaStream, StreamingClient};
pub use model::{Message, Role};
pub use providers::CompletionsClient;
pub use sink::Sink;
pub use sse::StreamAssembler;
