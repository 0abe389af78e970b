//! Streaming client trait and error types.

use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use thiserror::Error;

use crate::model::Message;
use crate::options::{ModelOptions, TransportOptions};
use crate::prompt::Publication;

/// Errors that can occur during client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Rate limits exceeded, please try again later.")]
    RateLimited,

    #[error("Payment required, please add funds to your workspace.")]
    PaymentRequired,

    #[error("AI gateway error ({status}): {message}")]
    Gateway {
        status: reqwest::StatusCode,
        message: String,
    },

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Text deltas of one streamed reply, in arrival order.
pub type DeltaStream = Pin<Box<dyn Stream<Item = Result<String, ClientError>> + Send>>;

/// Client for chat backends that stream their reply as text deltas.
///
/// # Required Methods
/// - `request_stream`: Static method that starts a stream with explicit options
/// - `model_options`: Accessor for the stored model options
/// - `transport_options`: Accessor for the stored transport options
///
/// # Provided Methods
/// - `chat_stream`: Uses the stored options
/// - `chat_stream_with_options`: Overrides model options
#[async_trait]
pub trait StreamingClient: Send + Sync + Sized {
    /// Provider-specific transport options type.
    type TransportProvider: Send + Sync;

    /// Start streaming a reply to `messages`.
    ///
    /// `publications` are listed in the system prompt as reference material.
    /// Errors returned here happen before any delta is produced; errors
    /// inside the stream are transport failures mid-reply.
    async fn request_stream(
        messages: Vec<Message>,
        publications: &[Publication],
        model_options: &ModelOptions,
        transport_options: &TransportOptions<Self::TransportProvider>,
    ) -> Result<DeltaStream, ClientError>;

    fn model_options(&self) -> &ModelOptions;

    fn transport_options(&self) -> &TransportOptions<Self::TransportProvider>;

    /// Stream a reply using the client's stored options.
    async fn chat_stream(
        &self,
        messages: Vec<Message>,
        publications: &[Publication],
    ) -> Result<DeltaStream, ClientError> {
        Self::request_stream(
            messages,
            publications,
            self.model_options(),
            self.transport_options(),
        )
        .await
    }

    /// Stream a reply with different model options for this request only.
    async fn chat_stream_with_options(
        &self,
        messages: Vec<Message>,
        publications: &[Publication],
        model_options: &ModelOptions,
    ) -> Result<DeltaStream, ClientError> {
        Self::request_stream(
            messages,
            publications,
            model_options,
            self.transport_options(),
        )
        .await
    }
}
