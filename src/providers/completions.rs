//! Chat Completions client for the AI gateway.
//!
//! Sends the conversation with `stream: true` and exposes the reply as a
//! [`DeltaStream`]. The gateway speaks the OpenAI Chat Completions dialect.

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::client::{ClientError, DeltaStream, StreamingClient};
use crate::http::{build_http_client, event_stream_post};
use crate::model::Message;
use crate::options::{HttpTransport, ModelOptions, TransportOptions};
use crate::prompt::{system_prompt, Publication, SYSTEM_PROMPT};
use crate::sse::SSEResponseExt;

pub const DEFAULT_API_BASE: &str = "https://ai.gateway.lovable.dev";
pub const DEFAULT_MODEL: &str = "google/gemini-2.5-flash";

/// Streaming chat client using HTTP transport.
#[derive(Debug, Clone)]
pub struct CompletionsClient {
    model_options: ModelOptions,
    transport_options: TransportOptions<HttpTransport>,
}

impl CompletionsClient {
    pub fn new(
        model_options: ModelOptions,
        transport_options: TransportOptions<HttpTransport>,
    ) -> Self {
        Self {
            model_options,
            transport_options,
        }
    }

    /// Client configured from `AI_GATEWAY_API_KEY` / `AI_GATEWAY_BASE_URL`.
    pub fn from_env() -> Result<Self, ClientError> {
        Ok(Self::new(
            ModelOptions::default(),
            TransportOptions::new(HttpTransport::from_env()?),
        ))
    }

    /// Map a non-success status to an error.
    ///
    /// 429 and 402 have dedicated variants. Otherwise the message is taken
    /// from an `{"error": "..."}` or `{"error": {"message": "..."}}` body,
    /// falling back to the raw body.
    fn handle_error_response(status: reqwest::StatusCode, body: &str) -> ClientError {
        match status.as_u16() {
            429 => ClientError::RateLimited,
            402 => ClientError::PaymentRequired,
            _ => {
                let message = serde_json::from_str::<Value>(body)
                    .ok()
                    .and_then(|json| match &json["error"] {
                        Value::String(message) => Some(message.clone()),
                        error => error["message"].as_str().map(str::to_string),
                    })
                    .unwrap_or_else(|| body.to_string());

                ClientError::Gateway { status, message }
            }
        }
    }
}

#[async_trait]
impl StreamingClient for CompletionsClient {
    type TransportProvider = HttpTransport;

    async fn request_stream(
        messages: Vec<Message>,
        publications: &[Publication],
        model_options: &ModelOptions,
        transport_options: &TransportOptions<Self::TransportProvider>,
    ) -> Result<DeltaStream, ClientError> {
        let api_base = transport_options
            .provider
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_API_BASE)
            .trim_end_matches('/');
        let url = format!("{}/v1/chat/completions", api_base);

        let request_body = CompletionsRequest::new(messages, publications, model_options);

        let http_client = build_http_client(transport_options)?;
        let req = event_stream_post(&http_client, &url, &transport_options.provider)?;

        debug!(
            model = %request_body.model,
            messages = request_body.messages.len(),
            publications = publications.len(),
            "starting chat completion stream"
        );

        let response = req.json(&request_body).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, body = %body, "AI gateway error");
            return Err(Self::handle_error_response(status, &body));
        }

        Ok(Box::pin(response.deltas()))
    }

    fn model_options(&self) -> &ModelOptions {
        &self.model_options
    }

    fn transport_options(&self) -> &TransportOptions<Self::TransportProvider> {
        &self.transport_options
    }
}

// --- Chat Completions request types ---

#[derive(Debug, Clone, Serialize)]
struct CompletionsRequest {
    model: String,
    messages: Vec<Message>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

impl CompletionsRequest {
    /// The system message goes first, followed by the conversation.
    fn new(history: Vec<Message>, publications: &[Publication], model_options: &ModelOptions) -> Self {
        let persona = model_options.instructions.as_deref().unwrap_or(SYSTEM_PROMPT);

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(Message::system(system_prompt(persona, publications)));
        messages.extend(history);

        Self {
            model: model_options
                .model
                .clone()
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            messages,
            stream: true,
            temperature: model_options.temperature,
            top_p: model_options.top_p,
            max_tokens: model_options.max_tokens,
        }
    }
}
