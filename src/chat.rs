//! Conversation state for the assistant chat.

use futures::{Stream, StreamExt};
use nonempty::NonEmpty;
use tracing::warn;

use crate::client::ClientError;
use crate::model::{Message, Role};
use crate::sink::Sink;

/// First assistant message of every conversation.
pub const WELCOME_MESSAGE: &str = "Welcome to the Space Biology Knowledge Engine. I'm here to help you explore NASA bioscience research. Ask me anything about space biology, microgravity effects, radiation studies, or specific publications!";

/// An ongoing chat, always opened by the welcome message.
#[derive(Debug, Clone)]
pub struct Conversation {
    messages: NonEmpty<Message>,
}

impl Default for Conversation {
    fn default() -> Self {
        Self::new()
    }
}

impl Conversation {
    pub fn new() -> Self {
        Self {
            messages: NonEmpty::new(Message::assistant(WELCOME_MESSAGE)),
        }
    }

    pub fn messages(&self) -> &NonEmpty<Message> {
        &self.messages
    }

    pub fn last(&self) -> &Message {
        self.messages.last()
    }

    /// Messages to send upstream, oldest first.
    pub fn history(&self) -> Vec<Message> {
        self.messages.iter().cloned().collect()
    }

    /// Add the user's input, trimmed. Blank input is ignored and returns
    /// `false`.
    pub fn push_user(&mut self, input: &str) -> bool {
        let input = input.trim();
        if input.is_empty() {
            return false;
        }

        self.messages.push(Message::user(input));
        true
    }

    /// Stream an assistant reply into the conversation.
    ///
    /// The reply appears as a new assistant message that grows with every
    /// delta. If the stream fails midway the partial message is removed and
    /// the error is returned.
    pub async fn stream_reply<S>(&mut self, deltas: S) -> Result<&Message, ClientError>
    where
        S: Stream<Item = Result<String, ClientError>>,
    {
        self.messages.push(Message::assistant(String::new()));
        futures::pin_mut!(deltas);

        while let Some(delta) = deltas.next().await {
            match delta {
                Ok(delta) => self.messages.last_mut().append(&delta),
                Err(e) => {
                    warn!(error = %e, "assistant reply failed, discarding partial message");
                    self.messages.pop();
                    return Err(e);
                }
            }
        }

        Ok(self.messages.last())
    }

    /// Number of messages sent by `role`.
    pub fn count(&self, role: Role) -> usize {
        self.messages.iter().filter(|m| m.role == role).count()
    }
}
