//! Stream an assistant reply from the AI gateway.
//!
//! Run with:
//! ```bash
//! export AI_GATEWAY_API_KEY="your-api-key"
//! RUST_LOG=sbke=debug cargo run --example chat_stream -- "How does radiation affect astronauts?"
//! ```

use std::io::Write;

use futures::StreamExt;
use sbke::prompt::{search_terms, Publication};
use sbke::{ClientError, CompletionsClient, Conversation, StreamingClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let question = std::env::args()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");
    let question = if question.trim().is_empty() {
        "What are the main effects of microgravity on human cells?".to_string()
    } else {
        question
    };

    let client = CompletionsClient::from_env()?;

    let mut conversation = Conversation::new();
    println!("Assistant: {}\n", conversation.last().content);
    conversation.push_user(&question);
    println!("You: {}\n", question);

    // The web app looks these up with a full-text search on this query.
    println!("(publication search query: {:?})\n", search_terms(&question));
    let publications = vec![Publication::new(
        "Microgravity effects on human cell biology",
        "https://www.ncbi.nlm.nih.gov/pmc/",
    )];

    let deltas = match client.chat_stream(conversation.history(), &publications).await {
        Ok(deltas) => deltas,
        Err(e @ (ClientError::RateLimited | ClientError::PaymentRequired)) => {
            eprintln!("{}", e);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    // Echo each delta as it arrives while the conversation assembles it.
    let deltas = deltas.inspect(|delta| {
        if let Ok(delta) = delta {
            print!("{}", delta);
            let _ = std::io::stdout().flush();
        }
    });

    print!("Assistant: ");
    match conversation.stream_reply(deltas).await {
        Ok(reply) => println!("\n\n=== Stream Complete ({} chars) ===", reply.content.chars().count()),
        Err(e) => {
            eprintln!("\nFailed to get AI response: {}", e);
            return Err(e.into());
        }
    }

    Ok(())
}
