//! System prompt for the space biology assistant.

use itertools::Itertools;
use serde::{Deserialize, Serialize};

/// Assistant persona sent as the system message.
pub const SYSTEM_PROMPT: &str = "You are a knowledgeable AI assistant specializing in NASA space biology research. 

Your role:
- Answer questions about space biology, microgravity effects, radiation studies, and related topics
- When relevant publications are provided, ALWAYS reference them with their links as markdown: [Study Title](link)
- Format your responses with clear structure using bullet points, numbered lists, and headings
- Use **bold** for KEY findings, important concepts, and emphasis (this will be styled in green)
- Use *italics* for scientific terms
- Add relevant emojis to make the content engaging (🧬 🚀 🔬 🌌 ⚛️ 🛰️ 🌍 etc.)
- Structure responses with:
  • Clear introductory statement with emoji
  • Bullet points for key findings or effects
  • Numbered lists for sequential information
  • Relevant study references with links
- Keep responses informative but scannable (use white space)
- Always link to specific studies when mentioning research

CRITICAL: When referencing publications from the provided list, you MUST format them as markdown links: [Publication Title](URL)

Style: Engaging, visual, and easy to scan while maintaining scientific accuracy.";

/// Number of leading words of a question used as the publication search query.
pub const SEARCH_TERM_LIMIT: usize = 5;

/// A publication offered to the model as reference material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Publication {
    pub title: String,
    pub link: String,
}

impl Publication {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
        }
    }
}

/// Full-text search query for publications related to a question.
///
/// Takes the first words split on single spaces, so runs of spaces count as
/// empty words, matching the query the web app's search expects.
///
/// ```
/// use sbke::prompt::search_terms;
///
/// assert_eq!(
///     search_terms("How does the immune system change in space?"),
///     "How does the immune system"
/// );
/// ```
pub fn search_terms(question: &str) -> String {
    question.split(' ').take(SEARCH_TERM_LIMIT).join(" ")
}

/// Numbered list of publications appended to the system prompt.
///
/// Empty when there are none.
pub fn publications_context(publications: &[Publication]) -> String {
    if publications.is_empty() {
        return String::new();
    }

    let entries = publications
        .iter()
        .enumerate()
        .map(|(idx, publication)| {
            format!("{}. \"{}\" - {}\n", idx + 1, publication.title, publication.link)
        })
        .join("");

    format!("\n\nRelevant NASA space biology publications:\n{}", entries)
}

/// System prompt made of `persona` followed by the publication list.
pub fn system_prompt(persona: &str, publications: &[Publication]) -> String {
    format!("{}{}", persona, publications_context(publications))
}
