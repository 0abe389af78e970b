//! Chat backend implementations.

pub mod completions;

// Re-export for convenience
pub use completions::CompletionsClient;
