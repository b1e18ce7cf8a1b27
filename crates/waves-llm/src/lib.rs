// Optional LLM coach: streaming Claude client, prompt construction, and the
// fallback-safe advisory call.

pub mod advisor;
pub mod client;
pub mod prompt;

pub use advisor::{request_advice, AdviceSettings};
pub use client::{ClaudeClient, LlmClient, LlmEvent};
