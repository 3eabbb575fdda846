//! Mentor: a thin client for a hosted chat-completion endpoint, plus the
//! bounded log summaries it is prompted with.

mod client;
pub mod prompt;

pub use client::{ChatMessage, ChatRequest, ChatResponse, Choice, LlmClient};
pub use prompt::{mentor_messages, report_messages, summarize};
