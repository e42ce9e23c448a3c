//! Evaluation domain - per-case outcomes and per-prompt scoring

mod result;
mod scoring;

pub use result::{ResultRecord, ResultSet};
pub use scoring::{accuracy_percent, estimate_prompt_tokens, PromptSummary, CHARS_PER_TOKEN};
