//! Domain layer - Core evaluation types and contracts

pub mod error;
pub mod evaluation;
pub mod llm;
pub mod trial;

pub use error::{ConfigKind, DomainError, ErrorKind};
pub use evaluation::{
    accuracy_percent, estimate_prompt_tokens, PromptSummary, ResultRecord, ResultSet,
    CHARS_PER_TOKEN,
};
pub use llm::{LlmProvider, LlmRequest, LlmRequestBuilder, LlmResponse, Message, MessageRole, Usage};
pub use trial::{is_trial_key, DemoExchange, DemoSet, TestCase, TestSuite, Trial, TRIAL_PREFIX};

#[cfg(test)]
pub use llm::MockLlmProvider;
