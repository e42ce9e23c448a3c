use async_trait::async_trait;
use std::fmt::Debug;

use super::{LlmRequest, LlmResponse};
use crate::domain::DomainError;

/// Trait for chat completion services
#[async_trait]
pub trait LlmProvider: Send + Sync + Debug {
    /// Send a chat completion request
    async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError>;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use crate::domain::{Message, Usage};

    /// Replays scripted replies in order and records every request it sees
    #[derive(Debug)]
    pub struct MockLlmProvider {
        name: &'static str,
        replies: Mutex<VecDeque<Result<(String, u32), String>>>,
        fallback: Option<(String, u32)>,
        requests: Mutex<Vec<(String, LlmRequest)>>,
    }

    impl MockLlmProvider {
        pub fn new(name: &'static str) -> Self {
            Self {
                name,
                replies: Mutex::new(VecDeque::new()),
                fallback: None,
                requests: Mutex::new(Vec::new()),
            }
        }

        /// Queue one reply with the given prompt token count
        pub fn with_reply(self, content: impl Into<String>, prompt_tokens: u32) -> Self {
            self.replies
                .lock()
                .unwrap()
                .push_back(Ok((content.into(), prompt_tokens)));
            self
        }

        /// Queue a failing call
        pub fn with_error(self, error: impl Into<String>) -> Self {
            self.replies.lock().unwrap().push_back(Err(error.into()));
            self
        }

        /// Reply used once the queue is exhausted
        pub fn with_fallback(mut self, content: impl Into<String>, prompt_tokens: u32) -> Self {
            self.fallback = Some((content.into(), prompt_tokens));
            self
        }

        pub fn call_count(&self) -> usize {
            self.requests.lock().unwrap().len()
        }

        pub fn requests(&self) -> Vec<(String, LlmRequest)> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl LlmProvider for MockLlmProvider {
        async fn chat(&self, model: &str, request: LlmRequest) -> Result<LlmResponse, DomainError> {
            self.requests
                .lock()
                .unwrap()
                .push((model.to_string(), request));

            let next = self.replies.lock().unwrap().pop_front();
            let (content, prompt_tokens) = match next {
                Some(Ok(reply)) => reply,
                Some(Err(error)) => return Err(DomainError::service(self.name, error)),
                None => self.fallback.clone().ok_or_else(|| {
                    DomainError::service(self.name, "No mock response configured")
                })?,
            };

            Ok(LlmResponse::new("mock-id", model, Message::assistant(content))
                .with_usage(Usage::new(prompt_tokens, 1)))
        }

        fn provider_name(&self) -> &'static str {
            self.name
        }
    }
}
