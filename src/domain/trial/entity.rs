//! Trial configuration types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::domain::Message;

/// Top-level keys carrying this prefix are trials; anything else is ignored
pub const TRIAL_PREFIX: &str = "trial-";

pub fn is_trial_key(key: &str) -> bool {
    key.starts_with(TRIAL_PREFIX)
}

/// A labeled input with its exact expected output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    pub input: String,
    pub output: String,
}

impl TestCase {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// A named group of prompt templates evaluated against the same test cases
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    name: String,
    prompts: Vec<String>,
    /// Case id -> case, in declaration order
    test_cases: IndexMap<String, TestCase>,
}

impl Trial {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prompts: Vec::new(),
            test_cases: IndexMap::new(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompts.push(prompt.into());
        self
    }

    pub fn with_test_case(mut self, id: impl Into<String>, case: TestCase) -> Self {
        self.test_cases.insert(id.into(), case);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prompts(&self) -> &[String] {
        &self.prompts
    }

    pub fn test_cases(&self) -> &IndexMap<String, TestCase> {
        &self.test_cases
    }

    /// Number of completion calls this trial needs
    pub fn call_count(&self) -> usize {
        self.prompts.len() * self.test_cases.len()
    }
}

/// All trials of a test file, in declaration order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestSuite {
    trials: Vec<Trial>,
}

impl TestSuite {
    pub fn new(trials: Vec<Trial>) -> Self {
        Self { trials }
    }

    pub fn trials(&self) -> &[Trial] {
        &self.trials
    }

    pub fn is_empty(&self) -> bool {
        self.trials.is_empty()
    }

    pub fn call_count(&self) -> usize {
        self.trials.iter().map(Trial::call_count).sum()
    }
}

/// One demonstrated user/assistant exchange
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoExchange {
    pub input: String,
    pub output: String,
}

impl DemoExchange {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }
}

/// Conversation prefix shared by every evaluation call
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DemoSet {
    exchanges: Vec<DemoExchange>,
}

impl DemoSet {
    pub fn new(exchanges: Vec<DemoExchange>) -> Self {
        Self { exchanges }
    }

    pub fn exchanges(&self) -> &[DemoExchange] {
        &self.exchanges
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    /// Flattens the exchanges into alternating user/assistant turns
    pub fn to_messages(&self) -> Vec<Message> {
        self.exchanges
            .iter()
            .flat_map(|e| [Message::user(&e.input), Message::assistant(&e.output)])
            .collect()
    }
}
