//! Evaluation result types

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::scoring::{accuracy_percent, estimate_prompt_tokens, PromptSummary};

/// Outcome of one (prompt, test case) completion call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Whether the reply equals the expected output exactly
    pub matched: bool,
    /// Prompt tokens reported by the service for this call
    pub prompt_tokens: u32,
}

impl ResultRecord {
    pub fn new(matched: bool, prompt_tokens: u32) -> Self {
        Self {
            matched,
            prompt_tokens,
        }
    }

    /// Case-sensitive comparison with no normalization beyond the caller's trim
    pub fn score(reply: &str, expected: &str, prompt_tokens: u32) -> Self {
        Self::new(reply == expected, prompt_tokens)
    }
}

/// Records grouped by prompt text, in the order prompts were first evaluated
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultSet {
    results: IndexMap<String, Vec<ResultRecord>>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a record; a prompt's key exists only once it has a record
    pub fn push(&mut self, prompt: &str, record: ResultRecord) {
        match self.results.get_mut(prompt) {
            Some(records) => records.push(record),
            None => {
                self.results.insert(prompt.to_string(), vec![record]);
            }
        }
    }

    pub fn records(&self, prompt: &str) -> Option<&[ResultRecord]> {
        self.results.get(prompt).map(Vec::as_slice)
    }

    pub fn prompts(&self) -> impl Iterator<Item = &str> {
        self.results.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ResultRecord])> {
        self.results
            .iter()
            .map(|(prompt, records)| (prompt.as_str(), records.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// One summary per prompt, in key order
    pub fn summarize(&self, chars_per_token: f64) -> Vec<PromptSummary> {
        self.iter()
            .map(|(prompt, records)| PromptSummary {
                prompt: prompt.to_string(),
                accuracy: accuracy_percent(records),
                estimated_tokens: estimate_prompt_tokens(prompt, chars_per_token),
                reported_tokens: records.iter().map(|r| u64::from(r.prompt_tokens)).sum(),
            })
            .collect()
    }
}
