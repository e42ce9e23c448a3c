//! Accuracy and token estimation

use serde::{Deserialize, Serialize};

use super::ResultRecord;

/// Average characters per token used for display-time estimates
pub const CHARS_PER_TOKEN: f64 = 4.2;

/// Whole-percent share of matching records, rounding half to even.
///
/// Returns 0 for an empty slice; a prompt never reaches the report without
/// at least one record.
pub fn accuracy_percent(records: &[ResultRecord]) -> u32 {
    if records.is_empty() {
        return 0;
    }

    let matches = records.iter().filter(|r| r.matched).count();
    let ratio = matches as f64 / records.len() as f64 * 100.0;
    ratio.round_ties_even() as u32
}

/// Token estimate from prompt length alone, independent of the service
pub fn estimate_prompt_tokens(prompt: &str, chars_per_token: f64) -> usize {
    if chars_per_token <= 0.0 {
        return 0;
    }

    (prompt.chars().count() as f64 / chars_per_token) as usize
}

/// Aggregated figures for one prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSummary {
    pub prompt: String,
    pub accuracy: u32,
    pub estimated_tokens: usize,
    /// Sum of the prompt tokens the service reported across all cases
    pub reported_tokens: u64,
}
