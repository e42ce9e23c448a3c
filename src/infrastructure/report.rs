//! Results table rendering

use tabled::{
    settings::{
        object::{Columns, Segment},
        Alignment, Modify, Style, Width,
    },
    Table, Tabled,
};

use crate::domain::{PromptSummary, ResultSet, CHARS_PER_TOKEN};

/// Display options for the results table
#[derive(Debug, Clone, Copy)]
pub struct ReportOptions {
    pub chars_per_token: f64,
    /// Column width at which prompt text wraps
    pub prompt_width: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            chars_per_token: CHARS_PER_TOKEN,
            prompt_width: 40,
        }
    }
}

#[derive(Debug, Clone, Tabled)]
pub struct ReportRow {
    #[tabled(rename = "Prompt")]
    pub prompt: String,
    #[tabled(rename = "Accuracy", display_with = "display_percent")]
    pub accuracy: u32,
    #[tabled(rename = "Prompt Tokens")]
    pub prompt_tokens: usize,
}

impl From<PromptSummary> for ReportRow {
    fn from(summary: PromptSummary) -> Self {
        Self {
            prompt: summary.prompt,
            accuracy: summary.accuracy,
            prompt_tokens: summary.estimated_tokens,
        }
    }
}

fn display_percent(value: &u32) -> String {
    format!("{}%", value)
}

pub fn report_rows(results: &ResultSet, options: &ReportOptions) -> Vec<ReportRow> {
    results
        .summarize(options.chars_per_token)
        .into_iter()
        .map(ReportRow::from)
        .collect()
}

/// Render one row per prompt, in result order
pub fn render_table(results: &ResultSet, options: &ReportOptions) -> String {
    let rows = report_rows(results, options);

    let mut table = Table::new(&rows);
    table
        .with(Style::ascii())
        .with(Modify::new(Segment::all()).with(Alignment::left()))
        .with(Modify::new(Columns::first()).with(Width::wrap(options.prompt_width).keep_words()));

    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ResultRecord;

    fn results() -> ResultSet {
        let mut results = ResultSet::new();
        let short = "x".repeat(42);
        for matched in [true, false, true, false] {
            results.push(&short, ResultRecord::new(matched, 90));
        }
        results.push("Answer yes or no.", ResultRecord::new(true, 30));
        results
    }

    #[test]
    fn test_report_rows() {
        let rows = report_rows(&results(), &ReportOptions::default());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].accuracy, 50);
        assert_eq!(rows[0].prompt_tokens, 10);
        assert_eq!(rows[1].prompt, "Answer yes or no.");
        assert_eq!(rows[1].accuracy, 100);
        assert_eq!(rows[1].prompt_tokens, 4);
    }

    #[test]
    fn test_render_table() {
        let table = render_table(&results(), &ReportOptions::default());

        assert!(table.contains("Prompt"));
        assert!(table.contains("Accuracy"));
        assert!(table.contains("Prompt Tokens"));
        assert!(table.contains("50%"));
        assert!(table.contains("100%"));
        assert!(table.contains("Answer yes or no."));
        assert!(table.starts_with('+'));
    }

    #[test]
    fn test_render_table_rows_follow_result_order() {
        let table = render_table(&results(), &ReportOptions::default());

        let fifty = table.find("50%").unwrap();
        let hundred = table.find("100%").unwrap();
        assert!(fifty < hundred);
    }

    #[test]
    fn test_long_prompts_wrap_on_word_boundaries() {
        let prompt = "Classify the sentiment of the sentence as positive or negative.";
        let mut results = ResultSet::new();
        results.push(prompt, ResultRecord::new(true, 1));

        let options = ReportOptions {
            prompt_width: 20,
            ..ReportOptions::default()
        };
        let table = render_table(&results, &options);

        let words: Vec<&str> = prompt.split_whitespace().collect();
        let mut rendered = Vec::new();
        for line in table.lines().filter(|l| l.starts_with('|')) {
            let cell = line.split('|').nth(1).unwrap().trim();
            if cell == "Prompt" {
                continue;
            }
            for word in cell.split_whitespace() {
                assert!(words.contains(&word), "split word {word:?} in {line}");
                rendered.push(word);
            }
        }
        assert_eq!(rendered, words);
    }

    #[test]
    fn test_long_prompts_wrap() {
        let mut results = ResultSet::new();
        let prompt = "word ".repeat(30);
        results.push(prompt.trim(), ResultRecord::new(true, 1));

        let options = ReportOptions {
            prompt_width: 20,
            ..ReportOptions::default()
        };
        let table = render_table(&results, &options);

        assert!(table.lines().count() > 5);
        for line in table.lines() {
            assert!(line.chars().count() < 60, "line too wide: {line}");
        }
    }
}
