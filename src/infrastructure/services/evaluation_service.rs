//! Evaluation service - runs every prompt of a test suite against every test case

use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info, info_span, Instrument};

use crate::domain::{
    DemoSet, DomainError, LlmProvider, LlmRequest, Message, ResultRecord, ResultSet, TestSuite,
    Trial,
};

pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo-0613";
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You must follow the directions given. Do not explain anything.";

/// Per-run evaluation settings
#[derive(Debug, Clone)]
pub struct EvaluatorSettings {
    pub model: String,
    pub system_prompt: String,
    pub temperature: Option<f32>,
}

impl Default for EvaluatorSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: None,
        }
    }
}

/// How per-prompt progress is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMode {
    Hidden,
    /// A bar `width` columns wide on stderr
    Bar { width: u16 },
}

/// Sequential evaluator: one completion call in flight at a time
#[derive(Debug)]
pub struct EvaluationService {
    provider: Arc<dyn LlmProvider>,
    settings: EvaluatorSettings,
    demo: Vec<Message>,
    progress: ProgressMode,
}

impl EvaluationService {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: EvaluatorSettings) -> Self {
        Self {
            provider,
            settings,
            demo: Vec::new(),
            progress: ProgressMode::Hidden,
        }
    }

    /// Use `demo` as the conversation prefix of every call
    pub fn with_demo(mut self, demo: &DemoSet) -> Self {
        self.demo = demo.to_messages();
        self
    }

    pub fn with_progress(mut self, progress: ProgressMode) -> Self {
        self.progress = progress;
        self
    }

    /// System instruction, then the demo prefix, then prompt and input
    pub fn build_messages(&self, prompt: &str, input: &str) -> Vec<Message> {
        let mut messages = Vec::with_capacity(self.demo.len() + 2);
        messages.push(Message::system(&self.settings.system_prompt));
        messages.extend(self.demo.iter().cloned());
        messages.push(Message::user(format!("{}\n{}", prompt, input)));
        messages
    }

    /// Evaluate the whole suite; the first failed call aborts the run
    pub async fn evaluate(&self, suite: &TestSuite) -> Result<ResultSet, DomainError> {
        info!(
            provider = self.provider.provider_name(),
            model = %self.settings.model,
            trials = suite.trials().len(),
            calls = suite.call_count(),
            "Starting evaluation"
        );

        let mut results = ResultSet::new();

        for trial in suite.trials() {
            let span = info_span!("trial", name = %trial.name());
            self.evaluate_trial(trial, &mut results)
                .instrument(span)
                .await?;
        }

        info!(prompts = results.len(), "Evaluation finished");
        Ok(results)
    }

    async fn evaluate_trial(&self, trial: &Trial, results: &mut ResultSet) -> Result<(), DomainError> {
        for (index, prompt) in trial.prompts().iter().enumerate() {
            let bar = self.progress_bar(trial.test_cases().len() as u64);

            for (case_id, case) in trial.test_cases() {
                let (reply, prompt_tokens) = match self.complete(prompt, &case.input).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        bar.abandon();
                        return Err(e);
                    }
                };

                let record = ResultRecord::score(&reply, &case.output, prompt_tokens);
                debug!(
                    prompt = index,
                    case = %case_id,
                    matched = record.matched,
                    prompt_tokens,
                    "Scored test case"
                );

                results.push(prompt, record);
                bar.inc(1);
            }

            bar.finish();
        }

        Ok(())
    }

    /// One completion call; returns the trimmed reply and reported prompt tokens
    async fn complete(&self, prompt: &str, input: &str) -> Result<(String, u32), DomainError> {
        let request = LlmRequest::builder()
            .messages(self.build_messages(prompt, input))
            .temperature(self.settings.temperature)
            .build();

        let response = self.provider.chat(&self.settings.model, request).await?;

        Ok((response.content().trim().to_string(), response.prompt_tokens()))
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        match self.progress {
            ProgressMode::Hidden => ProgressBar::hidden(),
            ProgressMode::Bar { width } => {
                let bar_width = width.saturating_sub(30).max(10);
                let template = format!(
                    "{{percent:>3}}%|{{bar:{}}}| {{pos}}/{{len}} [{{elapsed_precise}}]",
                    bar_width
                );
                let style = ProgressStyle::with_template(&template)
                    .unwrap_or_else(|_| ProgressStyle::default_bar());

                ProgressBar::new(len).with_style(style)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DemoExchange, ErrorKind, MessageRole, MockLlmProvider, TestCase};

    fn service(provider: &Arc<MockLlmProvider>) -> EvaluationService {
        EvaluationService::new(provider.clone(), EvaluatorSettings::default())
    }

    fn yes_no_trial() -> Trial {
        Trial::new("trial-yes-no")
            .with_prompt("Answer yes or no.")
            .with_prompt("Reply with yes or no only.")
            .with_test_case("sky", TestCase::new("Is the sky blue?", "yes"))
            .with_test_case("grass", TestCase::new("Is grass red?", "no"))
            .with_test_case("snow", TestCase::new("Is snow white?", "yes"))
    }

    #[test]
    fn test_build_messages_layout() {
        let provider = Arc::new(MockLlmProvider::new("mock"));
        let demo = DemoSet::new(vec![DemoExchange::new("2+2", "4")]);
        let service = service(&provider).with_demo(&demo);

        let messages = service.build_messages("Add the numbers.", "3+3");

        assert_eq!(messages.len(), 4);
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(messages[0].content(), DEFAULT_SYSTEM_PROMPT);
        assert_eq!(messages[1], Message::user("2+2"));
        assert_eq!(messages[2], Message::assistant("4"));
        assert_eq!(messages[3], Message::user("Add the numbers.\n3+3"));
    }

    #[tokio::test]
    async fn test_evaluate_produces_one_record_per_case() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_fallback("yes", 20));
        let suite = TestSuite::new(vec![yes_no_trial()]);

        let results = service(&provider).evaluate(&suite).await.unwrap();

        assert_eq!(results.len(), 2);
        for (_, records) in results.iter() {
            assert_eq!(records.len(), 3);
        }
        assert_eq!(provider.call_count(), 6);
    }

    #[tokio::test]
    async fn test_evaluate_scores_exact_matches() {
        let provider = Arc::new(
            MockLlmProvider::new("mock")
                .with_reply("  yes\n", 11)
                .with_reply("No", 12)
                .with_reply("Yes", 13)
                .with_fallback("no", 1),
        );
        let suite = TestSuite::new(vec![yes_no_trial()]);

        let results = service(&provider).evaluate(&suite).await.unwrap();

        let first = results.records("Answer yes or no.").unwrap();
        assert_eq!(
            first,
            [
                ResultRecord::new(true, 11),
                ResultRecord::new(false, 12),
                ResultRecord::new(false, 13),
            ]
        );
    }

    #[tokio::test]
    async fn test_evaluate_sends_prompt_and_input() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_fallback("ok", 1));
        let suite = TestSuite::new(vec![
            Trial::new("trial-one")
                .with_prompt("Translate to French.")
                .with_test_case("c", TestCase::new("cat", "chat")),
        ]);

        service(&provider).evaluate(&suite).await.unwrap();

        let requests = provider.requests();
        assert_eq!(requests.len(), 1);
        let (model, request) = &requests[0];
        assert_eq!(model, DEFAULT_MODEL);
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[1].content(), "Translate to French.\ncat");
    }

    #[tokio::test]
    async fn test_demo_prefix_is_shared_by_every_call() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_fallback("ok", 1));
        let demo = DemoSet::new(vec![
            DemoExchange::new("a", "1"),
            DemoExchange::new("b", "2"),
        ]);
        let suite = TestSuite::new(vec![yes_no_trial()]);

        service(&provider).with_demo(&demo).evaluate(&suite).await.unwrap();

        for (_, request) in provider.requests() {
            assert_eq!(request.messages.len(), 6);
            assert_eq!(request.messages[1].content(), "a");
            assert_eq!(request.messages[4].content(), "2");
        }
    }

    #[tokio::test]
    async fn test_service_error_aborts_run() {
        let provider = Arc::new(
            MockLlmProvider::new("mock")
                .with_reply("yes", 1)
                .with_error("rate limited")
                .with_fallback("yes", 1),
        );
        let suite = TestSuite::new(vec![yes_no_trial()]);

        let error = service(&provider).evaluate(&suite).await.unwrap_err();

        assert_eq!(error.kind(), ErrorKind::Service);
        assert!(error.to_string().contains("rate limited"));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn test_prompt_without_cases_has_no_entry() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_fallback("x", 1));
        let suite = TestSuite::new(vec![Trial::new("trial-empty").with_prompt("lonely")]);

        let results = service(&provider).evaluate(&suite).await.unwrap();

        assert!(results.is_empty());
        assert_eq!(provider.call_count(), 0);
    }

    #[tokio::test]
    async fn test_settings_are_forwarded() {
        let provider = Arc::new(MockLlmProvider::new("mock").with_fallback("x", 1));
        let settings = EvaluatorSettings {
            model: "gpt-4o-mini".to_string(),
            system_prompt: "Be terse.".to_string(),
            temperature: Some(0.0),
        };
        let suite = TestSuite::new(vec![
            Trial::new("trial-a")
                .with_prompt("p")
                .with_test_case("c", TestCase::new("i", "o")),
        ]);

        EvaluationService::new(provider.clone(), settings)
            .evaluate(&suite)
            .await
            .unwrap();

        let (model, request) = &provider.requests()[0];
        assert_eq!(model, "gpt-4o-mini");
        assert_eq!(request.temperature, Some(0.0));
        assert_eq!(request.messages[0].content(), "Be terse.");
    }
}
