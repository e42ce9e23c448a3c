//! Command line driver
//!
//! Wires configuration, loaders, the evaluation service and the reporter
//! together. Every error is caught here exactly once and printed as a single
//! line; the process exits normally either way.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{debug, info};

use crate::config::AppConfig;
use crate::domain::{ConfigKind, DemoSet, DomainError, ResultSet};
use crate::infrastructure::llm::{HttpClient, OpenAiProvider};
use crate::infrastructure::loader::{load_demo_set, load_test_suite, LoaderOptions};
use crate::infrastructure::logging;
use crate::infrastructure::report::{render_table, ReportOptions};
use crate::infrastructure::services::{EvaluationService, EvaluatorSettings, ProgressMode};

pub const DRY_RUN_MESSAGE: &str = "Dry run finished without errors. Ready for execution.";

/// Evaluate prompts against expected outputs using a chat completion model
#[derive(Debug, Parser)]
#[command(name = "truths")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to the YAML test file
    #[arg(long, value_name = "file_path")]
    pub test: Option<PathBuf>,

    /// Path to the YAML demo file
    #[arg(long, value_name = "file_path")]
    pub demo: Option<PathBuf>,

    /// Validate the test file without making API calls
    #[arg(long)]
    pub dry_run: bool,

    /// Run in debug mode for verbose output
    #[arg(long)]
    pub debug: bool,

    /// Model to evaluate (overrides configuration)
    #[arg(long)]
    pub model: Option<String>,
}

/// What a successful invocation produced
#[derive(Debug)]
pub enum RunOutcome {
    DryRun,
    Completed(ResultSet),
}

/// Full CLI entry point: environment, configuration, logging, then the run
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut config = match load_config(AppConfig::environment()) {
        Ok(config) => config,
        Err(e) => {
            println!("{}", e);
            return Ok(());
        }
    };
    if cli.debug {
        config.logging.level = "debug".to_string();
    }
    logging::init_logging(&logging::LoggingConfig {
        level: config.logging.level.clone(),
        format: config.logging.format.clone(),
    });

    match execute(&cli, &config).await {
        Ok(RunOutcome::DryRun) => println!("{}", DRY_RUN_MESSAGE),
        Ok(RunOutcome::Completed(results)) => {
            for summary in results.summarize(config.evaluation.chars_per_token) {
                debug!(
                    prompt = %summary.prompt,
                    accuracy = summary.accuracy,
                    estimated_tokens = summary.estimated_tokens,
                    reported_tokens = summary.reported_tokens,
                    "Prompt summary"
                );
            }
            if !results.is_empty() {
                println!("{}", render_table(&results, &report_options(&config)));
            }
        }
        Err(e) => {
            debug!(error = ?e, kind = ?e.kind(), "Run failed");
            println!("{}", e);
        }
    }

    Ok(())
}

/// Layered configuration; a source that fails to parse is reported, never
/// replaced by defaults
pub fn load_config(environment: config::Environment) -> Result<AppConfig, DomainError> {
    AppConfig::load_with_environment(environment)
        .map_err(|e| DomainError::validation(format!("Invalid configuration: {}", e)))
}

/// Load, validate and (unless dry-running) evaluate the configured test.
///
/// Dry-run checks trial structure as well as YAML syntax: a file that parses
/// but has a malformed trial (for example `prompts: one`) is rejected rather
/// than confirmed.
pub async fn execute(cli: &Cli, config: &AppConfig) -> Result<RunOutcome, DomainError> {
    let options = LoaderOptions { debug: cli.debug };

    let test_path = cli
        .test
        .as_deref()
        .ok_or_else(|| DomainError::config_not_found(ConfigKind::Test, "<none>"))?;
    let suite = load_test_suite(test_path, options)?;

    if cli.dry_run {
        info!(calls = suite.call_count(), "Dry run: skipping evaluation");
        return Ok(RunOutcome::DryRun);
    }

    let demo = match cli.demo.as_deref() {
        Some(path) => load_demo_set(path, options)?,
        None => DemoSet::default(),
    };

    let service = evaluation_service(cli, config)?
        .with_demo(&demo)
        .with_progress(ProgressMode::Bar {
            width: config.evaluation.progress_width,
        });

    let results = service.evaluate(&suite).await?;
    Ok(RunOutcome::Completed(results))
}

fn evaluation_service(cli: &Cli, config: &AppConfig) -> Result<EvaluationService, DomainError> {
    let api_key = config.openai.resolve_api_key().ok_or_else(|| {
        DomainError::validation("No API key found. Set OPENAI_KEY in the environment or a .env file.")
    })?;

    let client = match config.openai.timeout_secs {
        Some(secs) => HttpClient::with_timeout(Duration::from_secs(secs))?,
        None => HttpClient::new(),
    };
    let provider = OpenAiProvider::with_base_url(client, api_key, &config.openai.base_url);

    let settings = EvaluatorSettings {
        model: cli.model.clone().unwrap_or_else(|| config.openai.model.clone()),
        system_prompt: config.evaluation.system_prompt.clone(),
        temperature: config.evaluation.temperature,
    };

    Ok(EvaluationService::new(Arc::new(provider), settings))
}

fn report_options(config: &AppConfig) -> ReportOptions {
    ReportOptions {
        chars_per_token: config.evaluation.chars_per_token,
        prompt_width: config.evaluation.prompt_width,
    }
}
