//! Test and demo file loading
//!
//! Both files share one shape: a top-level section (`test` or `demo`) whose
//! `trial-` prefixed entries are trials. Other entries are skipped. Entries
//! that are trials are validated structurally, so a typo inside a trial is
//! reported instead of silently producing no results.

use std::fs;
use std::path::Path;

use serde_yaml::{Mapping, Value};
use tracing::{debug, warn};

use crate::domain::{
    is_trial_key, ConfigKind, DemoExchange, DemoSet, DomainError, TestCase, TestSuite, Trial,
};

const TEST_SECTION: &str = "test";
const DEMO_SECTION: &str = "demo";

/// Loader behaviour switches
#[derive(Debug, Clone, Copy, Default)]
pub struct LoaderOptions {
    /// Print the underlying io/YAML error before it is translated
    pub debug: bool,
}

/// Read and validate the test file
pub fn load_test_suite(path: &Path, options: LoaderOptions) -> Result<TestSuite, DomainError> {
    let document = read_document(path, ConfigKind::Test, options)?;
    let suite = test_suite_from_value(&document)?;

    debug!(
        path = %path.display(),
        trials = suite.trials().len(),
        calls = suite.call_count(),
        "Loaded test suite"
    );

    Ok(suite)
}

/// Read the demo file into a conversation prefix
pub fn load_demo_set(path: &Path, options: LoaderOptions) -> Result<DemoSet, DomainError> {
    let document = read_document(path, ConfigKind::Demo, options)?;
    let demo = demo_set_from_value(&document)?;

    debug!(path = %path.display(), exchanges = demo.len(), "Loaded demo set");

    Ok(demo)
}

pub fn test_suite_from_value(document: &Value) -> Result<TestSuite, DomainError> {
    let section = section(document, TEST_SECTION)?;
    let mut trials = Vec::new();

    for (name, body) in trial_entries(section, TEST_SECTION)? {
        trials.push(parse_trial(&name, body)?);
    }

    if trials.is_empty() {
        warn!("Test file contains no trial entries");
    }

    Ok(TestSuite::new(trials))
}

pub fn demo_set_from_value(document: &Value) -> Result<DemoSet, DomainError> {
    let section = section(document, DEMO_SECTION)?;
    let mut exchanges = Vec::new();

    for (name, body) in trial_entries(section, DEMO_SECTION)? {
        for (id, case) in case_entries(&name, body)? {
            let case = parse_case(&name, &id, case)?;
            exchanges.push(DemoExchange::new(case.input, case.output));
        }
    }

    Ok(DemoSet::new(exchanges))
}

fn read_document(path: &Path, kind: ConfigKind, options: LoaderOptions) -> Result<Value, DomainError> {
    let not_found = || DomainError::config_not_found(kind, path.display().to_string());

    let source = fs::read_to_string(path).map_err(|e| {
        report(options, &e);
        not_found()
    })?;

    serde_yaml::from_str(&source).map_err(|e| {
        report(options, &e);
        not_found()
    })
}

fn report(options: LoaderOptions, error: &dyn std::error::Error) {
    if options.debug {
        println!("{}", error);
    }
    debug!(error = %error, "Failed to read configuration file");
}

/// The mapping under `name`; an empty section counts as an empty mapping
fn section<'a>(document: &'a Value, name: &str) -> Result<Option<&'a Mapping>, DomainError> {
    let root = document
        .as_mapping()
        .ok_or_else(|| DomainError::validation(format!("Expected a top-level `{}` section", name)))?;

    match root.get(name) {
        Some(Value::Mapping(section)) => Ok(Some(section)),
        Some(Value::Null) => Ok(None),
        Some(_) => Err(DomainError::validation(format!(
            "The `{}` section must be a mapping of trials",
            name
        ))),
        None => Err(DomainError::validation(format!(
            "Expected a top-level `{}` section",
            name
        ))),
    }
}

fn trial_entries<'a>(
    section: Option<&'a Mapping>,
    section_name: &str,
) -> Result<Vec<(String, &'a Value)>, DomainError> {
    let mut entries = Vec::new();

    for (key, value) in section.into_iter().flatten() {
        let key = key_text(key).ok_or_else(|| {
            DomainError::validation(format!("Unsupported key in `{}` section", section_name))
        })?;

        if is_trial_key(&key) {
            entries.push((key, value));
        } else {
            debug!(key = %key, section = section_name, "Skipping non-trial entry");
        }
    }

    Ok(entries)
}

fn parse_trial(name: &str, body: &Value) -> Result<Trial, DomainError> {
    let mut trial = Trial::new(name);

    let body = match body {
        Value::Mapping(body) => body,
        Value::Null => {
            warn!(trial = name, "Trial is empty");
            return Ok(trial);
        }
        _ => {
            return Err(DomainError::validation(format!(
                "Trial '{}' must be a mapping with `prompts` and `test_cases`",
                name
            )));
        }
    };

    match body.get("prompts") {
        None | Some(Value::Null) => {}
        Some(Value::Sequence(prompts)) => {
            for prompt in prompts {
                let prompt = scalar_text(prompt).ok_or_else(|| {
                    DomainError::validation(format!("Trial '{}' has a non-text prompt", name))
                })?;
                trial = trial.with_prompt(prompt);
            }
        }
        Some(_) => {
            return Err(DomainError::validation(format!(
                "Trial '{}': `prompts` must be a list",
                name
            )));
        }
    }

    if let Some(cases) = body.get("test_cases") {
        for (id, case) in case_entries(name, cases)? {
            let case = parse_case(name, &id, case)?;
            trial = trial.with_test_case(id, case);
        }
    }

    Ok(trial)
}

fn case_entries<'a>(trial: &str, cases: &'a Value) -> Result<Vec<(String, &'a Value)>, DomainError> {
    let cases = match cases {
        Value::Mapping(cases) => cases,
        Value::Null => return Ok(Vec::new()),
        _ => {
            return Err(DomainError::validation(format!(
                "Trial '{}': test cases must be a mapping of case id to case",
                trial
            )));
        }
    };

    cases
        .iter()
        .map(|(id, case)| {
            key_text(id)
                .map(|id| (id, case))
                .ok_or_else(|| DomainError::validation(format!("Trial '{}' has an invalid case id", trial)))
        })
        .collect()
}

fn parse_case(trial: &str, id: &str, case: &Value) -> Result<TestCase, DomainError> {
    let field = |name: &str| {
        case.get(name).and_then(scalar_text).ok_or_else(|| {
            DomainError::validation(format!(
                "Trial '{}', case '{}': missing or non-text `{}`",
                trial, id, name
            ))
        })
    };

    Ok(TestCase::new(field("input")?, field("output")?))
}

/// Text form of a scalar; numbers and booleans keep their YAML spelling
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        _ => None,
    }
}

fn key_text(key: &Value) -> Option<String> {
    scalar_text(key)
}
