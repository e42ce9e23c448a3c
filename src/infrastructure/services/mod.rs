//! Infrastructure services

mod evaluation_service;

pub use evaluation_service::{
    EvaluationService, EvaluatorSettings, ProgressMode, DEFAULT_MODEL, DEFAULT_SYSTEM_PROMPT,
};
