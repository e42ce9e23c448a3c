//! Infrastructure layer - File loading, completion client, evaluation and reporting

pub mod llm;
pub mod loader;
pub mod logging;
pub mod report;
pub mod services;
