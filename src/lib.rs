//! Truths - prompt accuracy harness
//!
//! Runs every prompt template of a YAML test file against every labeled test
//! case through a chat completion model and reports, per prompt:
//! - exact-match accuracy against the expected outputs
//! - an estimate of the prompt's token cost
//!
//! An optional demo file supplies example exchanges that prefix every
//! conversation.

pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;
pub use domain::DomainError;
