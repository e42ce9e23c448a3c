//! Trial domain - test suites, test cases and demo conversations

mod entity;

pub use entity::{DemoExchange, DemoSet, TestCase, TestSuite, Trial, is_trial_key, TRIAL_PREFIX};
