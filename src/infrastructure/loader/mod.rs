//! YAML loaders for test and demo files

mod yaml;

pub use yaml::{demo_set_from_value, load_demo_set, load_test_suite, test_suite_from_value, LoaderOptions};
