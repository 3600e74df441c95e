//! quizrun-banks: Question bank sources.
//!
//! Implements the `BankSource` trait for a local directory and an HTTP
//! server, and loads the `quizrun.toml` configuration that picks one.

pub mod config;
pub mod directory;
pub mod http;
pub mod mock;

pub use config::{
    create_source, load_config, load_config_from, AttemptDefaults, QuizrunConfig, SourceConfig,
};
pub use directory::DirectorySource;
pub use http::HttpSource;
pub use mock::MockSource;

/// Name of the manifest file at the root of every bank source.
pub const MANIFEST_FILE: &str = "banks.json";
