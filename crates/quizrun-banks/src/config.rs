//! quizrun configuration and bank source factory.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use quizrun_core::difficulty::Profile;
use quizrun_core::engine::AttemptConfig;
use quizrun_core::model::Mode;
use quizrun_core::traits::BankSource;

use crate::directory::DirectorySource;
use crate::http::HttpSource;

/// File name looked up in the current directory.
pub const CONFIG_FILE: &str = "quizrun.toml";

/// Where bank files are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SourceConfig {
    Directory {
        #[serde(default = "default_banks_dir")]
        path: PathBuf,
    },
    Http {
        base_url: String,
    },
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig::Directory {
            path: default_banks_dir(),
        }
    }
}

fn default_banks_dir() -> PathBuf {
    PathBuf::from("./banks")
}

/// Attempt settings used when the command line does not override them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptDefaults {
    #[serde(default)]
    pub mode: Mode,
    #[serde(default = "default_count")]
    pub count: usize,
    #[serde(default = "default_timer_minutes")]
    pub timer_minutes: u64,
    #[serde(default = "default_true")]
    pub shuffle_options: bool,
    #[serde(default = "default_true")]
    pub avoid_repeats: bool,
    #[serde(default)]
    pub difficulty: Profile,
}

fn default_count() -> usize {
    75
}
fn default_timer_minutes() -> u64 {
    90
}
fn default_true() -> bool {
    true
}

impl Default for AttemptDefaults {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            count: default_count(),
            timer_minutes: default_timer_minutes(),
            shuffle_options: true,
            avoid_repeats: true,
            difficulty: Profile::default(),
        }
    }
}

impl AttemptDefaults {
    /// An attempt config for `bank_ids` seeded from these defaults, clamped to the allowed ranges.
    pub fn attempt_config(&self, bank_ids: Vec<String>) -> AttemptConfig {
        AttemptConfig {
            mode: self.mode,
            bank_ids,
            count: self.count,
            time_limit_minutes: self.timer_minutes,
            shuffle_options: self.shuffle_options,
            avoid_repeats: self.avoid_repeats,
            profile: self.difficulty,
        }
        .clamped()
    }
}

/// Top-level quizrun configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizrunConfig {
    #[serde(default)]
    pub source: SourceConfig,
    /// Directory holding the seen set and attempt history.
    #[serde(default = "default_history_dir")]
    pub history_dir: PathBuf,
    #[serde(default)]
    pub defaults: AttemptDefaults,
}

fn default_history_dir() -> PathBuf {
    PathBuf::from("./.quizrun-history")
}

impl Default for QuizrunConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            history_dir: default_history_dir(),
            defaults: AttemptDefaults::default(),
        }
    }
}

/// The config written by `quizrun init`.
pub const STARTER_CONFIG: &str = r#"# quizrun configuration

history_dir = "./.quizrun-history"

[source]
type = "directory"
path = "./banks"

# [source]
# type = "http"
# base_url = "https://example.com/banks"

[defaults]
mode = "exam"
count = 75
timer_minutes = 90
shuffle_options = true
avoid_repeats = true
difficulty = "mixed"
"#;

/// Resolve environment variable references like `${VAR_NAME}` in a string.
///
/// Substituted values are not scanned again.
fn resolve_env_vars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(end) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        result.push_str(&std::env::var(&rest[start + 2..start + end]).unwrap_or_default());
        rest = &rest[start + end + 1..];
    }
    result.push_str(rest);
    result
}

fn resolve_source(source: &SourceConfig) -> SourceConfig {
    match source {
        SourceConfig::Directory { path } => SourceConfig::Directory {
            path: PathBuf::from(resolve_env_vars(&path.to_string_lossy())),
        },
        SourceConfig::Http { base_url } => SourceConfig::Http {
            base_url: resolve_env_vars(base_url),
        },
    }
}

/// Apply `QUIZRUN_*` overrides read through `lookup`.
///
/// A banks URL wins over a banks directory when both are set.
fn apply_overrides(config: &mut QuizrunConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(dir) = lookup("QUIZRUN_BANKS_DIR") {
        config.source = SourceConfig::Directory { path: dir.into() };
    }
    if let Some(url) = lookup("QUIZRUN_BANKS_URL") {
        config.source = SourceConfig::Http { base_url: url };
    }
    if let Some(dir) = lookup("QUIZRUN_HISTORY_DIR") {
        config.history_dir = dir.into();
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `quizrun.toml` in the current directory
/// 2. `~/.config/quizrun/config.toml`
///
/// Environment variable overrides: `QUIZRUN_BANKS_DIR`, `QUIZRUN_BANKS_URL`, `QUIZRUN_HISTORY_DIR`.
pub fn load_config() -> Result<QuizrunConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<QuizrunConfig> {
    let config_path = match path {
        Some(p) => {
            anyhow::ensure!(p.exists(), "config file not found: {}", p.display());
            Some(p.to_path_buf())
        }
        None => {
            let local = PathBuf::from(CONFIG_FILE);
            if local.exists() {
                Some(local)
            } else {
                global_config_path().filter(|p| p.exists())
            }
        }
    };

    let mut config = match config_path {
        Some(path) => parse_config(&path)?,
        None => QuizrunConfig::default(),
    };

    apply_overrides(&mut config, |key| {
        std::env::var(key).ok().filter(|v| !v.is_empty())
    });
    config.source = resolve_source(&config.source);

    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}

fn parse_config(path: &Path) -> Result<QuizrunConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str(&content).with_context(|| format!("failed to parse config: {}", path.display()))
}

fn global_config_path() -> Option<PathBuf> {
    std::env::var("HOME").ok().map(|h| {
        PathBuf::from(h)
            .join(".config")
            .join("quizrun")
            .join("config.toml")
    })
}

/// Create a bank source from its configuration.
pub fn create_source(config: &SourceConfig) -> Result<Box<dyn BankSource>> {
    match config {
        SourceConfig::Directory { path } => Ok(Box::new(DirectorySource::new(path))),
        SourceConfig::Http { base_url } => {
            anyhow::ensure!(!base_url.trim().is_empty(), "http bank source needs a base_url");
            let source = HttpSource::new(base_url)
                .with_context(|| format!("failed to set up HTTP client for {base_url}"))?;
            Ok(Box::new(source))
        }
    }
}
