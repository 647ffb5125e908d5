//! Configuration file loading.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::model::Category;
use crate::report::DEFAULT_COMPLETION_THRESHOLD;
use crate::selector::DEFAULT_QUESTIONS_PER_CATEGORY;

/// Top-level competency configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompetencyConfig {
    /// Bank file or directory of bank files.
    #[serde(default = "default_bank_path")]
    pub bank_path: PathBuf,
    /// Questions drawn per category when generating a test.
    #[serde(default = "default_questions_per_category")]
    pub questions_per_category: usize,
    /// Overall percentage an attempt needs to count as completed.
    #[serde(default = "default_completion_threshold")]
    pub completion_threshold: f64,
    /// Output directory for tests and reports.
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,
    /// Categories to test by default (empty = every category in the bank).
    #[serde(default)]
    pub categories: Vec<Category>,
}

fn default_bank_path() -> PathBuf {
    PathBuf::from("./banks")
}
fn default_questions_per_category() -> usize {
    DEFAULT_QUESTIONS_PER_CATEGORY
}
fn default_completion_threshold() -> f64 {
    DEFAULT_COMPLETION_THRESHOLD
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("./competency-results")
}

impl Default for CompetencyConfig {
    fn default() -> Self {
        Self {
            bank_path: default_bank_path(),
            questions_per_category: default_questions_per_category(),
            completion_threshold: default_completion_threshold(),
            output_dir: default_output_dir(),
            categories: Vec::new(),
        }
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_path(p: &Path) -> PathBuf {
    PathBuf::from(resolve_env_vars(&p.to_string_lossy()))
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `competency.toml` in the current directory
/// 2. `~/.config/competency/config.toml`
///
/// Environment variable overrides: `COMPETENCY_BANK`, `COMPETENCY_OUTPUT_DIR`.
pub fn load_config() -> Result<CompetencyConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<CompetencyConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("competency.toml");
        if local.exists() {
            Some(local)
        } else if let Some(home) = dirs_path() {
            let global = home.join("config.toml");
            if global.exists() {
                Some(global)
            } else {
                None
            }
        } else {
            None
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!("loading config from {}", path.display());
            parse_config_file(&path)?
        }
        None => CompetencyConfig::default(),
    };

    // Apply env var overrides
    if let Ok(bank) = std::env::var("COMPETENCY_BANK") {
        config.bank_path = PathBuf::from(bank);
    }
    if let Ok(dir) = std::env::var("COMPETENCY_OUTPUT_DIR") {
        config.output_dir = PathBuf::from(dir);
    }

    config.bank_path = resolve_path(&config.bank_path);
    config.output_dir = resolve_path(&config.output_dir);

    anyhow::ensure!(
        (0.0..=100.0).contains(&config.completion_threshold),
        "completion_threshold must be between 0 and 100"
    );

    Ok(config)
}

fn parse_config_file(path: &Path) -> Result<CompetencyConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config: {}", path.display()))?;
    toml::from_str::<CompetencyConfig>(&content)
        .with_context(|| format!("failed to parse config: {}", path.display()))
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("competency"))
}
