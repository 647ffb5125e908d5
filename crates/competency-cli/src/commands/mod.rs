pub mod compare;
pub mod generate;
pub mod init;
pub mod list;
pub mod score;
pub mod stats;
pub mod validate;

use std::path::PathBuf;

use anyhow::Result;

use competency_core::bank::CompetencyBank;
use competency_core::config::CompetencyConfig;
use competency_core::model::{Category, Difficulty};

/// Parse a comma-separated category list, accepting short aliases.
pub fn parse_categories(s: &str) -> Result<Vec<Category>> {
    s.split(',')
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(|c| c.parse::<Category>().map_err(|e| anyhow::anyhow!(e)))
        .collect()
}

pub fn parse_difficulty(s: &str) -> Result<Difficulty> {
    s.parse::<Difficulty>().map_err(|e| anyhow::anyhow!(e))
}

/// Load the bank named on the command line, or the configured one.
pub fn load_bank(bank: Option<PathBuf>, config: &CompetencyConfig) -> Result<CompetencyBank> {
    let path = bank.unwrap_or_else(|| config.bank_path.clone());
    competency_core::parser::load_bank(&path)
}
