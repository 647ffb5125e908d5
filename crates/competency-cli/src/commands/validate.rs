//! The `competency validate` command.

use std::path::PathBuf;

use anyhow::{Context, Result};

use competency_core::bank::CompetencyBank;
use competency_core::parser;

pub fn execute(bank_path: PathBuf) -> Result<()> {
    let (definitions, failures) = parser::scan_definitions(&bank_path)?;
    anyhow::ensure!(
        !definitions.is_empty() || !failures.is_empty(),
        "no question banks found in {}",
        bank_path.display()
    );

    for f in &failures {
        println!("{} ERROR: {:#}", f.path.display(), f.error);
    }

    let mut total_warnings = 0;

    for def in &definitions {
        println!("Bank: {} ({} questions)", def.name, def.questions.len());

        let warnings = parser::validate_bank(def);
        for w in &warnings {
            let prefix = w
                .question_id
                .as_ref()
                .map(|id| format!("  [{id}]"))
                .unwrap_or_else(|| "  ".to_string());
            println!("{prefix} WARNING: {}", w.message);
        }
        total_warnings += warnings.len();
    }

    if !failures.is_empty() {
        anyhow::bail!(
            "{} bank file(s) failed to parse in {}",
            failures.len(),
            bank_path.display()
        );
    }

    // Duplicates across files and bad thresholds only show up once merged.
    let bank = CompetencyBank::merge(definitions)
        .with_context(|| format!("invalid question bank: {}", bank_path.display()))?;

    if total_warnings == 0 {
        println!("All banks valid.");
    } else {
        println!("\n{total_warnings} warning(s) found.");
    }
    println!(
        "{} questions across {} categories.",
        bank.questions().len(),
        bank.categories().len()
    );

    Ok(())
}
