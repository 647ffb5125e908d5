//! The `competency generate` command.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};
use rand::rngs::StdRng;
use rand::SeedableRng;

use competency_core::config::load_config_from;
use competency_core::selector::{generate_from_spec, TestSpec};

use super::{load_bank, parse_categories, parse_difficulty};

#[allow(clippy::too_many_arguments)]
pub fn execute(
    bank_path: Option<PathBuf>,
    categories: Option<String>,
    per_category: Option<usize>,
    difficulty: Option<String>,
    seed: Option<u64>,
    output: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let bank = load_bank(bank_path, &config)?;

    let categories = match &categories {
        Some(c) => parse_categories(c)?,
        None if !config.categories.is_empty() => config.categories.clone(),
        None => bank.categories().into_iter().collect(),
    };
    anyhow::ensure!(!categories.is_empty(), "no categories to draw from");

    let per_category = per_category.unwrap_or(config.questions_per_category);
    anyhow::ensure!(per_category >= 1, "per-category must be at least 1");

    let difficulty = difficulty.as_deref().map(parse_difficulty).transpose()?;

    let spec = TestSpec::new(categories)
        .with_questions_per_category(per_category)
        .with_difficulty(difficulty);

    let test = match seed {
        Some(seed) => generate_from_spec(&bank, &spec, &mut StdRng::seed_from_u64(seed)),
        None => generate_from_spec(&bank, &spec, &mut rand::thread_rng()),
    };
    anyhow::ensure!(
        !test.is_empty(),
        "no questions in {} match the requested categories",
        bank.name()
    );

    // (questions, points)
    let mut breakdown: BTreeMap<_, (usize, u32)> = BTreeMap::new();
    for q in test.questions() {
        let entry = breakdown.entry(q.category).or_insert((0, 0));
        entry.0 += 1;
        entry.1 += q.points;
    }

    let mut table = Table::new();
    table.set_header(vec!["Category", "Questions", "Points", "Threshold"]);
    for (category, (count, points)) in &breakdown {
        table.add_row(vec![
            Cell::new(category.label()),
            Cell::new(count),
            Cell::new(points),
            Cell::new(format!("{:.0}%", test.thresholds().get(*category))),
        ]);
    }

    println!("Test {} from {}", test.id(), bank.name());
    println!("{table}");
    println!(
        "{} questions, about {} minutes",
        test.len(),
        test.total_time_limit_secs().div_ceil(60)
    );

    let path =
        output.unwrap_or_else(|| config.output_dir.join(format!("test-{}.json", test.id())));
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(&test).context("failed to serialize test")?;
    std::fs::write(&path, json)
        .with_context(|| format!("failed to write test to {}", path.display()))?;
    println!("Test saved to: {}", path.display());

    Ok(())
}
