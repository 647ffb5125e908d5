//! The `competency list` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use competency_core::config::load_config_from;
use competency_core::selector::get_by_category;

use super::{load_bank, parse_categories, parse_difficulty};

const PROMPT_WIDTH: usize = 60;

pub fn execute(
    bank_path: Option<PathBuf>,
    category: Option<String>,
    difficulty: Option<String>,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let config = load_config_from(config_path.as_deref())?;
    let bank = load_bank(bank_path, &config)?;

    let categories = match &category {
        Some(c) => parse_categories(c)?,
        None => bank.categories().into_iter().collect(),
    };
    let difficulty = difficulty.as_deref().map(parse_difficulty).transpose()?;

    let mut table = Table::new();
    table.set_header(vec![
        "ID",
        "Category",
        "Type",
        "Difficulty",
        "Points",
        "Prompt",
    ]);

    let mut count = 0;
    for category in categories {
        for q in get_by_category(&bank, category, difficulty) {
            table.add_row(vec![
                Cell::new(&q.id),
                Cell::new(q.category.label()),
                Cell::new(q.question_type),
                Cell::new(q.difficulty),
                Cell::new(q.points),
                Cell::new(truncate(&q.prompt, PROMPT_WIDTH)),
            ]);
            count += 1;
        }
    }

    if count == 0 {
        println!("No questions match.");
        return Ok(());
    }

    println!("{table}");
    println!("{count} question(s) in {}", bank.name());

    Ok(())
}

fn truncate(s: &str, width: usize) -> String {
    if s.chars().count() <= width {
        s.to_string()
    } else {
        let mut out: String = s.chars().take(width.saturating_sub(3)).collect();
        out.push_str("...");
        out
    }
}
