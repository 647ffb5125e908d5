//! The `competency stats` command.

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Table};

use competency_core::report::AttemptReport;
use competency_core::statistics::compute_cohort_stats;

pub fn execute(reports_dir: PathBuf, top: usize, format: String) -> Result<()> {
    let reports = AttemptReport::load_directory(&reports_dir)?;
    if reports.is_empty() {
        println!("No reports found in {}", reports_dir.display());
        return Ok(());
    }

    let stats = compute_cohort_stats(&reports);

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!(
        "{} attempt(s): {:.1}% completed, average {:.1}%",
        stats.attempts,
        stats.completion_rate * 100.0,
        stats.avg_percentage
    );

    let mut table = Table::new();
    table.set_header(vec!["Category", "Attempts", "Avg %", "Pass rate"]);
    for (category, c) in &stats.per_category {
        table.add_row(vec![
            Cell::new(category.label()),
            Cell::new(c.attempts),
            Cell::new(format!("{:.1}%", c.avg_percentage)),
            Cell::new(format!("{:.1}%", c.pass_rate * 100.0)),
        ]);
    }
    println!("{table}");

    let hardest = stats.hardest_questions(top);
    if !hardest.is_empty() {
        let mut table = Table::new();
        table.set_header(vec!["Question", "Category", "Correct", "Unanswered", "Facility"]);
        for q in hardest {
            table.add_row(vec![
                Cell::new(&q.question_id),
                Cell::new(q.category.label()),
                Cell::new(format!("{}/{}", q.correct, q.administered)),
                Cell::new(q.unanswered),
                Cell::new(format!("{:.2}", q.facility)),
            ]);
        }
        println!("\nHardest questions:");
        println!("{table}");
    }

    Ok(())
}
