//! The `competency compare` command.

use std::path::PathBuf;

use anyhow::Result;

use competency_core::report::AttemptReport;

pub fn execute(
    baseline_path: PathBuf,
    current_path: PathBuf,
    threshold: f64,
    fail_on_regression: bool,
    format: String,
) -> Result<()> {
    anyhow::ensure!(threshold >= 0.0, "threshold must not be negative");

    let baseline = AttemptReport::load_json(&baseline_path)?;
    let current = AttemptReport::load_json(&current_path)?;

    let report = current.compare(&baseline, threshold);

    match format.as_str() {
        "markdown" | "md" => {
            println!("{}", report.to_markdown());
        }
        "json" => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        _ => {
            // text format
            println!(
                "Overall: {:.1}% -> {:.1}%",
                report.baseline_percentage, report.current_percentage
            );
            println!(
                "Comparison: {} regressions, {} improvements, {} unchanged",
                report.regressions.len(),
                report.improvements.len(),
                report.unchanged
            );

            if !report.regressions.is_empty() {
                println!("\nRegressions:");
                for r in &report.regressions {
                    println!(
                        "  {} {:.1}% -> {:.1}% ({:+.1}) {}",
                        r.category.label(),
                        r.baseline_percentage,
                        r.current_percentage,
                        r.delta,
                        r.status()
                    );
                }
            }

            if !report.improvements.is_empty() {
                println!("\nImprovements:");
                for i in &report.improvements {
                    println!(
                        "  {} {:.1}% -> {:.1}% ({:+.1}) {}",
                        i.category.label(),
                        i.baseline_percentage,
                        i.current_percentage,
                        i.delta,
                        i.status()
                    );
                }
            }

            if report.new_categories > 0 {
                println!("\n{} new category(ies)", report.new_categories);
            }
            if report.removed_categories > 0 {
                println!("{} removed category(ies)", report.removed_categories);
            }
        }
    }

    if fail_on_regression && report.has_regressions() {
        std::process::exit(1);
    }

    Ok(())
}
