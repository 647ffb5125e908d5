//! The `competency score` command.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use comfy_table::{Cell, Table};

use competency_core::config::load_config_from;
use competency_core::model::AnswerSheet;
use competency_core::report::AttemptReport;
use competency_core::selector::TestInstance;
use competency_report::html::write_html_report;

#[allow(clippy::too_many_arguments)]
pub fn execute(
    test_path: PathBuf,
    answers_path: PathBuf,
    candidate: Option<String>,
    completion_threshold: Option<f64>,
    output: Option<PathBuf>,
    format: String,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let formats = parse_formats(&format)?;

    let config = load_config_from(config_path.as_deref())?;

    let test: TestInstance = read_json(&test_path, "test instance")?;
    let answers: AnswerSheet = read_json(&answers_path, "answer sheet")?;

    let completion_threshold = completion_threshold.unwrap_or(config.completion_threshold);
    anyhow::ensure!(
        (0.0..=100.0).contains(&completion_threshold),
        "completion threshold must be between 0 and 100"
    );

    let administered: HashSet<&str> = test.questions().iter().map(|q| q.id.as_str()).collect();
    let unknown = answers
        .keys()
        .filter(|id| !administered.contains(id.as_str()))
        .count();
    if unknown > 0 {
        tracing::warn!("{unknown} answer(s) do not match any question in the test, ignoring");
    }

    let score = test.score(&answers);
    let report = AttemptReport::new(&test, score, candidate, completion_threshold);

    print_summary(&report);

    let output = output.unwrap_or(config.output_dir);
    std::fs::create_dir_all(&output)?;
    let stem = format!(
        "attempt-{}-{}",
        report.created_at.format("%Y-%m-%dT%H%M%S"),
        &report.id.simple().to_string()[..8]
    );

    for fmt in &formats {
        match fmt {
            ReportFormat::Json => {
                let path = output.join(format!("{stem}.json"));
                report.save_json(&path)?;
                println!("Report saved to: {}", path.display());
            }
            ReportFormat::Html => {
                let path = output.join(format!("{stem}.html"));
                write_html_report(&report, &path)?;
                println!("HTML report: {}", path.display());
            }
        }
    }

    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Json,
    Html,
}

/// Parse `json`, `html`, `all`, or a comma-separated list.
fn parse_formats(format: &str) -> Result<Vec<ReportFormat>> {
    if format == "all" {
        return Ok(vec![ReportFormat::Json, ReportFormat::Html]);
    }
    format
        .split(',')
        .map(str::trim)
        .map(|f| match f {
            "json" => Ok(ReportFormat::Json),
            "html" => Ok(ReportFormat::Html),
            other => anyhow::bail!("unknown report format: {other} (expected json, html or all)"),
        })
        .collect()
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {what} from {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {what}: {}", path.display()))
}

fn print_summary(report: &AttemptReport) {
    let score = &report.score;

    let mut table = Table::new();
    table.set_header(vec!["Category", "Score", "Percentage", "Threshold", "Result"]);

    for (category, cat) in &score.category_scores {
        table.add_row(vec![
            Cell::new(category.label()),
            Cell::new(format!("{}/{}", cat.score, cat.possible)),
            Cell::new(format!("{:.1}%", cat.percentage)),
            Cell::new(format!("{:.0}%", cat.threshold)),
            Cell::new(if cat.passed { "PASS" } else { "FAIL" }),
        ]);
    }

    println!("{table}");
    println!(
        "Overall: {}/{} ({:.1}%), {} of {} correct",
        score.total_score,
        score.possible_score,
        score.percentage,
        score.correct_count(),
        score.outcomes.len()
    );
    if report.completed {
        println!("COMPLETED (threshold {:.0}%)", report.completion_threshold);
    } else {
        println!("NOT COMPLETED (threshold {:.0}%)", report.completion_threshold);
    }

    let failed = score.failed_categories();
    if !failed.is_empty() {
        let names: Vec<_> = failed.iter().map(|c| c.label()).collect();
        println!("Below threshold: {}", names.join(", "));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_formats_lists() {
        use ReportFormat::{Html, Json};
        assert_eq!(parse_formats("all").unwrap(), vec![Json, Html]);
        assert_eq!(parse_formats("html, json").unwrap(), vec![Html, Json]);
        assert!(parse_formats("json,pdf").is_err());
    }
}
