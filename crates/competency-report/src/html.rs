//! HTML report generator.
//!
//! Produces a self-contained HTML file with all CSS/JS inlined.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};

use competency_core::model::Category;
use competency_core::report::AttemptReport;
use competency_core::scoring::CategoryScore;

/// Escape a string for safe HTML insertion.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn pass_class(passed: bool) -> &'static str {
    if passed {
        "pass"
    } else {
        "fail"
    }
}

/// Generate an HTML report for a graded attempt.
pub fn generate_html(report: &AttemptReport) -> String {
    let mut html = String::new();
    let score = &report.score;

    html.push_str("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
    html.push_str("<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    html.push_str(&format!(
        "<title>Competency report: {}</title>\n",
        html_escape(&report.bank.name)
    ));
    html.push_str("<style>\n");
    html.push_str(CSS);
    html.push_str("</style>\n");
    html.push_str("</head>\n<body>\n");

    // Header
    html.push_str("<header>\n");
    html.push_str("<h1>Competency report</h1>\n");
    html.push_str(&format!(
        "<p class=\"meta\">Bank: <strong>{}</strong> | Candidate: {} | {} questions | {}</p>\n",
        html_escape(&report.bank.name),
        html_escape(report.candidate.as_deref().unwrap_or("anonymous")),
        score.outcomes.len(),
        report.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    html.push_str(&format!(
        "<p class=\"overall {}\">Overall: {}/{} ({:.1}%), {} (completion threshold {:.0}%)</p>\n",
        pass_class(report.completed),
        score.total_score,
        score.possible_score,
        score.percentage,
        if report.completed { "completed" } else { "not completed" },
        report.completion_threshold
    ));
    html.push_str("</header>\n");

    // Category dashboard
    html.push_str("<section class=\"dashboard\">\n");
    html.push_str("<h2>Categories</h2>\n");
    html.push_str("<table class=\"summary\">\n");
    html.push_str("<thead><tr><th>Category</th><th>Score</th><th>Percentage</th><th>Threshold</th><th>Result</th></tr></thead>\n");
    html.push_str("<tbody>\n");
    for (category, cat) in &score.category_scores {
        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}/{}</td><td>{:.1}%</td><td>{:.0}%</td><td>{}</td></tr>\n",
            pass_class(cat.passed),
            html_escape(category.label()),
            cat.score,
            cat.possible,
            cat.percentage,
            cat.threshold,
            if cat.passed { "PASS" } else { "FAIL" },
        ));
    }
    html.push_str("</tbody></table>\n");

    if !score.category_scores.is_empty() {
        html.push_str(&generate_bar_chart(&score.category_scores));
    }

    html.push_str("</section>\n");

    // Per-question outcomes
    html.push_str("<section class=\"results\">\n");
    html.push_str("<h2>Questions</h2>\n");
    html.push_str("<table class=\"results-table\" id=\"results\">\n");
    html.push_str("<thead><tr><th onclick=\"sortTable(0)\">Question</th><th onclick=\"sortTable(1)\">Category</th><th onclick=\"sortTable(2)\">Points</th><th onclick=\"sortTable(3)\">Result</th></tr></thead>\n");
    html.push_str("<tbody>\n");

    for o in &score.outcomes {
        let result_text = if o.correct {
            "CORRECT"
        } else if o.answered {
            "WRONG"
        } else {
            "UNANSWERED"
        };

        html.push_str(&format!(
            "<tr class=\"{}\"><td>{}</td><td>{}</td><td>{}/{}</td><td>{}</td></tr>\n",
            pass_class(o.correct),
            html_escape(&o.question_id),
            html_escape(o.category.label()),
            o.points_awarded,
            o.points_possible,
            result_text
        ));
    }

    html.push_str("</tbody></table>\n");
    html.push_str("</section>\n");

    // Raw JSON
    html.push_str("<section class=\"raw-data\">\n");
    html.push_str("<details>\n<summary>Raw JSON Data</summary>\n");
    html.push_str("<pre><code>");
    html.push_str(&html_escape(
        &serde_json::to_string_pretty(report).unwrap_or_default(),
    ));
    html.push_str("</code></pre>\n");
    html.push_str("</details>\n</section>\n");

    // JavaScript for sorting
    html.push_str("<script>\n");
    html.push_str(JS);
    html.push_str("</script>\n");

    html.push_str("</body>\n</html>");
    html
}

/// Write an HTML report to a file.
pub fn write_html_report(report: &AttemptReport, path: &Path) -> Result<()> {
    let html = generate_html(report);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, html)
        .with_context(|| format!("failed to write HTML report to {}", path.display()))?;
    Ok(())
}

/// Horizontal bars of category percentage with a marker at the threshold.
fn generate_bar_chart(categories: &BTreeMap<Category, CategoryScore>) -> String {
    let bar_height = 30;
    let max_width = 400;
    let padding = 10;
    let label_width = 220;

    let total_height = categories.len() * (bar_height + padding) + padding;

    let mut svg = format!(
        "<svg width=\"{}\" height=\"{}\" xmlns=\"http://www.w3.org/2000/svg\">\n",
        label_width + max_width + 60,
        total_height
    );

    for (i, (category, cat)) in categories.iter().enumerate() {
        let y = i * (bar_height + padding) + padding;
        let width = (cat.percentage.clamp(0.0, 100.0) / 100.0 * max_width as f64) as usize;
        let marker_x = label_width + (cat.threshold / 100.0 * max_width as f64) as usize;

        let color = if cat.passed {
            "#22c55e"
        } else if cat.percentage >= cat.threshold - 10.0 {
            "#eab308"
        } else {
            "#ef4444"
        };

        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"14\" fill=\"currentColor\" text-anchor=\"end\" dominant-baseline=\"middle\">{}</text>\n",
            label_width - 10,
            y + bar_height / 2,
            html_escape(category.label())
        ));
        svg.push_str(&format!(
            "  <rect x=\"{}\" y=\"{}\" width=\"{}\" height=\"{}\" fill=\"{}\" rx=\"4\"/>\n",
            label_width, y, width, bar_height, color
        ));
        svg.push_str(&format!(
            "  <line class=\"threshold\" x1=\"{marker_x}\" y1=\"{}\" x2=\"{marker_x}\" y2=\"{}\" stroke=\"currentColor\" stroke-width=\"2\" stroke-dasharray=\"4 2\"/>\n",
            y.saturating_sub(2),
            y + bar_height + 2
        ));
        svg.push_str(&format!(
            "  <text x=\"{}\" y=\"{}\" font-size=\"12\" fill=\"currentColor\" dominant-baseline=\"middle\">{:.1}%</text>\n",
            label_width + max_width + 8,
            y + bar_height / 2,
            cat.percentage
        ));
    }

    svg.push_str("</svg>\n");
    svg
}

const CSS: &str = r#"
:root { --bg: #fff; --fg: #1a1a1a; --border: #e5e7eb; --pass: #dcfce7; --fail: #fde2e2; }
@media (prefers-color-scheme: dark) {
  :root { --bg: #111827; --fg: #f9fafb; --border: #374151; --pass: #064e3b; --fail: #7f1d1d; }
}
body { font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', sans-serif; margin: 0; padding: 2rem; background: var(--bg); color: var(--fg); }
h1, h2 { margin-top: 2rem; }
.meta { color: #6b7280; }
.overall { display: inline-block; padding: 0.5rem 1rem; border-radius: 8px; font-weight: bold; }
table { border-collapse: collapse; width: 100%; margin: 1rem 0; }
th, td { border: 1px solid var(--border); padding: 0.5rem 1rem; text-align: left; }
th { background: var(--border); cursor: pointer; }
.pass { background: var(--pass); }
.fail { background: var(--fail); }
pre { overflow-x: auto; padding: 1rem; background: var(--border); border-radius: 8px; }
code { font-family: 'JetBrains Mono', 'Fira Code', monospace; font-size: 0.85rem; }
details { margin: 1rem 0; }
summary { cursor: pointer; font-weight: bold; }
svg { margin: 1rem 0; }
"#;

const JS: &str = r#"
function sortTable(col) {
  const table = document.getElementById('results');
  const tbody = table.querySelector('tbody');
  const rows = Array.from(tbody.querySelectorAll('tr'));
  const asc = table.dataset.sortCol == col && table.dataset.sortDir == 'asc' ? false : true;
  rows.sort((a, b) => {
    const va = a.cells[col].textContent;
    const vb = b.cells[col].textContent;
    return asc ? va.localeCompare(vb, undefined, { numeric: true }) : vb.localeCompare(va, undefined, { numeric: true });
  });
  table.dataset.sortCol = col;
  table.dataset.sortDir = asc ? 'asc' : 'desc';
  rows.forEach(r => tbody.appendChild(r));
}
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use competency_core::bank::BankSummary;
    use competency_core::scoring::{QuestionOutcome, ScoreResult};

    fn outcome(id: &str, category: Category, points: u32, correct: bool) -> QuestionOutcome {
        QuestionOutcome {
            question_id: id.into(),
            category,
            points_possible: points,
            points_awarded: if correct { points } else { 0 },
            answered: true,
            correct,
        }
    }

    fn make_test_report() -> AttemptReport {
        let mut category_scores = BTreeMap::new();
        category_scores.insert(
            Category::WhsSafety,
            CategoryScore {
                score: 7,
                possible: 17,
                percentage: 7.0 / 17.0 * 100.0,
                threshold: 90.0,
                passed: false,
            },
        );
        category_scores.insert(
            Category::TaxGst,
            CategoryScore {
                score: 5,
                possible: 5,
                percentage: 100.0,
                threshold: 75.0,
                passed: true,
            },
        );

        AttemptReport {
            id: uuid::Uuid::nil(),
            created_at: chrono::Utc::now(),
            candidate: Some("<script>alert(1)</script>".into()),
            test_id: uuid::Uuid::nil(),
            bank: BankSummary {
                id: "australian-competency".into(),
                name: "Australian Disaster Recovery Competency".into(),
                question_count: 31,
            },
            score: ScoreResult {
                total_score: 12,
                possible_score: 22,
                percentage: 12.0 / 22.0 * 100.0,
                category_scores,
                outcomes: vec![
                    outcome("whs_001", Category::WhsSafety, 5, false),
                    outcome("whs_002", Category::WhsSafety, 5, false),
                    outcome("whs_003", Category::WhsSafety, 7, true),
                    outcome("tax_001", Category::TaxGst, 5, true),
                ],
            },
            completion_threshold: 75.0,
            completed: false,
        }
    }

    #[test]
    fn html_report_contains_required_elements() {
        let report = make_test_report();
        let html = generate_html(&report);

        assert!(html.contains("<html"));
        assert!(html.contains("</html>"));
        assert!(html.contains("Australian Disaster Recovery Competency"));
        assert!(html.contains("WHS Safety"));
        assert!(html.contains("Tax &amp; GST"));
        assert!(html.contains("whs_003"));
        assert!(html.contains("<svg"));
        assert!(html.contains("not completed"));
    }

    #[test]
    fn html_report_marks_pass_and_fail() {
        let html = generate_html(&make_test_report());
        assert!(html.contains("<td>7/17</td><td>41.2%</td><td>90%</td><td>FAIL</td>"));
        assert!(html.contains("<td>5/5</td><td>100.0%</td><td>75%</td><td>PASS</td>"));
        assert_eq!(html.matches("class=\"threshold\"").count(), 2);
    }

    #[test]
    fn html_report_escapes_user_text() {
        let html = generate_html(&make_test_report());
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    }

    #[test]
    fn html_report_write_to_file() {
        let report = make_test_report();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.html");

        write_html_report(&report, &path).unwrap();
        assert!(path.exists());

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("<html"));
    }
}
