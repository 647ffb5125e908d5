//! Attempt report types with JSON persistence and progress comparison.

use std::collections::BTreeSet;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bank::BankSummary;
use crate::model::Category;
use crate::scoring::ScoreResult;
use crate::selector::TestInstance;

/// Default overall percentage for an attempt to count as completed.
pub const DEFAULT_COMPLETION_THRESHOLD: f64 = 75.0;

/// A graded attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttemptReport {
    /// Unique report identifier.
    pub id: Uuid,
    /// When the attempt was graded.
    pub created_at: DateTime<Utc>,
    /// Who sat the test, if known.
    #[serde(default)]
    pub candidate: Option<String>,
    /// The test instance that was graded.
    pub test_id: Uuid,
    /// Bank the test was drawn from.
    pub bank: BankSummary,
    pub score: ScoreResult,
    /// Overall percentage needed to complete.
    pub completion_threshold: f64,
    /// Whether the overall percentage met `completion_threshold`.
    pub completed: bool,
}

impl AttemptReport {
    /// Build a report for a graded test instance.
    pub fn new(
        test: &TestInstance,
        score: ScoreResult,
        candidate: Option<String>,
        completion_threshold: f64,
    ) -> Self {
        let completed = score.percentage >= completion_threshold;
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            candidate,
            test_id: test.id(),
            bank: test.bank().clone(),
            score,
            completion_threshold,
            completed,
        }
    }

    /// Save the report as JSON to a file.
    pub fn save_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("failed to serialize report")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, json)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        Ok(())
    }

    /// Load a report from a JSON file.
    pub fn load_json(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read report from {}", path.display()))?;
        let report: AttemptReport =
            serde_json::from_str(&content).context("failed to parse report JSON")?;
        Ok(report)
    }

    /// Load every `*.json` report in a directory, skipping files that do not parse.
    pub fn load_directory(dir: &Path) -> Result<Vec<Self>> {
        if !dir.is_dir() {
            anyhow::bail!("not a directory: {}", dir.display());
        }

        let mut paths = std::fs::read_dir(dir)
            .with_context(|| format!("failed to read directory: {}", dir.display()))?
            .map(|e| e.map(|e| e.path()))
            .collect::<std::io::Result<Vec<_>>>()?;
        paths.sort();

        let mut reports = Vec::new();
        for path in paths {
            if !path.extension().is_some_and(|ext| ext == "json") {
                continue;
            }
            match Self::load_json(&path) {
                Ok(r) => reports.push(r),
                Err(e) => tracing::warn!("skipping {}: {:#}", path.display(), e),
            }
        }
        Ok(reports)
    }

    /// Compare this attempt against a baseline, per category.
    ///
    /// `threshold` is in percentage points: a change larger than it counts
    /// as a regression or an improvement.
    pub fn compare(&self, baseline: &AttemptReport, threshold: f64) -> ProgressReport {
        let mut regressions = Vec::new();
        let mut improvements = Vec::new();
        let mut unchanged = 0usize;
        let mut new_categories = 0usize;

        for (category, current) in &self.score.category_scores {
            let Some(base) = baseline.score.category_scores.get(category) else {
                new_categories += 1;
                continue;
            };

            let delta = current.percentage - base.percentage;
            let change = CategoryChange {
                category: *category,
                baseline_percentage: base.percentage,
                current_percentage: current.percentage,
                delta,
                baseline_passed: base.passed,
                current_passed: current.passed,
            };

            if delta < -threshold {
                regressions.push(change);
            } else if delta > threshold {
                improvements.push(change);
            } else {
                unchanged += 1;
            }
        }

        let current_categories: BTreeSet<_> = self.score.category_scores.keys().collect();
        let removed_categories = baseline
            .score
            .category_scores
            .keys()
            .filter(|c| !current_categories.contains(c))
            .count();

        ProgressReport {
            baseline_percentage: baseline.score.percentage,
            current_percentage: self.score.percentage,
            regressions,
            improvements,
            unchanged,
            new_categories,
            removed_categories,
        }
    }
}

/// Result of comparing two attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressReport {
    /// Overall percentage of the baseline attempt.
    pub baseline_percentage: f64,
    /// Overall percentage of the current attempt.
    pub current_percentage: f64,
    /// Categories where the percentage went down.
    pub regressions: Vec<CategoryChange>,
    /// Categories where the percentage went up.
    pub improvements: Vec<CategoryChange>,
    /// Categories with no significant change.
    pub unchanged: usize,
    /// Categories in current but not baseline.
    pub new_categories: usize,
    /// Categories in baseline but not current.
    pub removed_categories: usize,
}

/// A per-category change between two attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryChange {
    pub category: Category,
    pub baseline_percentage: f64,
    pub current_percentage: f64,
    pub delta: f64,
    pub baseline_passed: bool,
    pub current_passed: bool,
}

impl CategoryChange {
    /// Pass/fail transition between the two attempts.
    pub fn status(&self) -> &'static str {
        match (self.baseline_passed, self.current_passed) {
            (true, false) => "now failing",
            (false, true) => "now passing",
            (true, true) => "passing",
            (false, false) => "failing",
        }
    }
}

impl ProgressReport {
    /// Format the progress report as markdown.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!(
            "**Overall:** {:.1}% -> {:.1}%\n\n",
            self.baseline_percentage, self.current_percentage
        ));
        md.push_str(&format!(
            "**Summary:** {} regressions, {} improvements, {} unchanged\n\n",
            self.regressions.len(),
            self.improvements.len(),
            self.unchanged
        ));

        if !self.regressions.is_empty() {
            md.push_str("### Regressions\n\n");
            md.push_str("| Category | Baseline | Current | Delta | Status |\n");
            md.push_str("|----------|----------|---------|-------|--------|\n");
            for r in &self.regressions {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | {:.1} | {} |\n",
                    r.category.label(),
                    r.baseline_percentage,
                    r.current_percentage,
                    r.delta,
                    r.status()
                ));
            }
            md.push('\n');
        }

        if !self.improvements.is_empty() {
            md.push_str("### Improvements\n\n");
            md.push_str("| Category | Baseline | Current | Delta | Status |\n");
            md.push_str("|----------|----------|---------|-------|--------|\n");
            for i in &self.improvements {
                md.push_str(&format!(
                    "| {} | {:.1}% | {:.1}% | +{:.1} | {} |\n",
                    i.category.label(),
                    i.baseline_percentage,
                    i.current_percentage,
                    i.delta,
                    i.status()
                ));
            }
        }

        md
    }

    /// Returns true if there are any regressions.
    pub fn has_regressions(&self) -> bool {
        !self.regressions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::tests::question;
    use crate::bank::CompetencyBank;
    use crate::model::{Answer, AnswerSheet, PassThresholds};
    use crate::selector::generate_random_test;

    fn bank() -> CompetencyBank {
        let questions = vec![
            question("whs_1", Category::WhsSafety, 5, "TRUE"),
            question("whs_2", Category::WhsSafety, 5, "TRUE"),
            question("tax_1", Category::TaxGst, 5, "TRUE"),
            question("doc_1", Category::Documentation, 5, "TRUE"),
        ];
        CompetencyBank::new("fixture", "Fixture", questions, PassThresholds::standard()).unwrap()
    }

    fn attempt(bank: &CompetencyBank, categories: &[Category], correct: &[&str]) -> AttemptReport {
        let test = generate_random_test(bank, categories, 5);
        let answers: AnswerSheet = correct
            .iter()
            .map(|id| (id.to_string(), Answer::from("TRUE")))
            .collect();
        let score = test.score(&answers);
        AttemptReport::new(&test, score, Some("sam".into()), 75.0)
    }

    #[test]
    fn completion_uses_overall_percentage() {
        let bank = bank();
        let both = [Category::WhsSafety, Category::TaxGst];
        let passed = attempt(&bank, &both, &["whs_1", "whs_2", "tax_1"]);
        assert!(passed.completed);
        let failed = attempt(&bank, &both, &["whs_1"]);
        assert!(!failed.completed);
    }

    #[test]
    fn compare_identical_attempts() {
        let bank = bank();
        let a = attempt(&bank, &[Category::WhsSafety], &["whs_1", "whs_2"]);
        let report = a.compare(&a, 5.0);
        assert!(report.regressions.is_empty());
        assert!(report.improvements.is_empty());
        assert_eq!(report.unchanged, 1);
    }

    #[test]
    fn compare_with_regression() {
        let bank = bank();
        let baseline = attempt(&bank, &[Category::WhsSafety], &["whs_1", "whs_2"]);
        let current = attempt(&bank, &[Category::WhsSafety], &["whs_1"]);

        let report = current.compare(&baseline, 5.0);
        assert!(report.has_regressions());
        assert_eq!(report.regressions[0].category, Category::WhsSafety);
        assert_eq!(report.regressions[0].delta, -50.0);
        assert_eq!(report.regressions[0].status(), "now failing");
    }

    #[test]
    fn compare_with_new_and_removed() {
        let bank = bank();
        let baseline = attempt(&bank, &[Category::TaxGst], &["tax_1"]);
        let current = attempt(&bank, &[Category::Documentation], &["doc_1"]);

        let report = current.compare(&baseline, 5.0);
        assert_eq!(report.new_categories, 1);
        assert_eq!(report.removed_categories, 1);
    }

    #[test]
    fn json_roundtrip() {
        let bank = bank();
        let report = attempt(&bank, &[Category::WhsSafety], &["whs_1"]);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("report.json");

        report.save_json(&path).unwrap();
        let loaded = AttemptReport::load_json(&path).unwrap();

        assert_eq!(loaded.id, report.id);
        assert_eq!(loaded.bank.id, "fixture");
        assert_eq!(loaded.candidate.as_deref(), Some("sam"));
        assert_eq!(loaded.score.total_score, 5);
    }

    #[test]
    fn load_directory_skips_other_files() {
        let bank = bank();
        let dir = tempfile::tempdir().unwrap();
        attempt(&bank, &[Category::WhsSafety], &["whs_1"])
            .save_json(&dir.path().join("a.json"))
            .unwrap();
        attempt(&bank, &[Category::TaxGst], &[])
            .save_json(&dir.path().join("b.json"))
            .unwrap();
        std::fs::write(dir.path().join("c.json"), "{ not a report").unwrap();
        std::fs::write(dir.path().join("notes.md"), "# notes").unwrap();

        let reports = AttemptReport::load_directory(dir.path()).unwrap();
        assert_eq!(reports.len(), 2);
    }

    #[test]
    fn markdown_output() {
        let bank = bank();
        let both = [Category::WhsSafety, Category::TaxGst];
        let baseline = attempt(&bank, &both, &["whs_1", "whs_2"]);
        let current = attempt(&bank, &both, &["tax_1"]);

        let md = current.compare(&baseline, 5.0).to_markdown();
        assert!(md.contains("Regressions"));
        assert!(md.contains("Improvements"));
        assert!(md.contains("WHS Safety"));
        assert!(md.contains("Tax & GST"));
    }
}
