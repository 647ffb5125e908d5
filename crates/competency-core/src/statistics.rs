//! Aggregate statistics across many graded attempts.
//!
//! Category pass rates show where a cohort is weak; question facility
//! (the share of candidates who answered an item correctly) flags items
//! that are too hard or badly worded.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::model::Category;
use crate::report::AttemptReport;

/// Statistics for one category across all attempts that included it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: Category,
    /// Attempts that scored this category.
    pub attempts: usize,
    pub avg_percentage: f64,
    /// Fraction of those attempts that met the threshold.
    pub pass_rate: f64,
}

/// Statistics for one question across all attempts that administered it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionStats {
    pub question_id: String,
    pub category: Category,
    pub administered: usize,
    pub correct: usize,
    /// Times left unanswered.
    pub unanswered: usize,
    /// `correct / administered`.
    pub facility: f64,
}

/// Aggregate statistics for a set of attempts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CohortStats {
    pub attempts: usize,
    /// Fraction of attempts that met their completion threshold.
    pub completion_rate: f64,
    pub avg_percentage: f64,
    pub per_category: BTreeMap<Category, CategoryStats>,
    pub per_question: BTreeMap<String, QuestionStats>,
}

impl CohortStats {
    /// The `n` questions with the lowest facility, hardest first.
    pub fn hardest_questions(&self, n: usize) -> Vec<&QuestionStats> {
        let mut items: Vec<_> = self.per_question.values().collect();
        items.sort_by(|a, b| {
            a.facility
                .total_cmp(&b.facility)
                .then_with(|| a.question_id.cmp(&b.question_id))
        });
        items.truncate(n);
        items
    }
}

/// Compute cohort statistics from graded attempts.
pub fn compute_cohort_stats(reports: &[AttemptReport]) -> CohortStats {
    let attempts = reports.len();
    let n = attempts.max(1) as f64;

    let completion_rate = reports.iter().filter(|r| r.completed).count() as f64 / n;
    let avg_percentage = reports.iter().map(|r| r.score.percentage).sum::<f64>() / n;

    // (attempts, percentage sum, passes)
    let mut categories: BTreeMap<Category, (usize, f64, usize)> = BTreeMap::new();
    for r in reports {
        for (category, score) in &r.score.category_scores {
            let entry = categories.entry(*category).or_insert((0, 0.0, 0));
            entry.0 += 1;
            entry.1 += score.percentage;
            if score.passed {
                entry.2 += 1;
            }
        }
    }

    let per_category = categories
        .into_iter()
        .map(|(category, (count, sum, passes))| {
            (
                category,
                CategoryStats {
                    category,
                    attempts: count,
                    avg_percentage: sum / count as f64,
                    pass_rate: passes as f64 / count as f64,
                },
            )
        })
        .collect();

    let mut questions: HashMap<&str, QuestionStats> = HashMap::new();
    for r in reports {
        for o in &r.score.outcomes {
            let entry = questions
                .entry(o.question_id.as_str())
                .or_insert_with(|| QuestionStats {
                    question_id: o.question_id.clone(),
                    category: o.category,
                    administered: 0,
                    correct: 0,
                    unanswered: 0,
                    facility: 0.0,
                });
            entry.administered += 1;
            if o.correct {
                entry.correct += 1;
            }
            if !o.answered {
                entry.unanswered += 1;
            }
        }
    }

    let per_question = questions
        .into_values()
        .map(|mut q| {
            q.facility = q.correct as f64 / q.administered as f64;
            (q.question_id.clone(), q)
        })
        .collect();

    CohortStats {
        attempts,
        completion_rate,
        avg_percentage,
        per_category,
        per_question,
    }
}
