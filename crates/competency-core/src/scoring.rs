//! Grading of completed test instances.
//!
//! [`calculate_test_score`] is pure and total: missing answers count as
//! wrong, answers for questions that were not administered are ignored, and
//! every category is compared against a threshold that is guaranteed to
//! exist.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::{AnswerSheet, Category, PassThresholds, Question};

/// Per-category totals and pass/fail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    /// Points earned.
    pub score: u32,
    /// Points available. Always > 0 for questions from a bank or a loaded test.
    pub possible: u32,
    /// `score / possible * 100`, unrounded.
    pub percentage: f64,
    /// Threshold this category was graded against.
    pub threshold: f64,
    pub passed: bool,
}

/// How a single question was graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionOutcome {
    pub question_id: String,
    pub category: Category,
    pub points_possible: u32,
    pub points_awarded: u32,
    /// Whether any answer was submitted.
    pub answered: bool,
    pub correct: bool,
}

/// Result of grading one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub total_score: u32,
    pub possible_score: u32,
    /// `total_score / possible_score * 100`; 0.0 for an empty test.
    pub percentage: f64,
    pub category_scores: BTreeMap<Category, CategoryScore>,
    /// One entry per administered question, in administration order.
    #[serde(default)]
    pub outcomes: Vec<QuestionOutcome>,
}

impl ScoreResult {
    /// True when every scored category met its threshold.
    pub fn all_categories_passed(&self) -> bool {
        self.category_scores.values().all(|c| c.passed)
    }

    /// Categories below their threshold, in category order.
    pub fn failed_categories(&self) -> Vec<Category> {
        self.category_scores
            .iter()
            .filter(|(_, s)| !s.passed)
            .map(|(c, _)| *c)
            .collect()
    }

    /// Number of questions answered correctly.
    pub fn correct_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.correct).count()
    }
}

/// Grade `questions` against `answers`.
pub fn calculate_test_score(
    answers: &AnswerSheet,
    questions: &[Question],
    thresholds: &PassThresholds,
) -> ScoreResult {
    let mut total_score = 0u32;
    let mut possible_score = 0u32;
    // (score, possible)
    let mut per_category: BTreeMap<Category, (u32, u32)> = BTreeMap::new();
    let mut outcomes = Vec::with_capacity(questions.len());

    for question in questions {
        let answer = answers.get(&question.id);
        let correct = question.is_correct(answer);

        possible_score = possible_score.saturating_add(question.points);
        let entry = per_category.entry(question.category).or_insert((0, 0));
        entry.1 = entry.1.saturating_add(question.points);

        let awarded = if correct { question.points } else { 0 };
        total_score = total_score.saturating_add(awarded);
        entry.0 = entry.0.saturating_add(awarded);

        outcomes.push(QuestionOutcome {
            question_id: question.id.clone(),
            category: question.category,
            points_possible: question.points,
            points_awarded: awarded,
            answered: answer.is_some(),
            correct,
        });
    }

    let category_scores = per_category
        .into_iter()
        .map(|(category, (score, possible))| {
            let percentage = percent(score, possible);
            let threshold = thresholds.get(category);
            (
                category,
                CategoryScore {
                    score,
                    possible,
                    percentage,
                    threshold,
                    passed: percentage >= threshold,
                },
            )
        })
        .collect();

    let result = ScoreResult {
        total_score,
        possible_score,
        percentage: percent(total_score, possible_score),
        category_scores,
        outcomes,
    };

    tracing::debug!(
        "scored {}/{} ({:.1}%) across {} categories",
        result.total_score,
        result.possible_score,
        result.percentage,
        result.category_scores.len()
    );

    result
}

fn percent(score: u32, possible: u32) -> f64 {
    if possible == 0 {
        0.0
    } else {
        score as f64 / possible as f64 * 100.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bank::tests::question;
    use crate::model::{Answer, CorrectAnswer};

    fn whs_questions() -> Vec<Question> {
        vec![
            question("whs_001", Category::WhsSafety, 5, "2003"),
            question("whs_002", Category::WhsSafety, 5, "2 metres"),
            question("whs_003", Category::WhsSafety, 7, "Immediately after securing the scene"),
        ]
    }

    fn sheet(entries: &[(&str, &str)]) -> AnswerSheet {
        entries
            .iter()
            .map(|(id, a)| (id.to_string(), Answer::from(*a)))
            .collect()
    }

    #[test]
    fn all_correct_passes() {
        let answers = sheet(&[
            ("whs_001", "2003"),
            ("whs_002", "2 metres"),
            ("whs_003", "Immediately after securing the scene"),
        ]);
        let result = calculate_test_score(&answers, &whs_questions(), &PassThresholds::standard());

        let whs = &result.category_scores[&Category::WhsSafety];
        assert_eq!((whs.score, whs.possible), (17, 17));
        assert_eq!(whs.percentage, 100.0);
        assert_eq!(whs.threshold, 90.0);
        assert!(whs.passed);
        assert_eq!(result.percentage, 100.0);
        assert!(result.all_categories_passed());
    }

    #[test]
    fn only_heaviest_correct_fails() {
        let answers = sheet(&[
            ("whs_001", "1995"),
            ("whs_002", "3 metres"),
            ("whs_003", "Immediately after securing the scene"),
        ]);
        let result = calculate_test_score(&answers, &whs_questions(), &PassThresholds::standard());

        let whs = &result.category_scores[&Category::WhsSafety];
        assert_eq!((whs.score, whs.possible), (7, 17));
        assert!((whs.percentage - 41.176).abs() < 0.01);
        assert!(!whs.passed);
        assert_eq!(result.failed_categories(), vec![Category::WhsSafety]);
    }

    #[test]
    fn empty_answers_score_zero() {
        let result = calculate_test_score(
            &AnswerSheet::new(),
            &whs_questions(),
            &PassThresholds::standard(),
        );
        assert_eq!(result.total_score, 0);
        assert_eq!(result.possible_score, 17);
        assert_eq!(result.percentage, 0.0);
        assert!(result.outcomes.iter().all(|o| !o.answered && !o.correct));
    }

    #[test]
    fn possible_score_ignores_answers() {
        let questions = whs_questions();
        let expected: u32 = questions.iter().map(|q| q.points).sum();
        for answers in [
            AnswerSheet::new(),
            sheet(&[("whs_001", "2003")]),
            sheet(&[("whs_001", "wrong"), ("whs_002", "2 metres")]),
        ] {
            let result = calculate_test_score(&answers, &questions, &PassThresholds::standard());
            assert_eq!(result.possible_score, expected);
            assert!(result.total_score <= result.possible_score);
        }
    }

    #[test]
    fn unknown_answer_ids_are_ignored() {
        let answers = sheet(&[("whs_001", "2003"), ("not_administered", "anything")]);
        let result = calculate_test_score(&answers, &whs_questions(), &PassThresholds::standard());
        assert_eq!(result.total_score, 5);
        assert_eq!(result.outcomes.len(), 3);
    }

    #[test]
    fn tie_at_threshold_passes() {
        // 3 of 4 equal-weight questions = exactly 75%.
        let questions: Vec<_> = (0..4)
            .map(|i| question(&format!("doc_{i}"), Category::Documentation, 5, "TRUE"))
            .collect();
        let answers = sheet(&[("doc_0", "TRUE"), ("doc_1", "TRUE"), ("doc_2", "TRUE")]);
        let result = calculate_test_score(&answers, &questions, &PassThresholds::standard());
        let doc = &result.category_scores[&Category::Documentation];
        assert_eq!(doc.percentage, 75.0);
        assert_eq!(doc.threshold, 75.0);
        assert!(doc.passed);
    }

    #[test]
    fn any_of_answers_use_membership() {
        let mut q = question("tax_001", Category::TaxGst, 5, "$750");
        q.correct_answer = CorrectAnswer::AnyOf(["$750".to_string(), "750".to_string()].into());
        let result = calculate_test_score(
            &sheet(&[("tax_001", "750")]),
            &[q],
            &PassThresholds::standard(),
        );
        assert_eq!(result.total_score, 5);
    }

    #[test]
    fn list_submissions_are_wrong() {
        let mut answers = AnswerSheet::new();
        answers.insert("whs_001".into(), Answer::Multiple(vec!["2003".into()]));
        let result = calculate_test_score(&answers, &whs_questions(), &PassThresholds::standard());
        assert_eq!(result.total_score, 0);
        assert!(result.outcomes[0].answered);
        assert!(!result.outcomes[0].correct);
    }

    #[test]
    fn categories_scored_independently() {
        let mut questions = whs_questions();
        questions.push(question("tax_001", Category::TaxGst, 5, "$750"));
        let answers = sheet(&[("tax_001", "$750")]);
        let result = calculate_test_score(&answers, &questions, &PassThresholds::standard());

        assert_eq!(result.category_scores.len(), 2);
        assert!(result.category_scores[&Category::TaxGst].passed);
        assert!(!result.category_scores[&Category::WhsSafety].passed);
        assert!((result.percentage - 5.0 / 22.0 * 100.0).abs() < 1e-9);
        assert!(!result.category_scores.contains_key(&Category::Documentation));
    }

    #[test]
    fn custom_thresholds_are_respected() {
        let thresholds = PassThresholds::standard()
            .with_override(Category::WhsSafety, 40.0)
            .unwrap();
        let answers = sheet(&[("whs_003", "Immediately after securing the scene")]);
        let result = calculate_test_score(&answers, &whs_questions(), &thresholds);
        assert!(result.category_scores[&Category::WhsSafety].passed);
    }

    #[test]
    fn empty_test_is_zero_percent() {
        let result = calculate_test_score(&AnswerSheet::new(), &[], &PassThresholds::standard());
        assert_eq!(result.possible_score, 0);
        assert_eq!(result.percentage, 0.0);
        assert!(result.category_scores.is_empty());
        assert!(result.all_categories_passed());
    }

    #[test]
    fn score_result_serializes_category_keys() {
        let result = calculate_test_score(
            &sheet(&[("whs_001", "2003")]),
            &whs_questions(),
            &PassThresholds::standard(),
        );
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"WHS_SAFETY\""));
        let back: ScoreResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.total_score, 5);
        assert_eq!(back.outcomes, result.outcomes);
        assert!((back.percentage - result.percentage).abs() < 1e-9);
        assert!(back.category_scores.contains_key(&Category::WhsSafety));
    }
}
