//! The read-only question bank.
//!
//! A [`CompetencyBank`] is constructed once from parsed definitions and then
//! handed to the selector and scorer by reference. It is never mutated.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::BankError;
use crate::model::{Category, PassThresholds, Question};

/// A bank as parsed from a single file, before validation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BankDefinition {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Per-category overrides of the standard pass thresholds.
    #[serde(default)]
    pub threshold_overrides: BTreeMap<Category, f64>,
    #[serde(default)]
    pub questions: Vec<Question>,
}

/// Summary of a bank (without the question bodies).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BankSummary {
    pub id: String,
    pub name: String,
    pub question_count: usize,
}

/// Reject duplicate ids and zero-point questions.
pub(crate) fn check_questions(questions: &[Question]) -> Result<(), BankError> {
    let mut seen = HashSet::new();
    for q in questions {
        if !seen.insert(q.id.as_str()) {
            return Err(BankError::DuplicateQuestion(q.id.clone()));
        }
        if q.points == 0 {
            return Err(BankError::ZeroPoints(q.id.clone()));
        }
    }
    Ok(())
}

/// Validated, immutable collection of questions plus pass thresholds.
#[derive(Debug, Clone)]
pub struct CompetencyBank {
    id: String,
    name: String,
    questions: Vec<Question>,
    thresholds: PassThresholds,
}

impl CompetencyBank {
    /// Build a bank, rejecting duplicate ids and zero-point questions.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        questions: Vec<Question>,
        thresholds: PassThresholds,
    ) -> Result<Self, BankError> {
        check_questions(&questions)?;

        Ok(Self {
            id: id.into(),
            name: name.into(),
            questions,
            thresholds,
        })
    }

    /// Build a bank from a single parsed definition.
    pub fn from_definition(def: BankDefinition) -> Result<Self, BankError> {
        let mut thresholds = PassThresholds::standard();
        for (category, value) in def.threshold_overrides {
            thresholds = thresholds.with_override(category, value)?;
        }
        Self::new(def.id, def.name, def.questions, thresholds)
    }

    /// Combine several definitions into one bank.
    ///
    /// Questions are concatenated in order. Threshold overrides are applied
    /// in order too; when two definitions disagree the later one wins.
    pub fn merge(definitions: Vec<BankDefinition>) -> Result<Self, BankError> {
        let definitions = match <[BankDefinition; 1]>::try_from(definitions) {
            Ok([def]) => return Self::from_definition(def),
            Err(definitions) => definitions,
        };

        let id = definitions
            .iter()
            .map(|d| d.id.as_str())
            .collect::<Vec<_>>()
            .join("+");
        let name = definitions
            .iter()
            .map(|d| d.name.as_str())
            .collect::<Vec<_>>()
            .join(" + ");

        let mut thresholds = PassThresholds::standard();
        let mut overridden: BTreeMap<Category, (f64, String)> = BTreeMap::new();
        let mut questions = Vec::new();

        for def in definitions {
            for (category, value) in def.threshold_overrides {
                if let Some((prev, prev_bank)) = overridden.get(&category) {
                    if *prev != value {
                        tracing::warn!(
                            "threshold for {} set to {} by '{}' overrides {} from '{}'",
                            category,
                            value,
                            def.id,
                            prev,
                            prev_bank
                        );
                    }
                }
                thresholds = thresholds.with_override(category, value)?;
                overridden.insert(category, (value, def.id.clone()));
            }
            questions.extend(def.questions);
        }

        Self::new(id, name, questions, thresholds)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// All questions, in bank order.
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Look up a question by id.
    pub fn get(&self, id: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.id == id)
    }

    pub fn thresholds(&self) -> &PassThresholds {
        &self.thresholds
    }

    /// Categories that have at least one question.
    pub fn categories(&self) -> BTreeSet<Category> {
        self.questions.iter().map(|q| q.category).collect()
    }

    /// Number of questions per category.
    pub fn category_counts(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for q in &self.questions {
            *counts.entry(q.category).or_insert(0) += 1;
        }
        counts
    }

    pub fn summary(&self) -> BankSummary {
        BankSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            question_count: self.questions.len(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::model::{CorrectAnswer, Difficulty, QuestionType};

    pub(crate) fn question(id: &str, category: Category, points: u32, answer: &str) -> Question {
        Question {
            id: id.into(),
            category,
            subcategory: String::new(),
            prompt: format!("Question {id}?"),
            question_type: QuestionType::TrueFalse,
            options: vec![],
            correct_answer: CorrectAnswer::from(answer),
            explanation: String::new(),
            reference: String::new(),
            difficulty: Difficulty::Basic,
            points,
            time_limit_secs: 45,
        }
    }

    fn definition(id: &str, questions: Vec<Question>) -> BankDefinition {
        BankDefinition {
            id: id.into(),
            name: id.to_uppercase(),
            description: String::new(),
            threshold_overrides: BTreeMap::new(),
            questions,
        }
    }

    #[test]
    fn rejects_duplicate_ids() {
        let err = CompetencyBank::new(
            "b",
            "B",
            vec![
                question("q1", Category::TaxGst, 5, "TRUE"),
                question("q1", Category::WhsSafety, 5, "TRUE"),
            ],
            PassThresholds::standard(),
        )
        .unwrap_err();
        assert_eq!(err, BankError::DuplicateQuestion("q1".into()));
    }

    #[test]
    fn rejects_zero_points() {
        let err = CompetencyBank::new(
            "b",
            "B",
            vec![question("q1", Category::TaxGst, 0, "TRUE")],
            PassThresholds::standard(),
        )
        .unwrap_err();
        assert_eq!(err, BankError::ZeroPoints("q1".into()));
    }

    #[test]
    fn lookup_and_categories() {
        let bank = CompetencyBank::new(
            "b",
            "B",
            vec![
                question("whs_1", Category::WhsSafety, 5, "TRUE"),
                question("tax_1", Category::TaxGst, 5, "TRUE"),
                question("whs_2", Category::WhsSafety, 7, "FALSE"),
            ],
            PassThresholds::standard(),
        )
        .unwrap();

        assert_eq!(bank.get("whs_2").map(|q| q.points), Some(7));
        assert!(bank.get("missing").is_none());
        assert_eq!(
            bank.categories().into_iter().collect::<Vec<_>>(),
            vec![Category::TaxGst, Category::WhsSafety]
        );
        assert_eq!(bank.category_counts()[&Category::WhsSafety], 2);
        assert_eq!(bank.summary().question_count, 3);
    }

    #[test]
    fn definition_overrides_apply() {
        let mut def = definition("b", vec![question("q1", Category::TaxGst, 5, "TRUE")]);
        def.threshold_overrides.insert(Category::TaxGst, 60.0);
        let bank = CompetencyBank::from_definition(def).unwrap();
        assert_eq!(bank.thresholds().get(Category::TaxGst), 60.0);
        assert_eq!(bank.thresholds().get(Category::WhsSafety), 90.0);
    }

    #[test]
    fn definition_with_invalid_override_fails() {
        let mut def = definition("b", vec![]);
        def.threshold_overrides.insert(Category::TaxGst, -1.0);
        assert!(matches!(
            CompetencyBank::from_definition(def),
            Err(BankError::InvalidThreshold { .. })
        ));
    }

    #[test]
    fn merge_concatenates_and_later_override_wins() {
        let mut a = definition("a", vec![question("a1", Category::TaxGst, 5, "TRUE")]);
        a.threshold_overrides.insert(Category::TaxGst, 60.0);
        let mut b = definition("b", vec![question("b1", Category::WhsSafety, 5, "TRUE")]);
        b.threshold_overrides.insert(Category::TaxGst, 70.0);

        let bank = CompetencyBank::merge(vec![a, b]).unwrap();
        assert_eq!(bank.id(), "a+b");
        assert_eq!(bank.questions().len(), 2);
        assert_eq!(bank.thresholds().get(Category::TaxGst), 70.0);
    }

    #[test]
    fn merge_detects_duplicates_across_files() {
        let a = definition("a", vec![question("q", Category::TaxGst, 5, "TRUE")]);
        let b = definition("b", vec![question("q", Category::TaxGst, 5, "TRUE")]);
        assert_eq!(
            CompetencyBank::merge(vec![a, b]).unwrap_err(),
            BankError::DuplicateQuestion("q".into())
        );
    }
}
