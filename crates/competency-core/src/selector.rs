//! Test selection: filter the bank and assemble shuffled test instances.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::bank::{check_questions, BankSummary, CompetencyBank};
use crate::error::BankError;
use crate::model::{AnswerSheet, Category, Difficulty, PassThresholds, Question};
use crate::scoring::{calculate_test_score, ScoreResult};

/// Default number of questions drawn per category.
pub const DEFAULT_QUESTIONS_PER_CATEGORY: usize = 5;

/// One concrete, shuffled sequence of questions for a single attempt.
///
/// Carries a snapshot of the bank's thresholds so it can be graded later
/// without the bank at hand. Deserializing re-runs the bank's question
/// checks, so a saved instance cannot smuggle in zero-point or duplicate
/// questions.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawTestInstance")]
pub struct TestInstance {
    id: Uuid,
    created_at: DateTime<Utc>,
    bank: BankSummary,
    questions: Vec<Question>,
    thresholds: PassThresholds,
}

#[derive(Deserialize)]
struct RawTestInstance {
    id: Uuid,
    created_at: DateTime<Utc>,
    bank: BankSummary,
    questions: Vec<Question>,
    thresholds: PassThresholds,
}

impl TryFrom<RawTestInstance> for TestInstance {
    type Error = BankError;

    fn try_from(raw: RawTestInstance) -> Result<Self, Self::Error> {
        check_questions(&raw.questions)?;
        Ok(Self {
            id: raw.id,
            created_at: raw.created_at,
            bank: raw.bank,
            questions: raw.questions,
            thresholds: raw.thresholds,
        })
    }
}

impl TestInstance {
    fn new(bank: &CompetencyBank, questions: Vec<Question>) -> Self {
        Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            bank: bank.summary(),
            questions,
            thresholds: bank.thresholds().clone(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn bank_id(&self) -> &str {
        &self.bank.id
    }

    /// The bank this instance was drawn from.
    pub fn bank(&self) -> &BankSummary {
        &self.bank
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn thresholds(&self) -> &PassThresholds {
        &self.thresholds
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Sum of the advisory time limits, in seconds.
    pub fn total_time_limit_secs(&self) -> u64 {
        self.questions.iter().map(|q| q.time_limit_secs as u64).sum()
    }

    /// Grade this instance against submitted answers.
    pub fn score(&self, answers: &AnswerSheet) -> ScoreResult {
        calculate_test_score(answers, &self.questions, &self.thresholds)
    }
}

/// What to draw from the bank for one attempt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestSpec {
    pub categories: Vec<Category>,
    #[serde(default = "default_per_category")]
    pub questions_per_category: usize,
    /// Restrict the pool to one difficulty.
    #[serde(default)]
    pub difficulty: Option<Difficulty>,
}

fn default_per_category() -> usize {
    DEFAULT_QUESTIONS_PER_CATEGORY
}

impl TestSpec {
    pub fn new(categories: Vec<Category>) -> Self {
        Self {
            categories,
            questions_per_category: DEFAULT_QUESTIONS_PER_CATEGORY,
            difficulty: None,
        }
    }

    pub fn with_questions_per_category(mut self, n: usize) -> Self {
        self.questions_per_category = n;
        self
    }

    pub fn with_difficulty(mut self, difficulty: Option<Difficulty>) -> Self {
        self.difficulty = difficulty;
        self
    }
}

/// Questions in `category`, optionally restricted to `difficulty`, in bank order.
pub fn get_by_category(
    bank: &CompetencyBank,
    category: Category,
    difficulty: Option<Difficulty>,
) -> Vec<&Question> {
    bank.questions()
        .iter()
        .filter(|q| q.category == category && (difficulty.is_none() || difficulty == Some(q.difficulty)))
        .collect()
}

/// Assemble a randomized test using the thread-local RNG.
pub fn generate_random_test(
    bank: &CompetencyBank,
    categories: &[Category],
    questions_per_category: usize,
) -> TestInstance {
    generate_random_test_with_rng(bank, categories, questions_per_category, &mut rand::thread_rng())
}

/// Assemble a randomized test drawing from `rng`.
///
/// Each requested category contributes at most `questions_per_category`
/// questions, fewer if its pool is smaller. Repeated categories are drawn
/// once. The combined selection is shuffled again before returning.
pub fn generate_random_test_with_rng<R: Rng + ?Sized>(
    bank: &CompetencyBank,
    categories: &[Category],
    questions_per_category: usize,
    rng: &mut R,
) -> TestInstance {
    let spec =
        TestSpec::new(categories.to_vec()).with_questions_per_category(questions_per_category);
    generate_from_spec(bank, &spec, rng)
}

/// Assemble a randomized test from a [`TestSpec`].
pub fn generate_from_spec<R: Rng + ?Sized>(
    bank: &CompetencyBank,
    spec: &TestSpec,
    rng: &mut R,
) -> TestInstance {
    let mut seen = HashSet::new();
    let mut selected: Vec<Question> = Vec::new();

    for &category in &spec.categories {
        if !seen.insert(category) {
            continue;
        }

        let mut pool = get_by_category(bank, category, spec.difficulty);
        if pool.is_empty() {
            tracing::debug!("no questions available for {}", category);
            continue;
        }
        if pool.len() < spec.questions_per_category {
            tracing::debug!(
                "{} has {} questions, fewer than the {} requested",
                category,
                pool.len(),
                spec.questions_per_category
            );
        }

        pool.shuffle(rng);
        selected.extend(pool.into_iter().take(spec.questions_per_category).cloned());
    }

    selected.shuffle(rng);

    tracing::debug!(
        "assembled test with {} questions from {} categories",
        selected.len(),
        seen.len()
    );

    TestInstance::new(bank, selected)
}
