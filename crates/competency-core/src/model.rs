//! Core data model types for competency assessments.
//!
//! Questions, answers, and pass thresholds. Everything here is plain owned
//! data; banks and thresholds are built once and then only read.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::BankError;

/// Competency domain a question belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    AustralianConsumerLaw,
    ContractorBusinessLaw,
    InsuranceLiability,
    TaxGst,
    IndustryStandards,
    WhsSafety,
    SpecialLicenses,
    EthicalConduct,
    TechnicalKnowledge,
    Documentation,
}

impl Category {
    /// Every category, in display order.
    pub const ALL: [Category; 10] = [
        Category::AustralianConsumerLaw,
        Category::ContractorBusinessLaw,
        Category::InsuranceLiability,
        Category::TaxGst,
        Category::IndustryStandards,
        Category::WhsSafety,
        Category::SpecialLicenses,
        Category::EthicalConduct,
        Category::TechnicalKnowledge,
        Category::Documentation,
    ];

    /// Canonical wire name (e.g. `WHS_SAFETY`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::AustralianConsumerLaw => "AUSTRALIAN_CONSUMER_LAW",
            Category::ContractorBusinessLaw => "CONTRACTOR_BUSINESS_LAW",
            Category::InsuranceLiability => "INSURANCE_LIABILITY",
            Category::TaxGst => "TAX_GST",
            Category::IndustryStandards => "INDUSTRY_STANDARDS",
            Category::WhsSafety => "WHS_SAFETY",
            Category::SpecialLicenses => "SPECIAL_LICENSES",
            Category::EthicalConduct => "ETHICAL_CONDUCT",
            Category::TechnicalKnowledge => "TECHNICAL_KNOWLEDGE",
            Category::Documentation => "DOCUMENTATION",
        }
    }

    /// Human-readable label.
    pub fn label(&self) -> &'static str {
        match self {
            Category::AustralianConsumerLaw => "Australian Consumer Law",
            Category::ContractorBusinessLaw => "Contractor Business Law",
            Category::InsuranceLiability => "Insurance & Liability",
            Category::TaxGst => "Tax & GST",
            Category::IndustryStandards => "Industry Standards",
            Category::WhsSafety => "WHS Safety",
            Category::SpecialLicenses => "Special Licenses",
            Category::EthicalConduct => "Ethical Conduct",
            Category::TechnicalKnowledge => "Technical Knowledge",
            Category::Documentation => "Documentation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "AUSTRALIAN_CONSUMER_LAW" | "ACL" => Ok(Category::AustralianConsumerLaw),
            "CONTRACTOR_BUSINESS_LAW" | "CBL" => Ok(Category::ContractorBusinessLaw),
            "INSURANCE_LIABILITY" | "INS" => Ok(Category::InsuranceLiability),
            "TAX_GST" | "TAX" | "GST" => Ok(Category::TaxGst),
            "INDUSTRY_STANDARDS" | "IND" => Ok(Category::IndustryStandards),
            "WHS_SAFETY" | "WHS" => Ok(Category::WhsSafety),
            "SPECIAL_LICENSES" | "LIC" => Ok(Category::SpecialLicenses),
            "ETHICAL_CONDUCT" | "ETH" => Ok(Category::EthicalConduct),
            "TECHNICAL_KNOWLEDGE" | "TECH" => Ok(Category::TechnicalKnowledge),
            "DOCUMENTATION" | "DOC" => Ok(Category::Documentation),
            _ => Err(format!("unknown category: {s}")),
        }
    }
}

/// Question difficulty. Only used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Difficulty {
    Basic,
    Intermediate,
    Advanced,
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Difficulty::Basic => write!(f, "BASIC"),
            Difficulty::Intermediate => write!(f, "INTERMEDIATE"),
            Difficulty::Advanced => write!(f, "ADVANCED"),
        }
    }
}

impl FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "basic" => Ok(Difficulty::Basic),
            "intermediate" => Ok(Difficulty::Intermediate),
            "advanced" => Ok(Difficulty::Advanced),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// How a question is presented to the learner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    Scenario,
    Calculation,
    Written,
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionType::MultipleChoice => write!(f, "MULTIPLE_CHOICE"),
            QuestionType::TrueFalse => write!(f, "TRUE_FALSE"),
            QuestionType::Scenario => write!(f, "SCENARIO"),
            QuestionType::Calculation => write!(f, "CALCULATION"),
            QuestionType::Written => write!(f, "WRITTEN"),
        }
    }
}

impl FromStr for QuestionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "MULTIPLE_CHOICE" | "MC" => Ok(QuestionType::MultipleChoice),
            "TRUE_FALSE" | "TF" => Ok(QuestionType::TrueFalse),
            "SCENARIO" => Ok(QuestionType::Scenario),
            "CALCULATION" => Ok(QuestionType::Calculation),
            "WRITTEN" => Ok(QuestionType::Written),
            _ => Err(format!("unknown question type: {s}")),
        }
    }
}

/// The accepted answer(s) for a question.
///
/// Comparison is on the raw stored strings: no trimming, no case folding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CorrectAnswer {
    /// Exactly one accepted string.
    Single(String),
    /// Any member of the set is accepted.
    AnyOf(BTreeSet<String>),
}

impl CorrectAnswer {
    /// Whether a submitted answer is correct.
    pub fn accepts(&self, answer: &Answer) -> bool {
        let Answer::Text(text) = answer else {
            // A list can never equal a string or be a member of a string set.
            return false;
        };
        match self {
            CorrectAnswer::Single(expected) => expected == text,
            CorrectAnswer::AnyOf(accepted) => accepted.contains(text),
        }
    }

    /// All accepted strings, in sorted order for `AnyOf`.
    pub fn accepted(&self) -> Vec<&str> {
        match self {
            CorrectAnswer::Single(s) => vec![s.as_str()],
            CorrectAnswer::AnyOf(set) => set.iter().map(String::as_str).collect(),
        }
    }
}

impl From<&str> for CorrectAnswer {
    fn from(s: &str) -> Self {
        CorrectAnswer::Single(s.to_string())
    }
}

/// A learner's submitted answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Text(String),
    Multiple(Vec<String>),
}

impl From<&str> for Answer {
    fn from(s: &str) -> Self {
        Answer::Text(s.to_string())
    }
}

/// Submitted answers keyed by question id.
pub type AnswerSheet = std::collections::HashMap<String, Answer>;

/// A single competency question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier (e.g. "whs_001").
    pub id: String,
    /// Domain this question scores towards.
    pub category: Category,
    /// Descriptive sub-topic.
    #[serde(default)]
    pub subcategory: String,
    /// The question text.
    pub prompt: String,
    pub question_type: QuestionType,
    /// Choices, for multiple-choice questions.
    #[serde(default)]
    pub options: Vec<String>,
    pub correct_answer: CorrectAnswer,
    #[serde(default)]
    pub explanation: String,
    /// Source legislation or standard.
    #[serde(default)]
    pub reference: String,
    pub difficulty: Difficulty,
    /// Weight contributed to the score. Always > 0 in a built bank.
    pub points: u32,
    /// Advisory time limit; not enforced by the scorer.
    #[serde(default)]
    pub time_limit_secs: u32,
}

impl Question {
    /// Whether `answer` earns this question's points.
    pub fn is_correct(&self, answer: Option<&Answer>) -> bool {
        answer.is_some_and(|a| self.correct_answer.accepts(a))
    }
}

/// Minimum percentage per category needed to pass it.
///
/// Always covers every [`Category`], so lookups cannot miss.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<Category, f64>", into = "BTreeMap<Category, f64>")]
pub struct PassThresholds {
    entries: BTreeMap<Category, f64>,
}

impl PassThresholds {
    /// The standard threshold table.
    pub fn standard() -> Self {
        let entries = [
            (Category::AustralianConsumerLaw, 80.0),
            (Category::ContractorBusinessLaw, 75.0),
            (Category::InsuranceLiability, 80.0),
            (Category::TaxGst, 75.0),
            (Category::IndustryStandards, 85.0),
            (Category::WhsSafety, 90.0),
            (Category::SpecialLicenses, 85.0),
            (Category::EthicalConduct, 85.0),
            (Category::TechnicalKnowledge, 80.0),
            (Category::Documentation, 75.0),
        ]
        .into_iter()
        .collect();
        Self { entries }
    }

    /// Build a table from explicit entries, which must cover every category.
    pub fn from_entries(
        entries: impl IntoIterator<Item = (Category, f64)>,
    ) -> Result<Self, BankError> {
        let mut map = BTreeMap::new();
        for (category, value) in entries {
            check_range(category, value)?;
            map.insert(category, value);
        }
        if let Some(missing) = Category::ALL.iter().find(|c| !map.contains_key(c)) {
            return Err(BankError::MissingThreshold(*missing));
        }
        Ok(Self { entries: map })
    }

    /// Replace the threshold for one category.
    pub fn with_override(mut self, category: Category, value: f64) -> Result<Self, BankError> {
        check_range(category, value)?;
        self.entries.insert(category, value);
        Ok(self)
    }

    /// Threshold for `category`.
    pub fn get(&self, category: Category) -> f64 {
        // Construction guarantees coverage, so the fallback is unreachable.
        self.entries.get(&category).copied().unwrap_or(100.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Category, f64)> + '_ {
        self.entries.iter().map(|(c, v)| (*c, *v))
    }
}

impl Default for PassThresholds {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<BTreeMap<Category, f64>> for PassThresholds {
    type Error = BankError;

    fn try_from(map: BTreeMap<Category, f64>) -> Result<Self, Self::Error> {
        Self::from_entries(map)
    }
}

impl From<PassThresholds> for BTreeMap<Category, f64> {
    fn from(t: PassThresholds) -> Self {
        t.entries
    }
}

fn check_range(category: Category, value: f64) -> Result<(), BankError> {
    if (0.0..=100.0).contains(&value) {
        Ok(())
    } else {
        Err(BankError::InvalidThreshold { category, value })
    }
}
