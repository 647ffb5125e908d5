//! TOML question bank parser.
//!
//! Loads bank definitions from TOML files and directories, and validates
//! them for content problems that do not prevent scoring.

use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::bank::{BankDefinition, CompetencyBank};
use crate::model::{Category, CorrectAnswer, Difficulty, Question, QuestionType};
use crate::selector::DEFAULT_QUESTIONS_PER_CATEGORY;

/// Intermediate TOML structure for parsing bank files.
#[derive(Debug, Deserialize)]
struct TomlBankFile {
    bank: TomlBankHeader,
    #[serde(default)]
    thresholds: BTreeMap<String, f64>,
    #[serde(default)]
    questions: Vec<TomlQuestion>,
}

#[derive(Debug, Deserialize)]
struct TomlBankHeader {
    id: String,
    name: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct TomlQuestion {
    id: String,
    category: String,
    #[serde(default)]
    subcategory: String,
    prompt: String,
    question_type: String,
    #[serde(default)]
    options: Vec<String>,
    correct_answer: CorrectAnswer,
    #[serde(default)]
    explanation: String,
    #[serde(default)]
    reference: String,
    #[serde(default = "default_difficulty")]
    difficulty: String,
    points: u32,
    #[serde(default = "default_time_limit")]
    time_limit_secs: u32,
}

fn default_difficulty() -> String {
    "basic".to_string()
}

fn default_time_limit() -> u32 {
    60
}

/// Parse a single TOML file into a `BankDefinition`.
pub fn parse_bank(path: &Path) -> Result<BankDefinition> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read bank file: {}", path.display()))?;

    parse_bank_str(&content, path)
}

/// Parse a TOML string into a `BankDefinition` (useful for testing).
pub fn parse_bank_str(content: &str, source_path: &Path) -> Result<BankDefinition> {
    let parsed: TomlBankFile = toml::from_str(content)
        .with_context(|| format!("failed to parse TOML: {}", source_path.display()))?;

    let threshold_overrides = parsed
        .thresholds
        .into_iter()
        .map(|(name, value)| {
            let category: Category = name.parse().map_err(|e: String| anyhow::anyhow!("{}", e))?;
            Ok((category, value))
        })
        .collect::<Result<BTreeMap<_, _>>>()?;

    let questions = parsed
        .questions
        .into_iter()
        .map(|q| {
            let category: Category = q
                .category
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;
            let question_type: QuestionType = q
                .question_type
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;
            let difficulty: Difficulty = q
                .difficulty
                .parse()
                .map_err(|e: String| anyhow::anyhow!("question {}: {}", q.id, e))?;

            Ok(Question {
                id: q.id,
                category,
                subcategory: q.subcategory,
                prompt: q.prompt,
                question_type,
                options: q.options,
                correct_answer: q.correct_answer,
                explanation: q.explanation,
                reference: q.reference,
                difficulty,
                points: q.points,
                time_limit_secs: q.time_limit_secs,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(BankDefinition {
        id: parsed.bank.id,
        name: parsed.bank.name,
        description: parsed.bank.description,
        threshold_overrides,
        questions,
    })
}

/// A bank file that could not be parsed.
#[derive(Debug)]
pub struct LoadFailure {
    pub path: PathBuf,
    pub error: anyhow::Error,
}

/// Recursively load all `.toml` bank files from a directory.
///
/// Files that fail to parse are skipped with a warning. Use
/// [`scan_bank_directory`] to see them instead.
pub fn load_bank_directory(dir: &Path) -> Result<Vec<BankDefinition>> {
    let (banks, failures) = scan_bank_directory(dir)?;
    for f in &failures {
        tracing::warn!("skipping {}: {:#}", f.path.display(), f.error);
    }
    Ok(banks)
}

/// Recursively parse all `.toml` bank files from a directory, returning the
/// parsed banks alongside the files that failed.
pub fn scan_bank_directory(dir: &Path) -> Result<(Vec<BankDefinition>, Vec<LoadFailure>)> {
    let mut banks = Vec::new();
    let mut failures = Vec::new();
    scan_into(dir, &mut banks, &mut failures)?;
    Ok((banks, failures))
}

fn scan_into(
    dir: &Path,
    banks: &mut Vec<BankDefinition>,
    failures: &mut Vec<LoadFailure>,
) -> Result<()> {
    if !dir.is_dir() {
        anyhow::bail!("not a directory: {}", dir.display());
    }

    let mut entries = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read directory: {}", dir.display()))?
        .collect::<std::io::Result<Vec<_>>>()?;
    // Merge order decides threshold conflicts, so keep it stable.
    entries.sort_by_key(|e| e.path());

    for entry in entries {
        let path = entry.path();

        if path.is_dir() {
            scan_into(&path, banks, failures)?;
        } else if path.extension().is_some_and(|ext| ext == "toml") {
            match parse_bank(&path) {
                Ok(bank) => banks.push(bank),
                Err(error) => failures.push(LoadFailure { path, error }),
            }
        }
    }

    Ok(())
}

/// Load a bank file or directory into one validated bank.
pub fn load_bank(path: &Path) -> Result<CompetencyBank> {
    let definitions = load_definitions(path)?;
    if definitions.is_empty() {
        anyhow::bail!("no question banks found in {}", path.display());
    }

    let bank = CompetencyBank::merge(definitions)
        .with_context(|| format!("invalid question bank: {}", path.display()))?;

    tracing::info!(
        "loaded bank '{}' with {} questions across {} categories",
        bank.name(),
        bank.questions().len(),
        bank.categories().len()
    );

    Ok(bank)
}

/// Parse a bank file, or every bank file under a directory.
pub fn load_definitions(path: &Path) -> Result<Vec<BankDefinition>> {
    if path.is_dir() {
        load_bank_directory(path)
    } else {
        Ok(vec![parse_bank(path)?])
    }
}

/// Like [`load_definitions`], but a directory file that fails to parse is
/// reported back rather than skipped.
pub fn scan_definitions(path: &Path) -> Result<(Vec<BankDefinition>, Vec<LoadFailure>)> {
    if path.is_dir() {
        scan_bank_directory(path)
    } else {
        Ok((vec![parse_bank(path)?], Vec::new()))
    }
}

/// A warning from bank validation.
#[derive(Debug, Clone)]
pub struct ValidationWarning {
    /// The question ID (if applicable).
    pub question_id: Option<String>,
    /// Warning message.
    pub message: String,
}

impl ValidationWarning {
    fn question(id: &str, message: impl Into<String>) -> Self {
        Self {
            question_id: Some(id.to_string()),
            message: message.into(),
        }
    }
}

/// Validate a bank definition for common issues.
pub fn validate_bank(bank: &BankDefinition) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    // Check for duplicate question IDs
    let mut seen_ids = HashSet::new();
    for q in &bank.questions {
        if !seen_ids.insert(&q.id) {
            warnings.push(ValidationWarning::question(
                &q.id,
                format!("duplicate question ID: {}", q.id),
            ));
        }
    }

    for q in &bank.questions {
        if q.points == 0 {
            warnings.push(ValidationWarning::question(&q.id, "points must be greater than zero"));
        }

        if q.prompt.trim().is_empty() {
            warnings.push(ValidationWarning::question(&q.id, "prompt is empty"));
        }

        match q.question_type {
            QuestionType::MultipleChoice => {
                if q.options.is_empty() {
                    warnings.push(ValidationWarning::question(
                        &q.id,
                        "multiple-choice question has no options",
                    ));
                } else if let Some(missing) = q
                    .correct_answer
                    .accepted()
                    .into_iter()
                    .find(|a| !q.options.iter().any(|o| o.as_str() == *a))
                {
                    warnings.push(ValidationWarning::question(
                        &q.id,
                        format!("correct answer '{missing}' is not one of the options"),
                    ));
                }
            }
            other => {
                if !q.options.is_empty() {
                    warnings.push(ValidationWarning::question(
                        &q.id,
                        format!("options are ignored for {other} questions"),
                    ));
                }
            }
        }

        if q.question_type == QuestionType::Written
            && matches!(q.correct_answer, CorrectAnswer::Single(_))
        {
            warnings.push(ValidationWarning::question(
                &q.id,
                "written answer is graded by exact string match",
            ));
        }
    }

    for (category, value) in &bank.threshold_overrides {
        if !(0.0..=100.0).contains(value) {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!("threshold for {category} is out of range: {value}"),
            });
        }
    }

    // Categories too small to fill a default-sized test
    let mut counts: BTreeMap<Category, usize> = BTreeMap::new();
    for q in &bank.questions {
        *counts.entry(q.category).or_insert(0) += 1;
    }
    for (category, count) in counts {
        if count < DEFAULT_QUESTIONS_PER_CATEGORY {
            warnings.push(ValidationWarning {
                question_id: None,
                message: format!(
                    "{category} has {count} question(s); tests will draw fewer than {DEFAULT_QUESTIONS_PER_CATEGORY}"
                ),
            });
        }
    }

    warnings
}
