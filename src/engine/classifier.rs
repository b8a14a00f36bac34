// src/engine/classifier.rs

use serde::{Deserialize, Serialize};

use crate::models::question::CognitiveLevel;

use super::QuestionBank;

/// Coarse difficulty of a question, derived from its cognitive level and
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DifficultyTier {
    Easy,
    Medium,
    Hard,
}

impl DifficultyTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyTier::Easy => "easy",
            DifficultyTier::Medium => "medium",
            DifficultyTier::Hard => "hard",
        }
    }
}

impl std::fmt::Display for DifficultyTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a cognitive level to its difficulty tier. The mapping is fixed and
/// total; a question's tier can only change by re-tagging the question.
pub fn classify(level: CognitiveLevel) -> DifficultyTier {
    match level {
        CognitiveLevel::Remember | CognitiveLevel::Understand => DifficultyTier::Easy,
        CognitiveLevel::Apply | CognitiveLevel::Analyze => DifficultyTier::Medium,
        CognitiveLevel::Evaluate | CognitiveLevel::Create => DifficultyTier::Hard,
    }
}

/// Counts over the current bank, recomputed from the classifier on every
/// call so they can never go stale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BankSummary {
    pub mcq_total: usize,
    pub open_total: usize,
    pub easy_mcqs: usize,
    pub medium_mcqs: usize,
    pub hard_mcqs: usize,
}

pub fn bank_summary(bank: &QuestionBank) -> BankSummary {
    let mut summary = BankSummary {
        mcq_total: bank.multiple_choice.len(),
        open_total: bank.open_ended.len(),
        easy_mcqs: 0,
        medium_mcqs: 0,
        hard_mcqs: 0,
    };
    for question in &bank.multiple_choice {
        match classify(question.cognitive_level) {
            DifficultyTier::Easy => summary.easy_mcqs += 1,
            DifficultyTier::Medium => summary.medium_mcqs += 1,
            DifficultyTier::Hard => summary.hard_mcqs += 1,
        }
    }
    summary
}
