// src/engine/composer.rs

use rand::Rng;
use rand::seq::SliceRandom;
use thiserror::Error;

use crate::models::exam::ExamConfig;
use crate::models::question::Question;

use super::QuestionBank;
use super::classifier::{DifficultyTier, classify};

/// A rejected exam configuration. Checks run in a fixed order and the first
/// failure wins; each variant carries the numbers the check failed on.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("MCQ plus open counts add up to {actual}, but total_questions is {expected}")]
    CountMismatch { expected: u32, actual: u64 },

    #[error(
        "difficulty percentages must sum to 100, got {sum} (easy {easy}%, medium {medium}%, hard {hard}%)"
    )]
    PercentMismatch {
        sum: u64,
        easy: u32,
        medium: u32,
        hard: u32,
    },

    #[error("not enough {tier} multiple-choice questions in the bank: need {required}, have {available}")]
    InsufficientMcq {
        tier: DifficultyTier,
        required: usize,
        available: usize,
    },

    #[error("not enough open questions in the bank: need {required}, have {available}")]
    InsufficientOpen { required: usize, available: usize },
}

/// Number of MCQs to draw per tier: each percentage is floored against the
/// MCQ count and the whole flooring remainder lands on the medium tier.
fn tier_targets(config: &ExamConfig) -> (usize, usize, usize) {
    let mcq = u64::from(config.mcq_count);
    let easy = mcq * u64::from(config.easy_percent) / 100;
    let mut medium = mcq * u64::from(config.medium_percent) / 100;
    let hard = mcq * u64::from(config.hard_percent) / 100;
    medium += mcq - (easy + medium + hard);
    (easy as usize, medium as usize, hard as usize)
}

/// Draws a full exam from the bank according to the configuration.
///
/// Validation order: question counts, then percentages, then per-tier MCQ
/// availability (easy, medium, hard), then open availability. On success
/// every question is drawn at most once, each pool is sampled uniformly,
/// and the combined list is shuffled once more so the delivery order mixes
/// kinds and tiers.
pub fn compose<R: Rng + ?Sized>(
    bank: &QuestionBank,
    config: &ExamConfig,
    rng: &mut R,
) -> Result<Vec<Question>, ValidationError> {
    // The counts arrive unchecked off the wire; sum in u64 so extremes
    // cannot wrap back onto a passing value.
    let actual = u64::from(config.mcq_count) + u64::from(config.open_count);
    if actual != u64::from(config.total_questions) {
        return Err(ValidationError::CountMismatch {
            expected: config.total_questions,
            actual,
        });
    }

    let sum = u64::from(config.easy_percent)
        + u64::from(config.medium_percent)
        + u64::from(config.hard_percent);
    if sum != 100 {
        return Err(ValidationError::PercentMismatch {
            sum,
            easy: config.easy_percent,
            medium: config.medium_percent,
            hard: config.hard_percent,
        });
    }

    let mut easy_pool: Vec<&Question> = Vec::new();
    let mut medium_pool: Vec<&Question> = Vec::new();
    let mut hard_pool: Vec<&Question> = Vec::new();
    for question in &bank.multiple_choice {
        match classify(question.cognitive_level) {
            DifficultyTier::Easy => easy_pool.push(question),
            DifficultyTier::Medium => medium_pool.push(question),
            DifficultyTier::Hard => hard_pool.push(question),
        }
    }

    let (easy_target, medium_target, hard_target) = tier_targets(config);

    for (tier, available, required) in [
        (DifficultyTier::Easy, easy_pool.len(), easy_target),
        (DifficultyTier::Medium, medium_pool.len(), medium_target),
        (DifficultyTier::Hard, hard_pool.len(), hard_target),
    ] {
        if available < required {
            return Err(ValidationError::InsufficientMcq {
                tier,
                required,
                available,
            });
        }
    }

    let open_required = config.open_count as usize;
    if bank.open_ended.len() < open_required {
        return Err(ValidationError::InsufficientOpen {
            required: open_required,
            available: bank.open_ended.len(),
        });
    }

    let mut selected: Vec<Question> = Vec::with_capacity(config.total_questions as usize);
    for (pool, target) in [
        (&mut easy_pool, easy_target),
        (&mut medium_pool, medium_target),
        (&mut hard_pool, hard_target),
    ] {
        pool.shuffle(rng);
        selected.extend(pool.iter().take(target).map(|&q| q.clone()));
    }

    let mut open_pool: Vec<&Question> = bank.open_ended.iter().collect();
    open_pool.shuffle(rng);
    selected.extend(open_pool.iter().take(open_required).map(|&q| q.clone()));

    // Delivery order is drawn fresh over the combined list on every call.
    selected.shuffle(rng);
    Ok(selected)
}
