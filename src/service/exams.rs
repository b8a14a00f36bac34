// src/service/exams.rs

use std::collections::HashMap;

use chrono::Utc;
use rand::Rng;
use thiserror::Error;

use crate::engine::QuestionBank;
use crate::engine::composer::{ValidationError, compose};
use crate::engine::randomizer::randomize;
use crate::models::exam::{ExamConfig, ExamItem, ExamItemDetail, ExamView, GeneratedExam};
use crate::models::question::Question;
use crate::store::{ExamStore, QuestionStore, StoreError};

/// A failed generation attempt: either the configuration was rejected
/// before anything was written, or a store call failed along the way.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Composes an exam from the bank and persists it: first the exam row,
/// then one item per question in delivery order. The two writes are not
/// atomic; if the items cannot be written the exam row is deleted again
/// best-effort and the original error is returned.
pub async fn generate<R: Rng + ?Sized>(
    questions: &dyn QuestionStore,
    exams: &dyn ExamStore,
    created_by: i64,
    title: Option<&str>,
    config: &ExamConfig,
    rng: &mut R,
) -> Result<GeneratedExam, GenerateError> {
    let bank = QuestionBank::partition(questions.list_questions().await?);
    let composed = compose(&bank, config, rng)?;
    let generated = randomize(composed, rng);

    let title = match title {
        Some(title) if !title.trim().is_empty() => title.to_string(),
        _ => format!("Exam {}", Utc::now().format("%Y-%m-%d")),
    };

    let exam = exams.create_exam(created_by, &title, config).await?;

    let question_ids: Vec<i64> = generated.iter().map(|g| g.question.id).collect();
    let items = match exams.create_exam_items(exam.id, &question_ids).await {
        Ok(items) => items,
        Err(err) => {
            // Best-effort cleanup of the orphaned exam row.
            if let Err(cleanup_err) = exams.delete_exam(exam.id).await {
                tracing::warn!(
                    "Failed to delete orphaned exam {} after item creation failure: {}",
                    exam.id,
                    cleanup_err
                );
            }
            return Err(err.into());
        }
    };

    Ok(GeneratedExam {
        exam,
        items,
        questions: generated,
    })
}

/// Rehydrates a stored exam: its items in order, each joined with its
/// question where the question still exists, plus fresh delivery snapshots
/// for the resolvable ones. Returns `None` for an unknown exam id.
pub async fn load_exam<R: Rng + ?Sized>(
    questions: &dyn QuestionStore,
    exams: &dyn ExamStore,
    exam_id: i64,
    rng: &mut R,
) -> Result<Option<ExamView>, StoreError> {
    let Some(exam) = exams.get_exam(exam_id).await? else {
        return Ok(None);
    };

    let items = exams.get_exam_items(exam_id).await?;
    let items = repair_sequence(exams, items).await;

    let ids: Vec<i64> = items.iter().map(|item| item.question_id).collect();
    let by_id: HashMap<i64, Question> = questions
        .find_by_id_in(&ids)
        .await?
        .into_iter()
        .map(|q| (q.id, q))
        .collect();

    let mut details = Vec::with_capacity(items.len());
    for item in &items {
        // A deleted question leaves the slot in place with no question.
        details.push(ExamItemDetail {
            id: item.id,
            order_index: item.order_index,
            question_id: item.question_id,
            question: by_id.get(&item.question_id).cloned(),
        });
    }

    let resolvable: Vec<Question> = details
        .iter()
        .filter_map(|detail| detail.question.clone())
        .collect();
    let generated = randomize(resolvable, rng);

    Ok(Some(ExamView {
        exam,
        items: details,
        questions: generated,
    }))
}

/// Renumbers a gapped item sequence back to 1..=N in stored order. Items
/// arrive sorted ascending, so every target index is at most the current
/// one and the renumbering never collides. A failed update is logged and
/// left for the next load.
async fn repair_sequence(exams: &dyn ExamStore, mut items: Vec<ExamItem>) -> Vec<ExamItem> {
    let gapped = items
        .iter()
        .enumerate()
        .any(|(position, item)| item.order_index != position as i64 + 1);
    if !gapped {
        return items;
    }

    if let Some(first) = items.first() {
        tracing::warn!("Exam {} has a gapped item sequence, renumbering", first.exam_id);
    }

    for (position, item) in items.iter_mut().enumerate() {
        let expected = position as i64 + 1;
        if item.order_index == expected {
            continue;
        }
        match exams.update_item_order(item.id, expected).await {
            Ok(()) => item.order_index = expected,
            Err(err) => {
                tracing::warn!("Failed to renumber exam item {}: {}", item.id, err);
            }
        }
    }
    items
}
