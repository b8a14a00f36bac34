// src/service/lifecycle.rs

use std::collections::HashSet;

use crate::store::{ExamStore, StoreError};

/// Lock state of one exam item inside an edit session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockState {
    Active,
    Locked,
}

/// Outcome of a replace attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceOutcome {
    Replaced,
    /// The item was locked in this session; nothing was written.
    SkippedLocked,
}

/// Outcome of a delete attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted {
        /// How many later items were shifted down to close the gap.
        resequenced: usize,
    },
    /// The item was locked in this session; nothing was written.
    SkippedLocked,
}

/// One editing session over an exam's items. Locks live here and nowhere
/// else: they are never persisted, and a new session starts with every
/// item unlocked.
#[derive(Debug, Default)]
pub struct ExamEditor {
    locked: HashSet<i64>,
}

impl ExamEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flips an item between active and locked. No store I/O.
    pub fn toggle_lock(&mut self, item_id: i64) -> LockState {
        if self.locked.remove(&item_id) {
            LockState::Active
        } else {
            self.locked.insert(item_id);
            LockState::Locked
        }
    }

    pub fn is_locked(&self, item_id: i64) -> bool {
        self.locked.contains(&item_id)
    }

    /// Points an item at a different question. The item keeps its id and
    /// position; callers reload the exam afterwards, which also draws a
    /// fresh option shuffle for the new question.
    pub async fn replace(
        &self,
        exams: &dyn ExamStore,
        item_id: i64,
        new_question_id: i64,
    ) -> Result<ReplaceOutcome, StoreError> {
        if self.is_locked(item_id) {
            return Ok(ReplaceOutcome::SkippedLocked);
        }
        exams.update_exam_item(item_id, new_question_id).await?;
        Ok(ReplaceOutcome::Replaced)
    }

    /// Deletes an item, then closes the gap by decrementing every later
    /// item's order by one, in ascending order, one update at a time. A
    /// failed decrement is logged and skipped; the item itself stays
    /// deleted, and the sequence is repaired on the next load.
    pub async fn delete(
        &mut self,
        exams: &dyn ExamStore,
        item_id: i64,
    ) -> Result<DeleteOutcome, StoreError> {
        if self.is_locked(item_id) {
            return Ok(DeleteOutcome::SkippedLocked);
        }

        let item = exams
            .get_exam_item(item_id)
            .await?
            .ok_or(StoreError::NotFound("exam item"))?;
        exams.delete_exam_item(item_id).await?;
        self.locked.remove(&item_id);

        let later = match exams.items_after(item.exam_id, item.order_index).await {
            Ok(later) => later,
            Err(err) => {
                tracing::warn!(
                    "Failed to fetch items after position {} of exam {} for resequencing: {}",
                    item.order_index,
                    item.exam_id,
                    err
                );
                return Ok(DeleteOutcome::Deleted { resequenced: 0 });
            }
        };

        let mut resequenced = 0;
        for later_item in later {
            match exams
                .update_item_order(later_item.id, later_item.order_index - 1)
                .await
            {
                Ok(()) => resequenced += 1,
                Err(err) => {
                    tracing::warn!("Failed to shift exam item {} down: {}", later_item.id, err);
                }
            }
        }

        Ok(DeleteOutcome::Deleted { resequenced })
    }
}
