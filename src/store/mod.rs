// src/store/mod.rs
//
// Persistence boundary. Services talk to these traits only; the SQLite
// implementation lives in `sqlite.rs`.

pub mod sqlite;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::exam::{Exam, ExamConfig, ExamItem};
use crate::models::question::{CognitiveLevel, NewQuestion, Question};

pub use sqlite::SqliteStore;

/// A failed store call. Every call is independently fallible; a failure is
/// terminal for the attempt, never a panic.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0} not found")]
    NotFound(&'static str),

    /// A stored row that cannot be decoded into its domain type, such as an
    /// unknown cognitive level tag or a correct index outside the options.
    #[error("corrupt {entity} record {id}: {reason}")]
    Corrupt {
        entity: &'static str,
        id: i64,
        reason: String,
    },
}

/// Read and write access to the question bank.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn list_questions(&self) -> Result<Vec<Question>, StoreError>;

    async fn get_question(&self, id: i64) -> Result<Option<Question>, StoreError>;

    async fn create_question(&self, new: NewQuestion) -> Result<Question, StoreError>;

    /// Writes the full record back under its id.
    async fn update_question(&self, question: &Question) -> Result<(), StoreError>;

    async fn delete_question(&self, id: i64) -> Result<(), StoreError>;

    /// Questions of the given kind tag with exactly these attributes.
    /// `topic: None` matches only rows without a topic.
    async fn find_by_kind_and_attributes(
        &self,
        kind: &str,
        level: CognitiveLevel,
        difficulty: i64,
        topic: Option<&str>,
    ) -> Result<Vec<Question>, StoreError>;

    async fn find_by_id_in(&self, ids: &[i64]) -> Result<Vec<Question>, StoreError>;
}

/// Read and write access to exams and their ordered items.
#[async_trait]
pub trait ExamStore: Send + Sync {
    async fn create_exam(
        &self,
        created_by: i64,
        title: &str,
        config: &ExamConfig,
    ) -> Result<Exam, StoreError>;

    /// Inserts one item per question id, `order_index` 1..=N in the given
    /// order.
    async fn create_exam_items(
        &self,
        exam_id: i64,
        question_ids: &[i64],
    ) -> Result<Vec<ExamItem>, StoreError>;

    async fn get_exam(&self, id: i64) -> Result<Option<Exam>, StoreError>;

    /// All items of an exam, ordered by `order_index`.
    async fn get_exam_items(&self, exam_id: i64) -> Result<Vec<ExamItem>, StoreError>;

    async fn get_exam_item(&self, item_id: i64) -> Result<Option<ExamItem>, StoreError>;

    /// Points an item at a different question; id and order are untouched.
    async fn update_exam_item(&self, item_id: i64, question_id: i64) -> Result<(), StoreError>;

    async fn update_item_order(&self, item_id: i64, order_index: i64) -> Result<(), StoreError>;

    /// Items of the exam with an order strictly greater than the given one,
    /// ascending.
    async fn items_after(
        &self,
        exam_id: i64,
        order_index: i64,
    ) -> Result<Vec<ExamItem>, StoreError>;

    async fn delete_exam_item(&self, item_id: i64) -> Result<(), StoreError>;

    /// Removes the exam and, with it, its items.
    async fn delete_exam(&self, id: i64) -> Result<(), StoreError>;
}
