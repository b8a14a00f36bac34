// src/models/exam.rs

use serde::{Deserialize, Serialize};
use sqlx::{prelude::FromRow, types::Json};

use super::question::Question;

/// Shape of an exam as requested by its author. Plain data; the composer
/// enforces the arithmetic between the fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExamConfig {
    pub total_questions: u32,
    pub mcq_count: u32,
    pub open_count: u32,
    pub easy_percent: u32,
    pub medium_percent: u32,
    pub hard_percent: u32,
}

/// Represents the 'exams' table in the database.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Exam {
    pub id: i64,

    pub created_by: i64,

    pub title: String,

    /// The configuration the exam was generated from, kept verbatim.
    pub config: Json<ExamConfig>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Represents the 'exam_items' table: one slot of an exam, pointing at a
/// bank question. `question_id` is a weak reference; the question may have
/// been deleted since.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
pub struct ExamItem {
    pub id: i64,
    pub exam_id: i64,
    /// 1-based position; contiguous and unique within the exam.
    pub order_index: i64,
    pub question_id: i64,
}

/// An exam item joined with its question, for editing views. `question` is
/// `None` when the referenced question no longer exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamItemDetail {
    pub id: i64,
    pub order_index: i64,
    pub question_id: i64,
    pub question: Option<Question>,
}

/// A question as handed to a candidate: the bank record plus a display
/// permutation of its options. `correct_index` inside still addresses the
/// canonical order, never the shuffled one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedQuestion {
    #[serde(flatten)]
    pub question: Question,

    /// `Some` for multiple-choice questions, freshly permuted per delivery.
    pub shuffled_options: Option<Vec<String>>,
}

/// DTO for generating an exam.
#[derive(Debug, Deserialize)]
pub struct CreateExamRequest {
    /// Falls back to a dated default when absent or blank.
    pub title: Option<String>,
    pub config: ExamConfig,
}

/// DTO for submitting answers: question id to the chosen option text
/// (clients resolve their shuffled index to text before sending).
#[derive(Debug, Deserialize)]
pub struct SubmitExamRequest {
    pub answers: std::collections::HashMap<i64, String>,
}

/// DTO for pointing an exam item at a different bank question.
#[derive(Debug, Deserialize)]
pub struct ReplaceItemRequest {
    pub question_id: i64,
}

/// A freshly generated exam: the persisted row, its item rows, and the
/// question snapshots in delivery order.
#[derive(Debug, Serialize, Deserialize)]
pub struct GeneratedExam {
    pub exam: Exam,
    pub items: Vec<ExamItem>,
    pub questions: Vec<GeneratedQuestion>,
}

/// A stored exam rehydrated for display. `items` keeps every slot (dangling
/// ones included); `questions` carries only the resolvable ones, re-shuffled
/// for this load.
#[derive(Debug, Serialize, Deserialize)]
pub struct ExamView {
    pub exam: Exam,
    pub items: Vec<ExamItemDetail>,
    pub questions: Vec<GeneratedQuestion>,
}
