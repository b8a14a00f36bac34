// src/store/sqlite.rs

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool, prelude::FromRow, types::Json};

use crate::models::exam::{Exam, ExamConfig, ExamItem};
use crate::models::question::{CognitiveLevel, NewQuestion, Question, QuestionKind};

use super::{ExamStore, QuestionStore, StoreError};

/// Store implementation over a SQLite pool. Cloning shares the pool.
#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

/// Raw 'questions' row. `into_question` folds the kind columns into the
/// tagged domain type and rejects rows that do not decode.
#[derive(Debug, FromRow)]
struct QuestionRow {
    id: i64,
    #[sqlx(rename = "type")]
    question_type: String,
    question_text: String,
    options: Option<Json<Vec<String>>>,
    correct_index: Option<i64>,
    bloom_level: String,
    topic: Option<String>,
    difficulty: i64,
    explanation: Option<String>,
    image_data: Option<String>,
    created_at: Option<chrono::DateTime<chrono::Utc>>,
}

fn corrupt(id: i64, reason: impl Into<String>) -> StoreError {
    StoreError::Corrupt {
        entity: "question",
        id,
        reason: reason.into(),
    }
}

impl QuestionRow {
    fn into_question(self) -> Result<Question, StoreError> {
        let cognitive_level = self.bloom_level.parse::<CognitiveLevel>().map_err(|_| {
            corrupt(
                self.id,
                format!("unknown cognitive level '{}'", self.bloom_level),
            )
        })?;

        let kind = match self.question_type.as_str() {
            "mcq" => {
                let options = self
                    .options
                    .ok_or_else(|| corrupt(self.id, "multiple-choice row without options"))?
                    .0;
                let correct_index = self
                    .correct_index
                    .ok_or_else(|| corrupt(self.id, "multiple-choice row without correct_index"))?;
                if correct_index < 0 || correct_index as usize >= options.len() {
                    return Err(corrupt(
                        self.id,
                        format!(
                            "correct_index {} out of range for {} options",
                            correct_index,
                            options.len()
                        ),
                    ));
                }
                QuestionKind::MultipleChoice {
                    options,
                    correct_index: correct_index as usize,
                }
            }
            "open" => QuestionKind::Open,
            other => {
                return Err(corrupt(self.id, format!("unknown question type '{other}'")));
            }
        };

        Ok(Question {
            id: self.id,
            question_text: self.question_text,
            cognitive_level,
            topic: self.topic,
            difficulty: self.difficulty,
            explanation: self.explanation,
            image_data: self.image_data,
            created_at: self.created_at,
            kind,
        })
    }
}

/// The two kind-specific columns as stored, NULL for open questions.
fn kind_columns(kind: &QuestionKind) -> (Option<Json<Vec<String>>>, Option<i64>) {
    match kind {
        QuestionKind::MultipleChoice {
            options,
            correct_index,
        } => (Some(Json(options.clone())), Some(*correct_index as i64)),
        QuestionKind::Open => (None, None),
    }
}

#[async_trait]
impl QuestionStore for SqliteStore {
    async fn list_questions(&self) -> Result<Vec<Question>, StoreError> {
        let rows = sqlx::query_as::<_, QuestionRow>("SELECT * FROM questions ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(QuestionRow::into_question).collect()
    }

    async fn get_question(&self, id: i64) -> Result<Option<Question>, StoreError> {
        let row = sqlx::query_as::<_, QuestionRow>("SELECT * FROM questions WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.map(QuestionRow::into_question).transpose()
    }

    async fn create_question(&self, new: NewQuestion) -> Result<Question, StoreError> {
        let (options, correct_index) = kind_columns(&new.kind);

        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            INSERT INTO questions
                (type, question_text, options, correct_index, bloom_level,
                 topic, difficulty, explanation, image_data, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(new.kind.tag())
        .bind(&new.question_text)
        .bind(options)
        .bind(correct_index)
        .bind(new.cognitive_level.as_str())
        .bind(&new.topic)
        .bind(new.difficulty)
        .bind(&new.explanation)
        .bind(&new.image_data)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        row.into_question()
    }

    async fn update_question(&self, question: &Question) -> Result<(), StoreError> {
        let (options, correct_index) = kind_columns(&question.kind);

        let result = sqlx::query(
            r#"
            UPDATE questions
            SET type = ?, question_text = ?, options = ?, correct_index = ?,
                bloom_level = ?, topic = ?, difficulty = ?, explanation = ?,
                image_data = ?
            WHERE id = ?
            "#,
        )
        .bind(question.kind.tag())
        .bind(&question.question_text)
        .bind(options)
        .bind(correct_index)
        .bind(question.cognitive_level.as_str())
        .bind(&question.topic)
        .bind(question.difficulty)
        .bind(&question.explanation)
        .bind(&question.image_data)
        .bind(question.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("question"));
        }
        Ok(())
    }

    async fn delete_question(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM questions WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("question"));
        }
        Ok(())
    }

    async fn find_by_kind_and_attributes(
        &self,
        kind: &str,
        level: CognitiveLevel,
        difficulty: i64,
        topic: Option<&str>,
    ) -> Result<Vec<Question>, StoreError> {
        let mut query_builder = QueryBuilder::<Sqlite>::new("SELECT * FROM questions WHERE type = ");
        query_builder.push_bind(kind);
        query_builder.push(" AND bloom_level = ");
        query_builder.push_bind(level.as_str());
        query_builder.push(" AND difficulty = ");
        query_builder.push_bind(difficulty);
        match topic {
            Some(topic) => {
                query_builder.push(" AND topic = ");
                query_builder.push_bind(topic);
            }
            // A row without a topic only ever matches a missing topic.
            None => {
                query_builder.push(" AND topic IS NULL");
            }
        }
        query_builder.push(" ORDER BY id");

        let rows: Vec<QuestionRow> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(QuestionRow::into_question).collect()
    }

    async fn find_by_id_in(&self, ids: &[i64]) -> Result<Vec<Question>, StoreError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // Dynamic IN clause, one bind per id
        let mut query_builder = QueryBuilder::<Sqlite>::new("SELECT * FROM questions WHERE id IN (");
        let mut separated = query_builder.separated(",");
        for id in ids {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let rows: Vec<QuestionRow> = query_builder
            .build_query_as()
            .fetch_all(&self.pool)
            .await?;
        rows.into_iter().map(QuestionRow::into_question).collect()
    }
}

#[async_trait]
impl ExamStore for SqliteStore {
    async fn create_exam(
        &self,
        created_by: i64,
        title: &str,
        config: &ExamConfig,
    ) -> Result<Exam, StoreError> {
        let exam = sqlx::query_as::<_, Exam>(
            r#"
            INSERT INTO exams (created_by, title, config, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING *
            "#,
        )
        .bind(created_by)
        .bind(title)
        .bind(Json(config))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;
        Ok(exam)
    }

    async fn create_exam_items(
        &self,
        exam_id: i64,
        question_ids: &[i64],
    ) -> Result<Vec<ExamItem>, StoreError> {
        let mut items = Vec::with_capacity(question_ids.len());
        for (position, question_id) in question_ids.iter().enumerate() {
            let item = sqlx::query_as::<_, ExamItem>(
                r#"
                INSERT INTO exam_items (exam_id, question_id, order_index)
                VALUES (?, ?, ?)
                RETURNING *
                "#,
            )
            .bind(exam_id)
            .bind(question_id)
            .bind(position as i64 + 1)
            .fetch_one(&self.pool)
            .await?;
            items.push(item);
        }
        Ok(items)
    }

    async fn get_exam(&self, id: i64) -> Result<Option<Exam>, StoreError> {
        let exam = sqlx::query_as::<_, Exam>("SELECT * FROM exams WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(exam)
    }

    async fn get_exam_items(&self, exam_id: i64) -> Result<Vec<ExamItem>, StoreError> {
        let items = sqlx::query_as::<_, ExamItem>(
            "SELECT * FROM exam_items WHERE exam_id = ? ORDER BY order_index",
        )
        .bind(exam_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn get_exam_item(&self, item_id: i64) -> Result<Option<ExamItem>, StoreError> {
        let item = sqlx::query_as::<_, ExamItem>("SELECT * FROM exam_items WHERE id = ?")
            .bind(item_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(item)
    }

    async fn update_exam_item(&self, item_id: i64, question_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE exam_items SET question_id = ? WHERE id = ?")
            .bind(question_id)
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("exam item"));
        }
        Ok(())
    }

    async fn update_item_order(&self, item_id: i64, order_index: i64) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE exam_items SET order_index = ? WHERE id = ?")
            .bind(order_index)
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("exam item"));
        }
        Ok(())
    }

    async fn items_after(
        &self,
        exam_id: i64,
        order_index: i64,
    ) -> Result<Vec<ExamItem>, StoreError> {
        let items = sqlx::query_as::<_, ExamItem>(
            "SELECT * FROM exam_items WHERE exam_id = ? AND order_index > ? ORDER BY order_index",
        )
        .bind(exam_id)
        .bind(order_index)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }

    async fn delete_exam_item(&self, item_id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM exam_items WHERE id = ?")
            .bind(item_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("exam item"));
        }
        Ok(())
    }

    async fn delete_exam(&self, id: i64) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM exam_items WHERE exam_id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        let result = sqlx::query("DELETE FROM exams WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound("exam"));
        }
        Ok(())
    }
}
