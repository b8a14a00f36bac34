// src/handlers/questions.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use validator::Validate;

use crate::{
    engine::{QuestionBank, classifier::bank_summary},
    error::AppError,
    models::question::{
        CreateQuestionRequest, DEFAULT_QUESTION_DIFFICULTY, NewQuestion, UpdateQuestionRequest,
    },
    store::{QuestionStore, SqliteStore},
};

/// Lists the whole question bank.
pub async fn list_questions(
    State(store): State<SqliteStore>,
) -> Result<impl IntoResponse, AppError> {
    let questions = store.list_questions().await?;
    Ok(Json(questions))
}

/// Per-kind and per-tier counts of the bank, the numbers an exam config
/// is checked against.
pub async fn bank_stats(State(store): State<SqliteStore>) -> Result<impl IntoResponse, AppError> {
    let questions = store.list_questions().await?;
    let bank = QuestionBank::partition(questions);
    Ok(Json(bank_summary(&bank)))
}

/// Fetches a single question by ID.
pub async fn get_question(
    State(store): State<SqliteStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let question = store
        .get_question(id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    Ok(Json(question))
}

/// Adds a question to the bank.
/// Authenticated.
pub async fn create_question(
    State(store): State<SqliteStore>,
    Json(payload): Json<CreateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }
    payload.kind.check().map_err(AppError::BadRequest)?;

    let question = store
        .create_question(NewQuestion {
            question_text: payload.question_text,
            cognitive_level: payload.cognitive_level,
            topic: payload.topic,
            difficulty: payload.difficulty.unwrap_or(DEFAULT_QUESTION_DIFFICULTY),
            explanation: payload.explanation,
            image_data: payload.image_data,
            kind: payload.kind.into(),
        })
        .await?;

    Ok((StatusCode::CREATED, Json(question)))
}

/// Applies a partial update to a question. The kind cannot change after
/// creation; option edits are re-checked against the merged record.
/// Authenticated.
pub async fn update_question(
    State(store): State<SqliteStore>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let mut question = store
        .get_question(id)
        .await?
        .ok_or(AppError::NotFound("Question not found".to_string()))?;

    payload
        .apply_to(&mut question)
        .map_err(AppError::BadRequest)?;
    store.update_question(&question).await?;

    Ok(Json(question))
}

/// Deletes a question by ID. Exams keep their item slots; the reference
/// dangles and the slot shows up without a question on the next load.
/// Authenticated.
pub async fn delete_question(
    State(store): State<SqliteStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    store.delete_question(id).await?;

    Ok(StatusCode::NO_CONTENT)
}
