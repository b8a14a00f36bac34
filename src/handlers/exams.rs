// src/handlers/exams.rs

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use rand::{SeedableRng, rngs::StdRng};
use serde::Deserialize;

use crate::{
    engine::scoring::grade,
    error::AppError,
    models::exam::{CreateExamRequest, ExamView, ReplaceItemRequest, SubmitExamRequest},
    service::{
        self,
        candidates::{CandidateFilter, find_candidates},
        lifecycle::{DeleteOutcome, ExamEditor},
    },
    store::{ExamStore, QuestionStore, SqliteStore},
    utils::jwt::Claims,
};

/// Generates and persists a new exam from the caller's configuration.
/// Instructor only; the role gate sits in front of this handler, so an
/// unauthorized caller never reaches config validation.
pub async fn generate_exam(
    State(store): State<SqliteStore>,
    Extension(claims): Extension<Claims>,
    Json(payload): Json<CreateExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    let created_by: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::AuthError("Invalid token subject".to_string()))?;

    let mut rng = StdRng::from_os_rng();
    let generated = service::exams::generate(
        &store,
        &store,
        created_by,
        payload.title.as_deref(),
        &payload.config,
        &mut rng,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(generated)))
}

/// Rehydrates a stored exam with a fresh option shuffle per delivery.
pub async fn get_exam(
    State(store): State<SqliteStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    let view = reload_exam(&store, id).await?;

    Ok(Json(view))
}

/// Grades a set of submitted answers against the exam's questions.
/// Answers carry the chosen option text; results are returned, not stored.
pub async fn submit_exam(
    State(store): State<SqliteStore>,
    Path(id): Path<i64>,
    Json(payload): Json<SubmitExamRequest>,
) -> Result<impl IntoResponse, AppError> {
    store
        .get_exam(id)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))?;

    let items = store.get_exam_items(id).await?;
    let ids: Vec<i64> = items.iter().map(|item| item.question_id).collect();
    let questions = store.find_by_id_in(&ids).await?;

    Ok(Json(grade(&questions, &payload.answers)))
}

/// Points an exam item at a different question, then returns the exam as
/// reloaded. The slot keeps its id and position.
/// Authenticated.
pub async fn replace_exam_item(
    State(store): State<SqliteStore>,
    Path((exam_id, item_id)): Path<(i64, i64)>,
    Json(payload): Json<ReplaceItemRequest>,
) -> Result<impl IntoResponse, AppError> {
    check_item_belongs(&store, exam_id, item_id).await?;

    let editor = ExamEditor::new();
    editor.replace(&store, item_id, payload.question_id).await?;

    let view = reload_exam(&store, exam_id).await?;
    Ok(Json(view))
}

/// Removes one exam item and closes the gap it leaves, then returns the
/// exam as reloaded.
/// Authenticated.
pub async fn delete_exam_item(
    State(store): State<SqliteStore>,
    Path((exam_id, item_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, AppError> {
    check_item_belongs(&store, exam_id, item_id).await?;

    let mut editor = ExamEditor::new();
    if let DeleteOutcome::Deleted { resequenced } = editor.delete(&store, item_id).await? {
        tracing::debug!(
            "Deleted exam item {}, moved up {} following items",
            item_id,
            resequenced
        );
    }

    let view = reload_exam(&store, exam_id).await?;
    Ok(Json(view))
}

/// Query switches of the candidate search. Only `exclude` is required.
#[derive(Debug, Deserialize)]
pub struct CandidateQuery {
    /// The question being replaced; never part of the result.
    pub exclude: i64,
    pub filter_by_config: Option<bool>,
    pub allow_duplicates: Option<bool>,
    /// Case-insensitive substring over the question text.
    pub q: Option<String>,
}

/// Lists the questions that could stand in for one of the exam's items.
/// Authenticated.
pub async fn list_candidates(
    State(store): State<SqliteStore>,
    Path(exam_id): Path<i64>,
    Query(params): Query<CandidateQuery>,
) -> Result<impl IntoResponse, AppError> {
    let defaults = CandidateFilter::default();
    let filter = CandidateFilter {
        filter_by_config: params.filter_by_config.unwrap_or(defaults.filter_by_config),
        allow_duplicates: params.allow_duplicates.unwrap_or(defaults.allow_duplicates),
        search_text: params.q,
    };

    let candidates = find_candidates(&store, &store, exam_id, params.exclude, &filter).await?;

    Ok(Json(candidates))
}

/// Deletes an exam and its items.
/// Authenticated.
pub async fn delete_exam(
    State(store): State<SqliteStore>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, AppError> {
    store.delete_exam(id).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Rejects item operations whose item does not belong to the exam in the
/// path, so guessing item ids across exams reads as a plain miss.
async fn check_item_belongs(
    store: &SqliteStore,
    exam_id: i64,
    item_id: i64,
) -> Result<(), AppError> {
    let item = store
        .get_exam_item(item_id)
        .await?
        .ok_or(AppError::NotFound("Exam item not found".to_string()))?;

    if item.exam_id != exam_id {
        return Err(AppError::NotFound("Exam item not found".to_string()));
    }

    Ok(())
}

async fn reload_exam(store: &SqliteStore, exam_id: i64) -> Result<ExamView, AppError> {
    let mut rng = StdRng::from_os_rng();
    service::exams::load_exam(store, store, exam_id, &mut rng)
        .await?
        .ok_or(AppError::NotFound("Exam not found".to_string()))
}
