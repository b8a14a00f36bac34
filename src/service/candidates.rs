// src/service/candidates.rs

use std::collections::HashSet;

use crate::models::question::Question;
use crate::store::{ExamStore, QuestionStore, StoreError};

/// Switches of the replacement search, mirroring the selection dialog.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    /// Restrict to questions whose kind, cognitive level, difficulty and
    /// topic all equal those of the question being replaced.
    pub filter_by_config: bool,
    /// Keep questions that already appear elsewhere in the exam.
    pub allow_duplicates: bool,
    /// Case-insensitive substring over the question text.
    pub search_text: Option<String>,
}

impl Default for CandidateFilter {
    fn default() -> Self {
        Self {
            filter_by_config: true,
            allow_duplicates: false,
            search_text: None,
        }
    }
}

/// Collects the questions that may stand in for `exclude_question_id` in
/// the given exam. The replaced question itself is never a candidate; an
/// empty result is a valid answer.
pub async fn find_candidates(
    questions: &dyn QuestionStore,
    exams: &dyn ExamStore,
    exam_id: i64,
    exclude_question_id: i64,
    filter: &CandidateFilter,
) -> Result<Vec<Question>, StoreError> {
    let mut candidates = if filter.filter_by_config {
        let reference = questions
            .get_question(exclude_question_id)
            .await?
            .ok_or(StoreError::NotFound("question"))?;
        questions
            .find_by_kind_and_attributes(
                reference.kind.tag(),
                reference.cognitive_level,
                reference.difficulty,
                reference.topic.as_deref(),
            )
            .await?
    } else {
        questions.list_questions().await?
    };

    candidates.retain(|question| question.id != exclude_question_id);

    if !filter.allow_duplicates {
        let items = exams.get_exam_items(exam_id).await?;
        let used: HashSet<i64> = items.iter().map(|item| item.question_id).collect();
        candidates.retain(|question| !used.contains(&question.id));
    }

    if let Some(search) = filter.search_text.as_deref() {
        let needle = search.to_lowercase();
        if !needle.is_empty() {
            candidates.retain(|question| question.question_text.to_lowercase().contains(&needle));
        }
    }

    Ok(candidates)
}

#[cfg(test)]
mod tests {
    use sqlx::SqlitePool;
    use sqlx::sqlite::SqlitePoolOptions;

    use super::*;
    use crate::models::exam::ExamConfig;
    use crate::models::question::{CognitiveLevel, NewQuestion, QuestionKind};
    use crate::store::SqliteStore;

    async fn test_store() -> (SqliteStore, SqlitePool) {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        sqlx::migrate!("./migrations").run(&pool).await.unwrap();
        (SqliteStore::new(pool.clone()), pool)
    }

    fn mcq(text: &str, level: CognitiveLevel, difficulty: i64, topic: Option<&str>) -> NewQuestion {
        NewQuestion {
            question_text: text.to_string(),
            cognitive_level: level,
            topic: topic.map(|t| t.to_string()),
            difficulty,
            explanation: None,
            image_data: None,
            kind: QuestionKind::MultipleChoice {
                options: vec!["A".to_string(), "B".to_string()],
                correct_index: 0,
            },
        }
    }

    async fn exam_over(store: &SqliteStore, pool: &SqlitePool, question_ids: &[i64]) -> i64 {
        let user_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO users (username, password, role, created_at)
            VALUES ('instructor', 'x', 'instructor', '2024-01-01T00:00:00Z')
            RETURNING id
            "#,
        )
        .fetch_one(pool)
        .await
        .unwrap();

        let config = ExamConfig {
            total_questions: question_ids.len() as u32,
            mcq_count: question_ids.len() as u32,
            open_count: 0,
            easy_percent: 0,
            medium_percent: 100,
            hard_percent: 0,
        };
        let exam = store.create_exam(user_id, "Exam", &config).await.unwrap();
        store.create_exam_items(exam.id, question_ids).await.unwrap();
        exam.id
    }

    #[tokio::test]
    async fn test_config_match_is_exact_and_null_topic_matches_null() {
        let (store, pool) = test_store().await;
        let replaced = store
            .create_question(mcq("replaced", CognitiveLevel::Apply, 3, None))
            .await
            .unwrap();
        let same_shape = store
            .create_question(mcq("same shape", CognitiveLevel::Apply, 3, None))
            .await
            .unwrap();
        // Near misses: topic set, wrong level, wrong difficulty.
        store
            .create_question(mcq("topiced", CognitiveLevel::Apply, 3, Some("sets")))
            .await
            .unwrap();
        store
            .create_question(mcq("wrong level", CognitiveLevel::Create, 3, None))
            .await
            .unwrap();
        store
            .create_question(mcq("wrong difficulty", CognitiveLevel::Apply, 4, None))
            .await
            .unwrap();

        let exam_id = exam_over(&store, &pool, &[replaced.id]).await;
        let found = find_candidates(
            &store,
            &store,
            exam_id,
            replaced.id,
            &CandidateFilter::default(),
        )
        .await
        .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, same_shape.id);
    }

    #[tokio::test]
    async fn test_duplicates_are_dropped_unless_allowed() {
        let (store, pool) = test_store().await;
        let replaced = store
            .create_question(mcq("replaced", CognitiveLevel::Apply, 2, None))
            .await
            .unwrap();
        let elsewhere = store
            .create_question(mcq("already in exam", CognitiveLevel::Apply, 2, None))
            .await
            .unwrap();
        let fresh = store
            .create_question(mcq("fresh", CognitiveLevel::Apply, 2, None))
            .await
            .unwrap();

        let exam_id = exam_over(&store, &pool, &[replaced.id, elsewhere.id]).await;

        let found = find_candidates(
            &store,
            &store,
            exam_id,
            replaced.id,
            &CandidateFilter::default(),
        )
        .await
        .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, fresh.id);

        let found = find_candidates(
            &store,
            &store,
            exam_id,
            replaced.id,
            &CandidateFilter {
                allow_duplicates: true,
                ..CandidateFilter::default()
            },
        )
        .await
        .unwrap();
        let ids: Vec<i64> = found.iter().map(|q| q.id).collect();
        assert!(ids.contains(&elsewhere.id));
        assert!(ids.contains(&fresh.id));
        assert!(!ids.contains(&replaced.id));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let (store, pool) = test_store().await;
        let replaced = store
            .create_question(mcq("replaced", CognitiveLevel::Apply, 2, None))
            .await
            .unwrap();
        store
            .create_question(mcq("The Pythagorean theorem", CognitiveLevel::Apply, 2, None))
            .await
            .unwrap();
        store
            .create_question(mcq("Prime factorization", CognitiveLevel::Apply, 2, None))
            .await
            .unwrap();

        let exam_id = exam_over(&store, &pool, &[replaced.id]).await;
        let found = find_candidates(
            &store,
            &store,
            exam_id,
            replaced.id,
            &CandidateFilter {
                search_text: Some("pythagorean".to_string()),
                ..CandidateFilter::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].question_text, "The Pythagorean theorem");
    }

    #[tokio::test]
    async fn test_unfiltered_search_spans_kinds() {
        let (store, pool) = test_store().await;
        let replaced = store
            .create_question(mcq("replaced", CognitiveLevel::Apply, 2, None))
            .await
            .unwrap();
        store
            .create_question(NewQuestion {
                question_text: "Discuss the proof".to_string(),
                cognitive_level: CognitiveLevel::Evaluate,
                topic: None,
                difficulty: 5,
                explanation: None,
                image_data: None,
                kind: QuestionKind::Open,
            })
            .await
            .unwrap();

        let exam_id = exam_over(&store, &pool, &[replaced.id]).await;
        let found = find_candidates(
            &store,
            &store,
            exam_id,
            replaced.id,
            &CandidateFilter {
                filter_by_config: false,
                ..CandidateFilter::default()
            },
        )
        .await
        .unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].question_text, "Discuss the proof");
    }

    #[tokio::test]
    async fn test_missing_reference_question_is_not_found() {
        let (store, pool) = test_store().await;
        let replaced = store
            .create_question(mcq("replaced", CognitiveLevel::Apply, 2, None))
            .await
            .unwrap();
        let exam_id = exam_over(&store, &pool, &[replaced.id]).await;
        store.delete_question(replaced.id).await.unwrap();

        let err = find_candidates(
            &store,
            &store,
            exam_id,
            replaced.id,
            &CandidateFilter::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
