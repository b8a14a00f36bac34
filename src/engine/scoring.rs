// src/engine/scoring.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::exam::GeneratedQuestion;
use crate::models::question::{Question, QuestionKind};

/// How one question came out of grading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    Correct,
    Incorrect,
    Unanswered,
    /// Open questions are recorded but never graded automatically.
    NotGraded,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question_id: i64,
    pub outcome: AnswerOutcome,
}

/// Result of grading one submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeReport {
    pub results: Vec<QuestionResult>,
    pub correct_count: usize,
    pub mcq_total: usize,
    /// Share of correctly answered MCQs, 0.0 when the exam has none.
    pub score_percent: f64,
}

/// The text of the correct option, or `None` for an open question.
pub fn correct_option_text(question: &Question) -> Option<&str> {
    match &question.kind {
        QuestionKind::MultipleChoice {
            options,
            correct_index,
        } => options.get(*correct_index).map(|s| s.as_str()),
        QuestionKind::Open => None,
    }
}

/// Resolves a picked position in a delivery snapshot to its option text.
/// Clients submit the text, not the position, since every delivery has its
/// own permutation.
pub fn chosen_text(generated: &GeneratedQuestion, choice: usize) -> Option<&str> {
    generated
        .shuffled_options
        .as_ref()?
        .get(choice)
        .map(|s| s.as_str())
}

/// Grades submitted answer texts against the canonical correct options.
/// Only multiple-choice questions count toward the score; a missing answer
/// is wrong, an open answer is left ungraded.
pub fn grade(questions: &[Question], answers: &HashMap<i64, String>) -> GradeReport {
    let mut results = Vec::with_capacity(questions.len());
    let mut correct_count = 0;
    let mut mcq_total = 0;

    for question in questions {
        let outcome = match correct_option_text(question) {
            None => AnswerOutcome::NotGraded,
            Some(correct) => {
                mcq_total += 1;
                match answers.get(&question.id) {
                    None => AnswerOutcome::Unanswered,
                    Some(answer) if answer == correct => {
                        correct_count += 1;
                        AnswerOutcome::Correct
                    }
                    Some(_) => AnswerOutcome::Incorrect,
                }
            }
        };
        results.push(QuestionResult {
            question_id: question.id,
            outcome,
        });
    }

    let score_percent = if mcq_total == 0 {
        0.0
    } else {
        correct_count as f64 / mcq_total as f64 * 100.0
    };

    GradeReport {
        results,
        correct_count,
        mcq_total,
        score_percent,
    }
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::engine::fixtures::{mcq, open_question};
    use crate::engine::randomizer::randomize;
    use crate::models::question::CognitiveLevel;

    #[test]
    fn test_correct_pick_grades_correct_under_any_permutation() {
        let questions: Vec<Question> = (1..=8).map(|id| mcq(id, CognitiveLevel::Apply)).collect();

        for seed in 0..10 {
            let mut rng = StdRng::seed_from_u64(seed);
            let generated = randomize(questions.clone(), &mut rng);

            // Pick, for every question, the shuffled position that holds
            // the canonical correct text.
            let mut answers = HashMap::new();
            for g in &generated {
                let correct = correct_option_text(&g.question).unwrap();
                let position = g
                    .shuffled_options
                    .as_ref()
                    .unwrap()
                    .iter()
                    .position(|opt| opt == correct)
                    .unwrap();
                let text = chosen_text(g, position).unwrap();
                answers.insert(g.question.id, text.to_string());
            }

            let report = grade(&questions, &answers);
            assert_eq!(report.correct_count, 8);
            assert_eq!(report.mcq_total, 8);
            assert_eq!(report.score_percent, 100.0);
        }
    }

    #[test]
    fn test_missing_answer_counts_as_wrong() {
        let questions = vec![mcq(1, CognitiveLevel::Apply), mcq(2, CognitiveLevel::Apply)];
        let mut answers = HashMap::new();
        answers.insert(1, "Right".to_string());

        let report = grade(&questions, &answers);
        assert_eq!(report.correct_count, 1);
        assert_eq!(report.mcq_total, 2);
        assert_eq!(report.score_percent, 50.0);
        assert_eq!(report.results[0].outcome, AnswerOutcome::Correct);
        assert_eq!(report.results[1].outcome, AnswerOutcome::Unanswered);
    }

    #[test]
    fn test_wrong_text_is_incorrect() {
        let questions = vec![mcq(1, CognitiveLevel::Apply)];
        let mut answers = HashMap::new();
        answers.insert(1, "Wrong A".to_string());

        let report = grade(&questions, &answers);
        assert_eq!(report.correct_count, 0);
        assert_eq!(report.score_percent, 0.0);
        assert_eq!(report.results[0].outcome, AnswerOutcome::Incorrect);
    }

    #[test]
    fn test_open_answers_are_recorded_but_not_graded() {
        let questions = vec![
            mcq(1, CognitiveLevel::Apply),
            open_question(2, CognitiveLevel::Create),
        ];
        let mut answers = HashMap::new();
        answers.insert(1, "Right".to_string());
        answers.insert(2, "an essay".to_string());

        let report = grade(&questions, &answers);
        assert_eq!(report.mcq_total, 1);
        assert_eq!(report.correct_count, 1);
        assert_eq!(report.results[1].outcome, AnswerOutcome::NotGraded);
        assert_eq!(report.score_percent, 100.0);
    }

    #[test]
    fn test_score_is_zero_without_mcqs() {
        let questions = vec![open_question(1, CognitiveLevel::Create)];
        let report = grade(&questions, &HashMap::new());
        assert_eq!(report.mcq_total, 0);
        assert_eq!(report.score_percent, 0.0);
    }
}
