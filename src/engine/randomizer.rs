// src/engine/randomizer.rs

use rand::Rng;
use rand::seq::SliceRandom;

use crate::models::exam::GeneratedQuestion;
use crate::models::question::{Question, QuestionKind};

/// Attaches a display permutation to every composed question. Each
/// multiple-choice question gets its own fresh permutation on every call;
/// the underlying records are untouched, so `correct_index` keeps
/// addressing the canonical option order.
pub fn randomize<R: Rng + ?Sized>(composed: Vec<Question>, rng: &mut R) -> Vec<GeneratedQuestion> {
    composed
        .into_iter()
        .map(|question| {
            let shuffled_options = match &question.kind {
                QuestionKind::MultipleChoice { options, .. } => {
                    let mut shuffled = options.clone();
                    shuffled.shuffle(rng);
                    Some(shuffled)
                }
                QuestionKind::Open => None,
            };
            GeneratedQuestion {
                question,
                shuffled_options,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::engine::fixtures::{mcq, open_question};
    use crate::models::question::CognitiveLevel;

    #[test]
    fn test_shuffled_options_are_a_permutation() {
        let questions = vec![mcq(1, CognitiveLevel::Apply), mcq(2, CognitiveLevel::Create)];
        let mut rng = StdRng::seed_from_u64(11);
        for generated in randomize(questions, &mut rng) {
            let mut shuffled = generated.shuffled_options.clone().unwrap();
            let mut canonical = generated.question.options().unwrap().to_vec();
            shuffled.sort();
            canonical.sort();
            assert_eq!(shuffled, canonical);
        }
    }

    #[test]
    fn test_correct_index_keeps_addressing_canonical_order() {
        let question = mcq(1, CognitiveLevel::Apply);
        let correct_before = question.options().unwrap()[1].clone();
        let mut rng = StdRng::seed_from_u64(12);
        let generated = randomize(vec![question], &mut rng).remove(0);
        assert_eq!(generated.question.options().unwrap()[1], correct_before);
    }

    #[test]
    fn test_open_questions_pass_through() {
        let mut rng = StdRng::seed_from_u64(13);
        let generated = randomize(vec![open_question(1, CognitiveLevel::Evaluate)], &mut rng);
        assert_eq!(generated.len(), 1);
        assert!(generated[0].shuffled_options.is_none());
    }

    #[test]
    fn test_each_question_is_shuffled_independently() {
        // Same question twice in one call: the two snapshots must not be
        // forced to share a permutation.
        let questions: Vec<Question> = (0..64).map(|_| mcq(1, CognitiveLevel::Apply)).collect();
        let mut rng = StdRng::seed_from_u64(14);
        let generated = randomize(questions, &mut rng);
        let first = generated[0].shuffled_options.clone().unwrap();
        assert!(
            generated
                .iter()
                .any(|g| g.shuffled_options.as_ref().unwrap() != &first)
        );
    }
}
