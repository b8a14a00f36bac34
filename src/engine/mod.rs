// src/engine/mod.rs
//
// Pure exam computation. Nothing in here touches the store or the network;
// randomness is always injected by the caller.

pub mod classifier;
pub mod composer;
pub mod randomizer;
pub mod scoring;

use crate::models::question::Question;

/// The question bank split by kind, the shape composition and statistics
/// work over.
#[derive(Debug, Clone, Default)]
pub struct QuestionBank {
    pub multiple_choice: Vec<Question>,
    pub open_ended: Vec<Question>,
}

impl QuestionBank {
    /// Splits a flat question list on the kind tag.
    pub fn partition(questions: Vec<Question>) -> Self {
        let mut bank = QuestionBank::default();
        for question in questions {
            if question.kind.is_multiple_choice() {
                bank.multiple_choice.push(question);
            } else {
                bank.open_ended.push(question);
            }
        }
        bank
    }
}
