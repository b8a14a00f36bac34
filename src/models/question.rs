// src/models/question.rs

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Difficulty assigned to questions created without an explicit rating.
pub const DEFAULT_QUESTION_DIFFICULTY: i64 = 2;

/// Cognitive level of a question, following Bloom's taxonomy.
/// The set is closed: difficulty tiers are derived from it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CognitiveLevel {
    Remember,
    Understand,
    Apply,
    Analyze,
    Evaluate,
    Create,
}

impl CognitiveLevel {
    pub const ALL: [CognitiveLevel; 6] = [
        CognitiveLevel::Remember,
        CognitiveLevel::Understand,
        CognitiveLevel::Apply,
        CognitiveLevel::Analyze,
        CognitiveLevel::Evaluate,
        CognitiveLevel::Create,
    ];

    /// Canonical string form, as stored in the `bloom_level` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            CognitiveLevel::Remember => "Remember",
            CognitiveLevel::Understand => "Understand",
            CognitiveLevel::Apply => "Apply",
            CognitiveLevel::Analyze => "Analyze",
            CognitiveLevel::Evaluate => "Evaluate",
            CognitiveLevel::Create => "Create",
        }
    }
}

impl std::str::FromStr for CognitiveLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CognitiveLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or(())
    }
}

impl std::fmt::Display for CognitiveLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The variant half of a question. The `type` tag is part of the wire and
/// storage format, so a record is never classified by which fields happen
/// to be present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum QuestionKind {
    #[serde(rename = "mcq")]
    MultipleChoice {
        /// Canonical option order. `correct_index` addresses this order,
        /// no matter how a presentation layer shuffles a copy.
        options: Vec<String>,
        correct_index: usize,
    },
    #[serde(rename = "open")]
    Open,
}

impl QuestionKind {
    /// Storage tag for the `questions.type` column.
    pub fn tag(&self) -> &'static str {
        match self {
            QuestionKind::MultipleChoice { .. } => "mcq",
            QuestionKind::Open => "open",
        }
    }

    pub fn is_multiple_choice(&self) -> bool {
        matches!(self, QuestionKind::MultipleChoice { .. })
    }
}

/// Represents one record of the question bank ('questions' table).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,

    pub question_text: String,

    pub cognitive_level: CognitiveLevel,

    /// Free-form grouping label. Questions without a topic only ever match
    /// other topic-less questions in attribute filters.
    pub topic: Option<String>,

    /// Author-rated difficulty on a 1..=5 scale, independent of the tier
    /// derived from `cognitive_level`.
    pub difficulty: i64,

    pub explanation: Option<String>,

    /// Opaque reference to an attached illustration, passed through as-is.
    pub image_data: Option<String>,

    pub created_at: Option<chrono::DateTime<chrono::Utc>>,

    #[serde(flatten)]
    pub kind: QuestionKind,
}

impl Question {
    /// The canonical options slice, or `None` for an open question.
    pub fn options(&self) -> Option<&[String]> {
        match &self.kind {
            QuestionKind::MultipleChoice { options, .. } => Some(options),
            QuestionKind::Open => None,
        }
    }
}

/// Field set for inserting a question; id and timestamp are assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub question_text: String,
    pub cognitive_level: CognitiveLevel,
    pub topic: Option<String>,
    pub difficulty: i64,
    pub explanation: Option<String>,
    pub image_data: Option<String>,
    pub kind: QuestionKind,
}

/// DTO for adding a question to the bank.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question_text: String,

    pub cognitive_level: CognitiveLevel,

    #[validate(length(min = 1, max = 200))]
    pub topic: Option<String>,

    /// Defaults to `DEFAULT_QUESTION_DIFFICULTY` when omitted.
    #[validate(range(min = 1, max = 5))]
    pub difficulty: Option<i64>,

    #[validate(length(max = 2000))]
    pub explanation: Option<String>,

    pub image_data: Option<String>,

    #[serde(flatten)]
    pub kind: CreateQuestionKind,
}

/// Variant payload of [`CreateQuestionRequest`], same tag as the stored kind.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
pub enum CreateQuestionKind {
    #[serde(rename = "mcq")]
    MultipleChoice {
        options: Vec<String>,
        correct_index: usize,
    },
    #[serde(rename = "open")]
    Open,
}

impl From<CreateQuestionKind> for QuestionKind {
    fn from(kind: CreateQuestionKind) -> Self {
        match kind {
            CreateQuestionKind::MultipleChoice {
                options,
                correct_index,
            } => QuestionKind::MultipleChoice {
                options,
                correct_index,
            },
            CreateQuestionKind::Open => QuestionKind::Open,
        }
    }
}

impl CreateQuestionKind {
    /// Checks the invariants that span fields: at least two non-empty
    /// options, and a correct index inside them.
    pub fn check(&self) -> Result<(), String> {
        match self {
            CreateQuestionKind::MultipleChoice {
                options,
                correct_index,
            } => {
                if validate_options(options).is_err() {
                    return Err(
                        "A multiple-choice question needs at least 2 non-empty options".to_string(),
                    );
                }
                if *correct_index >= options.len() {
                    return Err(format!(
                        "correct_index {} is out of range for {} options",
                        correct_index,
                        options.len()
                    ));
                }
                Ok(())
            }
            CreateQuestionKind::Open => Ok(()),
        }
    }
}

/// DTO for partially updating a question. Absent fields are left untouched;
/// the kind itself cannot change after creation.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateQuestionRequest {
    #[validate(length(min = 1, max = 2000))]
    pub question_text: Option<String>,

    pub cognitive_level: Option<CognitiveLevel>,

    #[validate(length(min = 1, max = 200))]
    pub topic: Option<String>,

    #[validate(range(min = 1, max = 5))]
    pub difficulty: Option<i64>,

    #[validate(length(max = 2000))]
    pub explanation: Option<String>,

    pub image_data: Option<String>,

    #[validate(custom(function = validate_options))]
    pub options: Option<Vec<String>>,

    pub correct_index: Option<usize>,
}

impl UpdateQuestionRequest {
    /// Folds the patch into an existing question. Option lists and the
    /// correct index are re-checked together against the merged state.
    pub fn apply_to(&self, question: &mut Question) -> Result<(), String> {
        if let Some(text) = &self.question_text {
            question.question_text = text.clone();
        }
        if let Some(level) = self.cognitive_level {
            question.cognitive_level = level;
        }
        if let Some(topic) = &self.topic {
            question.topic = Some(topic.clone());
        }
        if let Some(difficulty) = self.difficulty {
            question.difficulty = difficulty;
        }
        if let Some(explanation) = &self.explanation {
            question.explanation = Some(explanation.clone());
        }
        if let Some(image) = &self.image_data {
            question.image_data = Some(image.clone());
        }

        match &mut question.kind {
            QuestionKind::MultipleChoice {
                options,
                correct_index,
            } => {
                if let Some(new_options) = &self.options {
                    *options = new_options.clone();
                }
                if let Some(new_index) = self.correct_index {
                    *correct_index = new_index;
                }
                CreateQuestionKind::MultipleChoice {
                    options: options.clone(),
                    correct_index: *correct_index,
                }
                .check()
            }
            QuestionKind::Open => {
                if self.options.is_some() || self.correct_index.is_some() {
                    return Err("An open question has no options".to_string());
                }
                Ok(())
            }
        }
    }
}

fn validate_options(options: &[String]) -> Result<(), validator::ValidationError> {
    if options.len() < 2 {
        return Err(validator::ValidationError::new("too_few_options"));
    }
    for opt in options {
        if opt.trim().is_empty() {
            return Err(validator::ValidationError::new("option_empty"));
        }
        if opt.len() > 500 {
            return Err(validator::ValidationError::new("option_too_long"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mcq_kind(options: &[&str], correct_index: usize) -> QuestionKind {
        QuestionKind::MultipleChoice {
            options: options.iter().map(|s| s.to_string()).collect(),
            correct_index,
        }
    }

    #[test]
    fn test_kind_round_trips_through_tag() {
        let mcq = mcq_kind(&["a", "b"], 1);
        let json = serde_json::to_value(&mcq).unwrap();
        assert_eq!(json["type"], "mcq");
        assert_eq!(serde_json::from_value::<QuestionKind>(json).unwrap(), mcq);

        let open = serde_json::to_value(QuestionKind::Open).unwrap();
        assert_eq!(open["type"], "open");
    }

    #[test]
    fn test_untagged_payload_is_rejected() {
        // Options alone must not make a record multiple-choice.
        let raw = serde_json::json!({ "options": ["a", "b"], "correct_index": 0 });
        assert!(serde_json::from_value::<QuestionKind>(raw).is_err());
    }

    #[test]
    fn test_create_kind_checks() {
        let too_few = CreateQuestionKind::MultipleChoice {
            options: vec!["only one".to_string()],
            correct_index: 0,
        };
        assert!(too_few.check().is_err());

        let blank = CreateQuestionKind::MultipleChoice {
            options: vec!["a".to_string(), "   ".to_string()],
            correct_index: 0,
        };
        assert!(blank.check().is_err());

        let out_of_range = CreateQuestionKind::MultipleChoice {
            options: vec!["a".to_string(), "b".to_string()],
            correct_index: 2,
        };
        assert!(out_of_range.check().is_err());

        assert!(CreateQuestionKind::Open.check().is_ok());
    }

    #[test]
    fn test_patch_keeps_index_and_options_consistent() {
        let mut question = Question {
            id: 1,
            question_text: "q".to_string(),
            cognitive_level: CognitiveLevel::Apply,
            topic: None,
            difficulty: 2,
            explanation: None,
            image_data: None,
            created_at: None,
            kind: mcq_kind(&["a", "b", "c"], 2),
        };

        // Shrinking the option list without moving the index must fail.
        let patch: UpdateQuestionRequest = serde_json::from_value(serde_json::json!({
            "options": ["x", "y"]
        }))
        .unwrap();
        assert!(patch.apply_to(&mut question.clone()).is_err());

        let patch: UpdateQuestionRequest = serde_json::from_value(serde_json::json!({
            "options": ["x", "y"],
            "correct_index": 0
        }))
        .unwrap();
        patch.apply_to(&mut question).unwrap();
        assert_eq!(question.options().unwrap(), ["x", "y"]);
    }
}
