use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::ids::Topic;

//
// ─── ERRORS ───────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question prompt is empty")]
    EmptyPrompt,
    #[error("predicted success {0} is outside [0, 1]")]
    PredictedSuccessOutOfRange(f64),
}

//
// ─── DIFFICULTY ───────────────────────────────────────────────────────────────
//

/// Difficulty band assigned to a question by the question source.
///
/// Labels outside the known bands are preserved rather than rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Other(String),
}

impl Difficulty {
    #[must_use]
    pub fn from_label(label: &str) -> Self {
        let label = label.trim();
        match label.to_lowercase().as_str() {
            "easy" => Self::Easy,
            "medium" => Self::Medium,
            "hard" => Self::Hard,
            _ => Self::Other(label.to_owned()),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Other(label) => label,
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

//
// ─── PREDICTED SUCCESS ────────────────────────────────────────────────────────
//

/// Probability in `[0, 1]` that the learner answers the question correctly.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct PredictedSuccess(f64);

impl PredictedSuccess {
    /// # Errors
    ///
    /// Returns `QuestionError::PredictedSuccessOutOfRange` for non-finite values
    /// or values outside `[0, 1]`.
    pub fn new(value: f64) -> Result<Self, QuestionError> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(QuestionError::PredictedSuccessOutOfRange(value))
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }

    /// Whole percentage, rounded to nearest.
    #[must_use]
    pub fn as_percent(self) -> u8 {
        // Bounded by construction to 0..=100.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let percent = (self.0 * 100.0).round() as u8;
        percent
    }
}

//
// ─── QUESTION ─────────────────────────────────────────────────────────────────
//

/// Explanations the question source attaches to its choice of item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionReasoning {
    pub topic_reasoning: Option<String>,
    pub difficulty_reasoning: Option<String>,
    pub ml_reasoning: Option<String>,
    pub hint_reasoning: Option<String>,
}

impl QuestionReasoning {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topic_reasoning.is_none()
            && self.difficulty_reasoning.is_none()
            && self.ml_reasoning.is_none()
            && self.hint_reasoning.is_none()
    }
}

/// A single practice item.
///
/// `expected_answer` is only present when the source exposes it; without it the
/// answer cannot be graded locally.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    topic: Topic,
    prompt: String,
    expected_answer: Option<String>,
    difficulty: Difficulty,
    predicted_success: PredictedSuccess,
    show_hint: bool,
    reasoning: Option<QuestionReasoning>,
}

impl Question {
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyPrompt` if the prompt is blank.
    pub fn new(
        topic: Topic,
        prompt: impl Into<String>,
        difficulty: Difficulty,
        predicted_success: PredictedSuccess,
    ) -> Result<Self, QuestionError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(QuestionError::EmptyPrompt);
        }
        Ok(Self {
            topic,
            prompt,
            expected_answer: None,
            difficulty,
            predicted_success,
            show_hint: false,
            reasoning: None,
        })
    }

    /// Attach the expected answer. Blank answers are treated as absent.
    #[must_use]
    pub fn with_expected_answer(mut self, answer: impl Into<String>) -> Self {
        let answer = answer.into();
        self.expected_answer = if answer.trim().is_empty() {
            None
        } else {
            Some(answer)
        };
        self
    }

    #[must_use]
    pub fn with_show_hint(mut self, show_hint: bool) -> Self {
        self.show_hint = show_hint;
        self
    }

    #[must_use]
    pub fn with_reasoning(mut self, reasoning: QuestionReasoning) -> Self {
        self.reasoning = (!reasoning.is_empty()).then_some(reasoning);
        self
    }

    #[must_use]
    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn expected_answer(&self) -> Option<&str> {
        self.expected_answer.as_deref()
    }

    #[must_use]
    pub fn difficulty(&self) -> &Difficulty {
        &self.difficulty
    }

    #[must_use]
    pub fn predicted_success(&self) -> PredictedSuccess {
        self.predicted_success
    }

    #[must_use]
    pub fn show_hint(&self) -> bool {
        self.show_hint
    }

    #[must_use]
    pub fn reasoning(&self) -> Option<&QuestionReasoning> {
        self.reasoning.as_ref()
    }
}

/// What the question source hands back: another item, or subject-wide completion.
#[derive(Debug, Clone, PartialEq)]
pub enum NextQuestion {
    Question(Question),
    Graduated,
}
