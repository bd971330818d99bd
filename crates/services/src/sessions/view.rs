use std::fmt;

use practice_core::model::{
    Difficulty, MasteryPercent, Question, QuestionReasoning, SessionId, SessionStatus, Topic,
};

/// Externally visible controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Loading,
    AwaitingAnswer,
    Feedback,
    Graduated,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Loading => "loading",
            SessionPhase::AwaitingAnswer => "awaiting answer",
            SessionPhase::Feedback => "feedback",
            SessionPhase::Graduated => "graduated",
        })
    }
}

/// Question as shown to the learner. The expected answer is never exposed here.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionView {
    pub topic: Topic,
    pub prompt: String,
    pub difficulty: Difficulty,
    pub predicted_success_percent: u8,
    pub reasoning: Option<QuestionReasoning>,
}

impl QuestionView {
    #[must_use]
    pub fn from_question(question: &Question) -> Self {
        Self {
            topic: question.topic().clone(),
            prompt: question.prompt().to_owned(),
            difficulty: question.difficulty().clone(),
            predicted_success_percent: question.predicted_success().as_percent(),
            reasoning: question.reasoning().cloned(),
        }
    }
}

/// Outcome of the last accepted answer.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedbackView {
    pub correct: bool,
    pub message: String,
    /// `"Correct Answer: ..."` when the answer was wrong and the expected answer is known.
    pub solution: Option<String>,
    pub mastery: MasteryPercent,
}

/// Detached copy of everything a view needs to render one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub session_id: SessionId,
    pub phase: SessionPhase,
    pub status: SessionStatus,
    pub topic: Option<Topic>,
    pub question: Option<QuestionView>,
    pub feedback: Option<FeedbackView>,
    /// Latest mastery reported for the current topic.
    pub mastery: Option<MasteryPercent>,
    /// A submission is in flight.
    pub submitting: bool,
    /// A failed submission is retained and will be resent as-is.
    pub retry_pending: bool,
    pub show_hint: bool,
    pub answered: usize,
    pub correct: usize,
}

impl SessionSnapshot {
    #[must_use]
    pub fn is_graduated(&self) -> bool {
        self.phase == SessionPhase::Graduated
    }
}
