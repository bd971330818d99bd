use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::ids::{AttemptId, SessionId, Topic};
use crate::model::mastery::MasteryPercent;
use crate::model::question::Question;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionStateError {
    #[error("session already graduated")]
    Graduated,

    #[error("no question is waiting for an answer")]
    NoPendingQuestion,

    #[error("attempt for {got} does not match pending question topic {expected}")]
    TopicMismatch { expected: Topic, got: Topic },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Graduated,
}

/// One answered question, in the order it was answered.
#[derive(Debug, Clone, PartialEq)]
pub struct Attempt {
    pub attempt_id: AttemptId,
    pub topic: Topic,
    pub correct: bool,
    pub mastery: MasteryPercent,
    pub answered_at: DateTime<Utc>,
}

/// Ephemeral practice run: the current question plus everything answered so far.
///
/// Holds at most one question at a time. Once graduated, no further questions
/// or attempts are accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    id: SessionId,
    topic: Option<Topic>,
    question: Option<Question>,
    answered: bool,
    history: Vec<Attempt>,
    status: SessionStatus,
    started_at: DateTime<Utc>,
}

impl Session {
    #[must_use]
    pub fn new(id: SessionId, started_at: DateTime<Utc>) -> Self {
        Self {
            id,
            topic: None,
            question: None,
            answered: false,
            history: Vec::new(),
            status: SessionStatus::Active,
            started_at,
        }
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn topic(&self) -> Option<&Topic> {
        self.topic.as_ref()
    }

    #[must_use]
    pub fn question(&self) -> Option<&Question> {
        self.question.as_ref()
    }

    /// The current question, if it has not been answered yet.
    #[must_use]
    pub fn pending_question(&self) -> Option<&Question> {
        self.question.as_ref().filter(|_| !self.answered)
    }

    #[must_use]
    pub fn history(&self) -> &[Attempt] {
        &self.history
    }

    #[must_use]
    pub fn status(&self) -> SessionStatus {
        self.status
    }

    #[must_use]
    pub fn is_graduated(&self) -> bool {
        self.status == SessionStatus::Graduated
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Replace the current question with a freshly issued one.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::Graduated` once the session is terminal.
    pub fn begin_question(&mut self, question: Question) -> Result<(), SessionStateError> {
        if self.is_graduated() {
            return Err(SessionStateError::Graduated);
        }
        self.topic = Some(question.topic().clone());
        self.question = Some(question);
        self.answered = false;
        Ok(())
    }

    /// Record the outcome of answering the pending question.
    ///
    /// # Errors
    ///
    /// Returns `SessionStateError::NoPendingQuestion` when nothing is awaiting an
    /// answer, and `SessionStateError::TopicMismatch` when the attempt names a
    /// different topic than the pending question.
    pub fn record_attempt(&mut self, attempt: Attempt) -> Result<&Attempt, SessionStateError> {
        if self.is_graduated() {
            return Err(SessionStateError::Graduated);
        }
        let pending = self
            .pending_question()
            .ok_or(SessionStateError::NoPendingQuestion)?;
        if pending.topic() != &attempt.topic {
            return Err(SessionStateError::TopicMismatch {
                expected: pending.topic().clone(),
                got: attempt.topic,
            });
        }

        self.answered = true;
        self.history.push(attempt);
        self.history.last().ok_or(SessionStateError::NoPendingQuestion)
    }

    /// Enter the terminal state. Idempotent.
    pub fn graduate(&mut self) {
        self.status = SessionStatus::Graduated;
    }

    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.history.iter().filter(|a| a.correct).count()
    }

    /// Fraction of attempts answered correctly, `None` before the first answer.
    #[must_use]
    pub fn accuracy(&self) -> Option<f64> {
        if self.history.is_empty() {
            return None;
        }
        #[allow(clippy::cast_precision_loss)]
        let ratio = self.correct_count() as f64 / self.history.len() as f64;
        Some(ratio)
    }

    pub fn attempts_for<'a>(&'a self, topic: &'a Topic) -> impl Iterator<Item = &'a Attempt> {
        self.history.iter().filter(move |a| &a.topic == topic)
    }

    /// Most recent mastery the service reported for `topic` in this session.
    #[must_use]
    pub fn latest_mastery(&self, topic: &Topic) -> Option<MasteryPercent> {
        self.attempts_for(topic).last().map(|a| a.mastery)
    }
}
