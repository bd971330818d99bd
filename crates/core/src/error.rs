use thiserror::Error;

use crate::model::{MasteryError, QuestionError, SessionStateError, TopicError};

/// Any domain validation failure raised by this crate.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    #[error(transparent)]
    Topic(#[from] TopicError),
    #[error(transparent)]
    Question(#[from] QuestionError),
    #[error(transparent)]
    Mastery(#[from] MasteryError),
    #[error(transparent)]
    SessionState(#[from] SessionStateError),
}
