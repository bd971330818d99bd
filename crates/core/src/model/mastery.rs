use serde::Serialize;
use std::fmt;
use thiserror::Error;

use crate::model::ids::Topic;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum MasteryError {
    #[error("mastery {0} is outside [0, 100]")]
    OutOfRange(f64),
}

/// Proficiency estimate for a topic, as a percentage in `[0, 100]`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize)]
pub struct MasteryPercent(f64);

impl MasteryPercent {
    pub const MIN: Self = Self(0.0);
    pub const MAX: Self = Self(100.0);

    /// # Errors
    ///
    /// Returns `MasteryError::OutOfRange` for non-finite values or values
    /// outside `[0, 100]`.
    pub fn new(value: f64) -> Result<Self, MasteryError> {
        if value.is_finite() && (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(MasteryError::OutOfRange(value))
        }
    }

    #[must_use]
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for MasteryPercent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{:.0}%", self.0)
        } else {
            write!(f, "{:.1}%", self.0)
        }
    }
}

/// Result of recording one answer with the mastery service.
#[derive(Debug, Clone, PartialEq)]
pub struct MasteryUpdate {
    pub topic: Topic,
    pub mastery: MasteryPercent,
    pub feedback: Option<String>,
    pub graduated: bool,
    pub show_hint: bool,
    /// The service's own verdict on the answer, when it reports one.
    pub correct: Option<bool>,
}

impl MasteryUpdate {
    #[must_use]
    pub fn new(topic: Topic, mastery: MasteryPercent) -> Self {
        Self {
            topic,
            mastery,
            feedback: None,
            graduated: false,
            show_hint: false,
            correct: None,
        }
    }

    #[must_use]
    pub fn with_feedback(mut self, feedback: impl Into<String>) -> Self {
        let feedback = feedback.into();
        self.feedback = (!feedback.trim().is_empty()).then_some(feedback);
        self
    }

    #[must_use]
    pub fn graduated(mut self, graduated: bool) -> Self {
        self.graduated = graduated;
        self
    }

    #[must_use]
    pub fn with_show_hint(mut self, show_hint: bool) -> Self {
        self.show_hint = show_hint;
        self
    }

    #[must_use]
    pub fn with_verdict(mut self, correct: Option<bool>) -> Self {
        self.correct = correct;
        self
    }
}
