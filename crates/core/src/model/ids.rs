use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

/// Errors raised when a textual identifier is blank.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TopicError {
    #[error("{kind} must not be empty")]
    Empty { kind: &'static str },
}

/// Name of an independently tracked unit of subject content (e.g. "Fractions").
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    /// Creates a new `Topic` from a trimmed, non-empty name.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::Empty` if the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, TopicError> {
        non_blank(name.into(), "topic").map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Name of the subject a practice session draws its topics from.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Subject(String);

impl Subject {
    /// Creates a new `Subject` from a trimmed, non-empty name.
    ///
    /// # Errors
    ///
    /// Returns `TopicError::Empty` if the name is blank.
    pub fn new(name: impl Into<String>) -> Result<Self, TopicError> {
        non_blank(name.into(), "subject").map(Self)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn non_blank(raw: String, kind: &'static str) -> Result<String, TopicError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(TopicError::Empty { kind });
    }
    if trimmed.len() == raw.len() {
        Ok(raw)
    } else {
        Ok(trimmed.to_owned())
    }
}

/// Identifier of one practice session; a restart always yields a fresh one.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SessionId(u64);

impl SessionId {
    /// Creates a new `SessionId`
    #[must_use]
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The identifier that follows this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Idempotency key for one logical answer.
///
/// Minted once when an answer is first submitted and reused verbatim when the
/// same answer is resent after a failure.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttemptId(Uuid);

impl AttemptId {
    #[must_use]
    pub fn new_v4() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Topic({:?})", self.0)
    }
}

impl fmt::Debug for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Subject({:?})", self.0)
    }
}

impl fmt::Debug for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SessionId({})", self.0)
    }
}

impl fmt::Debug for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AttemptId({})", self.0)
    }
}

// ─── Display Implementations ───────────────────────────────────────────────────

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for AttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ─── Conversions ───────────────────────────────────────────────────────────────

impl FromStr for Topic {
    type Err = TopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl FromStr for Subject {
    type Err = TopicError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Topic {
    type Error = TopicError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<String> for Subject {
    type Error = TopicError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Topic> for String {
    fn from(value: Topic) -> Self {
        value.0
    }
}

impl From<Subject> for String {
    fn from(value: Subject) -> Self {
        value.0
    }
}

// ─── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn topic_is_trimmed() {
        let topic = Topic::new("  Fractions ").unwrap();
        assert_eq!(topic.as_str(), "Fractions");
        assert_eq!(topic.to_string(), "Fractions");
    }

    #[test]
    fn blank_topic_is_rejected() {
        let err = Topic::new("   ").unwrap_err();
        assert_eq!(err, TopicError::Empty { kind: "topic" });
    }

    #[test]
    fn subject_from_str() {
        let subject: Subject = "Mathematics".parse().unwrap();
        assert_eq!(subject.as_str(), "Mathematics");
        assert!("".parse::<Subject>().is_err());
    }

    #[test]
    fn topic_deserializes_with_validation() {
        let topic: Topic = serde_json::from_str("\"Decimals\"").unwrap();
        assert_eq!(topic.as_str(), "Decimals");
        assert!(serde_json::from_str::<Topic>("\"\"").is_err());
    }

    #[test]
    fn session_id_next_increments() {
        assert_eq!(SessionId::new(4).next(), SessionId::new(5));
    }

    #[test]
    fn attempt_ids_are_unique() {
        assert_ne!(AttemptId::new_v4(), AttemptId::new_v4());
    }
}
