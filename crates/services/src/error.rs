//! Shared error types for the services crate.

use thiserror::Error;

use practice_core::model::Topic;

use crate::sessions::SessionPhase;

/// Failures reported by a remote practice backend adapter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RemoteError {
    #[error("transport failure: {0}")]
    Transport(String),
    #[error("practice service responded with status {0}")]
    Status(u16),
    #[error("practice service rejected the request: {0}")]
    Rejected(String),
    #[error("unknown topic: {0}")]
    UnknownTopic(Topic),
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RemoteError {
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, RemoteError::Transport(_))
    }
}

impl From<reqwest::Error> for RemoteError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RemoteError::Malformed(err.to_string())
        } else if let Some(status) = err.status() {
            RemoteError::Status(status.as_u16())
        } else {
            RemoteError::Transport(err.to_string())
        }
    }
}

impl From<practice_core::Error> for RemoteError {
    fn from(err: practice_core::Error) -> Self {
        RemoteError::Malformed(err.to_string())
    }
}

/// Commands a view can issue against a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    SubmitAnswer,
    Advance,
    Hint,
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Command::Start => "start",
            Command::SubmitAnswer => "submit",
            Command::Advance => "advance",
            Command::Hint => "hint",
        })
    }
}

/// Errors emitted by the session controller.
///
/// Every variant leaves the session exactly as it was before the command.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("cannot {command} while {phase}")]
    InvalidState {
        command: Command,
        phase: SessionPhase,
    },
    #[error("unknown topic: {0}")]
    InvalidTopic(Topic),
    #[error("network failure, try again: {0}")]
    NetworkFailure(String),
    #[error("practice service error, try again: {0}")]
    ServiceError(String),
    #[error("session already graduated")]
    GraduatedTerminal,
    #[error("answer is empty")]
    EmptyAnswer,
    #[error("session was restarted while the request was in flight")]
    Superseded,
}

impl SessionError {
    /// Re-issuing the same command may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SessionError::NetworkFailure(_) | SessionError::ServiceError(_)
        )
    }

    /// Reported for commands after graduation; nothing needs recovering.
    #[must_use]
    pub fn is_terminal_noop(&self) -> bool {
        matches!(self, SessionError::GraduatedTerminal)
    }

    /// Classify a failed answer submission. The answer is kept for a retry, so
    /// every failure is reported as retryable.
    #[must_use]
    pub fn submission_failed(err: RemoteError) -> Self {
        match err {
            RemoteError::Transport(msg) => SessionError::NetworkFailure(msg),
            other => SessionError::ServiceError(other.to_string()),
        }
    }
}

impl From<RemoteError> for SessionError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Transport(msg) => SessionError::NetworkFailure(msg),
            RemoteError::UnknownTopic(topic) => SessionError::InvalidTopic(topic),
            other => SessionError::ServiceError(other.to_string()),
        }
    }
}

/// Errors raised while loading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid API url {raw}: {reason}")]
    InvalidUrl { raw: String, reason: String },
    #[error("invalid subject: {0}")]
    InvalidSubject(String),
    #[error("invalid topic: {0}")]
    InvalidTopic(String),
    #[error("invalid timeout seconds: {0}")]
    InvalidTimeout(String),
}

/// Errors emitted by `SubjectReportService`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReportError {
    #[error(transparent)]
    Remote(#[from] RemoteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_errors_map_to_session_kinds() {
        let topic = Topic::new("Geometry").unwrap();
        assert_eq!(
            SessionError::from(RemoteError::UnknownTopic(topic.clone())),
            SessionError::InvalidTopic(topic)
        );
        assert!(matches!(
            SessionError::from(RemoteError::Transport("reset".into())),
            SessionError::NetworkFailure(_)
        ));
        assert!(matches!(
            SessionError::from(RemoteError::Status(500)),
            SessionError::ServiceError(_)
        ));
        assert!(matches!(
            SessionError::from(RemoteError::Malformed("no mastery".into())),
            SessionError::ServiceError(_)
        ));
    }

    #[test]
    fn submission_failures_are_always_retryable() {
        let topic = Topic::new("Fractions").unwrap();
        for err in [
            RemoteError::UnknownTopic(topic),
            RemoteError::Status(404),
            RemoteError::Rejected("busy".into()),
            RemoteError::Transport("reset".into()),
        ] {
            assert!(SessionError::submission_failed(err).is_retryable());
        }
    }

    #[test]
    fn retry_and_terminal_classification() {
        assert!(SessionError::NetworkFailure(String::new()).is_retryable());
        assert!(SessionError::ServiceError(String::new()).is_retryable());
        assert!(!SessionError::GraduatedTerminal.is_retryable());
        assert!(SessionError::GraduatedTerminal.is_terminal_noop());
        assert!(!SessionError::EmptyAnswer.is_terminal_noop());
    }

    #[test]
    fn invalid_state_message_names_command_and_phase() {
        let err = SessionError::InvalidState {
            command: Command::SubmitAnswer,
            phase: SessionPhase::Feedback,
        };
        assert_eq!(err.to_string(), "cannot submit while feedback");
    }
}
