//! Contracts for the remote practice backend and the HTTP adapter that speaks them.

mod http;
mod wire;

use async_trait::async_trait;

use practice_core::model::{AttemptId, MasteryUpdate, NextQuestion, Subject, SubjectReport, Topic};

use crate::error::RemoteError;

pub use http::HttpPracticeApi;

/// One answer as sent to the mastery service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub attempt_id: AttemptId,
    pub topic: Topic,
    pub correct: bool,
    pub answer: String,
}

/// Supplies practice items.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch the next item for `topic`, or for the next due topic when `topic`
    /// is `None`.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError::UnknownTopic` for a topic the source does not know,
    /// or other `RemoteError`s for transport and service failures.
    async fn next_question(
        &self,
        subject: &Subject,
        topic: Option<&Topic>,
    ) -> Result<NextQuestion, RemoteError>;
}

/// Records correctness signals and reports updated mastery.
#[async_trait]
pub trait MasteryService: Send + Sync {
    /// Record a single answer. Called at most once per `attempt_id` unless the
    /// previous call failed.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` for transport and service failures.
    async fn record(&self, submission: &Submission) -> Result<MasteryUpdate, RemoteError>;
}

/// Supplies the read-only subject dashboard.
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// # Errors
    ///
    /// Returns `RemoteError` for transport and service failures.
    async fn subject_report(&self, subject: &Subject) -> Result<SubjectReport, RemoteError>;
}
