#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod remote;
pub mod reports;
pub mod sessions;

pub use practice_core::Clock;

pub use config::PracticeConfig;
pub use error::{ConfigError, RemoteError, ReportError, SessionError};
pub use remote::{HttpPracticeApi, MasteryService, QuestionSource, ReportSource, Submission};
pub use reports::{PracticeTarget, SubjectReportService};
pub use sessions::{
    Command, FeedbackView, HINT, QuestionView, SessionController, SessionPhase, SessionSnapshot,
};
