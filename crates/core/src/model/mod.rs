mod ids;
mod mastery;
mod question;
mod report;
mod session;

pub use ids::{AttemptId, SessionId, Subject, Topic, TopicError};
pub use mastery::{MasteryError, MasteryPercent, MasteryUpdate};
pub use question::{
    Difficulty, NextQuestion, PredictedSuccess, Question, QuestionError, QuestionReasoning,
};
pub use report::SubjectReport;
pub use session::{Attempt, Session, SessionStateError, SessionStatus};
