mod controller;
mod feedback;
mod view;

// Public API of the session subsystem.
pub use crate::error::{Command, SessionError};
pub use controller::SessionController;
pub use feedback::HINT;
pub use view::{FeedbackView, QuestionView, SessionPhase, SessionSnapshot};
