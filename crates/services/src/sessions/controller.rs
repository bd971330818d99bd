use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, info, warn};

use practice_core::evaluator::{self, Verdict};
use practice_core::model::{
    Attempt, AttemptId, MasteryPercent, MasteryUpdate, NextQuestion, Session, SessionId, Subject,
    Topic,
};
use practice_core::Clock;

use crate::error::{Command, RemoteError, SessionError};
use crate::remote::{MasteryService, QuestionSource, Submission};

use super::feedback::{self, HINT};
use super::view::{FeedbackView, QuestionView, SessionPhase, SessionSnapshot};

//
// ─── INTERNAL STATE ───────────────────────────────────────────────────────────
//

/// Identifies one remote call. A response is applied only while its ticket is
/// still the one in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Ticket {
    generation: u64,
    seq: u64,
}

/// An answer that has been graded locally and sent (or is about to be sent).
#[derive(Debug, Clone)]
struct PendingSubmission {
    attempt_id: AttemptId,
    topic: Topic,
    verdict: Verdict,
    correct: bool,
    answer: String,
}

impl PendingSubmission {
    fn to_submission(&self) -> Submission {
        Submission {
            attempt_id: self.attempt_id,
            topic: self.topic.clone(),
            correct: self.correct,
            answer: self.answer.clone(),
        }
    }
}

#[derive(Debug)]
enum Phase {
    Idle,
    /// `resume` is restored if the request fails.
    Loading { resume: Resume },
    AwaitingAnswer { pending: Option<PendingSubmission> },
    Feedback,
    Graduated,
}

#[derive(Debug, Clone, Copy)]
enum Resume {
    Idle,
    Feedback,
}

impl From<Resume> for Phase {
    fn from(resume: Resume) -> Self {
        match resume {
            Resume::Idle => Phase::Idle,
            Resume::Feedback => Phase::Feedback,
        }
    }
}

impl Phase {
    fn tag(&self) -> SessionPhase {
        match self {
            Phase::Idle => SessionPhase::Idle,
            Phase::Loading { .. } => SessionPhase::Loading,
            Phase::AwaitingAnswer { .. } => SessionPhase::AwaitingAnswer,
            Phase::Feedback => SessionPhase::Feedback,
            Phase::Graduated => SessionPhase::Graduated,
        }
    }
}

#[derive(Debug)]
struct Inner {
    session: Session,
    phase: Phase,
    /// Topic the learner asked for; `None` lets the source pick the next due one.
    requested: Option<Topic>,
    feedback: Option<FeedbackView>,
    mastery: Option<MasteryPercent>,
    show_hint: bool,
    generation: u64,
    seq: u64,
    in_flight: Option<Ticket>,
}

impl Inner {
    fn fresh(session: Session, generation: u64) -> Self {
        Self {
            session,
            phase: Phase::Idle,
            requested: None,
            feedback: None,
            mastery: None,
            show_hint: false,
            generation,
            seq: 0,
            in_flight: None,
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.seq += 1;
        let ticket = Ticket {
            generation: self.generation,
            seq: self.seq,
        };
        self.in_flight = Some(ticket);
        ticket
    }

    /// Clears the in-flight marker if `ticket` still owns it.
    fn settle(&mut self, ticket: Ticket) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
            true
        } else {
            false
        }
    }

    fn guard_graduated(&self) -> Result<(), SessionError> {
        if self.session.is_graduated() {
            Err(SessionError::GraduatedTerminal)
        } else {
            Ok(())
        }
    }

    fn invalid(&self, command: Command) -> SessionError {
        SessionError::InvalidState {
            command,
            phase: self.phase.tag(),
        }
    }

    fn snapshot(&self) -> SessionSnapshot {
        let (submitting, retry_pending) = match &self.phase {
            Phase::AwaitingAnswer { pending } => {
                let submitting = self.in_flight.is_some();
                (submitting, pending.is_some() && !submitting)
            }
            _ => (false, false),
        };
        let question = match self.phase {
            Phase::AwaitingAnswer { .. } | Phase::Feedback => self.session.question(),
            _ => None,
        };

        SessionSnapshot {
            session_id: self.session.id(),
            phase: self.phase.tag(),
            status: self.session.status(),
            topic: self.session.topic().cloned(),
            question: question.map(QuestionView::from_question),
            feedback: self.feedback.clone(),
            mastery: self.mastery,
            submitting,
            retry_pending,
            show_hint: self.show_hint,
            answered: self.session.history().len(),
            correct: self.session.correct_count(),
        }
    }
}

//
// ─── CONTROLLER ───────────────────────────────────────────────────────────────
//

/// Owns one practice session and sequences it:
/// question → answer → mastery update → feedback → next question or graduation.
///
/// Commands take `&self` and may be issued from concurrent tasks. A command that
/// does not fit the current phase (including one that overlaps an in-flight
/// request) is rejected with `SessionError::InvalidState`; nothing is queued.
/// The state lock is never held across a remote call.
pub struct SessionController {
    subject: Subject,
    questions: Arc<dyn QuestionSource>,
    mastery: Arc<dyn MasteryService>,
    clock: Clock,
    inner: Mutex<Inner>,
    updates: watch::Sender<SessionSnapshot>,
}

impl SessionController {
    #[must_use]
    pub fn new(
        subject: Subject,
        questions: Arc<dyn QuestionSource>,
        mastery: Arc<dyn MasteryService>,
    ) -> Self {
        let clock = Clock::default();
        let inner = Inner::fresh(Session::new(SessionId::new(1), clock.now()), 0);
        let (updates, _) = watch::channel(inner.snapshot());
        Self {
            subject,
            questions,
            mastery,
            clock,
            inner: Mutex::new(inner),
            updates,
        }
    }

    /// Use `clock` for session and attempt timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        let inner = self.inner.get_mut().unwrap_or_else(PoisonError::into_inner);
        let id = inner.session.id();
        inner.session = Session::new(id, clock.now());
        self
    }

    #[must_use]
    pub fn subject(&self) -> &Subject {
        &self.subject
    }

    /// Receive a snapshot after every committed transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.updates.subscribe()
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    /// Answers recorded in the current session, oldest first.
    #[must_use]
    pub fn attempts(&self) -> Vec<Attempt> {
        self.lock().session.history().to_vec()
    }

    /// Request the first question, for `topic` or for the next due topic.
    ///
    /// Valid from `Idle`, and from `Feedback` to switch topics.
    ///
    /// # Errors
    ///
    /// - `SessionError::GraduatedTerminal` once the session has graduated
    /// - `SessionError::InvalidState` from any other phase
    /// - `SessionError::InvalidTopic` if the source does not know `topic`
    /// - `SessionError::NetworkFailure` / `SessionError::ServiceError` on remote failures
    /// - `SessionError::Superseded` if the session was restarted meanwhile
    pub async fn start(&self, topic: Option<Topic>) -> Result<SessionSnapshot, SessionError> {
        self.load_next(Command::Start, topic).await
    }

    /// Request the next question after feedback, keeping the topic choice from `start`.
    ///
    /// # Errors
    ///
    /// Same as [`SessionController::start`]; only valid from `Feedback`.
    pub async fn advance(&self) -> Result<SessionSnapshot, SessionError> {
        let requested = self.lock().requested.clone();
        self.load_next(Command::Advance, requested).await
    }

    /// Grade `raw` and report it to the mastery service.
    ///
    /// If a previous submission for the current question failed, that submission
    /// is resent unchanged and `raw` is ignored.
    ///
    /// # Errors
    ///
    /// - `SessionError::GraduatedTerminal` once the session has graduated
    /// - `SessionError::InvalidState` unless a question is awaiting an answer
    /// - `SessionError::EmptyAnswer` for blank input
    /// - `SessionError::NetworkFailure` / `SessionError::ServiceError` on remote
    ///   failures; the graded answer is kept for a retry
    /// - `SessionError::Superseded` if the session was restarted meanwhile
    pub async fn submit_answer(&self, raw: &str) -> Result<SessionSnapshot, SessionError> {
        self.submit(Some(raw)).await
    }

    /// Resend the submission retained after a failed `submit_answer`.
    ///
    /// # Errors
    ///
    /// `SessionError::InvalidState` when nothing is retained; otherwise as
    /// [`SessionController::submit_answer`].
    pub async fn retry_submission(&self) -> Result<SessionSnapshot, SessionError> {
        self.submit(None).await
    }

    /// Fixed advisory text. No state change and no remote call.
    ///
    /// # Errors
    ///
    /// `SessionError::InvalidState` unless a question is awaiting an answer.
    pub fn hint(&self) -> Result<&'static str, SessionError> {
        let inner = self.lock();
        match inner.phase {
            Phase::AwaitingAnswer { .. } => Ok(HINT),
            _ => Err(inner.invalid(Command::Hint)),
        }
    }

    /// Tear down the current session and begin a fresh one in `Idle`.
    ///
    /// Valid in every phase. Responses still in flight for the old session are
    /// discarded when they arrive.
    pub fn restart(&self) -> SessionSnapshot {
        let mut inner = self.lock();
        let next_id = inner.session.id().next();
        let generation = inner.generation + 1;
        if inner.in_flight.is_some() {
            debug!(session = %inner.session.id(), "restart abandons in-flight request");
        }
        let elapsed = self.clock.elapsed_since(inner.session.started_at());
        debug!(
            session = %inner.session.id(),
            answered = inner.session.history().len(),
            elapsed_secs = elapsed.num_seconds(),
            "session closed"
        );
        *inner = Inner::fresh(Session::new(next_id, self.clock.now()), generation);
        debug!(session = %next_id, "session restarted");
        self.publish(&inner)
    }

    //
    // ─── TRANSITIONS ──────────────────────────────────────────────────────────
    //

    async fn load_next(
        &self,
        command: Command,
        topic: Option<Topic>,
    ) -> Result<SessionSnapshot, SessionError> {
        let ticket = {
            let mut inner = self.lock();
            inner.guard_graduated()?;
            let resume = match (command, &inner.phase) {
                (Command::Start, Phase::Idle) => Resume::Idle,
                (Command::Start | Command::Advance, Phase::Feedback) => Resume::Feedback,
                _ => return Err(inner.invalid(command)),
            };
            inner.phase = Phase::Loading { resume };
            let ticket = inner.issue_ticket();
            debug!(%command, topic = ?topic, "loading next question");
            self.publish(&inner);
            ticket
        };

        let result = self
            .questions
            .next_question(&self.subject, topic.as_ref())
            .await;

        let mut inner = self.lock();
        if !inner.settle(ticket) {
            warn!(%command, "discarding question for a replaced session");
            return Err(SessionError::Superseded);
        }
        let Phase::Loading { resume } = inner.phase else {
            return Err(SessionError::Superseded);
        };

        match result {
            Err(err) => {
                warn!(%command, error = %err, "question request failed");
                inner.phase = resume.into();
                self.publish(&inner);
                Err(err.into())
            }
            Ok(NextQuestion::Graduated) => {
                inner.session.graduate();
                inner.phase = Phase::Graduated;
                info!(session = %inner.session.id(), "subject graduated");
                Ok(self.publish(&inner))
            }
            Ok(NextQuestion::Question(question)) => {
                let show_hint = question.show_hint();
                let issued = question.topic().clone();
                if let Err(err) = inner.session.begin_question(question) {
                    inner.phase = resume.into();
                    self.publish(&inner);
                    return Err(SessionError::ServiceError(err.to_string()));
                }
                inner.mastery = inner.session.latest_mastery(&issued);
                inner.requested = topic;
                inner.phase = Phase::AwaitingAnswer { pending: None };
                inner.feedback = None;
                inner.show_hint = show_hint;
                debug!(topic = %issued, "question issued");
                Ok(self.publish(&inner))
            }
        }
    }

    async fn submit(&self, raw: Option<&str>) -> Result<SessionSnapshot, SessionError> {
        let (ticket, pending) = {
            let mut inner = self.lock();
            inner.guard_graduated()?;
            if inner.in_flight.is_some() {
                return Err(inner.invalid(Command::SubmitAnswer));
            }
            let Phase::AwaitingAnswer { pending } = &inner.phase else {
                return Err(inner.invalid(Command::SubmitAnswer));
            };

            let pending = match (pending, raw) {
                (Some(retained), _) => retained.clone(),
                (None, None) => return Err(inner.invalid(Command::SubmitAnswer)),
                (None, Some(raw)) => {
                    let question = inner
                        .session
                        .pending_question()
                        .ok_or_else(|| inner.invalid(Command::SubmitAnswer))?;
                    grade(question.topic(), question.expected_answer(), raw)?
                }
            };

            inner.phase = Phase::AwaitingAnswer {
                pending: Some(pending.clone()),
            };
            let ticket = inner.issue_ticket();
            debug!(attempt = %pending.attempt_id, topic = %pending.topic, "submitting answer");
            self.publish(&inner);
            (ticket, pending)
        };

        let result = self.mastery.record(&pending.to_submission()).await;

        let mut inner = self.lock();
        if !inner.settle(ticket) {
            warn!(attempt = %pending.attempt_id, "discarding mastery update for a replaced session");
            return Err(SessionError::Superseded);
        }

        let update = match result.and_then(|update| check_attribution(&pending, update)) {
            Ok(update) => update,
            Err(err) => {
                warn!(attempt = %pending.attempt_id, error = %err, "submission failed, answer retained");
                self.publish(&inner);
                return Err(SessionError::submission_failed(err));
            }
        };

        let correct = if pending.verdict.is_deferred() {
            update.correct.unwrap_or(pending.correct)
        } else {
            if update.correct.is_some_and(|remote| Some(remote) != pending.verdict.as_local()) {
                debug!(attempt = %pending.attempt_id, "service verdict differs from local grading");
            }
            pending.correct
        };
        let expected = inner
            .session
            .pending_question()
            .and_then(|q| q.expected_answer().map(str::to_owned));
        let attempt = Attempt {
            attempt_id: pending.attempt_id,
            topic: pending.topic.clone(),
            correct,
            mastery: update.mastery,
            answered_at: self.clock.now(),
        };
        let recorded = inner.session.record_attempt(attempt).map(|_| ());
        if let Err(err) = recorded {
            self.publish(&inner);
            return Err(SessionError::ServiceError(err.to_string()));
        }

        inner.mastery = Some(update.mastery);
        inner.show_hint = update.show_hint;
        inner.feedback = Some(feedback::compose(
            correct,
            expected.as_deref(),
            update.feedback.as_deref(),
            update.mastery,
        ));
        if update.graduated {
            inner.session.graduate();
            inner.phase = Phase::Graduated;
            info!(
                session = %inner.session.id(),
                mastery = %update.mastery,
                accuracy = ?inner.session.accuracy(),
                "subject graduated"
            );
        } else {
            inner.phase = Phase::Feedback;
            debug!(topic = %pending.topic, correct, mastery = %update.mastery, "answer recorded");
        }
        Ok(self.publish(&inner))
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, inner: &Inner) -> SessionSnapshot {
        let snapshot = inner.snapshot();
        self.updates.send_replace(snapshot.clone());
        snapshot
    }
}

impl std::fmt::Debug for SessionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("SessionController")
            .field("subject", &self.subject)
            .field("session", &inner.session.id())
            .field("phase", &inner.phase.tag())
            .field("generation", &inner.generation)
            .finish_non_exhaustive()
    }
}

fn grade(
    topic: &Topic,
    expected: Option<&str>,
    raw: &str,
) -> Result<PendingSubmission, SessionError> {
    let answer = raw.trim();
    if answer.is_empty() {
        return Err(SessionError::EmptyAnswer);
    }
    let verdict = evaluator::evaluate(expected, answer);
    Ok(PendingSubmission {
        attempt_id: AttemptId::new_v4(),
        topic: topic.clone(),
        verdict,
        // A deferred answer is sent as an accepted attempt; the service decides.
        correct: verdict.as_local().unwrap_or(true),
        answer: answer.to_owned(),
    })
}

/// Reject updates that name a different topic than the answered question.
fn check_attribution(
    pending: &PendingSubmission,
    update: MasteryUpdate,
) -> Result<MasteryUpdate, RemoteError> {
    if update.topic == pending.topic {
        Ok(update)
    } else {
        Err(RemoteError::Malformed(format!(
            "mastery update for {} while answering {}",
            update.topic, pending.topic
        )))
    }
}
