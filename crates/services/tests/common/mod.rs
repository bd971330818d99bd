#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use practice_core::model::{
    Difficulty, MasteryPercent, MasteryUpdate, NextQuestion, PredictedSuccess, Question, Subject,
    Topic,
};
use practice_core::time::frozen_clock;
use services::{MasteryService, QuestionSource, RemoteError, SessionController, Submission};

pub fn topic(name: &str) -> Topic {
    Topic::new(name).unwrap()
}

pub fn subject() -> Subject {
    Subject::new("Mathematics").unwrap()
}

pub fn question(topic_name: &str, prompt: &str, answer: Option<&str>) -> Question {
    let q = Question::new(
        topic(topic_name),
        prompt,
        Difficulty::Medium,
        PredictedSuccess::new(0.65).unwrap(),
    )
    .unwrap();
    match answer {
        Some(answer) => q.with_expected_answer(answer),
        None => q,
    }
}

/// In-memory practice backend with scripted failures.
///
/// Questions are served round-robin per topic. Without a requested topic the
/// weakest topic is served. Mastery moves +5 / -3 and is clamped to [0, 100].
#[derive(Default)]
pub struct FakeBackend {
    bank: Mutex<BTreeMap<Topic, VecDeque<Question>>>,
    mastery: Mutex<BTreeMap<Topic, f64>>,
    graduate_at: Mutex<Option<f64>>,
    graduated_source: Mutex<bool>,
    question_failures: Mutex<VecDeque<RemoteError>>,
    record_failures: Mutex<VecDeque<RemoteError>>,
    verdicts: Mutex<VecDeque<Option<bool>>>,
    submissions: Mutex<Vec<Submission>>,
    question_requests: Mutex<Vec<Option<Topic>>>,
    record_gate: Mutex<Option<Arc<Notify>>>,
    question_gate: Mutex<Option<Arc<Notify>>>,
    misattribute: Mutex<Option<Topic>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_questions(questions: impl IntoIterator<Item = Question>) -> Arc<Self> {
        let backend = Self::default();
        {
            let mut bank = backend.bank.lock().unwrap();
            let mut mastery = backend.mastery.lock().unwrap();
            for q in questions {
                mastery.entry(q.topic().clone()).or_insert(50.0);
                bank.entry(q.topic().clone()).or_default().push_back(q);
            }
        }
        Arc::new(backend)
    }

    pub fn set_mastery(&self, topic_name: &str, value: f64) {
        self.mastery.lock().unwrap().insert(topic(topic_name), value);
    }

    pub fn mastery_of(&self, topic_name: &str) -> f64 {
        self.mastery.lock().unwrap()[&topic(topic_name)]
    }

    /// Report `graduated: true` once a recorded mastery reaches `threshold`.
    pub fn graduate_at(&self, threshold: f64) {
        *self.graduate_at.lock().unwrap() = Some(threshold);
    }

    /// Make the question source answer with the graduation signal.
    pub fn graduate_source(&self) {
        *self.graduated_source.lock().unwrap() = true;
    }

    pub fn fail_next_question(&self, err: RemoteError) {
        self.question_failures.lock().unwrap().push_back(err);
    }

    pub fn fail_next_record(&self, err: RemoteError) {
        self.record_failures.lock().unwrap().push_back(err);
    }

    /// Verdict the service reports for the next recorded answer.
    pub fn report_verdict(&self, verdict: Option<bool>) {
        self.verdicts.lock().unwrap().push_back(verdict);
    }

    /// Attribute the next mastery update to `topic_name` regardless of the submission.
    pub fn misattribute_next(&self, topic_name: &str) {
        *self.misattribute.lock().unwrap() = Some(topic(topic_name));
    }

    /// Hold every `record` call until the returned handle is notified.
    pub fn hold_records(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.record_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    /// Hold every `next_question` call until the returned handle is notified.
    pub fn hold_questions(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.question_gate.lock().unwrap() = Some(Arc::clone(&gate));
        gate
    }

    pub fn submissions(&self) -> Vec<Submission> {
        self.submissions.lock().unwrap().clone()
    }

    pub fn question_requests(&self) -> Vec<Option<Topic>> {
        self.question_requests.lock().unwrap().clone()
    }

    fn weakest_topic(&self) -> Option<Topic> {
        self.mastery
            .lock()
            .unwrap()
            .iter()
            .min_by(|(ta, a), (tb, b)| a.total_cmp(b).then_with(|| ta.cmp(tb)))
            .map(|(t, _)| t.clone())
    }
}

#[async_trait]
impl QuestionSource for FakeBackend {
    async fn next_question(
        &self,
        _subject: &Subject,
        requested: Option<&Topic>,
    ) -> Result<NextQuestion, RemoteError> {
        self.question_requests
            .lock()
            .unwrap()
            .push(requested.cloned());
        let gate = self.question_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(err) = self.question_failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        if *self.graduated_source.lock().unwrap() {
            return Ok(NextQuestion::Graduated);
        }

        let chosen = match requested {
            Some(t) => t.clone(),
            None => self
                .weakest_topic()
                .ok_or_else(|| RemoteError::Rejected("empty question bank".into()))?,
        };
        let mut bank = self.bank.lock().unwrap();
        let queue = bank
            .get_mut(&chosen)
            .ok_or_else(|| RemoteError::UnknownTopic(chosen.clone()))?;
        let next = queue
            .pop_front()
            .ok_or_else(|| RemoteError::Rejected("no questions for topic".into()))?;
        queue.push_back(next.clone());
        Ok(NextQuestion::Question(next))
    }
}

#[async_trait]
impl MasteryService for FakeBackend {
    async fn record(&self, submission: &Submission) -> Result<MasteryUpdate, RemoteError> {
        self.submissions.lock().unwrap().push(submission.clone());
        let gate = self.record_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        if let Some(err) = self.record_failures.lock().unwrap().pop_front() {
            return Err(err);
        }

        let verdict = self.verdicts.lock().unwrap().pop_front().flatten();
        let correct = verdict.unwrap_or(submission.correct);
        let value = {
            let mut mastery = self.mastery.lock().unwrap();
            let entry = mastery.entry(submission.topic.clone()).or_insert(50.0);
            *entry = if correct {
                (*entry + 5.0).min(100.0)
            } else {
                (*entry - 3.0).max(0.0)
            };
            *entry
        };
        let graduated = self
            .graduate_at
            .lock()
            .unwrap()
            .is_some_and(|threshold| value >= threshold);
        let attributed = self
            .misattribute
            .lock()
            .unwrap()
            .take()
            .unwrap_or_else(|| submission.topic.clone());

        Ok(MasteryUpdate::new(attributed, MasteryPercent::new(value).unwrap())
            .graduated(graduated)
            .with_verdict(verdict))
    }
}

pub fn controller(backend: &Arc<FakeBackend>) -> SessionController {
    SessionController::new(
        subject(),
        Arc::clone(backend) as Arc<dyn QuestionSource>,
        Arc::clone(backend) as Arc<dyn MasteryService>,
    )
    .with_clock(frozen_clock())
}
