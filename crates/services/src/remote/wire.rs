//! JSON shapes exchanged with the practice backend.
//!
//! Deployed backends disagree on field names (`correct`/`is_correct`,
//! `updated_mastery`/`new_mastery`, several feedback spellings); the aliases
//! below accept all of them and conversion into domain types validates values.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use practice_core::model::{
    AttemptId, Difficulty, MasteryPercent, MasteryUpdate, NextQuestion, PredictedSuccess,
    Question, QuestionReasoning, Subject, SubjectReport, Topic,
};

use crate::error::RemoteError;

use super::Submission;

/// Used when a backend omits `predicted_success`.
const NEUTRAL_PREDICTED_SUCCESS: f64 = 0.5;

//
// ─── NEXT QUESTION ────────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(super) struct QuestionBody {
    status: Option<String>,
    error: Option<String>,
    topic: Option<String>,
    question: Option<String>,
    answer: Option<String>,
    difficulty: Option<Value>,
    predicted_success: Option<f64>,
    #[serde(default)]
    show_hint: bool,
    ai_reasoning: Option<ReasoningBody>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ReasoningBody {
    Detailed(QuestionReasoning),
    Text(String),
}

impl QuestionBody {
    /// `requested` fills in the topic when the body leaves it out.
    pub(super) fn into_next(self, requested: Option<&Topic>) -> Result<NextQuestion, RemoteError> {
        if self
            .status
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("graduated"))
        {
            return Ok(NextQuestion::Graduated);
        }
        if let Some(error) = self.error {
            return Err(RemoteError::Rejected(error));
        }

        let topic = match (self.topic, requested) {
            (Some(raw), _) => Topic::new(raw).map_err(practice_core::Error::from)?,
            (None, Some(requested)) => requested.clone(),
            (None, None) => return Err(RemoteError::Malformed("question without topic".into())),
        };
        let prompt = self
            .question
            .ok_or_else(|| RemoteError::Malformed("missing question text".into()))?;
        let difficulty = match self.difficulty {
            Some(Value::String(label)) => Difficulty::from_label(&label),
            Some(Value::Null) | None => Difficulty::Medium,
            Some(other) => Difficulty::from_label(&other.to_string()),
        };
        let predicted = PredictedSuccess::new(
            self.predicted_success.unwrap_or(NEUTRAL_PREDICTED_SUCCESS),
        )
        .map_err(practice_core::Error::from)?;

        let mut question = Question::new(topic, prompt, difficulty, predicted)
            .map_err(practice_core::Error::from)?
            .with_show_hint(self.show_hint);
        if let Some(answer) = self.answer {
            question = question.with_expected_answer(answer);
        }
        match self.ai_reasoning {
            Some(ReasoningBody::Detailed(reasoning)) => {
                question = question.with_reasoning(reasoning);
            }
            Some(ReasoningBody::Text(text)) => {
                question = question.with_reasoning(QuestionReasoning {
                    topic_reasoning: Some(text),
                    ..QuestionReasoning::default()
                });
            }
            None => {}
        }

        Ok(NextQuestion::Question(question))
    }
}

//
// ─── SUBMIT ───────────────────────────────────────────────────────────────────
//

/// Carries correctness under both field spellings so either backend variant
/// reads it.
#[derive(Debug, Serialize)]
pub(super) struct SubmitRequest<'a> {
    attempt_id: AttemptId,
    topic: &'a str,
    correct: bool,
    is_correct: bool,
    answer: &'a str,
}

impl<'a> SubmitRequest<'a> {
    pub(super) fn from_submission(submission: &'a Submission) -> Self {
        Self {
            attempt_id: submission.attempt_id,
            topic: submission.topic.as_str(),
            correct: submission.correct,
            is_correct: submission.correct,
            answer: &submission.answer,
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct SubmitResponse {
    topic: Option<String>,
    #[serde(alias = "new_mastery")]
    updated_mastery: Option<f64>,
    #[serde(alias = "learning_feedback", alias = "feedback")]
    feedback_text: Option<String>,
    #[serde(alias = "is_correct")]
    correct: Option<bool>,
    #[serde(default)]
    graduated: bool,
    #[serde(default)]
    show_hint: bool,
    error: Option<String>,
}

impl SubmitResponse {
    /// `submitted` is used when the body does not name the topic it updated.
    pub(super) fn into_update(self, submitted: &Topic) -> Result<MasteryUpdate, RemoteError> {
        if let Some(error) = self.error {
            return Err(RemoteError::Rejected(error));
        }
        let topic = match self.topic {
            Some(raw) => Topic::new(raw).map_err(practice_core::Error::from)?,
            None => submitted.clone(),
        };
        let raw = self
            .updated_mastery
            .ok_or_else(|| RemoteError::Malformed("missing updated mastery".into()))?;
        let mastery = MasteryPercent::new(raw).map_err(practice_core::Error::from)?;

        let mut update = MasteryUpdate::new(topic, mastery)
            .graduated(self.graduated)
            .with_show_hint(self.show_hint)
            .with_verdict(self.correct);
        if let Some(feedback) = self.feedback_text {
            update = update.with_feedback(feedback);
        }
        Ok(update)
    }
}

//
// ─── SUBJECT REPORT ───────────────────────────────────────────────────────────
//

#[derive(Debug, Deserialize)]
pub(super) struct ReportBody {
    subject: Option<String>,
    #[serde(default)]
    mastery_overview: BTreeMap<String, f64>,
    #[serde(default)]
    strengths: Vec<String>,
    #[serde(default)]
    weak_areas: Vec<String>,
    focus_topic: Option<String>,
    #[serde(default)]
    ai_reasoning: String,
}

impl ReportBody {
    pub(super) fn into_report(self) -> Result<SubjectReport, RemoteError> {
        let mut mastery_overview = BTreeMap::new();
        for (topic, value) in self.mastery_overview {
            let topic = Topic::new(topic).map_err(practice_core::Error::from)?;
            let mastery = MasteryPercent::new(value).map_err(practice_core::Error::from)?;
            mastery_overview.insert(topic, mastery);
        }

        Ok(SubjectReport {
            subject: self.subject.and_then(|s| Subject::new(s).ok()),
            mastery_overview,
            strengths: topic_list(self.strengths),
            weak_areas: topic_list(self.weak_areas),
            focus_topic: self.focus_topic.and_then(|t| Topic::new(t).ok()),
            ai_reasoning: self.ai_reasoning,
        })
    }
}

/// Some backends label list entries as `"Fractions (80%)"`; keep just the topic.
fn topic_list(raw: Vec<String>) -> Vec<Topic> {
    raw.into_iter()
        .filter_map(|entry| Topic::new(strip_percent_suffix(&entry)).ok())
        .collect()
}

fn strip_percent_suffix(entry: &str) -> &str {
    let trimmed = entry.trim_end();
    match trimmed.rfind(" (") {
        Some(open) if trimmed.ends_with("%)") => &trimmed[..open],
        _ => trimmed,
    }
}
