use std::sync::Arc;

use practice_core::model::{MasteryPercent, Subject, SubjectReport, Topic};

use crate::error::ReportError;
use crate::remote::ReportSource;

/// Dashboard row offering a topic to practice.
#[derive(Debug, Clone, PartialEq)]
pub struct PracticeTarget {
    pub topic: Topic,
    pub mastery: MasteryPercent,
    pub is_focus: bool,
}

/// Presentation-facing facade over the subject report endpoint.
///
/// Read only: nothing here feeds back into a practice session.
#[derive(Clone)]
pub struct SubjectReportService {
    reports: Arc<dyn ReportSource>,
}

impl SubjectReportService {
    #[must_use]
    pub fn new(reports: Arc<dyn ReportSource>) -> Self {
        Self { reports }
    }

    /// # Errors
    ///
    /// Returns `ReportError::Remote` when the report cannot be fetched.
    pub async fn load(&self, subject: &Subject) -> Result<SubjectReport, ReportError> {
        Ok(self.reports.subject_report(subject).await?)
    }

    /// Topics to offer for practice, weakest first.
    #[must_use]
    pub fn practice_targets(report: &SubjectReport) -> Vec<PracticeTarget> {
        report
            .weakest_first()
            .into_iter()
            .map(|(topic, mastery)| PracticeTarget {
                is_focus: report.focus_topic.as_ref() == Some(&topic),
                topic,
                mastery,
            })
            .collect()
    }
}
