use std::collections::BTreeMap;

use crate::model::ids::{Subject, Topic};
use crate::model::mastery::MasteryPercent;

/// Read-only dashboard aggregate for a subject.
///
/// Produced by the report endpoint; nothing in the session flow mutates it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectReport {
    pub subject: Option<Subject>,
    pub mastery_overview: BTreeMap<Topic, MasteryPercent>,
    pub strengths: Vec<Topic>,
    pub weak_areas: Vec<Topic>,
    pub focus_topic: Option<Topic>,
    pub ai_reasoning: String,
}

impl SubjectReport {
    #[must_use]
    pub fn mastery_for(&self, topic: &Topic) -> Option<MasteryPercent> {
        self.mastery_overview.get(topic).copied()
    }

    /// Overview topics ordered weakest first; ties fall back to name order.
    #[must_use]
    pub fn weakest_first(&self) -> Vec<(Topic, MasteryPercent)> {
        let mut rows: Vec<_> = self
            .mastery_overview
            .iter()
            .map(|(topic, mastery)| (topic.clone(), *mastery))
            .collect();
        rows.sort_by(|(ta, ma), (tb, mb)| {
            ma.value().total_cmp(&mb.value()).then_with(|| ta.cmp(tb))
        });
        rows
    }
}
