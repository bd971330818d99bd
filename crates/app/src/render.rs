use std::fmt::Write as _;

use practice_core::model::SubjectReport;
use services::{SessionPhase, SessionSnapshot, SubjectReportService};

/// One terminal frame for a snapshot.
pub fn frame(snap: &SessionSnapshot) -> String {
    let mut out = String::new();
    match snap.phase {
        SessionPhase::Idle => {
            out.push_str("Type `:start [topic]` to begin practicing.\n");
        }
        SessionPhase::Loading => {
            out.push_str("Loading next question...\n");
        }
        SessionPhase::AwaitingAnswer => {
            if let Some(q) = &snap.question {
                let _ = writeln!(
                    out,
                    "[{}] {} ({}% predicted success)",
                    q.topic, q.difficulty, q.predicted_success_percent
                );
                let _ = writeln!(out, "{}", q.prompt);
                let why = q
                    .reasoning
                    .as_ref()
                    .and_then(|r| r.topic_reasoning.as_deref());
                if let Some(why) = why {
                    let _ = writeln!(out, "  why: {why}");
                }
            }
            if snap.submitting {
                out.push_str("Checking answer...\n");
            } else if snap.retry_pending {
                out.push_str("Your answer was kept. Type `:retry` to send it again.\n");
            } else if snap.show_hint {
                out.push_str("Stuck? Type `:hint`.\n");
            }
        }
        SessionPhase::Feedback => {
            feedback(&mut out, snap);
            out.push_str("Type `:next` for another question.\n");
        }
        SessionPhase::Graduated => {
            feedback(&mut out, snap);
            out.push_str("Module Mastered!\n");
            out.push_str("Type `:restart` to practice again or `:quit` to leave.\n");
        }
    }
    if let Some(mastery) = snap.mastery {
        let _ = writeln!(
            out,
            "Mastery: {mastery}  ({}/{} correct)",
            snap.correct, snap.answered
        );
    }
    out
}

/// Verdict for the last answer, including the one that graduated the session.
fn feedback(out: &mut String, snap: &SessionSnapshot) {
    if let Some(fb) = &snap.feedback {
        let _ = writeln!(out, "{}", fb.message);
        if let Some(solution) = &fb.solution {
            let _ = writeln!(out, "{solution}");
        }
    }
}

pub fn report(report: &SubjectReport) -> String {
    let mut out = String::new();
    if let Some(subject) = &report.subject {
        let _ = writeln!(out, "== {subject} ==");
    }
    for target in SubjectReportService::practice_targets(report) {
        let marker = if target.is_focus { "*" } else { " " };
        let _ = writeln!(out, "{marker} {:<24} {}", target.topic.as_str(), target.mastery);
    }
    if let Some(focus) = &report.focus_topic {
        match report.mastery_for(focus) {
            Some(mastery) => {
                let _ = writeln!(out, "Focus: {focus} ({mastery})");
            }
            None => {
                let _ = writeln!(out, "Focus: {focus}");
            }
        }
    }
    if !report.ai_reasoning.is_empty() {
        let _ = writeln!(out, "{}", report.ai_reasoning);
    }
    out
}
