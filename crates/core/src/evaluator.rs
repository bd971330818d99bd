//! Local answer grading.
//!
//! Grading is only possible when the question carries its expected answer.
//! Without one the verdict is [`Verdict::Deferred`] and correctness comes from
//! the mastery service instead.

/// Outcome of checking a raw answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Correct,
    Incorrect,
    /// No expected answer is known locally.
    Deferred,
}

impl Verdict {
    /// The locally decided correctness, if any.
    #[must_use]
    pub fn as_local(self) -> Option<bool> {
        match self {
            Verdict::Correct => Some(true),
            Verdict::Incorrect => Some(false),
            Verdict::Deferred => None,
        }
    }

    #[must_use]
    pub fn is_deferred(self) -> bool {
        self == Verdict::Deferred
    }
}

/// Trim surrounding whitespace and case-fold. Inner whitespace is kept as is.
#[must_use]
pub fn normalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Compare `raw` against `expected` after normalizing both sides.
#[must_use]
pub fn evaluate(expected: Option<&str>, raw: &str) -> Verdict {
    match expected {
        Some(expected) if normalize(expected) == normalize(raw) => Verdict::Correct,
        Some(_) => Verdict::Incorrect,
        None => Verdict::Deferred,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_case_and_outer_whitespace() {
        assert_eq!(evaluate(Some("Paris"), " paris "), Verdict::Correct);
        assert_eq!(evaluate(Some("  1/2"), "1/2\n"), Verdict::Correct);
    }

    #[test]
    fn inner_whitespace_is_significant() {
        assert_eq!(evaluate(Some("New York"), "newyork"), Verdict::Incorrect);
        assert_eq!(evaluate(Some("New York"), "NEW YORK"), Verdict::Correct);
    }

    #[test]
    fn wrong_answer_is_incorrect() {
        let verdict = evaluate(Some("1/2"), "wrong");
        assert_eq!(verdict, Verdict::Incorrect);
        assert_eq!(verdict.as_local(), Some(false));
    }

    #[test]
    fn missing_expected_answer_defers() {
        let verdict = evaluate(None, "anything");
        assert!(verdict.is_deferred());
        assert_eq!(verdict.as_local(), None);
    }

    #[test]
    fn unicode_case_folding() {
        assert_eq!(evaluate(Some("ÉTÉ"), "été"), Verdict::Correct);
    }
}
