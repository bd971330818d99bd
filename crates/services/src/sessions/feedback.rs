use practice_core::model::MasteryPercent;

use super::view::FeedbackView;

/// Advisory returned by the hint command.
pub const HINT: &str = "Hint: Break the problem into smaller steps.";

const CORRECT_MESSAGE: &str = "Fantastic! You nailed it.";
const INCORRECT_MESSAGE: &str = "Not quite right...";

/// Service feedback wins; otherwise a fixed message for the verdict.
pub(crate) fn compose(
    correct: bool,
    expected: Option<&str>,
    service_text: Option<&str>,
    mastery: MasteryPercent,
) -> FeedbackView {
    let message = service_text.map_or_else(
        || {
            if correct {
                CORRECT_MESSAGE.to_owned()
            } else {
                INCORRECT_MESSAGE.to_owned()
            }
        },
        str::to_owned,
    );
    let solution = match (correct, expected) {
        (false, Some(expected)) => Some(format!("Correct Answer: {expected}")),
        _ => None,
    };

    FeedbackView {
        correct,
        message,
        solution,
        mastery,
    }
}
