use practice_core::model::Topic;

/// A line typed by the learner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start(Option<Topic>),
    Next,
    Hint,
    Retry,
    Report,
    Restart,
    Quit,
    Answer(String),
    Unknown(String),
}

/// Lines starting with `:` are commands; everything else is an answer.
pub fn parse(line: &str) -> Input {
    let trimmed = line.trim();
    let Some(command) = trimmed.strip_prefix(':') else {
        return Input::Answer(line.to_owned());
    };

    let (name, rest) = command
        .split_once(char::is_whitespace)
        .map_or((command, ""), |(name, rest)| (name, rest.trim()));
    match name {
        "start" | "s" => Input::Start(Topic::new(rest).ok()),
        "next" | "n" => Input::Next,
        "hint" | "h" => Input::Hint,
        "retry" | "r" => Input::Retry,
        "report" => Input::Report,
        "restart" => Input::Restart,
        "quit" | "q" => Input::Quit,
        other => Input::Unknown(other.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_an_answer() {
        assert_eq!(parse(" paris \n"), Input::Answer(" paris \n".into()));
    }

    #[test]
    fn start_takes_an_optional_topic() {
        assert_eq!(parse(":start"), Input::Start(None));
        assert_eq!(
            parse(":start  Long Division "),
            Input::Start(Some(Topic::new("Long Division").unwrap()))
        );
    }

    #[test]
    fn short_aliases_and_unknown_commands() {
        assert_eq!(parse(":n"), Input::Next);
        assert_eq!(parse(":q"), Input::Quit);
        assert_eq!(parse(":dance"), Input::Unknown("dance".into()));
    }
}
