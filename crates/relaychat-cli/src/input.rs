//! Input line parsing.

/// What a line typed by the user asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    /// `/join <name> [password]`
    Join {
        /// Display name, unvalidated.
        name: String,
        /// Optional password.
        password: Option<String>,
    },
    /// `/leave`
    Leave,
    /// `/quit`, or end of input.
    Quit,
    /// `/help`
    Help,
    /// Any other slash command.
    Unknown(String),
    /// Plain text to post.
    Say(String),
    /// Blank line.
    Empty,
}

/// Usage text shown for `/help` and unknown commands.
pub const HELP: &str = "commands: /join <name> [password], /leave, /quit, /help";

/// Parse one input line.
///
/// Lines starting with `/` are commands; everything else is posted as typed.
pub fn parse(line: &str) -> UserInput {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return UserInput::Empty;
    }
    let Some(command) = trimmed.strip_prefix('/') else {
        return UserInput::Say(line.trim_end_matches(['\r', '\n']).to_owned());
    };

    let mut words = command.split_whitespace();
    match words.next() {
        Some("join") => match words.next() {
            Some(name) => UserInput::Join {
                name: name.to_owned(),
                password: words.next().map(str::to_owned),
            },
            None => UserInput::Unknown(trimmed.to_owned()),
        },
        Some("leave") => UserInput::Leave,
        Some("quit" | "exit") => UserInput::Quit,
        Some("help") => UserInput::Help,
        _ => UserInput::Unknown(trimmed.to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_with_and_without_password() {
        assert_eq!(parse("/join Al"), UserInput::Join { name: "Al".into(), password: None });
        assert_eq!(
            parse("  /join Al hunter2 "),
            UserInput::Join { name: "Al".into(), password: Some("hunter2".into()) }
        );
    }

    #[test]
    fn join_without_name_is_unknown() {
        assert_eq!(parse("/join"), UserInput::Unknown("/join".into()));
    }

    #[test]
    fn plain_text_is_said_verbatim() {
        assert_eq!(parse("  hello world\n"), UserInput::Say("  hello world".into()));
    }

    #[test]
    fn simple_commands() {
        assert_eq!(parse("/leave"), UserInput::Leave);
        assert_eq!(parse("/quit"), UserInput::Quit);
        assert_eq!(parse("/exit"), UserInput::Quit);
        assert_eq!(parse("/help"), UserInput::Help);
        assert_eq!(parse("/dance"), UserInput::Unknown("/dance".into()));
        assert_eq!(parse("   "), UserInput::Empty);
    }
}
