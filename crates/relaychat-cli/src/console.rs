//! Plain-text rendering of session events.

use std::io::Write;

use relaychat_app::SessionObserver;
use relaychat_core::SessionState;

/// Writes one line per observer callback.
///
/// Write errors are logged and otherwise ignored; a closed stdout should not
/// take the session down with it.
pub struct ConsoleObserver<W> {
    out: W,
}

impl<W: Write + Send> ConsoleObserver<W> {
    /// Render to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Recover the writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn line(&mut self, text: std::fmt::Arguments<'_>) {
        if let Err(e) = writeln!(self.out, "{text}").and_then(|()| self.out.flush()) {
            tracing::debug!(error = %e, "console write failed");
        }
    }
}

impl<W: Write + Send> SessionObserver for ConsoleObserver<W> {
    fn on_message(&mut self, author: &str, content: &str) {
        self.line(format_args!("<{author}> {content}"));
    }

    fn on_roster_changed(&mut self, members: &[String]) {
        self.line(format_args!("* members: {}", members.join(", ")));
    }

    fn on_rejected(&mut self, reason: &str) {
        self.line(format_args!("! relay refused the session: {reason}"));
    }

    fn on_connection_state_changed(&mut self, is_live: bool) {
        if is_live {
            self.line(format_args!("* connected to relay"));
        } else {
            self.line(format_args!("* disconnected from relay"));
        }
    }

    fn on_state_changed(&mut self, from: SessionState, to: SessionState) {
        match to {
            SessionState::Connecting => self.line(format_args!("* connecting...")),
            SessionState::Simulated => {
                self.line(format_args!("* relay unreachable, starting a local demo session"));
            },
            SessionState::Disconnected if from != SessionState::Failed => {
                self.line(format_args!("* session ended"));
            },
            SessionState::Disconnected | SessionState::Live | SessionState::Failed => {},
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(f: impl FnOnce(&mut ConsoleObserver<Vec<u8>>)) -> String {
        let mut console = ConsoleObserver::new(Vec::new());
        f(&mut console);
        String::from_utf8(console.into_inner()).unwrap()
    }

    #[test]
    fn simulated_session_transcript() {
        let out = render(|c| {
            c.on_state_changed(SessionState::Disconnected, SessionState::Connecting);
            c.on_state_changed(SessionState::Connecting, SessionState::Failed);
            c.on_state_changed(SessionState::Failed, SessionState::Simulated);
            c.on_roster_changed(&["Bo".into(), "Ada".into(), "Grace".into()]);
            c.on_message("Ada", "Welcome!");
            c.on_state_changed(SessionState::Simulated, SessionState::Disconnected);
        });

        insta::assert_snapshot!(out, @r"
        * connecting...
        * relay unreachable, starting a local demo session
        * members: Bo, Ada, Grace
        <Ada> Welcome!
        * session ended
        ");
    }

    #[test]
    fn rejection_transcript() {
        let out = render(|c| {
            c.on_connection_state_changed(true);
            c.on_rejected("Username already taken");
            c.on_connection_state_changed(false);
            c.on_state_changed(SessionState::Failed, SessionState::Disconnected);
        });

        insta::assert_snapshot!(out, @r"
        * connected to relay
        ! relay refused the session: Username already taken
        * disconnected from relay
        ");
    }
}
