//! Line-oriented shell: reads commands, drives a [`SessionHandle`].

use std::{future::Future, io::Write};

use relaychat_app::{Driver, HandleError, Runtime, SessionHandle};
use relaychat_core::ClientConfig;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    CliError, ConsoleObserver,
    input::{self, HELP, UserInput},
};

enum Flow {
    Continue,
    Quit,
}

/// Run a session until `/quit`, end of input or `shutdown` resolves.
///
/// Session events are rendered to `events`; usage hints and input errors go
/// to `notices`. `initial` is applied before the first line is read.
pub async fn run<D, R, W, N>(
    driver: D,
    config: ClientConfig,
    reader: R,
    events: W,
    mut notices: N,
    initial: Option<UserInput>,
    shutdown: impl Future<Output = ()>,
) -> Result<(), CliError>
where
    D: Driver + 'static,
    R: AsyncBufRead + Unpin,
    W: Write + Send + 'static,
    N: Write,
{
    let (runtime, handle) = Runtime::new(driver, ConsoleObserver::new(events), &config);
    let task = tokio::spawn(runtime.run());

    match initial {
        Some(first) => {
            apply(&handle, &config, first, &mut notices)?;
        },
        None => writeln!(notices, "{HELP}")?,
    }

    let mut lines = reader.lines();
    tokio::pin!(shutdown);

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            () = &mut shutdown => None,
        };
        let Some(line) = line else { break };

        if let Flow::Quit = apply(&handle, &config, input::parse(&line), &mut notices)? {
            break;
        }
    }

    tracing::debug!("shell exiting");
    handle.shutdown()?;
    task.await?;
    Ok(())
}

fn apply<N: Write>(
    handle: &SessionHandle,
    config: &ClientConfig,
    input: UserInput,
    notices: &mut N,
) -> Result<Flow, CliError> {
    match input {
        UserInput::Join { name, password } => match handle.join(&name, password.as_deref()) {
            Ok(()) => {},
            Err(HandleError::Validation(e)) => writeln!(notices, "! invalid name: {e}")?,
            Err(e) => return Err(e.into()),
        },
        UserInput::Leave => handle.leave()?,
        UserInput::Say(text) => handle.send_message(config.cap_message(&text))?,
        UserInput::Help => writeln!(notices, "{HELP}")?,
        UserInput::Unknown(command) => writeln!(notices, "! unknown command {command}; {HELP}")?,
        UserInput::Quit => return Ok(Flow::Quit),
        UserInput::Empty => {},
    }
    Ok(Flow::Continue)
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };

    use super::*;
    use crate::OfflineDriver;

    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl SharedBuf {
        fn text(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    async fn run_lines(lines: &'static str, initial: Option<UserInput>) -> (String, String) {
        let events = SharedBuf::default();
        let mut notices = Vec::new();

        run(
            OfflineDriver,
            ClientConfig::new(),
            lines.as_bytes(),
            events.clone(),
            &mut notices,
            initial,
            std::future::pending(),
        )
        .await
        .unwrap();

        (events.text(), String::from_utf8(notices).unwrap())
    }

    #[tokio::test(start_paused = true)]
    async fn offline_session_echoes_and_ends() {
        let (events, notices) = run_lines("/join Bo\nhello\n/quit\nignored\n", None).await;

        insta::assert_snapshot!(events, @r"
        * connecting...
        * relay unreachable, starting a local demo session
        * members: Bo, Ada, Grace
        <Bo> hello
        * session ended
        ");
        assert_eq!(notices, format!("{HELP}\n"));
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_name_is_reported() {
        let (events, notices) = run_lines("/join A\n/what\n", None).await;

        assert!(events.is_empty());
        insta::assert_snapshot!(notices, @r"
        commands: /join <name> [password], /leave, /quit, /help
        ! invalid name: display name must be at least 2 characters, got 1
        ! unknown command /what; commands: /join <name> [password], /leave, /quit, /help
        ");
    }

    #[tokio::test(start_paused = true)]
    async fn initial_join_skips_help() {
        let initial = UserInput::Join { name: "Bo".into(), password: None };
        let (events, notices) = run_lines("", Some(initial)).await;

        assert!(events.starts_with("* connecting..."));
        assert!(notices.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn long_messages_are_capped() {
        let events = SharedBuf::default();
        let mut config = ClientConfig::new();
        config.max_message_len = 5;
        let initial = UserInput::Join { name: "Bo".into(), password: None };

        run(
            OfflineDriver,
            config,
            "abcdefgh\n".as_bytes(),
            events.clone(),
            std::io::sink(),
            Some(initial),
            tokio::time::sleep(Duration::from_millis(10)),
        )
        .await
        .unwrap();

        assert!(events.text().contains("<Bo> abcde\n"));
    }
}
