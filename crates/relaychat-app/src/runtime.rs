//! Generic runtime for session orchestration.
//!
//! The Runtime drives the client event loop, coordinating between:
//! - [`SessionController`]: connection lifecycle state machine
//! - [`Driver`]: transport I/O
//! - [`SessionObserver`]: presentation callbacks
//!
//! Everything runs on one task. Commands from [`SessionHandle`]s, inbound
//! frames and simulation timers are multiplexed with `tokio::select!`, and
//! each wake-up is turned into a [`SessionEvent`] whose actions are executed
//! before the next wake-up is considered.

use std::{collections::VecDeque, time::Duration};

use futures::{FutureExt, StreamExt, future::BoxFuture, stream::FuturesUnordered};
use relaychat_core::{ClientConfig, SessionAction, SessionController, SessionEvent};
use tokio::{
    sync::mpsc,
    time::{self, Instant},
};

use crate::{Driver, SessionHandle, SessionObserver, handle::Command};

/// A pending simulation timer. Resolves to `(generation, index)`.
type ScriptTimer = BoxFuture<'static, (u64, usize)>;

/// Generic runtime that orchestrates the session, a driver and an observer.
///
/// # Type Parameters
///
/// - `D`: transport driver
/// - `O`: presentation observer
pub struct Runtime<D, O>
where
    D: Driver,
    O: SessionObserver,
{
    driver: D,
    observer: O,
    session: SessionController,
    commands: mpsc::UnboundedReceiver<Command>,
    timers: FuturesUnordered<ScriptTimer>,
    connect_timeout: Duration,
    /// Generation the open transport belongs to, if any.
    transport_generation: Option<u64>,
    /// Set once shutdown was requested while a connect was in flight.
    stopping: bool,
}

impl<D, O> Runtime<D, O>
where
    D: Driver,
    O: SessionObserver,
{
    /// Create a runtime and the handle that drives it.
    pub fn new(driver: D, observer: O, config: &ClientConfig) -> (Self, SessionHandle) {
        let (tx, rx) = mpsc::unbounded_channel();
        let runtime = Self {
            driver,
            observer,
            session: SessionController::new(config),
            commands: rx,
            timers: FuturesUnordered::new(),
            connect_timeout: config.connect_timeout,
            transport_generation: None,
            stopping: false,
        };
        (runtime, SessionHandle::new(tx))
    }

    /// Session state machine, for inspection.
    pub fn session(&self) -> &SessionController {
        &self.session
    }

    /// Run until [`SessionHandle::shutdown`] is called or every handle is
    /// dropped. Either way the session is left before returning.
    pub async fn run(mut self) {
        while !self.stopping {
            let live = self.transport_generation.is_some() && self.driver.is_connected();
            let has_timers = !self.timers.is_empty();

            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Shutdown) | None => break,
                    Some(command) => self.handle_command(command).await,
                },
                frame = self.driver.recv_text(), if live => {
                    self.handle_frame(frame).await;
                },
                Some((generation, index)) = self.timers.next(), if has_timers => {
                    self.feed(SessionEvent::ScriptDue { generation, index }).await;
                },
            }
        }

        tracing::debug!("session runtime stopping");
        let actions = self.session.leave();
        self.execute(actions).await;
        self.driver.close();
    }

    async fn handle_command(&mut self, command: Command) {
        let actions = apply(&mut self.session, command);
        self.execute(actions).await;
    }

    async fn handle_frame(&mut self, frame: Option<String>) {
        let Some(generation) = self.transport_generation else {
            return;
        };

        let event = match frame {
            Some(frame) => SessionEvent::FrameReceived { generation, frame },
            None => {
                tracing::info!("relay closed the connection");
                self.transport_generation = None;
                SessionEvent::TransportClosed { generation }
            },
        };
        self.feed(event).await;
    }

    async fn feed(&mut self, event: SessionEvent) {
        let actions = self.session.handle(event);
        self.execute(actions).await;
    }

    /// Execute actions in order. Follow-up actions produced along the way
    /// (transport outcomes) are appended to the queue.
    async fn execute(&mut self, actions: Vec<SessionAction>) {
        let mut pending: VecDeque<SessionAction> = actions.into();

        while let Some(action) = pending.pop_front() {
            match action {
                SessionAction::Connect { url, generation } => {
                    pending.extend(self.establish(&url, generation).await);
                },
                SessionAction::Send(intent) => {
                    let frame = match relaychat_proto::encode(&intent) {
                        Ok(frame) => frame,
                        Err(e) => {
                            tracing::error!(error = %e, "failed to encode intent");
                            continue;
                        },
                    };

                    if let Err(e) = self.driver.send_text(frame).await {
                        tracing::warn!(
                            error = %e,
                            kind = intent.kind(),
                            name = intent.name(),
                            "send failed"
                        );
                        if let Some(generation) = self.transport_generation.take() {
                            self.driver.close();
                            pending.extend(
                                self.session.handle(SessionEvent::TransportClosed { generation }),
                            );
                        }
                    }
                },
                SessionAction::CloseTransport => {
                    self.transport_generation = None;
                    self.driver.close();
                },
                SessionAction::Deliver(event) => self.observer.on_event(&event),
                SessionAction::StateChanged { from, to } => {
                    self.observer.on_state_changed(from, to);
                    if from.is_live() != to.is_live() {
                        self.observer.on_connection_state_changed(to.is_live());
                    }
                },
                SessionAction::Schedule { generation, index, delay } => {
                    // Measured from now: a connect may have been awaited above
                    let deadline = Instant::now() + delay;
                    self.timers.push(
                        async move {
                            time::sleep_until(deadline).await;
                            (generation, index)
                        }
                        .boxed(),
                    );
                },
                SessionAction::CancelScheduled => self.timers.clear(),
            }
        }
    }

    /// Open the transport under the connect timeout.
    ///
    /// Commands keep being served while the attempt is in flight. A leave or
    /// shutdown abandons the attempt; the generation bump inside
    /// [`SessionController::leave`] makes any late outcome stale.
    async fn establish(&mut self, url: &str, generation: u64) -> Vec<SessionAction> {
        let limit = self.connect_timeout;
        let mut actions = Vec::new();

        let outcome = {
            let connect = time::timeout(limit, self.driver.connect(url));
            tokio::pin!(connect);

            loop {
                tokio::select! {
                    result = &mut connect => break Some(result),
                    command = self.commands.recv() => {
                        let command = command.unwrap_or(Command::Shutdown);
                        if matches!(command, Command::Shutdown) {
                            self.stopping = true;
                            actions.extend(self.session.leave());
                        } else {
                            actions.extend(apply(&mut self.session, command));
                        }
                        if self.session.generation() != generation {
                            break None;
                        }
                    },
                }
            }
        };

        let event = match outcome {
            None => {
                tracing::info!(url, "connect abandoned");
                self.driver.close();
                return actions;
            },
            Some(Ok(Ok(()))) => {
                self.transport_generation = Some(generation);
                SessionEvent::TransportOpened { generation }
            },
            Some(Ok(Err(e))) => {
                tracing::info!(error = %e, url, "relay unreachable");
                SessionEvent::TransportFailed { generation, reason: e.to_string() }
            },
            Some(Err(_)) => {
                tracing::info!(url, timeout_ms = limit.as_millis(), "relay connect timed out");
                self.driver.close();
                SessionEvent::TransportFailed {
                    generation,
                    reason: format!("connect timed out after {}ms", limit.as_millis()),
                }
            },
        };

        actions.extend(self.session.handle(event));
        actions
    }
}

/// Turn a handle command into session actions.
fn apply(session: &mut SessionController, command: Command) -> Vec<SessionAction> {
    match command {
        Command::Join { name, password } => {
            session.join(&name, password.as_deref()).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "join ignored");
                Vec::new()
            })
        },
        Command::Send(text) => session.send_message(&text),
        Command::Leave => session.leave(),
        Command::Shutdown => Vec::new(),
    }
}
