//! Fuzz target for the session state machine
//!
//! Arbitrary sequences of user calls and runtime events, including stale
//! generations and out-of-order timer firings.
//!
//! # Invariants
//!
//! - NEVER panic
//! - Failed is never a resting state
//! - Identity exists exactly while not disconnected
//! - Nothing is posted to the relay unless live

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use relaychat_core::{
    ClientConfig, OutboundIntent, SessionAction, SessionController, SessionEvent, SessionState,
};

#[derive(Debug, Clone, Arbitrary)]
enum Op {
    Join { name: String, password: Option<String> },
    Send { text: String },
    Leave,
    Opened { back: u8 },
    Failed { back: u8 },
    Closed { back: u8 },
    Frame { frame: String },
    Due { back: u8, index: u8 },
}

fuzz_target!(|ops: Vec<Op>| {
    let mut session = SessionController::new(&ClientConfig::new());

    for op in ops {
        let before = session.state();
        let current = session.generation();
        let generation = |back: u8| current.wrapping_sub(u64::from(back % 3));

        let actions = match op {
            Op::Join { name, password } => {
                session.join(&name, password.as_deref()).unwrap_or_default()
            },
            Op::Send { text } => session.send_message(&text),
            Op::Leave => session.leave(),
            Op::Opened { back } => {
                let generation = generation(back);
                session.handle(SessionEvent::TransportOpened { generation })
            },
            Op::Failed { back } => {
                let generation = generation(back);
                session.handle(SessionEvent::TransportFailed { generation, reason: String::new() })
            },
            Op::Closed { back } => {
                let generation = generation(back);
                session.handle(SessionEvent::TransportClosed { generation })
            },
            Op::Frame { frame } => {
                session.handle(SessionEvent::FrameReceived { generation: current, frame })
            },
            Op::Due { back, index } => {
                let generation = generation(back);
                session.handle(SessionEvent::ScriptDue { generation, index: usize::from(index) })
            },
        };

        let after = session.state();
        assert_ne!(after, SessionState::Failed);
        assert_eq!(session.identity().is_some(), after != SessionState::Disconnected);

        for action in &actions {
            if let SessionAction::Send(OutboundIntent::Post { .. }) = action {
                assert_eq!(before, SessionState::Live);
            }
        }
    }
});
