//! Fuzz target for inbound frame decoding
//!
//! # Strategy
//!
//! - Random text: arbitrary strings straight into the decoder
//! - Deeply nested: JSON arrays/objects nested to arbitrary depth
//! - Wrong field types: known tags with fields of the wrong JSON type
//! - Tag confusion: fields from one frame kind under another kind's tag
//!
//! # Invariants
//!
//! - NEVER panic on malformed input
//! - A roster never has more names than the frame has bytes
//! - Decoding is deterministic

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use relaychat_proto::{InboundEvent, decode};

#[derive(Debug, Clone, Arbitrary)]
enum FrameAttack {
    RandomText { text: String },
    DeeplyNested { depth: u8, object: bool },
    WrongTypes { tag: Tag, value: u32 },
    TagConfusion { tag: Tag, username: String, content: String, users: Vec<String> },
}

#[derive(Debug, Clone, Copy, Arbitrary)]
enum Tag {
    Message,
    UserList,
    Error,
    Join,
}

impl Tag {
    fn as_str(self) -> &'static str {
        match self {
            Tag::Message => "message",
            Tag::UserList => "userList",
            Tag::Error => "error",
            Tag::Join => "join",
        }
    }
}

fuzz_target!(|attack: FrameAttack| {
    let frame = match attack {
        FrameAttack::RandomText { text } => text,
        FrameAttack::DeeplyNested { depth, object } => {
            let depth = usize::from(depth);
            let (open, close) = if object { ("{\"a\":", "}") } else { ("[", "]") };
            format!("{}1{}", open.repeat(depth), close.repeat(depth))
        },
        FrameAttack::WrongTypes { tag, value } => format!(
            r#"{{"type":"{}","username":{value},"content":[{value}],"users":{value},"error":null}}"#,
            tag.as_str()
        ),
        FrameAttack::TagConfusion { tag, username, content, users } => {
            let users: Vec<String> = users.iter().map(|u| format!("{u:?}")).collect();
            format!(
                r#"{{"type":"{}","username":{username:?},"content":{content:?},"users":[{}]}}"#,
                tag.as_str(),
                users.join(",")
            )
        },
    };

    let first = decode(&frame);
    assert_eq!(first, decode(&frame));

    // Rosters are passed through as sent; deduplication is the session's job
    if let Some(InboundEvent::RosterChanged { members }) = first {
        assert!(members.len() <= frame.len());
    }
});
