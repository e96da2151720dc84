//! Client configuration.
//!
//! Everything here is fixed at build time or by command-line flags; nothing
//! is negotiated with the relay.

use std::time::Duration;

use crate::error::ScriptError;

/// Default relay host.
pub const DEFAULT_HOST: &str = "localhost";

/// Default relay port.
pub const DEFAULT_PORT: u16 = 8080;

/// Time allowed to establish the relay connection before falling back to the
/// simulated session.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Longest message, in characters, the frontend accepts.
pub const DEFAULT_MAX_MESSAGE_LEN: usize = 500;

/// Relay endpoint address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    /// Relay host name or address.
    pub host: String,
    /// Relay port.
    pub port: u16,
    /// Full URL override. Takes precedence over host and port when set.
    pub url: Option<String>,
}

impl Endpoint {
    /// WebSocket URL to connect to.
    pub fn url(&self) -> String {
        match &self.url {
            Some(url) => url.clone(),
            None => format!("ws://{}:{}", self.host, self.port),
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Self { host: DEFAULT_HOST.to_string(), port: DEFAULT_PORT, url: None }
    }
}

/// One scripted message played back by the simulated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptedMessage {
    /// Display name of the fake author.
    pub author: String,
    /// Message text.
    pub text: String,
    /// Delay from activation until delivery.
    pub delay: Duration,
}

impl ScriptedMessage {
    /// Create a scripted message.
    pub fn new(author: impl Into<String>, text: impl Into<String>, delay: Duration) -> Self {
        Self { author: author.into(), text: text.into(), delay }
    }
}

/// Content played back when no relay is reachable.
///
/// # Invariants
///
/// - Every delay is non-zero.
/// - Delays strictly increase, so delivery order equals script order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimulationScript {
    demo_members: Vec<String>,
    messages: Vec<ScriptedMessage>,
}

impl SimulationScript {
    /// Build a script, checking the delay invariants.
    pub fn new(
        demo_members: Vec<String>,
        messages: Vec<ScriptedMessage>,
    ) -> Result<Self, ScriptError> {
        let mut previous = Duration::ZERO;
        for (index, message) in messages.iter().enumerate() {
            if message.delay.is_zero() {
                return Err(ScriptError::ZeroDelay { index });
            }
            if message.delay <= previous {
                return Err(ScriptError::NonIncreasingDelay { index });
            }
            previous = message.delay;
        }
        Ok(Self { demo_members, messages })
    }

    /// Fake members listed after our own name.
    pub fn demo_members(&self) -> &[String] {
        &self.demo_members
    }

    /// Scripted messages in delivery order.
    pub fn messages(&self) -> &[ScriptedMessage] {
        &self.messages
    }
}

impl Default for SimulationScript {
    fn default() -> Self {
        Self {
            demo_members: vec!["Ada".to_string(), "Grace".to_string()],
            messages: vec![
                ScriptedMessage::new(
                    "Ada",
                    "Welcome! The relay is unreachable, so this is a local demo session.",
                    Duration::from_millis(1500),
                ),
                ScriptedMessage::new(
                    "Grace",
                    "Messages you send here stay on this machine.",
                    Duration::from_millis(3500),
                ),
            ],
        }
    }
}

/// Complete client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Relay endpoint.
    pub endpoint: Endpoint,
    /// Connection establishment timeout.
    pub connect_timeout: Duration,
    /// Longest message, in characters, the frontend accepts.
    pub max_message_len: usize,
    /// Simulated session content.
    pub script: SimulationScript,
}

impl ClientConfig {
    /// Configuration with every default applied.
    pub fn new() -> Self {
        Self {
            endpoint: Endpoint::default(),
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            max_message_len: DEFAULT_MAX_MESSAGE_LEN,
            script: SimulationScript::default(),
        }
    }

    /// Cut `text` down to at most `max_message_len` characters.
    pub fn cap_message<'a>(&self, text: &'a str) -> &'a str {
        match text.char_indices().nth(self.max_message_len) {
            Some((end, _)) => &text[..end],
            None => text,
        }
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_override_wins() {
        let mut endpoint = Endpoint::default();
        assert_eq!(endpoint.url(), "ws://localhost:8080");

        endpoint.url = Some("wss://relay.example/chat".into());
        assert_eq!(endpoint.url(), "wss://relay.example/chat");
    }

    #[test]
    fn default_script_is_valid() {
        let script = SimulationScript::default();
        let rebuilt =
            SimulationScript::new(script.demo_members().to_vec(), script.messages().to_vec());

        assert_eq!(rebuilt, Ok(script));
    }

    #[test]
    fn script_rejects_bad_delays() {
        let zero = vec![ScriptedMessage::new("Ada", "hi", Duration::ZERO)];
        assert_eq!(SimulationScript::new(vec![], zero), Err(ScriptError::ZeroDelay { index: 0 }));

        let unordered = vec![
            ScriptedMessage::new("Ada", "one", Duration::from_millis(20)),
            ScriptedMessage::new("Ada", "two", Duration::from_millis(20)),
        ];
        assert_eq!(
            SimulationScript::new(vec![], unordered),
            Err(ScriptError::NonIncreasingDelay { index: 1 })
        );
    }

    #[test]
    fn cap_message_respects_char_boundaries() {
        let config = ClientConfig { max_message_len: 3, ..ClientConfig::new() };

        assert_eq!(config.cap_message("héllo"), "hél");
        assert_eq!(config.cap_message("hé"), "hé");
    }
}
