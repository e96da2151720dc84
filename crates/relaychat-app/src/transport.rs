//! WebSocket driver.
//!
//! One text WebSocket message per protocol frame. Binary, ping and pong
//! messages are skipped; a close message, a read error or end of stream all
//! mean the relay has gone away.

use futures::{SinkExt, StreamExt};
use thiserror::Error;
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use crate::Driver;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// WebSocket transport errors.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The handshake or TCP connect failed.
    #[error("connection failed: {0}")]
    Connection(#[source] tokio_tungstenite::tungstenite::Error),

    /// A write failed after the connection was established.
    #[error("send failed: {0}")]
    Send(#[source] tokio_tungstenite::tungstenite::Error),

    /// No connection is open.
    #[error("not connected")]
    NotConnected,
}

/// [`Driver`] backed by `tokio-tungstenite`.
#[derive(Default)]
pub struct WsDriver {
    stream: Option<WsStream>,
}

impl WsDriver {
    /// Create a disconnected driver.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Driver for WsDriver {
    type Error = TransportError;

    async fn connect(&mut self, url: &str) -> Result<(), TransportError> {
        self.close();
        let (stream, _response) = connect_async(url).await.map_err(TransportError::Connection)?;
        tracing::info!(url, "connected to relay");
        self.stream = Some(stream);
        Ok(())
    }

    async fn send_text(&mut self, frame: String) -> Result<(), TransportError> {
        let stream = self.stream.as_mut().ok_or(TransportError::NotConnected)?;
        stream.send(Message::Text(frame.into())).await.map_err(TransportError::Send)
    }

    async fn recv_text(&mut self) -> Option<String> {
        loop {
            let stream = self.stream.as_mut()?;
            match stream.next().await {
                Some(Ok(Message::Text(text))) => return Some(text.as_str().to_owned()),
                Some(Ok(Message::Close(_))) | None => {
                    self.stream = None;
                    return None;
                },
                Some(Err(e)) => {
                    tracing::debug!(error = %e, "websocket read failed");
                    self.stream = None;
                    return None;
                },
                Some(Ok(_)) => {},
            }
        }
    }

    fn is_connected(&self) -> bool {
        self.stream.is_some()
    }

    fn close(&mut self) {
        if let Some(mut stream) = self.stream.take() {
            tokio::spawn(async move {
                if let Err(e) = stream.close(None).await {
                    tracing::debug!(error = %e, "websocket close failed");
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn send_without_connection_fails() {
        let mut driver = WsDriver::new();

        let result = driver.send_text("{}".into()).await;

        assert!(matches!(result, Err(TransportError::NotConnected)));
        assert!(driver.recv_text().await.is_none());
        assert!(!driver.is_connected());
    }
}
