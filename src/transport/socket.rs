//! WebSocket push transport

use super::{Frame, Transport};
use crate::error::{MeterstreamError, Result};
use crate::logging::{StructuredLogger, get_logger};
use async_trait::async_trait;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Receives unsolicited text frames over a persistent WebSocket
pub struct SocketTransport {
    url: String,
    socket: Option<Socket>,
    logger: StructuredLogger,
}

impl SocketTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            socket: None,
            logger: get_logger("socket"),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Transport for SocketTransport {
    fn name(&self) -> &'static str {
        "socket"
    }

    async fn connect(&mut self) -> Result<()> {
        self.logger
            .info(&format!("Connecting to {}", self.url));
        let (socket, _response) = connect_async(self.url.as_str()).await?;
        self.socket = Some(socket);
        Ok(())
    }

    async fn recv(&mut self) -> Result<Option<Frame>> {
        loop {
            let Some(socket) = self.socket.as_mut() else {
                return Err(MeterstreamError::transport("socket is not connected"));
            };
            match socket.next().await {
                Some(Ok(Message::Text(text))) => return Ok(Some(Frame::Text(text))),
                Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                    Ok(text) => return Ok(Some(Frame::Text(text))),
                    Err(_) => self.logger.debug("Dropping non-UTF-8 binary frame"),
                },
                Some(Ok(Message::Close(reason))) => {
                    self.logger
                        .debug(&format!("Close frame received: {:?}", reason));
                    self.socket = None;
                    return Ok(None);
                }
                // ping replies are queued by tungstenite and flushed on the next read
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    self.socket = None;
                    return Err(e.into());
                }
                None => {
                    self.socket = None;
                    return Ok(None);
                }
            }
        }
    }

    async fn close(&mut self) {
        if let Some(mut socket) = self.socket.take()
            && let Err(e) = socket.close(None).await
        {
            self.logger.debug(&format!("Socket close failed: {}", e));
        }
    }
}
