use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt, stream::SplitStream};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};
use tracing::{debug, info, warn};

use crate::{ClientError, Result};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;
type WsReader = SplitStream<WsStream>;

/// One live text-frame connection to the game server.
#[async_trait]
pub trait Transport: Send + 'static {
    async fn send(&mut self, text: String) -> Result<()>;

    /// Next text frame. `None` once the peer has closed the connection.
    async fn recv(&mut self) -> Option<Result<String>>;

    /// Close the connection. Closing twice is a no-op.
    async fn close(&mut self) -> Result<()>;
}

/// Opens [`Transport`]s. A fresh one is requested for every (re)connect.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Transport: Transport;

    async fn connect(&self, url: &str) -> Result<Self::Transport>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    type Transport = WebSocketTransport;

    async fn connect(&self, url: &str) -> Result<WebSocketTransport> {
        WebSocketTransport::connect(url).await
    }
}

/// WebSocket connection to the game server
pub struct WebSocketTransport {
    sender: Option<mpsc::UnboundedSender<String>>,
    reader: WsReader,
    writer_task: Option<JoinHandle<()>>,
}

impl WebSocketTransport {
    pub async fn connect(url: &str) -> Result<Self> {
        info!("Connecting to WebSocket: {}", url);

        let (ws_stream, _) = connect_async(url).await?;
        info!("WebSocket connected successfully");

        let (writer, reader) = ws_stream.split();

        let (sender, mut receiver) = mpsc::unbounded_channel::<String>();

        // Writer task owns the sink; frames go out in the order they were queued
        let writer_task = tokio::spawn(async move {
            let mut writer = writer;
            while let Some(text) = receiver.recv().await {
                debug!("Sending message: {}", text);
                if let Err(e) = writer.send(Message::text(text)).await {
                    warn!("Failed to send WebSocket message: {}", e);
                    break;
                }
            }

            if let Err(e) = writer.close().await {
                debug!("WebSocket close handshake failed: {}", e);
            }
        });

        Ok(Self {
            sender: Some(sender),
            reader,
            writer_task: Some(writer_task),
        })
    }
}

#[async_trait]
impl Transport for WebSocketTransport {
    async fn send(&mut self, text: String) -> Result<()> {
        self.sender
            .as_ref()
            .ok_or(ClientError::NotConnected)?
            .send(text)
            .map_err(|_| ClientError::Closed)
    }

    async fn recv(&mut self) -> Option<Result<String>> {
        if self.sender.is_none() {
            return None;
        }

        while let Some(frame) = self.reader.next().await {
            match frame {
                Ok(Message::Text(text)) => {
                    debug!("Received message: {}", text.as_str());
                    return Some(Ok(text.as_str().to_owned()));
                }
                Ok(Message::Close(_)) => {
                    info!("WebSocket connection closed by server");
                    return None;
                }
                // ping/pong are answered by tungstenite, binary frames are not ours
                Ok(_) => continue,
                Err(e) => return Some(Err(e.into())),
            }
        }

        None
    }

    async fn close(&mut self) -> Result<()> {
        // Dropping the sender ends the writer task, which closes the sink
        drop(self.sender.take());

        if let Some(writer_task) = self.writer_task.take() {
            if let Err(e) = writer_task.await {
                debug!("WebSocket writer task ended abnormally: {}", e);
            }
        }

        Ok(())
    }
}
