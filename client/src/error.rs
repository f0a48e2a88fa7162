use tokio_tungstenite::tungstenite;

/// Errors raised by the client side of the game socket.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("websocket error: {0}")]
    WebSocket(#[from] tungstenite::Error),

    #[error("invalid server url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("unsupported url scheme `{0}`")]
    UnsupportedScheme(String),

    #[error("not connected to a game server")]
    NotConnected,

    /// The connection or the session loop has gone away.
    #[error("connection closed")]
    Closed,
}
