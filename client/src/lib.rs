//! Live Minesweeper Client Library
//!
//! Keeps one game session alive against a minesweeper server that pushes
//! board markup over a WebSocket. The session survives dropped connections:
//! after a fixed delay it reconnects and asks the server to `join` the game
//! it was playing (or `create` one if it never got an id), followed by `show`
//! for a fresh board. Once the game is lost or won it stops reconnecting.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use minesweeper_live_client::{
//!     ClientConfig, GameClient, Pos, RecordingView, TokioTimer, WebSocketConnector,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     let config = ClientConfig::new("http://localhost:4000")?;
//!     let view = RecordingView::new();
//!
//!     let game = GameClient::new(&config, WebSocketConnector, view.clone(), TokioTimer)?.spawn();
//!
//!     let mut updates = game.watch();
//!     updates.wait_for(|state| state.game_id.is_some()).await?;
//!
//!     game.sweep(Pos { x: 0, y: 0 })?;
//!     game.flag(Pos { x: 1, y: 1 })?;
//!
//!     game.shutdown().await;
//!     println!("{:?}", view.calls());
//!     Ok(())
//! }
//! ```
//!
//! The pieces can also be driven by hand: [`Dispatcher`] applies server
//! frames to a [`Session`] and a [`GameView`], [`Reconnector`] decides what
//! happens when a connection ends.

mod bindings;
mod config;
mod dispatcher;
mod error;
mod game;
mod reconnector;
mod session;
mod view;
mod websocket;

pub use bindings::{CellBindings, Gesture, parse_cell_id};
pub use config::{ClientConfig, SOCKET_PATH};
pub use dispatcher::{Directive, Dispatcher, Phase};
pub use error::ClientError;
pub use game::{GameClient, GameHandle, SessionSnapshot, UserAction};
pub use reconnector::{CloseCause, LinkState, ReconnectDecision, Reconnector, Timer, TokioTimer};
pub use session::Session;
pub use view::{GameView, RecordingView, ViewCall};
pub use websocket::{Connector, Transport, WebSocketConnector, WebSocketTransport};

// Re-export common types for convenience
pub use minesweeper_live_common::{DecodeError, codec, models::*, protocol::*};

pub type Result<T> = std::result::Result<T, ClientError>;
