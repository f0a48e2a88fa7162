//! Reconnection policy for the game socket.
//!
//! ```text
//! Connecting ──open──▶ Connected ──close/error──▶ Disconnected { retryable }
//!                          ▲                              │ retryable
//!                          └──open── Reconnecting ◀───────┘ (after delay)
//! ```
//!
//! `Disconnected { retryable: false }` is final: it is reached when the game
//! has ended or the client closed the socket on purpose.

use std::time::Duration;

use futures_util::future::BoxFuture;
use minesweeper_live_common::protocol::OutboundCommand;
use tracing::debug;

use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LinkState {
    #[default]
    Connecting,
    Connected,
    Disconnected {
        retryable: bool,
    },
    Reconnecting,
}

/// Why a connection stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseCause {
    /// The peer closed the socket.
    Unexpected,
    /// The socket failed, or a connect attempt failed before the handshake.
    Error,
    /// The client closed the socket itself.
    Deliberate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconnectDecision {
    Retry(Duration),
    Halt,
}

/// Source of the reconnect delay.
pub trait Timer: Send + Sync + 'static {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TokioTimer;

impl Timer for TokioTimer {
    fn sleep(&self, delay: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(delay))
    }
}

#[derive(Debug)]
pub struct Reconnector {
    state: LinkState,
    delay: Duration,
    failures: u32,
}

impl Reconnector {
    pub fn new(delay: Duration) -> Self {
        Self {
            state: LinkState::Connecting,
            delay,
            failures: 0,
        }
    }

    pub fn state(&self) -> LinkState {
        self.state
    }

    pub fn is_halted(&self) -> bool {
        self.state == LinkState::Disconnected { retryable: false }
    }

    /// Consecutive failed connections since the last successful open.
    pub fn failures(&self) -> u32 {
        self.failures
    }

    /// Record the start of a connect attempt. Returns `false` once halted.
    pub fn attempt_started(&mut self) -> bool {
        match self.state {
            LinkState::Disconnected { retryable: false } => false,
            LinkState::Disconnected { retryable: true } => {
                self.state = LinkState::Reconnecting;
                true
            }
            _ => true,
        }
    }

    /// A connection opened. Returns the commands that put the server back on
    /// this session's game: `join` when the game is known, else `create`,
    /// then `show` for a fresh board.
    pub fn on_open(&mut self, session: &Session) -> Vec<OutboundCommand> {
        self.state = LinkState::Connected;
        self.failures = 0;

        let resume = match session.identity() {
            Some(id) => OutboundCommand::Join { id: id.clone() },
            None => OutboundCommand::Create,
        };
        vec![resume, OutboundCommand::Show]
    }

    pub fn on_close(&mut self, cause: CloseCause, session: &Session) -> ReconnectDecision {
        if self.is_halted() {
            return ReconnectDecision::Halt;
        }

        let retryable = cause != CloseCause::Deliberate && !session.is_terminal();
        self.state = LinkState::Disconnected { retryable };

        if retryable {
            self.failures = self.failures.saturating_add(1);
            debug!(?cause, failures = self.failures, "Scheduling reconnect");
            ReconnectDecision::Retry(self.delay)
        } else {
            debug!(?cause, "Not reconnecting");
            ReconnectDecision::Halt
        }
    }

    /// Forget all history, as if the client had just started.
    pub fn reset(&mut self) {
        self.state = LinkState::Connecting;
        self.failures = 0;
    }
}
