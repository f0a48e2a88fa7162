use std::sync::Arc;

use futures_util::future::BoxFuture;
use minesweeper_live_common::{
    codec,
    models::{GameId, Pos},
    protocol::OutboundCommand,
};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{
    ClientConfig, ClientError, Result,
    bindings::Gesture,
    dispatcher::{Directive, Dispatcher},
    reconnector::{CloseCause, LinkState, ReconnectDecision, Reconnector, Timer},
    view::GameView,
    websocket::{Connector, Transport},
};

/// Input from the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserAction {
    Sweep(Pos),
    Flag(Pos),
    /// A gesture on a board cell element, identified by its element id.
    Gesture { cell_id: String, gesture: Gesture },
    RequestHiscore,
    SubmitHiscoreName(String),
    /// Abandon the current game and start over with a fresh session.
    Restart,
}

/// Observable state of the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub game_id: Option<GameId>,
    pub game_over: bool,
    pub link: LinkState,
}

impl SessionSnapshot {
    pub fn is_connected(&self) -> bool {
        self.link == LinkState::Connected
    }
}

enum Wake<T> {
    Frame(Option<Result<String>>),
    Opened(Result<T>),
    RetryDue,
    Action(Option<UserAction>),
}

/// Owns the session, its connection and the reconnect policy, and drives
/// them from a single task.
///
/// Every wake-up (a frame, a finished connect attempt, an expired reconnect
/// delay, a player action) is handled to completion before the next one is
/// looked at, so the session state needs no locking.
pub struct GameClient<C: Connector, V, T> {
    url: String,
    connector: Arc<C>,
    view: V,
    timer: T,
    dispatcher: Dispatcher,
    reconnector: Reconnector,
    connection: Option<C::Transport>,
    pending_open: Option<BoxFuture<'static, Result<C::Transport>>>,
    pending_retry: Option<BoxFuture<'static, ()>>,
    snapshot: watch::Sender<SessionSnapshot>,
}

impl<C, V, T> GameClient<C, V, T>
where
    C: Connector,
    V: GameView,
    T: Timer,
{
    pub fn new(config: &ClientConfig, connector: C, view: V, timer: T) -> Result<Self> {
        let url = config.websocket_url()?;
        let (snapshot, _) = watch::channel(SessionSnapshot::default());

        Ok(Self {
            url,
            connector: Arc::new(connector),
            view,
            timer,
            dispatcher: Dispatcher::new(),
            reconnector: Reconnector::new(config.reconnect_delay),
            connection: None,
            pending_open: None,
            pending_retry: None,
            snapshot,
        })
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.subscribe()
    }

    /// Run the session until `actions` closes.
    pub async fn run(mut self, mut actions: mpsc::UnboundedReceiver<UserAction>) {
        info!("Starting game session on {}", self.url);
        self.begin_connect();
        self.publish();

        loop {
            let wake = tokio::select! {
                frame = next_frame(&mut self.connection) => Wake::Frame(frame),
                opened = take_ready(&mut self.pending_open) => Wake::Opened(opened),
                () = take_ready(&mut self.pending_retry) => Wake::RetryDue,
                action = actions.recv() => Wake::Action(action),
            };

            match wake {
                Wake::Frame(Some(Ok(text))) => self.on_frame(&text).await,
                Wake::Frame(Some(Err(e))) => {
                    warn!("Error receiving WebSocket message: {}", e);
                    self.on_lost(CloseCause::Error).await;
                }
                Wake::Frame(None) => {
                    info!("Connection closed by server");
                    self.on_lost(CloseCause::Unexpected).await;
                }
                Wake::Opened(Ok(transport)) => self.on_open(transport).await,
                Wake::Opened(Err(e)) => {
                    warn!("Failed to connect to {}: {}", self.url, e);
                    self.on_lost(CloseCause::Error).await;
                }
                Wake::RetryDue => self.begin_connect(),
                Wake::Action(Some(action)) => self.on_action(action).await,
                Wake::Action(None) => break,
            }

            self.publish();
        }

        self.close_connection().await;
        info!("Game session stopped");
    }

    fn begin_connect(&mut self) {
        if !self.reconnector.attempt_started() {
            return;
        }

        let connector = Arc::clone(&self.connector);
        let url = self.url.clone();
        self.pending_open = Some(Box::pin(async move { connector.connect(&url).await }));
    }

    async fn on_open(&mut self, transport: C::Transport) {
        self.close_connection().await;
        info!("Connected to {}", self.url);

        self.connection = Some(transport);
        self.dispatcher.on_open();
        for command in self.reconnector.on_open(self.dispatcher.session()) {
            self.send(command).await;
        }
    }

    async fn on_frame(&mut self, text: &str) {
        if self.dispatcher.dispatch_payload(text, &mut self.view) == Directive::CloseTransport {
            self.on_lost(CloseCause::Deliberate).await;
        }
    }

    async fn on_lost(&mut self, cause: CloseCause) {
        self.close_connection().await;
        self.dispatcher.on_connection_lost();

        match self.reconnector.on_close(cause, self.dispatcher.session()) {
            ReconnectDecision::Retry(delay) => {
                info!("Disconnected, reconnecting in {:?}", delay);
                self.view.show_reconnecting();
                self.pending_retry = Some(self.timer.sleep(delay));
            }
            ReconnectDecision::Halt => info!("Disconnected"),
        }
    }

    async fn on_action(&mut self, action: UserAction) {
        match action {
            UserAction::Sweep(pos) => self.send(OutboundCommand::Sweep(pos)).await,
            UserAction::Flag(pos) => self.send(OutboundCommand::Flag(pos)).await,
            UserAction::Gesture { cell_id, gesture } => {
                match self.dispatcher.bindings().resolve(&cell_id) {
                    Some(pos) => self.send(gesture.command(pos)).await,
                    None => debug!("No cell `{}` on the current board", cell_id),
                }
            }
            UserAction::RequestHiscore => self.send(OutboundCommand::Hiscore).await,
            UserAction::SubmitHiscoreName(name) => {
                self.send(OutboundCommand::SetHiscoreName { name }).await;
                self.send(OutboundCommand::Hiscore).await;
            }
            UserAction::Restart => self.restart().await,
        }
    }

    /// Tell the server the game is abandoned, then start over as a brand new
    /// session: no identity, not ended, first connect.
    async fn restart(&mut self) {
        info!("Restarting with a new game");
        self.send(OutboundCommand::Stop).await;
        self.close_connection().await;

        self.pending_open = None;
        self.pending_retry = None;
        self.dispatcher = Dispatcher::new();
        self.reconnector.reset();
        self.begin_connect();
    }

    async fn send(&mut self, command: OutboundCommand) {
        if !self.dispatcher.permits(&command) {
            debug!("Game has ended, not sending `{}`", command.tag());
            return;
        }

        let Some(connection) = self.connection.as_mut() else {
            warn!("Not connected, dropping `{}`", command.tag());
            return;
        };

        if let Err(e) = connection.send(codec::encode(&command)).await {
            warn!("Failed to send `{}`: {}", command.tag(), e);
        }
    }

    async fn close_connection(&mut self) {
        if let Some(mut connection) = self.connection.take()
            && let Err(e) = connection.close().await
        {
            debug!("Error while closing connection: {}", e);
        }
    }

    fn publish(&self) {
        let session = self.dispatcher.session();
        let next = SessionSnapshot {
            game_id: session.identity().cloned(),
            game_over: session.is_terminal(),
            link: self.reconnector.state(),
        };

        self.snapshot.send_if_modified(|current| {
            if *current == next {
                return false;
            }
            *current = next;
            true
        });
    }
}

impl<C, V, T> GameClient<C, V, T>
where
    C: Connector,
    V: GameView + Send + 'static,
    T: Timer,
{
    /// Run the session on a background task.
    pub fn spawn(self) -> GameHandle {
        let (actions, receiver) = mpsc::unbounded_channel();
        let snapshot = self.watch();
        let task = tokio::spawn(self.run(receiver));

        GameHandle {
            actions,
            snapshot,
            task,
        }
    }
}

async fn next_frame<T: Transport>(connection: &mut Option<T>) -> Option<Result<String>> {
    match connection {
        Some(transport) => transport.recv().await,
        None => std::future::pending().await,
    }
}

/// Await the future in `slot`, emptying the slot once it resolves. Never
/// resolves while the slot is empty.
async fn take_ready<O>(slot: &mut Option<BoxFuture<'static, O>>) -> O {
    let output = match slot.as_mut() {
        Some(future) => future.await,
        None => std::future::pending().await,
    };
    *slot = None;
    output
}

/// Handle to a session running on a background task.
pub struct GameHandle {
    actions: mpsc::UnboundedSender<UserAction>,
    snapshot: watch::Receiver<SessionSnapshot>,
    task: JoinHandle<()>,
}

impl GameHandle {
    pub fn sweep(&self, pos: Pos) -> Result<()> {
        debug!("Sweeping cell at ({}, {})", pos.x, pos.y);
        self.act(UserAction::Sweep(pos))
    }

    pub fn flag(&self, pos: Pos) -> Result<()> {
        debug!("Flagging cell at ({}, {})", pos.x, pos.y);
        self.act(UserAction::Flag(pos))
    }

    /// A click (`Primary`) or context-menu click (`Secondary`) on the cell
    /// element with id `cell_id`.
    pub fn gesture(&self, cell_id: impl Into<String>, gesture: Gesture) -> Result<()> {
        self.act(UserAction::Gesture {
            cell_id: cell_id.into(),
            gesture,
        })
    }

    pub fn request_hiscore(&self) -> Result<()> {
        self.act(UserAction::RequestHiscore)
    }

    /// Put `name` on the high score table, then fetch the updated table.
    pub fn submit_hiscore_name(&self, name: impl Into<String>) -> Result<()> {
        self.act(UserAction::SubmitHiscoreName(name.into()))
    }

    pub fn restart(&self) -> Result<()> {
        self.act(UserAction::Restart)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn watch(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshot.clone()
    }

    /// Stop the session and close its connection.
    pub async fn shutdown(self) {
        drop(self.actions);
        if let Err(e) = self.task.await {
            warn!("Game session task failed: {}", e);
        }
    }

    fn act(&self, action: UserAction) -> Result<()> {
        self.actions.send(action).map_err(|_| ClientError::Closed)
    }
}
