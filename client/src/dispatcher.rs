//! Inbound message classification and the game-phase state machine.
//!
//! ```text
//! AwaitingConnection ──id / open with known id──▶ Joined
//!         ▲                                         │
//!         └──────────── connection lost ────────────┘
//! any ──gameover / win──▶ Terminal (absorbing)
//! ```

use minesweeper_live_common::{
    codec,
    protocol::{InboundEvent, OutboundCommand},
};
use tracing::{debug, info, warn};

use crate::{bindings::CellBindings, session::Session, view::GameView};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    AwaitingConnection,
    Joined,
    Terminal,
}

/// What the connection owner must do after a message was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Directive {
    Continue,
    CloseTransport,
}

/// Owns the [`Session`] and applies server events to it and to the view.
#[derive(Debug, Default)]
pub struct Dispatcher {
    session: Session,
    phase: Phase,
    bindings: CellBindings,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn bindings(&self) -> &CellBindings {
        &self.bindings
    }

    /// A connection opened. A session that already knows its game is joined
    /// straight away; the resume commands name it.
    pub fn on_open(&mut self) {
        if self.phase != Phase::Terminal {
            self.phase = if self.session.has_identity() {
                Phase::Joined
            } else {
                Phase::AwaitingConnection
            };
        }
    }

    pub fn on_connection_lost(&mut self) {
        if self.phase == Phase::Joined {
            self.phase = Phase::AwaitingConnection;
        }
    }

    /// Decode and dispatch one frame. Frames that do not decode are logged
    /// and dropped without touching any state.
    pub fn dispatch_payload(&mut self, text: &str, view: &mut impl GameView) -> Directive {
        match codec::decode(text) {
            Ok(event) => self.dispatch(event, view),
            Err(e) if e.is_unknown_type() => {
                debug!("Ignoring message: {}", e);
                Directive::Continue
            }
            Err(e) => {
                warn!("Dropping undecodable message ({}): {}", e, text);
                Directive::Continue
            }
        }
    }

    pub fn dispatch(&mut self, event: InboundEvent, view: &mut impl GameView) -> Directive {
        match event {
            InboundEvent::GameOver => {
                if self.end_game() {
                    info!("Game over");
                    view.show_game_over_banner();
                }
                return Directive::CloseTransport;
            }
            InboundEvent::Win { error } => {
                if self.end_game() {
                    info!(score_error = error, "Game won");
                    view.show_win_banner();
                    if !error {
                        view.prompt_hiscore_name();
                    }
                }
            }
            InboundEvent::Version { vsn } => view.show_version(&vsn),
            InboundEvent::Hiscore { top_list, position } => {
                view.render_hiscore(&top_list, position);
            }
            event if self.phase == Phase::Terminal => {
                debug!("Ignoring `{}` after the game ended", event.tag());
            }
            InboundEvent::Id { id } => {
                if self.session.set_identity(id.clone()) {
                    info!("Joined game {}", id);
                } else if self.session.identity() != Some(&id) {
                    warn!("Ignoring reassigned game id {}", id);
                }
                self.phase = Phase::Joined;
            }
            InboundEvent::Draw { html, score, flags } => {
                let cells = self.bindings.rebind(&html);
                debug!(cells, score, flags, "Board redrawn");
                view.render_board(&html);
                view.update_score(score, flags);
            }
            InboundEvent::Tick { time } => view.update_timer(&time),
        }

        Directive::Continue
    }

    /// Whether `command` still means anything to the server. Once the game is
    /// over only `stop` and the high score commands are sent.
    pub fn permits(&self, command: &OutboundCommand) -> bool {
        match command {
            OutboundCommand::Stop
            | OutboundCommand::Hiscore
            | OutboundCommand::SetHiscoreName { .. } => true,
            _ => !self.session.is_terminal(),
        }
    }

    fn end_game(&mut self) -> bool {
        self.phase = Phase::Terminal;
        self.session.mark_terminal()
    }
}

#[cfg(test)]
mod tests {
    use minesweeper_live_common::models::{GameId, Pos};

    use super::*;
    use crate::view::{RecordingView, ViewCall};

    fn feed(dispatcher: &mut Dispatcher, view: &mut RecordingView, frames: &[&str]) -> Vec<Directive> {
        frames
            .iter()
            .map(|frame| dispatcher.dispatch_payload(frame, view))
            .collect()
    }

    #[test]
    fn id_joins_and_draw_reaches_the_view() {
        let mut dispatcher = Dispatcher::new();
        let mut view = RecordingView::new();

        feed(
            &mut dispatcher,
            &mut view,
            &[
                r#"{"type":"id","id":"g1"}"#,
                r#"{"type":"draw","html":"<table/>","score":5,"flags":2}"#,
            ],
        );

        assert_eq!(dispatcher.phase(), Phase::Joined);
        assert_eq!(dispatcher.session().identity(), Some(&GameId::from("g1")));
        assert_eq!(
            view.calls(),
            vec![
                ViewCall::RenderBoard("<table/>".into()),
                ViewCall::UpdateScore { score: 5, flags: 2 },
            ]
        );
    }

    #[test]
    fn second_id_does_not_replace_the_first() {
        let mut dispatcher = Dispatcher::new();
        let mut view = RecordingView::new();

        feed(
            &mut dispatcher,
            &mut view,
            &[r#"{"type":"id","id":"A"}"#, r#"{"type":"id","id":"B"}"#],
        );

        assert_eq!(dispatcher.session().identity(), Some(&GameId::from("A")));
        assert!(view.calls().is_empty());
    }

    #[test]
    fn gameover_always_closes_but_announces_once() {
        let mut dispatcher = Dispatcher::new();
        let mut view = RecordingView::new();

        let directives = feed(
            &mut dispatcher,
            &mut view,
            &[r#"{"type":"gameover"}"#, r#"{"type":"gameover"}"#],
        );

        assert_eq!(directives, vec![Directive::CloseTransport; 2]);
        assert_eq!(view.calls(), vec![ViewCall::GameOverBanner]);
        assert_eq!(dispatcher.phase(), Phase::Terminal);
    }

    #[test]
    fn win_keeps_the_connection_and_asks_for_a_name() {
        let mut dispatcher = Dispatcher::new();
        let mut view = RecordingView::new();

        let directives = feed(
            &mut dispatcher,
            &mut view,
            &[r#"{"type":"win"}"#, r#"{"type":"win"}"#],
        );

        assert_eq!(directives, vec![Directive::Continue; 2]);
        assert_eq!(
            view.calls(),
            vec![ViewCall::WinBanner, ViewCall::PromptHiscoreName]
        );
    }

    #[test]
    fn win_with_error_skips_the_name_prompt() {
        let mut dispatcher = Dispatcher::new();
        let mut view = RecordingView::new();

        feed(&mut dispatcher, &mut view, &[r#"{"type":"win","error":true}"#]);

        assert_eq!(view.calls(), vec![ViewCall::WinBanner]);
    }

    #[test]
    fn terminal_absorbs_every_later_event() {
        let mut dispatcher = Dispatcher::new();
        let mut view = RecordingView::new();

        feed(
            &mut dispatcher,
            &mut view,
            &[
                r#"{"type":"win","error":true}"#,
                r#"{"type":"id","id":"late"}"#,
                r#"{"type":"draw","html":"<table/>","score":1,"flags":0}"#,
                r#"{"type":"tick","time":99}"#,
                r#"{"type":"gameover"}"#,
                r#"{"type":"hiscore","top_list":"<ol/>","position":2}"#,
            ],
        );

        assert!(dispatcher.session().is_terminal());
        assert_eq!(dispatcher.phase(), Phase::Terminal);
        assert!(!dispatcher.session().has_identity());
        assert_eq!(
            view.calls(),
            vec![
                ViewCall::WinBanner,
                ViewCall::RenderHiscore {
                    top_list: "<ol/>".into(),
                    position: Some(2)
                },
            ]
        );

        dispatcher.on_open();
        dispatcher.on_connection_lost();
        assert_eq!(dispatcher.phase(), Phase::Terminal);
    }

    #[test]
    fn unknown_and_malformed_frames_change_nothing() {
        let mut dispatcher = Dispatcher::new();
        let mut view = RecordingView::new();

        let directives = feed(
            &mut dispatcher,
            &mut view,
            &[r#"{"type":"unknown_tag"}"#, "{oops", r#"{"type":"draw"}"#],
        );

        assert_eq!(directives, vec![Directive::Continue; 3]);
        assert_eq!(dispatcher.phase(), Phase::AwaitingConnection);
        assert!(!dispatcher.session().has_identity());
        assert!(view.calls().is_empty());
    }

    #[test]
    fn version_tick_and_hiscore_are_forwarded() {
        let mut dispatcher = Dispatcher::new();
        let mut view = RecordingView::new();

        feed(
            &mut dispatcher,
            &mut view,
            &[
                r#"{"type":"vsn","vsn":"0.9.1"}"#,
                r#"{"type":"tick","time":"42"}"#,
                r#"{"type":"hiscore","top_list":"<ol/>"}"#,
            ],
        );

        assert_eq!(
            view.calls(),
            vec![
                ViewCall::ShowVersion("0.9.1".into()),
                ViewCall::UpdateTimer("42".into()),
                ViewCall::RenderHiscore {
                    top_list: "<ol/>".into(),
                    position: None
                },
            ]
        );
    }

    #[test]
    fn open_with_known_identity_joins_immediately() {
        let mut dispatcher = Dispatcher::new();
        let mut view = RecordingView::new();

        dispatcher.on_open();
        assert_eq!(dispatcher.phase(), Phase::AwaitingConnection);

        feed(&mut dispatcher, &mut view, &[r#"{"type":"id","id":"g1"}"#]);
        dispatcher.on_connection_lost();
        assert_eq!(dispatcher.phase(), Phase::AwaitingConnection);

        dispatcher.on_open();
        assert_eq!(dispatcher.phase(), Phase::Joined);
    }

    #[test]
    fn draw_rebinds_cells() {
        let mut dispatcher = Dispatcher::new();
        let mut view = RecordingView::new();

        feed(
            &mut dispatcher,
            &mut view,
            &[r#"{"type":"draw","html":"<table><tr><td class=\"cell\" id=\"row1-col4\"></td></tr></table>","score":0,"flags":10}"#],
        );

        assert_eq!(dispatcher.bindings().resolve("row1-col4"), Some(Pos::new(4, 1)));
    }

    #[test]
    fn moves_are_not_sent_after_the_game_ends() {
        let mut dispatcher = Dispatcher::new();
        let mut view = RecordingView::new();
        let sweep = OutboundCommand::Sweep(Pos::new(0, 0));

        assert!(dispatcher.permits(&sweep));
        feed(&mut dispatcher, &mut view, &[r#"{"type":"win"}"#]);

        assert!(!dispatcher.permits(&sweep));
        assert!(!dispatcher.permits(&OutboundCommand::Show));
        assert!(dispatcher.permits(&OutboundCommand::Stop));
        assert!(dispatcher.permits(&OutboundCommand::Hiscore));
        assert!(dispatcher.permits(&OutboundCommand::SetHiscoreName { name: "Ana".into() }));
    }
}
