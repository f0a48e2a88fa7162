use std::sync::{Arc, Mutex, PoisonError};

/// Everything the session shows to the player.
///
/// Calls are fire-and-forget: the session never inspects the outcome.
pub trait GameView {
    /// Replace the board with fresh markup. Also clears any status banner.
    fn render_board(&mut self, html: &str);
    fn update_score(&mut self, score: i64, flags: i64);
    fn render_hiscore(&mut self, top_list: &str, position: Option<u64>);
    fn show_version(&mut self, version: &str);
    fn update_timer(&mut self, time: &str);
    fn show_game_over_banner(&mut self);
    fn show_win_banner(&mut self);
    /// Ask the player for a name to put on the high score table.
    fn prompt_hiscore_name(&mut self);
    fn show_reconnecting(&mut self);
}

/// One call made on a [`RecordingView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewCall {
    RenderBoard(String),
    UpdateScore { score: i64, flags: i64 },
    RenderHiscore { top_list: String, position: Option<u64> },
    ShowVersion(String),
    UpdateTimer(String),
    GameOverBanner,
    WinBanner,
    PromptHiscoreName,
    Reconnecting,
}

/// A headless view that records every call. Clones share the same log, so
/// one copy can be handed to the session and another kept for inspection.
#[derive(Debug, Clone, Default)]
pub struct RecordingView {
    calls: Arc<Mutex<Vec<ViewCall>>>,
}

impl RecordingView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ViewCall> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Return the recorded calls and start a fresh log.
    pub fn take(&self) -> Vec<ViewCall> {
        std::mem::take(&mut *self.calls.lock().unwrap_or_else(PoisonError::into_inner))
    }

    fn record(&mut self, call: ViewCall) {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(call);
    }
}

impl GameView for RecordingView {
    fn render_board(&mut self, html: &str) {
        self.record(ViewCall::RenderBoard(html.to_string()));
    }

    fn update_score(&mut self, score: i64, flags: i64) {
        self.record(ViewCall::UpdateScore { score, flags });
    }

    fn render_hiscore(&mut self, top_list: &str, position: Option<u64>) {
        self.record(ViewCall::RenderHiscore {
            top_list: top_list.to_string(),
            position,
        });
    }

    fn show_version(&mut self, version: &str) {
        self.record(ViewCall::ShowVersion(version.to_string()));
    }

    fn update_timer(&mut self, time: &str) {
        self.record(ViewCall::UpdateTimer(time.to_string()));
    }

    fn show_game_over_banner(&mut self) {
        self.record(ViewCall::GameOverBanner);
    }

    fn show_win_banner(&mut self) {
        self.record(ViewCall::WinBanner);
    }

    fn prompt_hiscore_name(&mut self) {
        self.record(ViewCall::PromptHiscoreName);
    }

    fn show_reconnecting(&mut self) {
        self.record(ViewCall::Reconnecting);
    }
}
