//! Play over a terminal.
//!
//! ```text
//! MINESWEEPER_URL=http://localhost:4000 cargo run --example terminal
//! ```
//!
//! Commands: `s X Y` sweep, `f X Y` flag, `click CELL` / `mark CELL` on a
//! cell id such as `row3-col5`, `top` for the high scores, `name NAME` after
//! a win, `restart`, `quit`.

use minesweeper_live_client::{
    ClientConfig, GameClient, GameHandle, GameView, Gesture, Pos, TokioTimer, WebSocketConnector,
};
use tokio::io::{AsyncBufReadExt, BufReader};

struct TerminalView;

impl GameView for TerminalView {
    fn render_board(&mut self, html: &str) {
        println!("\n{}", plain_text(html));
    }

    fn update_score(&mut self, score: i64, flags: i64) {
        println!("📋 Score: {score}  Flags left: {flags}");
    }

    fn render_hiscore(&mut self, top_list: &str, position: Option<u64>) {
        println!("🏆 High scores:\n{}", plain_text(top_list));
        if let Some(position) = position {
            println!("Your position is {position}");
        }
    }

    fn show_version(&mut self, version: &str) {
        println!("Server v{version}");
    }

    fn update_timer(&mut self, time: &str) {
        println!("⏱  {time}");
    }

    fn show_game_over_banner(&mut self) {
        println!("💣 GAME OVER!");
    }

    fn show_win_banner(&mut self) {
        println!("🎉 YOU WIN!");
    }

    fn prompt_hiscore_name(&mut self) {
        println!("Enter `name <your name>` for the high score table");
    }

    fn show_reconnecting(&mut self) {
        println!("🔌 Disconnected! Reconnecting...");
    }
}

/// Markup rendered as plain text for the terminal.
fn plain_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), 80).unwrap_or_else(|_| html.to_string())
}

fn parse_pos(x: Option<&str>, y: Option<&str>) -> Option<Pos> {
    Some(Pos::new(x?.parse().ok()?, y?.parse().ok()?))
}

fn handle_line(game: &GameHandle, line: &str) -> minesweeper_live_client::Result<bool> {
    let mut words = line.split_whitespace();
    match words.next() {
        Some("s") => match parse_pos(words.next(), words.next()) {
            Some(pos) => game.sweep(pos)?,
            None => println!("usage: s X Y"),
        },
        Some("f") => match parse_pos(words.next(), words.next()) {
            Some(pos) => game.flag(pos)?,
            None => println!("usage: f X Y"),
        },
        Some("click") => game.gesture(words.next().unwrap_or_default(), Gesture::Primary)?,
        Some("mark") => game.gesture(words.next().unwrap_or_default(), Gesture::Secondary)?,
        Some("top") => game.request_hiscore()?,
        Some("name") => {
            let name = words.collect::<Vec<_>>().join(" ");
            game.submit_hiscore_name(name)?;
        }
        Some("restart") => game.restart()?,
        Some("quit") => return Ok(false),
        Some(other) => println!("unknown command `{other}`"),
        None => {}
    }
    Ok(true)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let config = ClientConfig::from_env()?;
    let game = GameClient::new(&config, WebSocketConnector, TerminalView, TokioTimer)?.spawn();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if !handle_line(&game, line.trim())? {
            break;
        }
    }

    if let Some(id) = game.snapshot().game_id {
        println!("Leaving game {id}");
    }
    game.shutdown().await;
    Ok(())
}
