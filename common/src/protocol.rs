use serde::Deserialize;

use crate::{
    lenient,
    models::{GameId, Pos},
};

/// Messages the client sends to the game server.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum OutboundCommand {
    #[serde(rename = "create")]
    Create,
    #[serde(rename = "join")]
    Join { id: GameId },
    #[serde(rename = "show")]
    Show,
    #[serde(rename = "sweep")]
    Sweep(Pos),
    #[serde(rename = "flag")]
    Flag(Pos),
    #[serde(rename = "stop")]
    Stop,
    #[serde(rename = "hiscore")]
    Hiscore,
    #[serde(rename = "set-hiscore-name")]
    SetHiscoreName { name: String },
}

impl OutboundCommand {
    pub const TAGS: [&'static str; 8] = [
        "create",
        "join",
        "show",
        "sweep",
        "flag",
        "stop",
        "hiscore",
        "set-hiscore-name",
    ];

    /// The wire `type` discriminator.
    pub fn tag(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Join { .. } => "join",
            Self::Show => "show",
            Self::Sweep(_) => "sweep",
            Self::Flag(_) => "flag",
            Self::Stop => "stop",
            Self::Hiscore => "hiscore",
            Self::SetHiscoreName { .. } => "set-hiscore-name",
        }
    }
}

/// Messages the game server pushes to the client.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(tag = "type")]
pub enum InboundEvent {
    /// The player hit a mine.
    #[serde(rename = "gameover")]
    GameOver,
    /// The board is cleared. `error` is set when the score could not be
    /// recorded, in which case no name is asked for.
    #[serde(rename = "win")]
    Win {
        #[serde(default, deserialize_with = "lenient::truthy")]
        error: bool,
    },
    /// Full board markup plus the score and remaining flag counters.
    #[serde(rename = "draw")]
    Draw { html: String, score: i64, flags: i64 },
    #[serde(rename = "id")]
    Id { id: GameId },
    #[serde(rename = "vsn")]
    Version {
        #[serde(deserialize_with = "lenient::text")]
        vsn: String,
    },
    #[serde(rename = "tick")]
    Tick {
        #[serde(deserialize_with = "lenient::text")]
        time: String,
    },
    /// High score table markup and, when the player placed, their rank.
    #[serde(rename = "hiscore")]
    Hiscore {
        top_list: String,
        #[serde(default, deserialize_with = "lenient::rank")]
        position: Option<u64>,
    },
}

impl InboundEvent {
    pub const TAGS: [&'static str; 7] =
        ["gameover", "win", "draw", "id", "vsn", "tick", "hiscore"];

    pub fn tag(&self) -> &'static str {
        match self {
            Self::GameOver => "gameover",
            Self::Win { .. } => "win",
            Self::Draw { .. } => "draw",
            Self::Id { .. } => "id",
            Self::Version { .. } => "vsn",
            Self::Tick { .. } => "tick",
            Self::Hiscore { .. } => "hiscore",
        }
    }
}
