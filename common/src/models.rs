use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// A board coordinate. `x` is the column, `y` the row.
#[derive(Deserialize, Serialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Pos {
    pub x: usize,
    pub y: usize,
}

impl Pos {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

/// Opaque game token assigned by the server.
///
/// The server may send it as a JSON string or number. It is kept in that
/// form so `join` echoes back exactly the value the server handed out.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct GameId(Token);

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(untagged)]
enum Token {
    Text(String),
    Number(Number),
}

impl GameId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(Token::Text(id.into()))
    }

    /// The id as it appears on the wire.
    pub fn to_json(&self) -> Value {
        match &self.0 {
            Token::Text(text) => Value::String(text.clone()),
            Token::Number(number) => Value::Number(number.clone()),
        }
    }
}

impl From<&str> for GameId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for GameId {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<u64> for GameId {
    fn from(value: u64) -> Self {
        Self(Token::Number(value.into()))
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Token::Text(text) => f.write_str(text),
            Token::Number(number) => write!(f, "{number}"),
        }
    }
}
