//! JSON text framing for both directions of the game socket.
//!
//! Every frame is a JSON object with a `type` discriminator. Outbound frames
//! are built explicitly so encoding cannot fail; inbound frames are checked
//! for shape and tag before the typed decode so callers can tell junk from
//! messages added by a newer server.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value, json};

use crate::protocol::{InboundEvent, OutboundCommand};

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Not JSON, or a known message with missing or ill-typed fields.
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("payload is not a JSON object")]
    NotAnObject,

    #[error("payload has no string `type` field")]
    MissingType,

    /// A well-formed message whose tag this client does not know.
    #[error("unknown message type `{0}`")]
    UnknownType(String),
}

impl DecodeError {
    /// Unknown tags are expected when talking to a newer server.
    pub fn is_unknown_type(&self) -> bool {
        matches!(self, Self::UnknownType(_))
    }
}

/// Encode a command as frame text.
pub fn encode(command: &OutboundCommand) -> String {
    let mut envelope = Map::new();
    envelope.insert("type".into(), json!(command.tag()));

    match command {
        OutboundCommand::Join { id } => {
            envelope.insert("id".into(), id.to_json());
        }
        OutboundCommand::Sweep(pos) | OutboundCommand::Flag(pos) => {
            envelope.insert("x".into(), json!(pos.x));
            envelope.insert("y".into(), json!(pos.y));
        }
        OutboundCommand::SetHiscoreName { name } => {
            envelope.insert("name".into(), json!(name));
        }
        OutboundCommand::Create
        | OutboundCommand::Show
        | OutboundCommand::Stop
        | OutboundCommand::Hiscore => {}
    }

    Value::Object(envelope).to_string()
}

/// Decode a frame pushed by the server.
pub fn decode(text: &str) -> Result<InboundEvent, DecodeError> {
    decode_tagged(text, &InboundEvent::TAGS)
}

/// Decode a frame sent by a client. Used on the serving side.
pub fn decode_command(text: &str) -> Result<OutboundCommand, DecodeError> {
    decode_tagged(text, &OutboundCommand::TAGS)
}

fn decode_tagged<T: DeserializeOwned>(text: &str, known: &[&str]) -> Result<T, DecodeError> {
    let value: Value = serde_json::from_str(text)?;
    let Value::Object(fields) = &value else {
        return Err(DecodeError::NotAnObject);
    };

    let tag = fields
        .get("type")
        .and_then(Value::as_str)
        .ok_or(DecodeError::MissingType)?;
    if !known.contains(&tag) {
        return Err(DecodeError::UnknownType(tag.to_owned()));
    }

    Ok(serde_json::from_value(value)?)
}
