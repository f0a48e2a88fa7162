//! Shared wire types for the live minesweeper client.
//!
//! The server speaks JSON text frames carrying a `type` discriminator.
//! [`protocol`] defines the two closed message sets, [`codec`] turns them
//! into and out of frame text.

pub mod codec;
mod lenient;
pub mod models;
pub mod protocol;

pub use codec::{DecodeError, decode, decode_command, encode};
