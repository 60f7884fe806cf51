//! Stickerforge - chat-triggered sticker pipeline
//!
//! Turns a `!sticker` command plus an image, GIF, or image link into a
//! sticker: still images get an optional caption overlay, GIFs are
//! re-encoded as animated stickers.

pub mod compose;
pub mod config;
pub mod directive;
pub mod messaging;
pub mod pipeline;
pub mod resolver;
