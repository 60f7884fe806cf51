//! Sticker request orchestration.
//!
//! Parses the command tail, resolves media, routes it to the compositor,
//! straight through, or to the transcoder, and reports one outcome.

mod executor;
mod invocation;
mod outcome;

pub use executor::StickerPipeline;
pub use invocation::{command_tail, Invocation, STICKER_COMMAND};
pub use outcome::{
    route, PipelineOutcome, PipelineResult, Route, ANIMATED_STICKER_READY,
    ANIMATED_TEXT_UNSUPPORTED, MISSING_MEDIA, STICKER_READY, STICKER_WITH_TEXT_READY,
    UNSUPPORTED_FORMAT,
};
