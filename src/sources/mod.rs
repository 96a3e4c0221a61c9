//! Reading sources for touchmidi
//!
//! Sources stand in for the sensing driver: they produce one ReadingFrame
//! per sampling tick for the mapping engine.

mod replay;
mod source;

pub use replay::{parse_readings, ReplaySource};
pub use source::{ReadingFrame, Source};
