//! touchmidi - capacitive touch electrodes to MIDI
//!
//! Every electrode on the board is bound to one mapping object. Note objects
//! turn touches into note on/off pairs using a hysteresis band, control
//! objects scale the reading into a controller value.

pub mod config;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod sources;

pub use config::TouchMidiConfig;
pub use engine::{MappingEngine, MidiMessage};
pub use error::{Error, MappingError, Result};
