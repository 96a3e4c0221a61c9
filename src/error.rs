//! Error types for touch mapping and MIDI output.

use thiserror::Error;

/// A problem with a single electrode's mapping configuration.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MappingError {
    #[error("touch threshold {touch} is below release threshold {release}")]
    InvertedHysteresis { touch: u32, release: u32 },

    #[error("input range {min}..={max} is empty")]
    DegenerateInputRange { min: u32, max: u32 },

    #[error("output range {min}..={max} is inverted")]
    InvertedOutputRange { min: u8, max: u8 },

    #[error("{field} {value} is outside the MIDI data range")]
    OutOfMidiRange { field: &'static str, value: u8 },
}

#[derive(Error, Debug)]
pub enum Error {
    #[error("electrode {index}: {source}")]
    Electrode {
        index: usize,
        #[source]
        source: MappingError,
    },

    #[error("MIDI channel {0} is outside 0-15")]
    InvalidChannel(u8),

    #[error("MIDI port error: {0}")]
    MidiPort(String),

    #[error("MIDI device error: {0}")]
    MidiDevice(String),

    #[error("MIDI send error: {0}")]
    MidiSend(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("replay parse error on line {line}: {message}")]
    ReplayParse { line: usize, message: String },
}

impl From<midir::InitError> for Error {
    fn from(e: midir::InitError) -> Self {
        Error::MidiDevice(e.to_string())
    }
}

impl From<midir::PortInfoError> for Error {
    fn from(e: midir::PortInfoError) -> Self {
        Error::MidiPort(e.to_string())
    }
}

impl From<midir::ConnectError<midir::MidiOutput>> for Error {
    fn from(e: midir::ConnectError<midir::MidiOutput>) -> Self {
        Error::MidiPort(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
