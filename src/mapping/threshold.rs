//! Note mapping
//!
//! Turns a continuous electrode reading into note on/off triggers using
//! two thresholds. Readings inside the band between them never change the
//! state, so a finger resting near a single threshold cannot chatter.

use super::{Mapper, NoteState, ObjectState};
use crate::engine::MidiMessage;
use crate::error::MappingError;

/// Default reading at or above which an electrode counts as touched
pub const DEFAULT_TOUCH_THRESHOLD: u32 = 40;

/// Default reading at or below which a touched electrode is released
pub const DEFAULT_RELEASE_THRESHOLD: u32 = 20;

/// Default note-on velocity
pub const DEFAULT_VELOCITY: u8 = 127;

/// Hysteresis note trigger for one electrode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteMapping {
    /// MIDI note number (0-127)
    pub note: u8,
    /// Reading at or above which `Released -> Touched`
    pub touch_threshold: u32,
    /// Reading at or below which `Touched -> Released`
    pub release_threshold: u32,
    /// Note-on velocity (1-127)
    pub velocity: u8,
}

impl NoteMapping {
    /// Create a note mapping with the default thresholds and velocity
    pub fn new(note: u8) -> Self {
        Self {
            note,
            ..Self::default()
        }
    }

    /// Set the touch and release thresholds
    pub fn with_thresholds(mut self, touch: u32, release: u32) -> Self {
        self.touch_threshold = touch;
        self.release_threshold = release;
        self
    }

    /// Set the note-on velocity
    pub fn with_velocity(mut self, velocity: u8) -> Self {
        self.velocity = velocity;
        self
    }
}

impl Default for NoteMapping {
    fn default() -> Self {
        Self {
            note: 0,
            touch_threshold: DEFAULT_TOUCH_THRESHOLD,
            release_threshold: DEFAULT_RELEASE_THRESHOLD,
            velocity: DEFAULT_VELOCITY,
        }
    }
}

impl Mapper for NoteMapping {
    fn validate(&self) -> Result<(), MappingError> {
        if self.note > 127 {
            return Err(MappingError::OutOfMidiRange {
                field: "note",
                value: self.note,
            });
        }
        // Velocity 0 on a note-on is read as a note-off by receivers
        if self.velocity == 0 || self.velocity > 127 {
            return Err(MappingError::OutOfMidiRange {
                field: "velocity",
                value: self.velocity,
            });
        }
        if self.touch_threshold < self.release_threshold {
            return Err(MappingError::InvertedHysteresis {
                touch: self.touch_threshold,
                release: self.release_threshold,
            });
        }
        Ok(())
    }

    fn update(&self, channel: u8, state: &mut ObjectState, reading: u32) -> Option<MidiMessage> {
        // Inverted band is rejected by validate(); never guess which way it was meant
        if self.touch_threshold < self.release_threshold {
            return None;
        }

        match state.note {
            NoteState::Released if reading >= self.touch_threshold => {
                state.note = NoteState::Touched;
                Some(MidiMessage::NoteOn(channel, self.note, self.velocity))
            }
            NoteState::Touched if reading <= self.release_threshold => {
                state.note = NoteState::Released;
                Some(MidiMessage::NoteOff(channel, self.note))
            }
            _ => None,
        }
    }
}
