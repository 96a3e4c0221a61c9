//! Per-electrode mapping objects

use super::{ControlMapping, Mapper, NoteMapping};
use crate::engine::MidiMessage;
use crate::error::MappingError;

/// What an electrode does, fixed once configured
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectConfig {
    /// Electrode is ignored
    #[default]
    Disabled,
    /// On/off note trigger
    Note(NoteMapping),
    /// Continuous controller
    Control(ControlMapping),
}

impl ObjectConfig {
    /// Short name of the object kind
    pub fn kind_name(&self) -> &'static str {
        match self {
            ObjectConfig::Disabled => "disabled",
            ObjectConfig::Note(_) => "note",
            ObjectConfig::Control(_) => "control",
        }
    }

    /// Check the configuration; disabled objects are always valid
    pub fn validate(&self) -> Result<(), MappingError> {
        match self {
            ObjectConfig::Disabled => Ok(()),
            ObjectConfig::Note(note) => note.validate(),
            ObjectConfig::Control(control) => control.validate(),
        }
    }
}

/// Debounced contact state of a note electrode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NoteState {
    #[default]
    Released,
    Touched,
}

/// Runtime state, rewritten every sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ObjectState {
    /// Contact state (note objects)
    pub note: NoteState,
    /// Last emitted controller value (control objects), `None` until the first emission
    pub last_output: Option<u8>,
}

impl ObjectState {
    pub fn is_touched(&self) -> bool {
        self.note == NoteState::Touched
    }
}

/// One electrode slot: configuration plus runtime state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MappingObject {
    pub config: ObjectConfig,
    pub state: ObjectState,
}

impl MappingObject {
    /// Create an object in its initial runtime state
    pub fn new(config: ObjectConfig) -> Self {
        Self {
            config,
            state: ObjectState::default(),
        }
    }

    /// Create a note object
    pub fn note(mapping: NoteMapping) -> Self {
        Self::new(ObjectConfig::Note(mapping))
    }

    /// Create a controller object
    pub fn control(mapping: ControlMapping) -> Self {
        Self::new(ObjectConfig::Control(mapping))
    }

    /// Evaluate one sample
    ///
    /// A `None` reading is a failed or missing sample: nothing is evaluated
    /// and the state is left untouched.
    pub fn update(&mut self, channel: u8, reading: Option<u32>) -> Option<MidiMessage> {
        let reading = reading?;
        match &self.config {
            ObjectConfig::Disabled => None,
            ObjectConfig::Note(note) => note.update(channel, &mut self.state, reading),
            ObjectConfig::Control(control) => control.update(channel, &mut self.state, reading),
        }
    }

    /// Note-off for a held note, resetting the state
    pub fn release(&mut self, channel: u8) -> Option<MidiMessage> {
        let event = match (&self.config, self.state.note) {
            (ObjectConfig::Note(note), NoteState::Touched) => {
                Some(MidiMessage::NoteOff(channel, note.note))
            }
            _ => None,
        };
        self.state = ObjectState::default();
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_object_is_disabled() {
        let object = MappingObject::default();
        assert_eq!(object.config, ObjectConfig::Disabled);
        assert!(!object.state.is_touched());
        assert_eq!(object.state.last_output, None);
    }

    #[test]
    fn test_disabled_object_is_noop() {
        let mut object = MappingObject::default();
        for reading in [0, 40, 1023, u32::MAX] {
            assert_eq!(object.update(0, Some(reading)), None);
        }
        assert_eq!(object.state, ObjectState::default());
    }

    #[test]
    fn test_missing_sample_skipped() {
        let mut object = MappingObject::note(NoteMapping::new(60));
        object.update(0, Some(100));
        assert!(object.state.is_touched());

        assert_eq!(object.update(0, None), None);
        assert!(object.state.is_touched());

        let mut control = MappingObject::control(ControlMapping::new(1));
        assert_eq!(control.update(0, None), None);
        assert_eq!(control.state.last_output, None);
    }

    #[test]
    fn test_release_held_note() {
        let mut object = MappingObject::note(NoteMapping::new(60));
        assert_eq!(object.release(0), None);

        object.update(2, Some(100));
        assert_eq!(object.release(2), Some(MidiMessage::NoteOff(2, 60)));
        assert_eq!(object.state.note, NoteState::Released);
    }

    #[test]
    fn test_release_clears_control_state() {
        let mut object = MappingObject::control(ControlMapping::new(1));
        object.update(0, Some(1023));
        assert_eq!(object.release(0), None);
        assert_eq!(object.state.last_output, None);
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(ObjectConfig::Disabled.kind_name(), "disabled");
        assert_eq!(ObjectConfig::Note(NoteMapping::default()).kind_name(), "note");
        assert_eq!(
            ObjectConfig::Control(ControlMapping::default()).kind_name(),
            "control"
        );
    }
}
