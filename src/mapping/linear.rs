//! Controller mapping

use super::{Mapper, ObjectState};
use crate::engine::MidiMessage;
use crate::error::MappingError;

/// Linear scaling of a raw electrode reading to a controller value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlMapping {
    /// MIDI controller number (0-127)
    pub controller: u8,
    /// Raw reading mapped to `output_min`
    pub input_min: u32,
    /// Raw reading mapped to `output_max`
    pub input_max: u32,
    pub output_min: u8,
    pub output_max: u8,
}

impl ControlMapping {
    /// Create a controller mapping over the full 10-bit input range
    pub fn new(controller: u8) -> Self {
        Self {
            controller,
            ..Self::default()
        }
    }

    /// Set the raw input range
    pub fn with_input_range(mut self, min: u32, max: u32) -> Self {
        self.input_min = min;
        self.input_max = max;
        self
    }

    /// Set the controller output range
    pub fn with_output_range(mut self, min: u8, max: u8) -> Self {
        self.output_min = min;
        self.output_max = max;
        self
    }

    /// Scale a raw reading into the output range
    ///
    /// The reading is clamped to the input range first and the result is
    /// rounded to the nearest integer, halves rounding up. Returns `None`
    /// for an empty input range.
    pub fn scale(&self, raw: u32) -> Option<u8> {
        if self.input_min >= self.input_max {
            return None;
        }

        let clamped = raw.clamp(self.input_min, self.input_max);
        let in_range = u64::from(self.input_max - self.input_min);
        let out_range = u64::from(self.output_max.saturating_sub(self.output_min));
        let offset = u64::from(clamped - self.input_min);

        let scaled = u64::from(self.output_min) + (offset * out_range + in_range / 2) / in_range;
        Some(scaled.min(u64::from(self.output_max)) as u8)
    }
}

impl Default for ControlMapping {
    fn default() -> Self {
        Self {
            controller: 0,
            input_min: 0,
            input_max: 1023,
            output_min: 0,
            output_max: 127,
        }
    }
}

impl Mapper for ControlMapping {
    fn validate(&self) -> Result<(), MappingError> {
        for (field, value) in [
            ("controller", self.controller),
            ("output_min", self.output_min),
            ("output_max", self.output_max),
        ] {
            if value > 127 {
                return Err(MappingError::OutOfMidiRange { field, value });
            }
        }
        if self.output_min > self.output_max {
            return Err(MappingError::InvertedOutputRange {
                min: self.output_min,
                max: self.output_max,
            });
        }
        if self.input_min >= self.input_max {
            return Err(MappingError::DegenerateInputRange {
                min: self.input_min,
                max: self.input_max,
            });
        }
        Ok(())
    }

    fn update(&self, channel: u8, state: &mut ObjectState, reading: u32) -> Option<MidiMessage> {
        let value = self.scale(reading)?;
        if state.last_output == Some(value) {
            return None;
        }

        state.last_output = Some(value);
        Some(MidiMessage::ControlChange(channel, self.controller, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_mapping_defaults() {
        let mapping = ControlMapping::default();
        assert_eq!(mapping.input_min, 0);
        assert_eq!(mapping.input_max, 1023);
        assert_eq!(mapping.output_min, 0);
        assert_eq!(mapping.output_max, 127);
        assert!(mapping.validate().is_ok());
    }

    #[test]
    fn test_scale_full_range() {
        let mapping = ControlMapping::new(1);

        assert_eq!(mapping.scale(0), Some(0));
        assert_eq!(mapping.scale(511), Some(63));
        assert_eq!(mapping.scale(512), Some(64));
        assert_eq!(mapping.scale(1023), Some(127));
    }

    #[test]
    fn test_scale_clamps_input() {
        let mapping = ControlMapping::new(1).with_input_range(100, 200);

        assert_eq!(mapping.scale(0), Some(0));
        assert_eq!(mapping.scale(100), Some(0));
        assert_eq!(mapping.scale(5000), Some(127));
    }

    #[test]
    fn test_scale_custom_output_range() {
        // 0..100 -> 20..70, slope of one half
        let mapping = ControlMapping::new(7)
            .with_input_range(0, 100)
            .with_output_range(20, 70);

        assert_eq!(mapping.scale(0), Some(20));
        assert_eq!(mapping.scale(50), Some(45));
        assert_eq!(mapping.scale(51), Some(46)); // 45.5 rounds up
        assert_eq!(mapping.scale(100), Some(70));
    }

    #[test]
    fn test_scale_degenerate_range() {
        let mapping = ControlMapping::new(1).with_input_range(300, 300);
        assert_eq!(mapping.scale(300), None);

        let mut state = ObjectState::default();
        assert_eq!(mapping.update(0, &mut state, 300), None);
        assert_eq!(state.last_output, None);
    }

    #[test]
    fn test_scale_wide_input_does_not_overflow() {
        let mapping = ControlMapping::new(1).with_input_range(0, u32::MAX);
        assert_eq!(mapping.scale(u32::MAX), Some(127));
        assert_eq!(mapping.scale(u32::MAX / 2), Some(63));
    }

    #[test]
    fn test_duplicate_values_suppressed() {
        let mapping = ControlMapping::new(1);
        let mut state = ObjectState::default();

        assert_eq!(
            mapping.update(0, &mut state, 0),
            Some(MidiMessage::ControlChange(0, 1, 0))
        );
        assert_eq!(mapping.update(0, &mut state, 0), None);
        // 3 still scales to 0
        assert_eq!(mapping.update(0, &mut state, 3), None);
        assert_eq!(
            mapping.update(0, &mut state, 1023),
            Some(MidiMessage::ControlChange(0, 1, 127))
        );
        assert_eq!(state.last_output, Some(127));
    }

    #[test]
    fn test_validation_errors() {
        assert_eq!(
            ControlMapping::new(1).with_input_range(10, 10).validate(),
            Err(MappingError::DegenerateInputRange { min: 10, max: 10 })
        );
        assert_eq!(
            ControlMapping::new(1).with_output_range(100, 10).validate(),
            Err(MappingError::InvertedOutputRange { min: 100, max: 10 })
        );
        assert_eq!(
            ControlMapping::new(130).validate(),
            Err(MappingError::OutOfMidiRange {
                field: "controller",
                value: 130
            })
        );
        assert!(ControlMapping::new(1).with_output_range(0, 128).validate().is_err());
    }
}
