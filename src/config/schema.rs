//! Configuration schema definitions

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::engine::MappingEngine;
use crate::mapping::{ControlMapping, MappingObject, NoteMapping, ObjectConfig};

/// Main configuration for touchmidi
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TouchMidiConfig {
    /// MIDI output settings
    #[serde(default)]
    pub midi: MidiSettings,

    /// Sampling settings
    #[serde(default)]
    pub sampling: SamplingConfig,

    /// Electrode mappings; unlisted electrodes are disabled
    #[serde(default)]
    pub electrodes: Vec<ElectrodeConfig>,
}

impl TouchMidiConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.midi.channel > 15 {
            bail!("MIDI channel must be between 0 and 15");
        }
        if self.midi.velocity == 0 || self.midi.velocity > 127 {
            bail!("Velocity must be between 1 and 127");
        }
        if self.sampling.interval_ms == 0 || self.sampling.interval_ms > 1000 {
            bail!("Sampling interval must be between 1 and 1000 ms");
        }
        if self.sampling.electrodes == 0 || self.sampling.electrodes > 128 {
            bail!("Electrode count must be between 1 and 128");
        }

        let mut seen = HashSet::new();
        for electrode in &self.electrodes {
            if electrode.index >= self.sampling.electrodes {
                bail!(
                    "Electrode {} is out of range (board has {})",
                    electrode.index,
                    self.sampling.electrodes
                );
            }
            if !seen.insert(electrode.index) {
                bail!("Electrode {} is configured more than once", electrode.index);
            }
        }

        // Mapping-level checks (thresholds, ranges) live with the mappings
        self.build_engine()?;
        Ok(())
    }

    /// One mapping object per electrode slot, in index order
    pub fn objects(&self) -> Vec<MappingObject> {
        let mut objects = vec![MappingObject::default(); self.sampling.electrodes];
        for electrode in &self.electrodes {
            if let Some(slot) = objects.get_mut(electrode.index) {
                *slot = MappingObject::new(electrode.to_object_config(self.midi.velocity));
            }
        }
        objects
    }

    /// Build a validated engine from this configuration
    pub fn build_engine(&self) -> Result<MappingEngine> {
        Ok(MappingEngine::new(self.midi.channel, self.objects())?)
    }
}

/// MIDI output settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MidiSettings {
    /// MIDI channel 0-15 (default: 0)
    #[serde(default)]
    pub channel: u8,

    /// Note-on velocity 1-127 (default: 127)
    #[serde(default = "default_velocity")]
    pub velocity: u8,

    /// Output port name, matched as a substring (None = first port)
    pub port: Option<String>,
}

impl Default for MidiSettings {
    fn default() -> Self {
        Self {
            channel: 0,
            velocity: default_velocity(),
            port: None,
        }
    }
}

fn default_velocity() -> u8 { 127 }

/// Sampling settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SamplingConfig {
    /// Time between ticks in milliseconds (default: 10)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Number of electrodes on the board (default: 12)
    #[serde(default = "default_electrodes")]
    pub electrodes: usize,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            electrodes: default_electrodes(),
        }
    }
}

fn default_interval_ms() -> u64 { 10 }
fn default_electrodes() -> usize { 12 }

/// Mapping for a single electrode
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "ElectrodeEntry", into = "ElectrodeEntry")]
pub struct ElectrodeConfig {
    /// Electrode index on the board
    pub index: usize,

    /// What the electrode does
    pub kind: ElectrodeKind,
}

impl ElectrodeConfig {
    /// Convert to a mapping configuration, filling in defaults
    pub fn to_object_config(&self, default_velocity: u8) -> ObjectConfig {
        match &self.kind {
            ElectrodeKind::Disabled => ObjectConfig::Disabled,
            ElectrodeKind::Note {
                note,
                touch_threshold,
                release_threshold,
                velocity,
            } => {
                let defaults = NoteMapping::default();
                ObjectConfig::Note(NoteMapping {
                    note: *note,
                    touch_threshold: touch_threshold.unwrap_or(defaults.touch_threshold),
                    release_threshold: release_threshold.unwrap_or(defaults.release_threshold),
                    velocity: velocity.unwrap_or(default_velocity),
                })
            }
            ElectrodeKind::Control {
                controller,
                input_min,
                input_max,
                output_min,
                output_max,
            } => {
                let defaults = ControlMapping::default();
                ObjectConfig::Control(ControlMapping {
                    controller: *controller,
                    input_min: input_min.unwrap_or(defaults.input_min),
                    input_max: input_max.unwrap_or(defaults.input_max),
                    output_min: output_min.unwrap_or(defaults.output_min),
                    output_max: output_max.unwrap_or(defaults.output_max),
                })
            }
        }
    }
}

/// What an electrode does
#[derive(Debug, Clone, PartialEq)]
pub enum ElectrodeKind {
    /// Ignored electrode
    Disabled,
    /// Note trigger
    Note {
        note: u8,
        touch_threshold: Option<u32>,
        release_threshold: Option<u32>,
        /// Overrides `midi.velocity`
        velocity: Option<u8>,
    },
    /// Continuous controller
    Control {
        controller: u8,
        input_min: Option<u32>,
        input_max: Option<u32>,
        output_min: Option<u8>,
        output_max: Option<u8>,
    },
}

/// An electrode entry exactly as written in the file
///
/// `index` sits in every variant so unknown keys are rejected per kind.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
enum ElectrodeEntry {
    Disabled {
        index: usize,
    },
    Note {
        index: usize,
        note: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        touch_threshold: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        release_threshold: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        velocity: Option<u8>,
    },
    Control {
        index: usize,
        controller: u8,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input_min: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        input_max: Option<u32>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output_min: Option<u8>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        output_max: Option<u8>,
    },
}

impl From<ElectrodeEntry> for ElectrodeConfig {
    fn from(entry: ElectrodeEntry) -> Self {
        match entry {
            ElectrodeEntry::Disabled { index } => Self {
                index,
                kind: ElectrodeKind::Disabled,
            },
            ElectrodeEntry::Note {
                index,
                note,
                touch_threshold,
                release_threshold,
                velocity,
            } => Self {
                index,
                kind: ElectrodeKind::Note {
                    note,
                    touch_threshold,
                    release_threshold,
                    velocity,
                },
            },
            ElectrodeEntry::Control {
                index,
                controller,
                input_min,
                input_max,
                output_min,
                output_max,
            } => Self {
                index,
                kind: ElectrodeKind::Control {
                    controller,
                    input_min,
                    input_max,
                    output_min,
                    output_max,
                },
            },
        }
    }
}

impl From<ElectrodeConfig> for ElectrodeEntry {
    fn from(config: ElectrodeConfig) -> Self {
        let index = config.index;
        match config.kind {
            ElectrodeKind::Disabled => Self::Disabled { index },
            ElectrodeKind::Note {
                note,
                touch_threshold,
                release_threshold,
                velocity,
            } => Self::Note {
                index,
                note,
                touch_threshold,
                release_threshold,
                velocity,
            },
            ElectrodeKind::Control {
                controller,
                input_min,
                input_max,
                output_min,
                output_max,
            } => Self::Control {
                index,
                controller,
                input_min,
                input_max,
                output_min,
                output_max,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_midi_settings() {
        let yaml = "channel: 3";
        let config: MidiSettings = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.channel, 3);
        assert_eq!(config.velocity, 127); // default
        assert!(config.port.is_none());
    }

    #[test]
    fn test_note_electrode_config() {
        let yaml = r#"
index: 0
kind: note
note: 60
touch_threshold: 50
"#;
        let config: ElectrodeConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.index, 0);

        match config.to_object_config(100) {
            ObjectConfig::Note(note) => {
                assert_eq!(note.note, 60);
                assert_eq!(note.touch_threshold, 50);
                assert_eq!(note.release_threshold, 20); // default
                assert_eq!(note.velocity, 100); // from midi settings
            }
            other => panic!("expected note, got {:?}", other),
        }
    }

    #[test]
    fn test_control_electrode_config() {
        let yaml = r#"
index: 11
kind: control
controller: 74
input_min: 100
input_max: 600
"#;
        let config: ElectrodeConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(
            config.to_object_config(127),
            ObjectConfig::Control(ControlMapping {
                controller: 74,
                input_min: 100,
                input_max: 600,
                output_min: 0,
                output_max: 127,
            })
        );
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let yaml = "index: 0\nkind: pitch_bend\n";
        assert!(serde_yaml::from_str::<ElectrodeConfig>(yaml).is_err());
    }

    #[test]
    fn test_misspelled_electrode_key_rejected() {
        let yaml = "{ index: 0, kind: note, note: 60, touch_treshold: 5 }";
        let err = serde_yaml::from_str::<ElectrodeConfig>(yaml).unwrap_err();
        assert!(err.to_string().contains("touch_treshold"));
    }

    #[test]
    fn test_disabled_electrode_rejects_mapping_keys() {
        let yaml = "{ index: 8, kind: disabled, note: 60 }";
        assert!(serde_yaml::from_str::<ElectrodeConfig>(yaml).is_err());
    }

    #[test]
    fn test_misspelled_settings_key_rejected() {
        assert!(serde_yaml::from_str::<SamplingConfig>("interval: 500").is_err());
        assert!(serde_yaml::from_str::<MidiSettings>("chanel: 3").is_err());
        assert!(serde_yaml::from_str::<TouchMidiConfig>("midii: {}").is_err());
    }

    #[test]
    fn test_electrode_config_serializes_flat() {
        let config = ElectrodeConfig {
            index: 9,
            kind: ElectrodeKind::Control {
                controller: 1,
                input_min: None,
                input_max: Some(800),
                output_min: None,
                output_max: None,
            },
        };

        let yaml = serde_yaml::to_string(&config).unwrap();
        assert!(yaml.contains("kind: control"));
        assert!(!yaml.contains("input_min"));

        let back: ElectrodeConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_unlisted_electrodes_disabled() {
        let config = TouchMidiConfig {
            electrodes: vec![ElectrodeConfig {
                index: 2,
                kind: ElectrodeKind::Note {
                    note: 64,
                    touch_threshold: None,
                    release_threshold: None,
                    velocity: None,
                },
            }],
            ..Default::default()
        };

        let objects = config.objects();
        assert_eq!(objects.len(), 12);
        assert_eq!(objects[0].config, ObjectConfig::Disabled);
        assert_eq!(objects[2].config.kind_name(), "note");
    }

    #[test]
    fn test_config_validation() {
        let config = TouchMidiConfig {
            electrodes: vec![
                ElectrodeConfig {
                    index: 0,
                    kind: ElectrodeKind::Note {
                        note: 60,
                        touch_threshold: Some(40),
                        release_threshold: Some(20),
                        velocity: None,
                    },
                },
                ElectrodeConfig {
                    index: 1,
                    kind: ElectrodeKind::Disabled,
                },
            ],
            ..Default::default()
        };

        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_inverted_thresholds_rejected() {
        let config = TouchMidiConfig {
            electrodes: vec![ElectrodeConfig {
                index: 4,
                kind: ElectrodeKind::Note {
                    note: 60,
                    touch_threshold: Some(10),
                    release_threshold: Some(50),
                    velocity: None,
                },
            }],
            ..Default::default()
        };

        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("electrode 4"));
    }

    #[test]
    fn test_duplicate_electrode_rejected() {
        let note = ElectrodeKind::Note {
            note: 60,
            touch_threshold: None,
            release_threshold: None,
            velocity: None,
        };
        let config = TouchMidiConfig {
            electrodes: vec![
                ElectrodeConfig { index: 1, kind: note.clone() },
                ElectrodeConfig { index: 1, kind: note },
            ],
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_out_of_range_electrode_rejected() {
        let config = TouchMidiConfig {
            electrodes: vec![ElectrodeConfig {
                index: 12,
                kind: ElectrodeKind::Disabled,
            }],
            ..Default::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_channel_rejected() {
        let mut config = TouchMidiConfig::default();
        config.midi.channel = 16;
        assert!(config.validate().is_err());
    }
}
