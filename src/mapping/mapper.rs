//! Mapper trait

use super::ObjectState;
use crate::engine::MidiMessage;
use crate::error::MappingError;

/// Trait for per-electrode mapping behaviours
///
/// A mapper is the immutable configuration half of a mapping object. The
/// mutable half lives in [`ObjectState`] and is passed in on every sample,
/// so evaluating a mapper can never rewrite its own configuration.
pub trait Mapper: Send + Sync {
    /// Check the configuration, before any sampling happens
    fn validate(&self) -> Result<(), MappingError>;

    /// Evaluate one fresh reading, returning at most one event
    fn update(&self, channel: u8, state: &mut ObjectState, reading: u32) -> Option<MidiMessage>;
}
