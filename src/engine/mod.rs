//! Mapping engine for touchmidi
//!
//! Owns the electrode slots and evaluates one sampling tick at a time.

mod driver;
mod midi;

pub use driver::{Driver, DriverStats};
pub use midi::{default_port_name, list_midi_ports, MidiMessage, MidiPlayer, MidiSink};

use crate::error::{Error, Result};
use crate::mapping::MappingObject;

/// Outcome of one tick handed to a sink
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Objects that received a reading
    pub evaluated: usize,
    /// Objects with no reading this tick
    pub skipped: usize,
    /// Events accepted by the sink
    pub emitted: usize,
    /// Events the sink rejected
    pub failed: usize,
}

/// The electrode mapping engine
///
/// Objects are evaluated in index order, so events within a tick come out
/// in electrode order.
#[derive(Debug, Clone)]
pub struct MappingEngine {
    channel: u8,
    objects: Vec<MappingObject>,
}

impl MappingEngine {
    /// Create an engine over the given electrode slots
    ///
    /// Every object is validated here, before any sampling; the first
    /// invalid object is reported with its electrode index.
    pub fn new(channel: u8, objects: Vec<MappingObject>) -> Result<Self> {
        if channel > 15 {
            return Err(Error::InvalidChannel(channel));
        }
        for (index, object) in objects.iter().enumerate() {
            object
                .config
                .validate()
                .map_err(|source| Error::Electrode { index, source })?;
        }

        Ok(Self { channel, objects })
    }

    /// MIDI channel all events are sent on
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// Number of electrode slots
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All electrode slots
    pub fn objects(&self) -> &[MappingObject] {
        &self.objects
    }

    /// A single electrode slot
    pub fn object(&self, index: usize) -> Option<&MappingObject> {
        self.objects.get(index)
    }

    /// Evaluate one electrode
    ///
    /// Unknown indices and `None` readings produce nothing.
    pub fn update(&mut self, index: usize, reading: Option<u32>) -> Option<MidiMessage> {
        let channel = self.channel;
        let object = self.objects.get_mut(index)?;
        let event = object.update(channel, reading);

        if let Some(event) = &event {
            tracing::debug!(electrode = index, ?reading, "{:?}", event);
        }
        event
    }

    /// Evaluate one tick, returning events in electrode order
    ///
    /// `readings[i]` is the sample for electrode `i`. Missing entries count
    /// as absent samples; surplus entries are ignored.
    pub fn tick(&mut self, readings: &[Option<u32>]) -> Vec<MidiMessage> {
        let mut events = Vec::new();
        self.tick_into(readings, &mut events);
        events
    }

    /// Evaluate one tick, handing each event to `sink` as it is produced
    ///
    /// A rejected event is logged and counted. The object's state has already
    /// moved on, so the next tick is evaluated as if the send had succeeded.
    pub fn tick_into<S: MidiSink + ?Sized>(
        &mut self,
        readings: &[Option<u32>],
        sink: &mut S,
    ) -> TickReport {
        let mut report = TickReport::default();
        for index in 0..self.objects.len() {
            let reading = readings.get(index).copied().flatten();
            if reading.is_some() {
                report.evaluated += 1;
            } else {
                report.skipped += 1;
            }

            if let Some(event) = self.update(index, reading) {
                match sink.send(event) {
                    Ok(()) => report.emitted += 1,
                    Err(e) => {
                        tracing::warn!(electrode = index, "dropping {:?}: {}", event, e);
                        report.failed += 1;
                    }
                }
            }
        }
        report
    }

    /// Release every held note and reset all runtime state
    ///
    /// Returns the note-offs for notes that were touched, in electrode order.
    pub fn release_all(&mut self) -> Vec<MidiMessage> {
        let channel = self.channel;
        self.objects
            .iter_mut()
            .filter_map(|object| object.release(channel))
            .collect()
    }

    /// Reset all runtime state without emitting anything
    pub fn reset(&mut self) {
        for object in &mut self.objects {
            object.state = Default::default();
        }
    }
}
