//! MIDI output for touchmidi.
//!
//! The typed events the engine emits, their wire encodings, and the sinks
//! that carry them to a MIDI port.

use std::sync::mpsc::{self, Sender};
use std::thread::{self, JoinHandle};

use midir::MidiOutput;
use serde::Serialize;

use crate::error::{Error, Result};

/// MIDI message types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MidiMessage {
    /// Note on: channel (0-15), note (0-127), velocity (1-127)
    NoteOn(u8, u8, u8),
    /// Note off: channel (0-15), note (0-127)
    NoteOff(u8, u8),
    /// Control change: channel (0-15), controller (0-127), value (0-127)
    ControlChange(u8, u8, u8),
}

impl MidiMessage {
    /// Convert to raw MIDI bytes.
    pub fn to_bytes(&self) -> [u8; 3] {
        match *self {
            MidiMessage::NoteOn(ch, note, vel) => [0x90 | (ch & 0x0F), note & 0x7F, vel & 0x7F],
            MidiMessage::NoteOff(ch, note) => [0x80 | (ch & 0x0F), note & 0x7F, 0],
            MidiMessage::ControlChange(ch, ctrl, val) => {
                [0xB0 | (ch & 0x0F), ctrl & 0x7F, val & 0x7F]
            }
        }
    }

    /// Convert to a 4-byte USB-MIDI event packet on the given cable.
    ///
    /// The code index number matches the status nibble for channel voice
    /// messages.
    pub fn to_usb_packet(&self, cable: u8) -> [u8; 4] {
        let [status, data1, data2] = self.to_bytes();
        [((cable & 0x0F) << 4) | (status >> 4), status, data1, data2]
    }
}

/// Sequential sink for engine events.
///
/// Sends are handed off in order; a failed send is reported to the caller
/// and never retried.
pub trait MidiSink {
    fn send(&mut self, msg: MidiMessage) -> Result<()>;
}

impl MidiSink for Vec<MidiMessage> {
    fn send(&mut self, msg: MidiMessage) -> Result<()> {
        self.push(msg);
        Ok(())
    }
}

/// MIDI output player.
pub struct MidiPlayer {
    sender: Sender<MidiPlayerCommand>,
    port_name: String,
    thread: Option<JoinHandle<()>>,
}

enum MidiPlayerCommand {
    Send(MidiMessage),
    Stop,
}

impl MidiPlayer {
    /// Create a new MIDI player connected to the given port.
    ///
    /// `port_name` matches any port whose name contains it; `None` picks the
    /// first available port.
    pub fn new(port_name: Option<&str>) -> Result<Self> {
        let midi_out = MidiOutput::new("touchmidi output")?;
        let ports = midi_out.ports();

        if ports.is_empty() {
            return Err(Error::MidiDevice("no MIDI output ports available".into()));
        }

        let port = if let Some(name) = port_name {
            ports
                .iter()
                .find(|p| {
                    midi_out
                        .port_name(p)
                        .map(|n| n.contains(name))
                        .unwrap_or(false)
                })
                .ok_or_else(|| Error::MidiPort(format!("MIDI port '{}' not found", name)))?
                .clone()
        } else {
            ports[0].clone()
        };

        let port_name_actual = midi_out.port_name(&port)?;
        let conn = midi_out.connect(&port, "touchmidi-output")?;

        let (sender, receiver) = mpsc::channel::<MidiPlayerCommand>();

        // Spawn thread to handle MIDI messages
        let thread = thread::spawn(move || {
            let mut conn = conn;
            while let Ok(cmd) = receiver.recv() {
                match cmd {
                    MidiPlayerCommand::Send(msg) => {
                        if let Err(e) = conn.send(&msg.to_bytes()) {
                            tracing::warn!("MIDI send failed for {:?}: {}", msg, e);
                        }
                    }
                    MidiPlayerCommand::Stop => break,
                }
            }
        });

        tracing::info!("MIDI output connected to: {}", port_name_actual);

        Ok(Self {
            sender,
            port_name: port_name_actual,
            thread: Some(thread),
        })
    }

    /// Name of the connected port.
    pub fn port_name(&self) -> &str {
        &self.port_name
    }

    /// Stop the MIDI player.
    pub fn stop(&self) {
        let _ = self.sender.send(MidiPlayerCommand::Stop);
    }
}

impl MidiSink for MidiPlayer {
    fn send(&mut self, msg: MidiMessage) -> Result<()> {
        self.sender
            .send(MidiPlayerCommand::Send(msg))
            .map_err(|e| Error::MidiSend(e.to_string()))
    }
}

impl Drop for MidiPlayer {
    fn drop(&mut self) {
        self.stop();
        // Queued messages go out before the stop, so trailing note-offs are not lost
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// List available MIDI output ports.
pub fn list_midi_ports() -> Result<Vec<String>> {
    let midi_out = MidiOutput::new("touchmidi list")?;
    let ports = midi_out.ports();

    let names: Vec<String> = ports
        .iter()
        .filter_map(|p| midi_out.port_name(p).ok())
        .collect();

    Ok(names)
}

/// Get the default MIDI output port name.
pub fn default_port_name() -> Option<String> {
    let midi_out = MidiOutput::new("touchmidi default").ok()?;
    let ports = midi_out.ports();
    ports.first().and_then(|p| midi_out.port_name(p).ok())
}
