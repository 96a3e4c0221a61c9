//! Mapping system for turning electrode readings into MIDI events
//!
//! Each electrode is bound to one mapping object. Note objects run a
//! hysteresis touch/release state machine, control objects scale the raw
//! reading into a controller value.

mod linear;
mod mapper;
mod object;
mod threshold;

pub use linear::ControlMapping;
pub use mapper::Mapper;
pub use object::{MappingObject, NoteState, ObjectConfig, ObjectState};
pub use threshold::NoteMapping;
