//! CLI interface for touchmidi

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Map capacitive touch electrodes to MIDI notes and controllers
#[derive(Parser)]
#[command(name = "touchmidi")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Replay recorded readings to a MIDI output port in real time
    Play {
        /// Configuration file path
        #[arg(short, long, default_value = "touchmidi.yaml")]
        config: PathBuf,

        /// Recorded readings file
        #[arg(short, long)]
        replay: PathBuf,

        /// Start over after the last reading
        #[arg(long = "loop")]
        looping: bool,
    },

    /// Run recorded readings through the mappings and print the events
    Simulate {
        /// Configuration file path
        #[arg(short, long, default_value = "touchmidi.yaml")]
        config: PathBuf,

        /// Recorded readings file
        #[arg(short, long)]
        replay: PathBuf,

        /// Print one JSON object per event
        #[arg(long)]
        json: bool,
    },

    /// List available MIDI output ports
    Ports,

    /// Validate a configuration file
    Check {
        /// Configuration file path
        #[arg(short, long, default_value = "touchmidi.yaml")]
        config: PathBuf,
    },

    /// Generate an example configuration file
    Init,
}
