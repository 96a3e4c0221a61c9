//! touchmidi - capacitive touch electrodes to MIDI

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use touchmidi::config;
use touchmidi::engine::{self, Driver, MidiPlayer};
use touchmidi::mapping::ObjectConfig;
use touchmidi::sources::{ReplaySource, Source};

mod cli;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Play {
            config: config_path,
            replay,
            looping,
        } => {
            println!("Loading configuration from {:?}...", config_path);
            let cfg = config::load_config(&config_path)?;
            let engine = cfg.build_engine()?;

            let interval = Duration::from_millis(cfg.sampling.interval_ms);
            let mut source = ReplaySource::from_file(&replay, interval)?.with_loop(looping);
            println!(
                "Replaying {} ticks from {:?} every {} ms",
                source.len(),
                replay,
                cfg.sampling.interval_ms
            );

            let player = MidiPlayer::new(cfg.midi.port.as_deref())?;
            println!("Sending on channel {} to {}", cfg.midi.channel, player.port_name());
            let mut driver = Driver::new(engine, player);
            info!(
                "{} of {} electrodes mapped",
                driver.engine().objects().iter().filter(|o| o.config != ObjectConfig::Disabled).count(),
                driver.engine().len()
            );

            let running = Arc::new(AtomicBool::new(true));
            {
                let running = Arc::clone(&running);
                ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
            }

            let rt = tokio::runtime::Runtime::new()?;
            let stats = rt.block_on(async {
                let frames = source.subscribe();
                source.start()?;
                info!("Started replay source {}", source.name());

                let watch = async {
                    while source.is_running() && running.load(Ordering::SeqCst) {
                        tokio::time::sleep(Duration::from_millis(50)).await;
                    }
                    running.store(false, Ordering::SeqCst);
                };

                let (stats, ()) = tokio::join!(driver.run(frames, Arc::clone(&running)), watch);
                source.stop();
                anyhow::Ok(stats)
            })?;

            println!(
                "\nStopped after {} ticks: {} events sent, {} failed, {} samples skipped, {} ticks dropped",
                stats.frames, stats.emitted, stats.failed, stats.skipped, stats.lagged
            );
        }

        Commands::Simulate {
            config: config_path,
            replay,
            json,
        } => {
            let cfg = config::load_config(&config_path)?;
            let mut engine = cfg.build_engine()?;
            let source = ReplaySource::from_file(&replay, Duration::from_millis(cfg.sampling.interval_ms))?;

            let mut failed_reads = 0;
            for frame in source.frames() {
                failed_reads += frame.readings.len() - frame.present();
                for event in engine.tick(&frame.readings) {
                    if json {
                        println!("{}", serde_json::json!({ "tick": frame.tick, "event": event }));
                    } else {
                        println!("{:>6}  {:?}", frame.tick, event);
                    }
                }
            }

            // Notes still held when the recording ends
            for event in engine.release_all() {
                if json {
                    println!("{}", serde_json::json!({ "tick": "end", "event": event }));
                } else {
                    println!("{:>6}  {:?}", "end", event);
                }
            }

            info!("{} ticks replayed, {} failed reads", source.len(), failed_reads);
        }

        Commands::Ports => {
            println!("Available MIDI output ports:\n");

            let default = engine::default_port_name();
            match engine::list_midi_ports() {
                Ok(ports) if ports.is_empty() => println!("  (none)"),
                Ok(ports) => {
                    for port in ports {
                        let marker = if Some(&port) == default.as_ref() { " [default]" } else { "" };
                        println!("  - {}{}", port, marker);
                    }
                }
                Err(e) => {
                    println!("  Error listing ports: {}", e);
                }
            }
        }

        Commands::Check { config: config_path } => {
            println!("Checking configuration at {:?}...", config_path);

            match config::load_config(&config_path) {
                Ok(cfg) => {
                    let engine = cfg.build_engine()?;
                    println!("Configuration is valid!");
                    println!("  MIDI channel: {}", cfg.midi.channel);
                    println!("  Velocity: {}", cfg.midi.velocity);
                    println!("  Port: {}", cfg.midi.port.as_deref().unwrap_or("(first available)"));
                    println!("  Sampling interval: {} ms", cfg.sampling.interval_ms);
                    println!("  Electrodes: {}", engine.len());
                    for (index, object) in engine.objects().iter().enumerate() {
                        match &object.config {
                            ObjectConfig::Disabled => println!("    E{:<2} disabled", index),
                            ObjectConfig::Note(note) => println!(
                                "    E{:<2} note {} (touch >= {}, release <= {}, velocity {})",
                                index,
                                note.note,
                                note.touch_threshold,
                                note.release_threshold,
                                note.velocity
                            ),
                            ObjectConfig::Control(control) => println!(
                                "    E{:<2} cc {} ({}..={} -> {}..={})",
                                index,
                                control.controller,
                                control.input_min,
                                control.input_max,
                                control.output_min,
                                control.output_max
                            ),
                        }
                    }
                }
                Err(e) => {
                    println!("Configuration is invalid: {:#}", e);
                    std::process::exit(1);
                }
            }
        }

        Commands::Init => {
            let path = "touchmidi.yaml";
            if std::path::Path::new(path).exists() {
                println!("touchmidi.yaml already exists. Not overwriting.");
            } else {
                std::fs::write(path, config::EXAMPLE_CONFIG)?;
                println!("Created touchmidi.yaml with example configuration.");
            }
        }
    }

    Ok(())
}
