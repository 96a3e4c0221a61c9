//! Sampling driver loop
//!
//! Feeds reading frames into the mapping engine and the engine's events into
//! a MIDI sink. Backpressure and shutdown live here, not in the engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::{self, error::RecvError};

use super::{MappingEngine, MidiSink, TickReport};
use crate::sources::ReadingFrame;

/// How often a waiting driver re-checks its stop flag
const STOP_POLL: Duration = Duration::from_millis(100);

/// Running totals for a driver
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriverStats {
    /// Frames evaluated
    pub frames: u64,
    /// Frames lost because the driver fell behind the source
    pub lagged: u64,
    /// Electrode samples skipped for missing readings
    pub skipped: u64,
    /// Events accepted by the sink
    pub emitted: u64,
    /// Events the sink rejected
    pub failed: u64,
    /// Frames carrying more readings than the engine has electrodes
    pub wide_frames: u64,
}

impl DriverStats {
    fn record(&mut self, report: TickReport) {
        self.frames += 1;
        self.skipped += report.skipped as u64;
        self.emitted += report.emitted as u64;
        self.failed += report.failed as u64;
    }
}

/// Owns an engine and the sink its events go to
pub struct Driver<S: MidiSink> {
    engine: MappingEngine,
    sink: S,
    stats: DriverStats,
}

impl<S: MidiSink> Driver<S> {
    pub fn new(engine: MappingEngine, sink: S) -> Self {
        Self {
            engine,
            sink,
            stats: DriverStats::default(),
        }
    }

    pub fn engine(&self) -> &MappingEngine {
        &self.engine
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn stats(&self) -> DriverStats {
        self.stats
    }

    /// Evaluate one frame and forward its events
    ///
    /// Readings beyond the configured electrodes are ignored; the first such
    /// frame is logged as a warning, later ones only counted.
    pub fn process(&mut self, frame: &ReadingFrame) -> TickReport {
        let electrodes = self.engine.len();
        if frame.readings.len() > electrodes {
            if self.stats.wide_frames == 0 {
                tracing::warn!(
                    tick = frame.tick,
                    "frame has {} readings but only {} electrodes are configured, ignoring the rest",
                    frame.readings.len(),
                    electrodes
                );
            }
            self.stats.wide_frames += 1;
        }

        let report = self.engine.tick_into(&frame.readings, &mut self.sink);
        self.stats.record(report);
        report
    }

    /// Send note-offs for every held note
    pub fn shutdown(&mut self) {
        for event in self.engine.release_all() {
            match self.sink.send(event) {
                Ok(()) => self.stats.emitted += 1,
                Err(e) => {
                    tracing::warn!("dropping {:?} on shutdown: {}", event, e);
                    self.stats.failed += 1;
                }
            }
        }
    }

    /// Process frames until the source closes or `running` is cleared
    ///
    /// Frames still queued at that point are processed, then held notes are
    /// released before returning.
    pub async fn run(
        &mut self,
        mut frames: broadcast::Receiver<ReadingFrame>,
        running: Arc<AtomicBool>,
    ) -> DriverStats {
        while running.load(Ordering::SeqCst) {
            match tokio::time::timeout(STOP_POLL, frames.recv()).await {
                Ok(Ok(frame)) => {
                    self.process(&frame);
                }
                Ok(Err(RecvError::Lagged(missed))) => {
                    tracing::warn!("driver fell behind, {} frames dropped", missed);
                    self.stats.lagged += missed;
                }
                Ok(Err(RecvError::Closed)) => break,
                Err(_) => continue,
            }
        }

        // Frames already queued when the stop came in still count
        while let Ok(frame) = frames.try_recv() {
            self.process(&frame);
        }

        self.shutdown();
        tracing::debug!(stats = ?self.stats, "driver stopped");
        self.stats
    }

    /// Stop driving and hand back the sink
    pub fn into_sink(self) -> S {
        self.sink
    }
}
