//! Source trait and ReadingFrame definition

use std::time::Instant;
use tokio::sync::broadcast;

/// One sampling tick from the sensing driver
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingFrame {
    /// Tick counter, starting at 0
    pub tick: u64,

    /// When the frame was produced
    pub timestamp: Instant,

    /// Filtered reading per electrode, `None` where the read failed
    pub readings: Vec<Option<u32>>,
}

impl ReadingFrame {
    /// Create a new frame
    pub fn new(tick: u64, readings: Vec<Option<u32>>) -> Self {
        Self {
            tick,
            timestamp: Instant::now(),
            readings,
        }
    }

    /// Number of electrodes with a usable reading
    pub fn present(&self) -> usize {
        self.readings.iter().filter(|r| r.is_some()).count()
    }
}

/// Trait for electrode reading sources
pub trait Source: Send + Sync {
    /// Get the name of this source
    fn name(&self) -> &str;

    /// Start producing frames
    fn start(&mut self) -> anyhow::Result<()>;

    /// Stop producing frames
    fn stop(&mut self);

    /// Check if the source is running
    fn is_running(&self) -> bool;

    /// Subscribe to frames from this source
    fn subscribe(&self) -> broadcast::Receiver<ReadingFrame>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_frame_creation() {
        let frame = ReadingFrame::new(3, vec![Some(10), None, Some(500)]);

        assert_eq!(frame.tick, 3);
        assert_eq!(frame.readings.len(), 3);
        assert_eq!(frame.present(), 2);
    }
}
