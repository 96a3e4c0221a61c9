//! Replay source
//!
//! Plays back recorded electrode readings at a fixed cadence, standing in
//! for the board's sensing driver.
//!
//! File format: one tick per line, readings separated by commas and/or
//! whitespace. `-` or `x` marks a failed read. Blank lines and anything
//! after `#` are ignored.

use super::{ReadingFrame, Source};
use crate::error::{Error, Result};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

/// Parse recorded readings, one row per tick
pub fn parse_readings(text: &str) -> Result<Vec<Vec<Option<u32>>>> {
    let mut rows = Vec::new();

    for (number, line) in text.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let row = line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
            .map(|token| match token {
                "-" | "x" | "X" => Ok(None),
                _ => token.parse::<u32>().map(Some).map_err(|e| Error::ReplayParse {
                    line: number + 1,
                    message: format!("'{}': {}", token, e),
                }),
            })
            .collect::<Result<Vec<_>>>()?;

        rows.push(row);
    }

    Ok(rows)
}

/// Source that replays recorded readings
pub struct ReplaySource {
    name: String,
    rows: Arc<Vec<Vec<Option<u32>>>>,
    interval: Duration,
    looping: bool,
    running: Arc<AtomicBool>,
    sender: broadcast::Sender<ReadingFrame>,
    task: Option<JoinHandle<()>>,
}

impl ReplaySource {
    /// Create a replay source over already parsed rows
    pub fn new(name: impl Into<String>, rows: Vec<Vec<Option<u32>>>, interval: Duration) -> Self {
        let (sender, _) = broadcast::channel(64);
        Self {
            name: name.into(),
            rows: Arc::new(rows),
            interval,
            looping: false,
            running: Arc::new(AtomicBool::new(false)),
            sender,
            task: None,
        }
    }

    /// Load a readings file
    pub fn from_file(path: &Path, interval: Duration) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let rows = parse_readings(&text)?;
        Ok(Self::new(path.display().to_string(), rows, interval))
    }

    /// Restart from the first row after the last one (builder pattern)
    pub fn with_loop(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    /// Number of recorded ticks
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Recorded rows as frames, without any pacing
    pub fn frames(&self) -> impl Iterator<Item = ReadingFrame> + '_ {
        self.rows
            .iter()
            .enumerate()
            .map(|(tick, row)| ReadingFrame::new(tick as u64, row.clone()))
    }
}

impl Source for ReplaySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn start(&mut self) -> anyhow::Result<()> {
        if self.is_running() {
            return Ok(());
        }
        if self.rows.is_empty() {
            anyhow::bail!("replay '{}' has no readings", self.name);
        }

        self.running.store(true, Ordering::SeqCst);

        let rows = Arc::clone(&self.rows);
        let period = self.interval;
        let looping = self.looping;
        let running = Arc::clone(&self.running);
        let sender = self.sender.clone();

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            let mut tick = 0u64;

            'replay: loop {
                for row in rows.iter() {
                    ticker.tick().await;
                    if !running.load(Ordering::SeqCst) {
                        break 'replay;
                    }

                    // Send (ignore errors if no receivers)
                    let _ = sender.send(ReadingFrame::new(tick, row.clone()));
                    tick += 1;
                }
                if !looping {
                    break;
                }
            }

            running.store(false, Ordering::SeqCst);
        });

        self.task = Some(task);
        Ok(())
    }

    fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> broadcast::Receiver<ReadingFrame> {
        self.sender.subscribe()
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
    }
}
