//! Event Logger
//!
//! Append-only JSONL log of viewpoint transitions.

use bevy_ecs::prelude::*;
use cam_events::CamEvent;
use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Resource for logging events to a JSONL file
#[derive(Resource)]
pub struct EventLogger {
    writer: Option<BufWriter<File>>,
    event_count: u64,
    by_type: BTreeMap<&'static str, u64>,
}

impl EventLogger {
    /// Create a new event logger writing to the specified path
    pub fn new(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            writer: Some(BufWriter::new(file)),
            event_count: 0,
            by_type: BTreeMap::new(),
        })
    }

    /// Create a logger that only counts events (for testing)
    pub fn null() -> Self {
        Self {
            writer: None,
            event_count: 0,
            by_type: BTreeMap::new(),
        }
    }

    pub fn event_count(&self) -> u64 {
        self.event_count
    }

    /// Events logged so far, per `type` tag
    pub fn counts(&self) -> &BTreeMap<&'static str, u64> {
        &self.by_type
    }

    pub fn count_of(&self, name: &str) -> u64 {
        self.by_type.get(name).copied().unwrap_or(0)
    }

    pub fn log(&mut self, event: &CamEvent) -> std::io::Result<()> {
        self.event_count += 1;
        *self.by_type.entry(event.kind.name()).or_insert(0) += 1;
        if let Some(ref mut writer) = self.writer {
            let json = event.to_jsonl()?;
            writeln!(writer, "{}", json)?;
        }
        Ok(())
    }

    pub fn log_batch(&mut self, events: &[CamEvent]) -> std::io::Result<()> {
        for event in events {
            self.log(event)?;
        }
        Ok(())
    }

    /// Flush the buffer to disk
    pub fn flush(&mut self) -> std::io::Result<()> {
        if let Some(ref mut writer) = self.writer {
            writer.flush()?;
        }
        Ok(())
    }
}

impl Drop for EventLogger {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            eprintln!("Warning: Failed to flush event logger: {}", e);
        }
    }
}
