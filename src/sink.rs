//! Event sinks for emitted notifications.

use std::io::Write;

use crate::Result;
use crate::models::Notification;

/// Receives each record the change detector marks for emission.
pub trait EventSink {
    fn emit(&mut self, record: &Notification) -> Result<()>;
}

/// Writes one JSON object per line.
pub struct JsonLinesSink<W> {
    writer: W,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> EventSink for JsonLinesSink<W> {
    fn emit(&mut self, record: &Notification) -> Result<()> {
        serde_json::to_writer(&mut self.writer, record)?;
        self.writer
            .write_all(b"\n")
            .and_then(|()| self.writer.flush())
            .map_err(|e| crate::WatchError::Io(format!("failed to write event: {e}")))
    }
}

/// Collects records in memory.
#[derive(Debug, Default)]
pub struct VecSink {
    pub records: Vec<Notification>,
}

impl EventSink for VecSink {
    fn emit(&mut self, record: &Notification) -> Result<()> {
        self.records.push(record.clone());
        Ok(())
    }
}
