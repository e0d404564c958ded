use crate::domain::events::FineEvent;
use crate::error::Result;
use std::io::Write;

/// Appends events as JSON lines, one object per event.
pub struct EventLog<W: Write> {
    writer: W,
}

impl<W: Write> EventLog<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn record(&mut self, events: &[FineEvent]) -> Result<()> {
        for event in events {
            serde_json::to_writer(&mut self.writer, event).map_err(std::io::Error::from)?;
            self.writer.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}
