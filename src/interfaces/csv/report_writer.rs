use crate::application::engine::DriverReport;
use crate::error::Result;
use std::io::Write;

/// Writes driver reports to a CSV destination.
///
/// Emits the header `driver,first_name,last_name,points,license_valid`.
pub struct ReportWriter<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(destination: W) -> Self {
        Self {
            writer: csv::Writer::from_writer(destination),
        }
    }

    /// Serializes every report and flushes the destination.
    pub fn write_reports(&mut self, reports: impl IntoIterator<Item = DriverReport>) -> Result<()> {
        for report in reports {
            self.writer.serialize(report)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
