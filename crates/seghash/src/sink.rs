use std::io::Write;

use tokio::sync::mpsc;

use crate::{
    error::{SeghashError, SeghashResult},
    processor::FingerprintRecord,
};

/// Receives records in playlist order, as soon as each one is produced.
///
/// A record handed to a sink is final: a failure on a later segment does not
/// retract it.
pub trait RecordSink {
    fn emit(&mut self, record: FingerprintRecord) -> SeghashResult<()>;
}

impl RecordSink for Vec<FingerprintRecord> {
    fn emit(&mut self, record: FingerprintRecord) -> SeghashResult<()> {
        self.push(record);
        Ok(())
    }
}

impl RecordSink for mpsc::UnboundedSender<FingerprintRecord> {
    fn emit(&mut self, record: FingerprintRecord) -> SeghashResult<()> {
        // nobody is listening anymore
        self.send(record).map_err(|_| SeghashError::Cancelled)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// `<timestamp> - segment <seq> (size: <bytes>) hash: <hex>`
    #[default]
    Text,
    /// One JSON object per line
    JsonLines,
}

/// Writes one line per record.
pub struct WriterSink<W> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> RecordSink for WriterSink<W> {
    fn emit(&mut self, record: FingerprintRecord) -> SeghashResult<()> {
        match self.format {
            OutputFormat::Text => writeln!(self.writer, "{record}")?,
            OutputFormat::JsonLines => {
                serde_json::to_writer(&mut self.writer, &record).map_err(std::io::Error::from)?;
                writeln!(self.writer)?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}
