//! Correspondence table writer.
//!
//! One CSV row per record, in record order:
//!
//! ```text
//! stopID,emmeID,stop x,stop y,node x,node y
//! 1001,17,630378.995,4834625.701,630401.2,4834610.5
//! 1002,Nothing Found,630500,4834700,-1,-1
//! ```
//!
//! Coordinates use Rust's shortest round-trip float formatting, so equal
//! inputs always produce byte-identical files.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use crate::models::types::*;

pub const HEADER: [&str; 6] = ["stopID", "emmeID", "stop x", "stop y", "node x", "node y"];

/// `emmeID` value for a stop whose index held no nodes
pub const NOTHING_FOUND: &str = "Nothing Found";
/// `emmeID` value for a stop whose nearest node no longer resolves
pub const NULL_NODE: &str = "None";

pub struct CorrespondenceWriter<W: Write> {
    writer: csv::Writer<W>,
    rows: usize,
}

impl<W: Write> CorrespondenceWriter<W> {
    /// Wrap `writer` and emit the header row
    pub fn new(writer: W) -> Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        writer.write_record(HEADER)?;
        Ok(Self { writer, rows: 0 })
    }

    pub fn write(&mut self, record: &CorrespondenceRecord) -> Result<()> {
        let node_id = match record.outcome {
            MatchOutcome::Matched { node, .. } => node.id.to_string(),
            MatchOutcome::IndexEmpty => NOTHING_FOUND.to_string(),
            MatchOutcome::NullReference(_) => NULL_NODE.to_string(),
        };
        let node = record.node_point();

        self.writer.write_record([
            record.stop_id.as_str(),
            node_id.as_str(),
            record.stop.x.to_string().as_str(),
            record.stop.y.to_string().as_str(),
            node.x.to_string().as_str(),
            node.y.to_string().as_str(),
        ])?;
        self.rows += 1;
        Ok(())
    }

    pub fn write_all<'a, I>(&mut self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a CorrespondenceRecord>,
    {
        for record in records {
            self.write(record)?;
        }
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Flush and hand back the underlying writer
    pub fn finish(mut self) -> Result<W> {
        self.writer.flush()?;
        self.writer.into_inner().map_err(|e| {
            MatchError::Io(std::io::Error::new(e.error().kind(), e.error().to_string()))
        })
    }
}

/// Write `records` to a new file at `path`, replacing any existing one
pub fn write_correspondence(path: &Path, records: &[CorrespondenceRecord]) -> Result<()> {
    let mut writer = CorrespondenceWriter::new(BufWriter::new(File::create(path)?))?;
    writer.write_all(records)?;
    let rows = writer.rows();
    writer.finish()?.flush()?;

    info!("Wrote {} correspondences to {}", rows, path.display());
    Ok(())
}
