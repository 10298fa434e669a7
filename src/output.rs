//! Output module
//!
//! Writes a completed [`ResultSet`] for downstream consumers.

use crate::error::Result;
use crate::traversal::ResultSet;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Serialization format for a result set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON array
    #[default]
    Json,
    /// One compact JSON value per line
    Jsonl,
}

/// Destination for a completed result set
pub trait DatasetSink {
    /// Write every item, returning the number of items written
    fn write_all(&mut self, result: &ResultSet) -> Result<usize>;
}

/// JSON / JSON Lines sink over any writer
pub struct JsonWriter<W: Write> {
    writer: W,
    format: OutputFormat,
}

impl<W: Write> JsonWriter<W> {
    /// Create a writer
    pub fn new(writer: W, format: OutputFormat) -> Self {
        Self { writer, format }
    }

    /// Output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Consume the sink and return the underlying writer
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl JsonWriter<BufWriter<File>> {
    /// Create (or truncate) a file and write to it
    pub fn create(path: impl AsRef<Path>, format: OutputFormat) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(BufWriter::new(file), format))
    }
}

impl<W: Write> DatasetSink for JsonWriter<W> {
    fn write_all(&mut self, result: &ResultSet) -> Result<usize> {
        match self.format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut self.writer, result)?;
                writeln!(self.writer)?;
            }
            OutputFormat::Jsonl => {
                for item in result {
                    serde_json::to_writer(&mut self.writer, item)?;
                    writeln!(self.writer)?;
                }
            }
        }
        self.writer.flush()?;
        Ok(result.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traversal::TraversalStats;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn result_set() -> ResultSet {
        ResultSet::new(
            vec![json!({"id": 1}), json!({"id": 2}), json!("c")],
            TraversalStats::default(),
        )
    }

    #[test]
    fn test_json_array() {
        let mut sink = JsonWriter::new(Vec::new(), OutputFormat::Json);
        let written = sink.write_all(&result_set()).unwrap();
        assert_eq!(written, 3);

        let out = String::from_utf8(sink.into_inner()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed, json!([{"id": 1}, {"id": 2}, "c"]));
    }

    #[test]
    fn test_json_lines() {
        let mut sink = JsonWriter::new(Vec::new(), OutputFormat::Jsonl);
        sink.write_all(&result_set()).unwrap();

        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert_eq!(out, "{\"id\":1}\n{\"id\":2}\n\"c\"\n");
    }

    #[test]
    fn test_empty_result() {
        let mut sink = JsonWriter::new(Vec::new(), OutputFormat::Jsonl);
        let written = sink.write_all(&ResultSet::default()).unwrap();
        assert_eq!(written, 0);
        assert!(sink.into_inner().is_empty());

        let mut sink = JsonWriter::new(Vec::new(), OutputFormat::Json);
        sink.write_all(&ResultSet::default()).unwrap();
        assert_eq!(String::from_utf8(sink.into_inner()).unwrap(), "[]\n");
    }

    #[test]
    fn test_write_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");

        let mut sink = JsonWriter::create(&path, OutputFormat::Jsonl).unwrap();
        sink.write_all(&result_set()).unwrap();
        drop(sink);

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 3);
    }
}
