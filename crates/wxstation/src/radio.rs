//! The packet-source interface consumed by the orchestrator.
//!
//! Demodulation and framing happen outside this crate; whatever listens to
//! the radio hands over batches of already-framed `(kind, payload)` pairs.
//! [`ReplaySource`] reads the same batches back from a capture file so the
//! whole pipeline can run without hardware.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::RawPacket;

/// A producer of framed packet batches.
///
/// `poll` collects one listen window's worth of frames. Implementations
/// never decode; validation happens downstream.
pub trait PacketSource: Send {
    /// The name of this source (for logging/debugging).
    fn name(&self) -> &'static str;

    /// Collect the next batch of frames.
    ///
    /// An empty batch is a normal outcome for a quiet listen window.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying source fails.
    fn poll(&mut self) -> Result<Vec<RawPacket>>;

    /// Whether this source can produce further batches.
    ///
    /// Live sources never run dry; finite sources (like a capture replay)
    /// report exhaustion so periodic loops know to stop.
    fn exhausted(&self) -> bool {
        false
    }
}

/// A source over pre-collected batches.
///
/// Useful when frames arrive from an external radio process and are handed
/// to the station in memory.
#[derive(Debug, Default)]
pub struct BatchSource {
    batches: VecDeque<Vec<RawPacket>>,
}

impl BatchSource {
    /// Create a source that yields the given batches in order.
    #[must_use]
    pub fn new(batches: impl IntoIterator<Item = Vec<RawPacket>>) -> Self {
        Self {
            batches: batches.into_iter().collect(),
        }
    }
}

impl PacketSource for BatchSource {
    fn name(&self) -> &'static str {
        "batch"
    }

    fn poll(&mut self) -> Result<Vec<RawPacket>> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }

    fn exhausted(&self) -> bool {
        self.batches.is_empty()
    }
}

/// Replays frames from a saved capture file.
///
/// The file holds one `KIND PAYLOAD` pair per line; `#` starts a comment
/// and a blank line ends a batch, so one file can carry several polling
/// cycles worth of traffic.
#[derive(Debug)]
pub struct ReplaySource {
    path: PathBuf,
    batches: VecDeque<Vec<RawPacket>>,
}

impl ReplaySource {
    /// Load a capture file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or a line is not a
    /// `KIND PAYLOAD` pair.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&path)
            .map_err(|err| Error::capture_file(&path, err.to_string()))?;
        Self::parse(path, &text)
    }

    fn parse(path: PathBuf, text: &str) -> Result<Self> {
        let mut batches = VecDeque::new();
        let mut current = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                if !current.is_empty() {
                    batches.push_back(std::mem::take(&mut current));
                }
                continue;
            }
            if line.starts_with('#') {
                continue;
            }

            let mut parts = line.split_whitespace();
            let (Some(kind), Some(payload), None) = (parts.next(), parts.next(), parts.next())
            else {
                return Err(Error::capture_file(
                    path,
                    format!("line {}: expected KIND PAYLOAD", index + 1),
                ));
            };
            current.push(RawPacket::new(kind, payload));
        }
        if !current.is_empty() {
            batches.push_back(current);
        }

        debug!(path = %path.display(), batches = batches.len(), "loaded capture file");
        Ok(Self { path, batches })
    }

    /// Path of the capture file this source replays.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PacketSource for ReplaySource {
    fn name(&self) -> &'static str {
        "replay"
    }

    fn poll(&mut self) -> Result<Vec<RawPacket>> {
        Ok(self.batches.pop_front().unwrap_or_default())
    }

    fn exhausted(&self) -> bool {
        self.batches.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAPTURE: &str = "\
# captured 433 MHz traffic
OSV2 A1D201BB05710818544A
OSV2 A1D3012200710618D2E0

OSV2 A3D000470712930730B3AE
";

    fn parse(text: &str) -> Result<ReplaySource> {
        ReplaySource::parse(PathBuf::from("test-capture.txt"), text)
    }

    #[test]
    fn test_parse_batches_split_on_blank_lines() {
        let mut source = parse(CAPTURE).unwrap();

        let first = source.poll().unwrap();
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].kind, "OSV2");
        assert_eq!(first[0].payload, "A1D201BB05710818544A");
        assert!(!source.exhausted());

        let second = source.poll().unwrap();
        assert_eq!(second.len(), 1);
        assert!(source.exhausted());

        // A drained source keeps yielding empty batches.
        assert!(source.poll().unwrap().is_empty());
    }

    #[test]
    fn test_parse_skips_comments() {
        let mut source = parse("# only comments\n# nothing else\n").unwrap();
        assert!(source.exhausted());
        assert!(source.poll().unwrap().is_empty());
    }

    #[test]
    fn test_parse_rejects_malformed_line() {
        let result = parse("OSV2\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("line 1"));

        let result = parse("OSV2 A1D2 junk\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_from_path_missing_file() {
        let result = ReplaySource::from_path("/nonexistent/capture.txt");
        assert!(matches!(result, Err(Error::CaptureFile { .. })));
    }

    #[test]
    fn test_from_path_round_trip() {
        let path = std::env::temp_dir().join(format!(
            "wxstation_capture_test_{}.txt",
            std::process::id()
        ));
        std::fs::write(&path, CAPTURE).unwrap();

        let mut source = ReplaySource::from_path(&path).unwrap();
        assert_eq!(source.path(), path);
        assert_eq!(source.poll().unwrap().len(), 2);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_batch_source_yields_in_order() {
        let mut source = BatchSource::new([
            vec![RawPacket::osv2("A1")],
            vec![RawPacket::osv2("A2"), RawPacket::osv2("A3")],
        ]);
        assert_eq!(source.name(), "batch");
        assert_eq!(source.poll().unwrap().len(), 1);
        assert_eq!(source.poll().unwrap().len(), 2);
        assert!(source.exhausted());
    }
}
