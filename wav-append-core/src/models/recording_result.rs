use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::state::HeaderOrigin;

/// Result returned when a writer is closed cleanly.
///
/// Serializable for the JSON sidecar written by [`write_summary`](crate::storage::metadata::write_summary).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordingSummary {
    pub file_path: PathBuf,
    pub origin: HeaderOrigin,
    /// Sample bytes recorded in the header's `data` sub-chunk size.
    pub data_bytes: u32,
    pub sample_rate: u32,
    pub channels: u16,
    pub duration_secs: f64,
    /// SHA-256 hex digest of the finished file.
    pub checksum: String,
}

impl RecordingSummary {
    /// Total length of the file on disk, header included.
    pub fn file_len(&self) -> u64 {
        crate::processing::wav_format::WAV_HEADER_SIZE as u64 + self.data_bytes as u64
    }
}
