use thiserror::Error;

/// Errors that can occur while creating, resuming or appending to a WAV file.
///
/// `DataWrite`: samples are still buffered. A leading part of them may be on
/// the medium already; the writer tracks it and does not write it again.
/// `HeaderPatch`: samples are on disk but the size fields lag behind them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WavError {
    #[error("failed to open file: {0}")]
    Open(String),

    #[error("short write: {written} of {expected} bytes transferred")]
    ShortWrite { written: usize, expected: usize },

    #[error("write failed after {written} of {expected} bytes: {reason}")]
    WriteFailed {
        written: usize,
        expected: usize,
        reason: String,
    },

    #[error("short read: {read} of {expected} bytes transferred")]
    ShortRead { read: usize, expected: usize },

    #[error("existing file holds only {available} bytes, a WAV header needs 44")]
    HeaderTruncated { available: usize },

    #[error("invalid WAV header: {0}")]
    InvalidHeader(String),

    #[error("existing file format does not match configuration: {0}")]
    FormatMismatch(String),

    #[error("sample data write failed: {0}")]
    DataWrite(String),

    #[error("header patch failed, data is on disk but sizes are stale: {0}")]
    HeaderPatch(String),

    #[error("sync to medium failed: {0}")]
    Sync(String),

    #[error("RIFF size limit reached: {data_size} bytes stored, {pending} pending")]
    CapacityExceeded { data_size: u32, pending: usize },

    #[error("configuration failed: {0}")]
    Configuration(String),

    #[error("storage error: {0}")]
    Storage(String),
}

impl WavError {
    /// Whether the whole flushed buffer was written before this error.
    ///
    /// False for `DataWrite`, even when a prefix of the buffer reached the
    /// medium.
    pub fn data_persisted(&self) -> bool {
        matches!(self, Self::HeaderPatch(_) | Self::Sync(_))
    }

    /// Bytes a failed write moved before it stopped.
    pub fn bytes_written(&self) -> usize {
        match self {
            Self::ShortWrite { written, .. } | Self::WriteFailed { written, .. } => *written,
            _ => 0,
        }
    }
}
