use serde::{Deserialize, Serialize};

use super::error::WavError;

/// How the writer obtained its header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderOrigin {
    /// A fresh header was synthesized and written to an absent or empty file.
    Created,
    /// The header was read back from a file that already held WAV data.
    Loaded,
}

/// Writer state machine.
///
/// State transitions:
/// ```text
/// open → ready ─(buffer full / flush)─→ ready
///          ↑                             ↓
///          └───(successful flush)── flush_failed
/// ```
/// A failed `open` never yields a writer, and `close` consumes it.
#[derive(Debug, Clone, PartialEq)]
pub enum WriterState {
    Ready,
    /// The last flush failed; samples it could not persist are still buffered.
    FlushFailed(WavError),
}

impl WriterState {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }

    pub fn last_error(&self) -> Option<&WavError> {
        match self {
            Self::FlushFailed(err) => Some(err),
            Self::Ready => None,
        }
    }
}
