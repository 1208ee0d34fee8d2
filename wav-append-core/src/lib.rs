//! # wav-append-core
//!
//! Incremental 8-bit PCM WAV writer for storage with little RAM to spare.
//!
//! Samples are pushed one at a time (or in runs) into a fixed-size buffer.
//! Each time the buffer fills it is appended to the file and the two size
//! fields of the header are patched in place, so the file on the medium is a
//! valid WAV file after every flush. Opening an existing recording resumes it.
//!
//! ## Architecture
//!
//! ```text
//! wav-append-core (this crate)
//! ├── traits/       ← StorageBackend, StorageFile
//! ├── models/       ← WavError, WriterConfiguration, WriterState, RecordingSummary
//! ├── processing/   ← WAV header codec, SampleBuffer
//! └── storage/      ← WavAppender, SharedAppender, resilient I/O, fs + memory backends, summary sidecar
//! ```
//!
//! ## Usage
//! ```no_run
//! use wav_append_core::{FsBackend, WavAppender, WriterConfiguration};
//!
//! let mut writer = WavAppender::open(FsBackend, "take1.wav", WriterConfiguration::default())?;
//! for sample in [0x80u8, 0x90, 0xA0] {
//!     writer.write_sample(sample)?;
//! }
//! let summary = writer.close()?;
//! println!("{} bytes, sha256 {}", summary.data_bytes, summary.checksum);
//! # Ok::<(), wav_append_core::WavError>(())
//! ```

pub mod models;
pub mod processing;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::config::{WavFormat, WriterConfiguration, DEFAULT_BUFFER_CAPACITY};
pub use models::error::WavError;
pub use models::recording_result::RecordingSummary;
pub use models::state::{HeaderOrigin, WriterState};
pub use processing::sample_buffer::SampleBuffer;
pub use processing::wav_format::{WavHeader, WAV_HEADER_SIZE};
pub use storage::fs_backend::{FsBackend, FsFile};
pub use storage::memory_backend::{FaultPlan, MemoryBackend, MemoryFile};
pub use storage::shared::SharedAppender;
pub use storage::wav_writer::{read_header, WavAppender};
pub use traits::storage::{StorageBackend, StorageFile};
