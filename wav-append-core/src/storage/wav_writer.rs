use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::config::WriterConfiguration;
use crate::models::error::WavError;
use crate::models::recording_result::RecordingSummary;
use crate::models::state::{HeaderOrigin, WriterState};
use crate::processing::sample_buffer::SampleBuffer;
use crate::processing::wav_format::{self, WavHeader, WAV_HEADER_SIZE};
use crate::storage::resilient_io::{read_fully, write_at};
use crate::traits::storage::{StorageBackend, StorageFile};

/// Incremental 8-bit PCM WAV writer.
///
/// Samples are staged in a fixed-size buffer. Every time the buffer fills
/// (and on [`flush`](Self::flush), [`close`](Self::close) or drop) its
/// contents are appended at the end of the file, the RIFF and `data` sizes
/// are patched in place and the file is synced, so the medium always holds a
/// playable WAV file between flushes.
///
/// ## File Format
/// ```text
/// [44-byte WAV header]
/// [raw unsigned 8-bit PCM data...]
/// ```
///
/// Opening a path that already holds WAV data resumes it: the header is read
/// back and new samples extend the existing `data` chunk.
///
/// Not synchronized. Use [`SharedAppender`](crate::SharedAppender) to feed one
/// writer from several threads.
pub struct WavAppender<B: StorageBackend> {
    backend: B,
    path: PathBuf,
    file: Option<B::File>,
    header: WavHeader,
    buffer: SampleBuffer,
    origin: HeaderOrigin,
    state: WriterState,
    /// Leading bytes of `buffer` already on the medium from a flush that
    /// stopped part-way through.
    partial: usize,
    /// Sample data reached the medium but the size fields were not patched.
    header_stale: bool,
    /// Writes went out since the last successful sync.
    unsynced: bool,
}

impl<B: StorageBackend> WavAppender<B> {
    /// Create `path` with a fresh header, or resume it if it already holds data.
    pub fn open(backend: B, path: impl Into<PathBuf>, config: WriterConfiguration) -> Result<Self, WavError> {
        config.validate().map_err(WavError::Configuration)?;
        let path = path.into();

        let existing_len = if backend.exists(&path) {
            let mut file = backend.open_read(&path).map_err(|e| open_error(&path, e))?;
            file.size()
                .map_err(|e| WavError::Storage(format!("failed to stat {}: {}", path.display(), e)))?
        } else {
            0
        };

        let (file, header, origin) = if existing_len > 0 {
            let (header, len) = read_header(&backend, &path)?;
            if config.validate_existing {
                header.validate()?;
                header.check_format(config.format())?;
            }
            if len != WAV_HEADER_SIZE as u64 + header.sub_chunk2_size as u64 {
                log::warn!(
                    "{} is {} bytes but its header accounts for {}; run a header reconcile to repair",
                    path.display(),
                    len,
                    WAV_HEADER_SIZE as u64 + header.sub_chunk2_size as u64
                );
            }
            let file = backend.open_read_write(&path).map_err(|e| open_error(&path, e))?;
            log::debug!("Resuming {} with {} bytes of sample data", path.display(), header.sub_chunk2_size);
            (file, header, HeaderOrigin::Loaded)
        } else {
            let mut file = backend.open_read_write(&path).map_err(|e| open_error(&path, e))?;
            let header = WavHeader::new(config.format());
            write_at(&mut file, 0, &header.to_bytes())?;
            file.sync().map_err(|e| WavError::Sync(e.to_string()))?;
            log::debug!("Created {} ({} Hz, {} ch)", path.display(), header.sample_rate, header.num_channels);
            (file, header, HeaderOrigin::Created)
        };

        Ok(Self {
            backend,
            path,
            file: Some(file),
            header,
            buffer: SampleBuffer::new(config.buffer_capacity),
            origin,
            state: WriterState::Ready,
            partial: 0,
            header_stale: false,
            unsynced: false,
        })
    }

    /// Buffer one sample, flushing when the buffer becomes full.
    ///
    /// If an earlier flush failed and left the buffer full, that flush is
    /// retried first; should it fail again the sample is not accepted. When
    /// the sample itself fills the buffer it is accepted even if the flush it
    /// triggers fails, and stays buffered for the next attempt.
    pub fn write_sample(&mut self, sample: u8) -> Result<(), WavError> {
        if self.buffer.is_full() {
            self.flush()?;
        }
        let accepted = self.buffer.push(sample);
        debug_assert!(accepted, "buffer is never full after a successful flush");
        if self.buffer.is_full() {
            return self.flush();
        }
        Ok(())
    }

    /// Buffer a run of samples, flushing each time the buffer fills.
    ///
    /// Stops at the first failed flush. [`samples_written`](Self::samples_written)
    /// tells how far the run got.
    pub fn write_samples(&mut self, mut samples: &[u8]) -> Result<(), WavError> {
        while !samples.is_empty() {
            if self.buffer.is_full() {
                self.flush()?;
            }
            let taken = self.buffer.extend_from_slice(samples);
            samples = &samples[taken..];
            if self.buffer.is_full() {
                self.flush()?;
            }
        }
        Ok(())
    }

    /// Append the buffered samples, patch both size fields and sync.
    ///
    /// On `DataWrite` the samples stay buffered and the header is untouched.
    /// On `HeaderPatch` the samples are on disk and the next flush patches again.
    /// On `Sync` the next flush syncs again even with nothing buffered.
    pub fn flush(&mut self) -> Result<(), WavError> {
        let result = self.flush_buffer();
        self.state = match &result {
            Ok(()) => WriterState::Ready,
            Err(e) => {
                log::warn!("Flush of {} failed: {}", self.path.display(), e);
                WriterState::FlushFailed(e.clone())
            }
        };
        result
    }

    fn flush_buffer(&mut self) -> Result<(), WavError> {
        if !self.has_unflushed() {
            return Ok(());
        }

        let pending = self.buffer.len();
        if pending as u64 > self.header.remaining_capacity() as u64 {
            return Err(WavError::CapacityExceeded {
                data_size: self.header.sub_chunk2_size,
                pending,
            });
        }

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| WavError::Storage("file is not open".into()))?;

        if pending > 0 {
            // Re-derive the append position every time; the file may have grown.
            let end = file
                .size()
                .map_err(|e| WavError::DataWrite(format!("failed to query file size: {}", e)))?;
            let unwritten = &self.buffer.as_slice()[self.partial..];
            if let Err(e) = write_at(file, end, unwritten) {
                self.partial += e.bytes_written();
                if e.bytes_written() > 0 {
                    self.unsynced = true;
                }
                return Err(WavError::DataWrite(e.to_string()));
            }

            self.header.grow(pending as u32);
            self.buffer.clear();
            self.partial = 0;
            self.header_stale = true;
        }

        write_at(file, wav_format::CHUNK_SIZE_OFFSET, &self.header.chunk_size.to_le_bytes())
            .map_err(|e| WavError::HeaderPatch(format!("chunk size: {}", e)))?;
        write_at(file, wav_format::DATA_SIZE_OFFSET, &self.header.sub_chunk2_size.to_le_bytes())
            .map_err(|e| WavError::HeaderPatch(format!("data size: {}", e)))?;
        self.header_stale = false;
        self.unsynced = true;

        file.sync().map_err(|e| WavError::Sync(e.to_string()))?;
        self.unsynced = false;
        log::debug!(
            "Flushed {} samples to {} ({} bytes of sample data)",
            pending,
            self.path.display(),
            self.header.sub_chunk2_size
        );
        Ok(())
    }

    fn has_unflushed(&self) -> bool {
        !self.buffer.is_empty() || self.header_stale || self.unsynced
    }

    /// Rewrite both size fields from the actual file length.
    ///
    /// Repairs a file whose header lags behind its data, e.g. after a
    /// `HeaderPatch` failure followed by a crash. Returns the new data size.
    pub fn reconcile_header(&mut self) -> Result<u32, WavError> {
        self.flush()?;

        let file = self
            .file
            .as_mut()
            .ok_or_else(|| WavError::Storage("file is not open".into()))?;
        let len = file
            .size()
            .map_err(|e| WavError::Storage(format!("failed to query file size: {}", e)))?;
        let data_len = len.saturating_sub(WAV_HEADER_SIZE as u64);
        let max_data = (u32::MAX - wav_format::CHUNK_SIZE_BASE) as u64;
        if data_len > max_data {
            return Err(WavError::CapacityExceeded {
                data_size: max_data as u32,
                pending: (data_len - max_data) as usize,
            });
        }

        let data_size = data_len as u32;
        if data_size != self.header.sub_chunk2_size {
            log::warn!(
                "Reconciling {}: header said {} bytes of sample data, file holds {}",
                self.path.display(),
                self.header.sub_chunk2_size,
                data_size
            );
        }
        self.header.set_data_size(data_size);
        self.header_stale = true;
        self.flush()?;
        Ok(data_size)
    }

    /// Flush, release the file and summarize the finished recording.
    pub fn close(mut self) -> Result<RecordingSummary, WavError> {
        if let Err(e) = self.flush() {
            // Drop must not flush a second time.
            self.file = None;
            return Err(e);
        }
        self.file = None;

        let checksum = sha256_file(&self.backend, &self.path)?;
        Ok(RecordingSummary {
            file_path: self.path.clone(),
            origin: self.origin,
            data_bytes: self.header.sub_chunk2_size,
            sample_rate: self.header.sample_rate,
            channels: self.header.num_channels,
            duration_secs: self.header.duration_secs(),
            checksum,
        })
    }

    /// Authoritative in-memory copy of the header.
    pub fn header(&self) -> &WavHeader {
        &self.header
    }

    /// Samples accepted but not yet on the medium.
    pub fn pending(&self) -> usize {
        self.buffer.len()
    }

    pub fn capacity(&self) -> usize {
        self.buffer.capacity()
    }

    /// Sample bytes the header accounts for on disk.
    pub fn data_len(&self) -> u32 {
        self.header.sub_chunk2_size
    }

    /// Every sample accepted so far, persisted or pending.
    pub fn samples_written(&self) -> u64 {
        self.header.sub_chunk2_size as u64 + self.buffer.len() as u64
    }

    pub fn origin(&self) -> HeaderOrigin {
        self.origin
    }

    pub fn state(&self) -> &WriterState {
        &self.state
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Playback length of the persisted samples.
    pub fn duration_secs(&self) -> f64 {
        self.header.duration_secs()
    }
}

impl<B: StorageBackend> Drop for WavAppender<B> {
    fn drop(&mut self) {
        if self.file.is_none() || !self.has_unflushed() {
            return;
        }
        if let Err(e) = self.flush() {
            log::error!("Failed to flush {} on drop, {} samples lost: {}", self.path.display(), self.buffer.len(), e);
        }
    }
}

/// Read the first 44 bytes of `path` and the file's total length.
///
/// The header is returned as stored; nothing is validated.
pub fn read_header<B: StorageBackend>(backend: &B, path: &Path) -> Result<(WavHeader, u64), WavError> {
    let mut file = backend.open_read(path).map_err(|e| open_error(path, e))?;
    let len = file
        .size()
        .map_err(|e| WavError::Storage(format!("failed to stat {}: {}", path.display(), e)))?;

    let mut bytes = [0u8; WAV_HEADER_SIZE];
    read_fully(&mut file, &mut bytes).map_err(|e| match e {
        WavError::ShortRead { read, .. } => WavError::HeaderTruncated { available: read },
        other => other,
    })?;
    Ok((WavHeader::parse(&bytes), len))
}

fn open_error(path: &Path, e: std::io::Error) -> WavError {
    WavError::Open(format!("{}: {}", path.display(), e))
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file<B: StorageBackend>(backend: &B, path: &Path) -> Result<String, WavError> {
    let mut file = backend.open_read(path).map_err(|e| open_error(path, e))?;
    let mut hasher = Sha256::new();
    let mut chunk = [0u8; 8192];
    loop {
        match file.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => hasher.update(&chunk[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(WavError::Storage(format!("failed to read file for checksum: {}", e))),
        }
    }
    Ok(hex_encode(&hasher.finalize()))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
