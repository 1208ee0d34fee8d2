use serde::{Deserialize, Serialize};

/// Default number of samples held in memory between flushes.
pub const DEFAULT_BUFFER_CAPACITY: usize = 4096;

/// PCM format parameters written into the `fmt ` sub-chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WavFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub bit_depth: u16,
}

impl WavFormat {
    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.channels as u32 * self.bit_depth as u32 / 8
    }

    pub fn block_align(&self) -> u16 {
        self.channels * self.bit_depth / 8
    }
}

impl Default for WavFormat {
    /// 8 kHz, mono, unsigned 8-bit.
    fn default() -> Self {
        Self {
            sample_rate: 8000,
            channels: 1,
            bit_depth: 8,
        }
    }
}

/// Configuration for a [`WavAppender`](crate::WavAppender).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriterConfiguration {
    /// Sample rate in Hz (default: 8000).
    pub sample_rate: u32,

    /// Number of interleaved channels (default: 1). Valid values: 1, 2.
    pub channels: u16,

    /// Bits per sample (default: 8). Samples are pushed as single bytes, so 8 is the only accepted value.
    pub bit_depth: u16,

    /// Samples buffered in memory before an automatic flush (default: 4096).
    pub buffer_capacity: usize,

    /// Reject existing files whose tags or format do not match (default: true).
    pub validate_existing: bool,
}

impl WriterConfiguration {
    pub fn validate(&self) -> Result<(), String> {
        if self.sample_rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if self.bit_depth != 8 {
            return Err(format!("unsupported bit depth: {}", self.bit_depth));
        }
        if ![1, 2].contains(&self.channels) {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.buffer_capacity == 0 {
            return Err("buffer capacity must be positive".into());
        }
        Ok(())
    }

    /// Default configuration carrying `format`, e.g. one read back from an existing file.
    pub fn for_format(format: WavFormat) -> Self {
        Self {
            sample_rate: format.sample_rate,
            channels: format.channels,
            bit_depth: format.bit_depth,
            ..Default::default()
        }
    }

    pub fn format(&self) -> WavFormat {
        WavFormat {
            sample_rate: self.sample_rate,
            channels: self.channels,
            bit_depth: self.bit_depth,
        }
    }
}

impl Default for WriterConfiguration {
    fn default() -> Self {
        let format = WavFormat::default();
        Self {
            sample_rate: format.sample_rate,
            channels: format.channels,
            bit_depth: format.bit_depth,
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            validate_existing: true,
        }
    }
}
