//! WAV file format utilities.
//!
//! Generates, parses and validates the canonical 44-byte RIFF header and
//! exposes the offsets of the two size fields patched after every flush.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::models::config::WavFormat;
use crate::models::error::WavError;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Offset of the RIFF chunk size (`36 + data_size`).
pub const CHUNK_SIZE_OFFSET: u64 = 4;

/// Offset of the `data` sub-chunk size.
pub const DATA_SIZE_OFFSET: u64 = 40;

/// Header bytes counted by the RIFF chunk size besides the sample data.
pub const CHUNK_SIZE_BASE: u32 = 36;

/// Generate a 44-byte WAV RIFF header with no sample data.
///
/// Format: PCM (format code 1), little-endian.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * channels * bit_depth / 8
/// [32-33]  block_align = channels * bit_depth / 8
/// [34-35]  bit_depth
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
pub fn generate_wav_header(format: WavFormat) -> [u8; WAV_HEADER_SIZE] {
    WavHeader::new(format).to_bytes()
}

/// In-memory copy of a 44-byte PCM WAV header.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WavHeader {
    #[serde(serialize_with = "serialize_tag")]
    pub chunk_id: [u8; 4],
    pub chunk_size: u32,
    #[serde(serialize_with = "serialize_tag")]
    pub format: [u8; 4],
    #[serde(serialize_with = "serialize_tag")]
    pub sub_chunk1_id: [u8; 4],
    pub sub_chunk1_size: u32,
    pub audio_format: u16,
    pub num_channels: u16,
    pub sample_rate: u32,
    pub byte_rate: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
    #[serde(serialize_with = "serialize_tag")]
    pub sub_chunk2_id: [u8; 4],
    pub sub_chunk2_size: u32,
}

impl WavHeader {
    /// Header for an empty recording in `format`.
    pub fn new(format: WavFormat) -> Self {
        Self {
            chunk_id: *b"RIFF",
            chunk_size: CHUNK_SIZE_BASE,
            format: *b"WAVE",
            sub_chunk1_id: *b"fmt ",
            sub_chunk1_size: 16,
            audio_format: 1,
            num_channels: format.channels,
            sample_rate: format.sample_rate,
            byte_rate: format.byte_rate(),
            block_align: format.block_align(),
            bits_per_sample: format.bit_depth,
            sub_chunk2_id: *b"data",
            sub_chunk2_size: 0,
        }
    }

    /// Reinterpret raw bytes as a header. No field is checked; see [`WavHeader::validate`].
    pub fn parse(bytes: &[u8; WAV_HEADER_SIZE]) -> Self {
        Self {
            chunk_id: tag_at(bytes, 0),
            chunk_size: u32_at(bytes, 4),
            format: tag_at(bytes, 8),
            sub_chunk1_id: tag_at(bytes, 12),
            sub_chunk1_size: u32_at(bytes, 16),
            audio_format: u16_at(bytes, 20),
            num_channels: u16_at(bytes, 22),
            sample_rate: u32_at(bytes, 24),
            byte_rate: u32_at(bytes, 28),
            block_align: u16_at(bytes, 32),
            bits_per_sample: u16_at(bytes, 34),
            sub_chunk2_id: tag_at(bytes, 36),
            sub_chunk2_size: u32_at(bytes, 40),
        }
    }

    pub fn to_bytes(&self) -> [u8; WAV_HEADER_SIZE] {
        let mut header = [0u8; WAV_HEADER_SIZE];

        // RIFF chunk descriptor
        header[0..4].copy_from_slice(&self.chunk_id);
        header[4..8].copy_from_slice(&self.chunk_size.to_le_bytes());
        header[8..12].copy_from_slice(&self.format);

        // fmt sub-chunk
        header[12..16].copy_from_slice(&self.sub_chunk1_id);
        header[16..20].copy_from_slice(&self.sub_chunk1_size.to_le_bytes());
        header[20..22].copy_from_slice(&self.audio_format.to_le_bytes());
        header[22..24].copy_from_slice(&self.num_channels.to_le_bytes());
        header[24..28].copy_from_slice(&self.sample_rate.to_le_bytes());
        header[28..32].copy_from_slice(&self.byte_rate.to_le_bytes());
        header[32..34].copy_from_slice(&self.block_align.to_le_bytes());
        header[34..36].copy_from_slice(&self.bits_per_sample.to_le_bytes());

        // data sub-chunk
        header[36..40].copy_from_slice(&self.sub_chunk2_id);
        header[40..44].copy_from_slice(&self.sub_chunk2_size.to_le_bytes());

        header
    }

    /// Check the tags, the PCM format fields and the size invariant.
    pub fn validate(&self) -> Result<(), WavError> {
        self.validate_layout()?;
        if Some(self.chunk_size) != CHUNK_SIZE_BASE.checked_add(self.sub_chunk2_size) {
            return Err(WavError::InvalidHeader(format!(
                "chunk size {} does not match data size {}",
                self.chunk_size, self.sub_chunk2_size
            )));
        }
        Ok(())
    }

    /// Check the tags and the PCM format fields, ignoring both size fields.
    pub fn validate_layout(&self) -> Result<(), WavError> {
        let tags = [
            (&self.chunk_id, b"RIFF", "chunk id"),
            (&self.format, b"WAVE", "format"),
            (&self.sub_chunk1_id, b"fmt ", "fmt sub-chunk id"),
            (&self.sub_chunk2_id, b"data", "data sub-chunk id"),
        ];
        for (actual, expected, name) in tags {
            if actual != expected {
                return Err(WavError::InvalidHeader(format!(
                    "{} is {:?}, expected {:?}",
                    name,
                    String::from_utf8_lossy(actual),
                    String::from_utf8_lossy(expected)
                )));
            }
        }

        if self.sub_chunk1_size != 16 {
            return Err(WavError::InvalidHeader(format!(
                "fmt sub-chunk size is {}, expected 16",
                self.sub_chunk1_size
            )));
        }
        if self.audio_format != 1 {
            return Err(WavError::InvalidHeader(format!(
                "audio format {} is not PCM",
                self.audio_format
            )));
        }
        Ok(())
    }

    /// Format parameters as stored in the `fmt ` sub-chunk.
    pub fn wav_format(&self) -> WavFormat {
        WavFormat {
            sample_rate: self.sample_rate,
            channels: self.num_channels,
            bit_depth: self.bits_per_sample,
        }
    }

    /// Compare the `fmt ` fields with `format`.
    pub fn check_format(&self, format: WavFormat) -> Result<(), WavError> {
        if self.wav_format() != format {
            return Err(WavError::FormatMismatch(format!(
                "file is {} Hz / {} ch / {} bit, configured {} Hz / {} ch / {} bit",
                self.sample_rate,
                self.num_channels,
                self.bits_per_sample,
                format.sample_rate,
                format.channels,
                format.bit_depth
            )));
        }
        Ok(())
    }

    /// Account for `count` more sample bytes in both size fields.
    pub fn grow(&mut self, count: u32) {
        self.chunk_size += count;
        self.sub_chunk2_size += count;
    }

    /// Set both size fields from a sample byte count.
    pub fn set_data_size(&mut self, data_size: u32) {
        self.sub_chunk2_size = data_size;
        self.chunk_size = CHUNK_SIZE_BASE + data_size;
    }

    /// Bytes of sample data that still fit before the RIFF chunk size overflows.
    pub fn remaining_capacity(&self) -> u32 {
        (u32::MAX - CHUNK_SIZE_BASE).saturating_sub(self.sub_chunk2_size)
    }

    pub fn duration_secs(&self) -> f64 {
        if self.byte_rate == 0 {
            return 0.0;
        }
        self.sub_chunk2_size as f64 / self.byte_rate as f64
    }
}

impl fmt::Display for WavHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "chunk id:        {}", String::from_utf8_lossy(&self.chunk_id))?;
        writeln!(f, "chunk size:      {}", self.chunk_size)?;
        writeln!(f, "format:          {}", String::from_utf8_lossy(&self.format))?;
        writeln!(f, "sub-chunk 1 id:  {}", String::from_utf8_lossy(&self.sub_chunk1_id))?;
        writeln!(f, "sub-chunk 1 size: {}", self.sub_chunk1_size)?;
        writeln!(f, "audio format:    {}", self.audio_format)?;
        writeln!(f, "channels:        {}", self.num_channels)?;
        writeln!(f, "sample rate:     {}", self.sample_rate)?;
        writeln!(f, "byte rate:       {}", self.byte_rate)?;
        writeln!(f, "block align:     {}", self.block_align)?;
        writeln!(f, "bits per sample: {}", self.bits_per_sample)?;
        writeln!(f, "sub-chunk 2 id:  {}", String::from_utf8_lossy(&self.sub_chunk2_id))?;
        write!(f, "sub-chunk 2 size: {}", self.sub_chunk2_size)
    }
}

fn tag_at(bytes: &[u8; WAV_HEADER_SIZE], offset: usize) -> [u8; 4] {
    [bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]]
}

fn u32_at(bytes: &[u8; WAV_HEADER_SIZE], offset: usize) -> u32 {
    u32::from_le_bytes(tag_at(bytes, offset))
}

fn u16_at(bytes: &[u8; WAV_HEADER_SIZE], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

fn serialize_tag<S: Serializer>(tag: &[u8; 4], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&String::from_utf8_lossy(tag))
}
