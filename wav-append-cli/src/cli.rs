pub use clap::Parser;
use clap::Subcommand;
use std::path::PathBuf;
use wav_append_core::{WavFormat, WriterConfiguration, DEFAULT_BUFFER_CAPACITY};

#[derive(Debug, Parser)]
#[command(
    version,
    about = "Record, inspect and repair WAV files written incrementally from raw 8-bit PCM samples.",
    arg_required_else_help = true
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Append raw unsigned 8-bit samples to a WAV file, creating it if needed
    Record {
        /// WAV file to create or resume
        #[arg(value_name = "output")]
        output: PathBuf,
        /// Raw sample file (defaults to stdin)
        #[arg(short = 'i', long = "input", value_name = "path")]
        input: Option<PathBuf>,
        /// Samples buffered between flushes (defaults to 4096)
        #[arg(short = 'b', long = "buffer", value_name = "samples", value_parser = clap::value_parser!(u32).range(1..))]
        buffer: Option<u32>,
        /// Sample rate in Hz (defaults to 8000, or the rate of the file being resumed)
        #[arg(short = 'r', long = "rate", value_name = "hz", value_parser = clap::value_parser!(u32).range(1..))]
        sample_rate: Option<u32>,
        /// Channel count, 1 or 2 (defaults to 1, or the count of the file being resumed)
        #[arg(short = 'c', long = "channels", value_name = "count", value_parser = clap::value_parser!(u16).range(1..=2))]
        channels: Option<u16>,
        /// Write a JSON summary next to the recording
        #[arg(short = 's', long = "summary")]
        summary: bool,
    },
    /// Print the header of a WAV file
    Inspect {
        #[arg(value_name = "path")]
        path: PathBuf,
        /// Print as JSON
        #[arg(long = "json")]
        json: bool,
    },
    /// Rewrite the header size fields from the actual file length
    Repair {
        #[arg(value_name = "path")]
        path: PathBuf,
    },
}

/// Writer settings for `record`: flags win, then the resumed file, then defaults.
pub fn record_config(
    existing: Option<WavFormat>,
    buffer: Option<u32>,
    sample_rate: Option<u32>,
    channels: Option<u16>,
) -> WriterConfiguration {
    let base = existing.unwrap_or_default();
    WriterConfiguration {
        sample_rate: sample_rate.unwrap_or(base.sample_rate),
        channels: channels.unwrap_or(base.channels),
        buffer_capacity: buffer.map(|b| b as usize).unwrap_or(DEFAULT_BUFFER_CAPACITY),
        ..WriterConfiguration::for_format(base)
    }
}
