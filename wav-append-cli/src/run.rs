use crate::cli::{record_config, Cli, Command};
use anyhow::{Context, Result};
use std::fs::{self, File};
use std::io::{self, BufReader, Read};
use std::path::{Path, PathBuf};
use wav_append_core::storage::metadata;
use wav_append_core::{read_header, FsBackend, WavAppender, WavFormat, WriterConfiguration, WAV_HEADER_SIZE};

pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Record {
            output,
            input,
            buffer,
            sample_rate,
            channels,
            summary,
        } => {
            let config = record_config(existing_format(&output)?, buffer, sample_rate, channels);
            let source: Box<dyn Read> = match &input {
                Some(path) => Box::new(File::open(path).with_context(|| format!("when opening {}", path.display()))?),
                None => Box::new(io::stdin().lock()),
            };
            record(BufReader::new(source), output, config, summary)
        }
        Command::Inspect { path, json } => inspect(&path, json),
        Command::Repair { path } => repair(&path),
    }
}

/// Format of a recording that will be resumed, if `path` already holds data.
fn existing_format(path: &Path) -> Result<Option<WavFormat>> {
    let len = fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    if len == 0 {
        return Ok(None);
    }
    let (header, _) = read_header(&FsBackend, path).with_context(|| format!("when reading {}", path.display()))?;
    Ok(Some(header.wav_format()))
}

pub fn record(mut source: impl Read, output: PathBuf, config: WriterConfiguration, summary: bool) -> Result<()> {
    let mut writer = WavAppender::open(FsBackend, &output, config)
        .with_context(|| format!("when opening {}", output.display()))?;

    let mut chunk = vec![0u8; writer.capacity()];
    loop {
        let n = match source.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("when reading samples"),
        };
        writer
            .write_samples(&chunk[..n])
            .with_context(|| format!("when writing to {}", output.display()))?;
    }
    pad_to_frame(&mut writer)?;

    let result = writer.close().context("when finalizing output file")?;
    println!("{}: {} bytes of samples ({:.2} s)", result.file_path.display(), result.data_bytes, result.duration_secs);
    println!("sha256 {}", result.checksum);
    if summary {
        let sidecar = metadata::write_summary(&result, &output)?;
        println!("summary written to {}", sidecar.display());
    }
    Ok(())
}

/// Unsigned 8-bit PCM midpoint.
const SILENCE: u8 = 0x80;

/// Complete a trailing partial frame with silence so the data chunk stays a
/// whole number of frames.
fn pad_to_frame(writer: &mut WavAppender<FsBackend>) -> Result<()> {
    let frame = writer.header().wav_format().block_align().max(1) as u64;
    let stray = writer.samples_written() % frame;
    if stray == 0 {
        return Ok(());
    }
    let pad = (frame - stray) as usize;
    log::warn!(
        "Input ended mid-frame, padding {} with {} byte(s) of silence",
        writer.path().display(),
        pad
    );
    writer
        .write_samples(&vec![SILENCE; pad])
        .with_context(|| format!("when writing to {}", writer.path().display()))
}

pub fn inspect(path: &Path, json: bool) -> Result<()> {
    let (header, len) = read_header(&FsBackend, path).with_context(|| format!("when reading {}", path.display()))?;
    let validation = header.validate();
    let expected_len = WAV_HEADER_SIZE as u64 + header.sub_chunk2_size as u64;

    if json {
        let report = serde_json::json!({
            "header": header,
            "file_len": len,
            "expected_len": expected_len,
            "valid": validation.is_ok(),
            "error": validation.as_ref().err().map(|e| e.to_string()),
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{header}");
    match validation {
        Ok(()) => println!("header is valid"),
        Err(e) => println!("{e}"),
    }
    if len != expected_len {
        println!("file is {len} bytes, header accounts for {expected_len}; `wavappend repair` fixes this");
    }
    Ok(())
}

pub fn repair(path: &Path) -> Result<()> {
    let (header, _) = read_header(&FsBackend, path).with_context(|| format!("when reading {}", path.display()))?;
    header.validate_layout()?;

    // Size fields are rewritten below; skip their check on open.
    let config = WriterConfiguration {
        validate_existing: false,
        ..WriterConfiguration::for_format(header.wav_format())
    };
    let mut writer = WavAppender::open(FsBackend, path, config)
        .with_context(|| format!("when opening {}", path.display()))?;
    let before = *writer.header();
    let after = writer.reconcile_header().context("when rewriting header")?;
    writer.close().context("when finalizing output file")?;

    if before.validate().is_ok() && before.sub_chunk2_size == after {
        println!("{}: header already matches {} bytes of samples", path.display(), after);
    } else {
        log::info!("Repaired {}", path.display());
        println!("{}: data size {} -> {}", path.display(), before.sub_chunk2_size, after);
    }
    Ok(())
}
