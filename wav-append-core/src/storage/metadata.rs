use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::WavError;
use crate::models::recording_result::RecordingSummary;

/// Path of the JSON sidecar for a recording: `{recording}.summary.json`.
pub fn summary_path(recording_path: &Path) -> PathBuf {
    recording_path.with_extension("summary.json")
}

/// Write a recording summary as a JSON sidecar file next to the recording.
pub fn write_summary(summary: &RecordingSummary, recording_path: &Path) -> Result<PathBuf, WavError> {
    let sidecar = summary_path(recording_path);
    let json = serde_json::to_string_pretty(summary)
        .map_err(|e| WavError::Storage(format!("failed to serialize summary: {}", e)))?;
    fs::write(&sidecar, json).map_err(|e| WavError::Storage(format!("failed to write summary: {}", e)))?;
    Ok(sidecar)
}

/// Read a recording summary from its JSON sidecar file.
pub fn read_summary(recording_path: &Path) -> Result<RecordingSummary, WavError> {
    let json = fs::read_to_string(summary_path(recording_path))
        .map_err(|e| WavError::Storage(format!("failed to read summary: {}", e)))?;
    serde_json::from_str(&json).map_err(|e| WavError::Storage(format!("failed to parse summary: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::state::HeaderOrigin;

    #[test]
    fn summary_round_trips_through_sidecar() {
        let dir = tempfile::tempdir().unwrap();
        let recording = dir.path().join("take1.wav");
        let summary = RecordingSummary {
            file_path: recording.clone(),
            origin: HeaderOrigin::Loaded,
            data_bytes: 8000,
            sample_rate: 8000,
            channels: 1,
            duration_secs: 1.0,
            checksum: "ab".repeat(32),
        };

        let sidecar = write_summary(&summary, &recording).unwrap();
        assert_eq!(sidecar, dir.path().join("take1.summary.json"));
        assert_eq!(read_summary(&recording).unwrap(), summary);
    }

    #[test]
    fn missing_sidecar_is_a_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_summary(&dir.path().join("none.wav")).unwrap_err();
        assert!(matches!(err, WavError::Storage(_)));
    }
}
