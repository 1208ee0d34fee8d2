use std::fs;
use std::path::Path;

use wav_append_core::{
    read_header, FaultPlan, FsBackend, HeaderOrigin, MemoryBackend, WavAppender, WavError, WavHeader,
    WriterConfiguration, WAV_HEADER_SIZE,
};

fn config(capacity: usize) -> WriterConfiguration {
    WriterConfiguration {
        buffer_capacity: capacity,
        ..Default::default()
    }
}

fn header_on_disk(path: &Path) -> WavHeader {
    let data = fs::read(path).unwrap();
    let bytes: [u8; WAV_HEADER_SIZE] = data[..WAV_HEADER_SIZE].try_into().unwrap();
    WavHeader::parse(&bytes)
}

#[test]
fn zero_sample_recording_is_a_bare_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("empty.wav");

    drop(WavAppender::open(FsBackend, &path, config(4096)).unwrap());

    assert_eq!(fs::metadata(&path).unwrap().len(), 44);
    let header = header_on_disk(&path);
    assert_eq!(header.chunk_size, 36);
    assert_eq!(header.sub_chunk2_size, 0);
    assert!(header.validate().is_ok());
}

#[test]
fn flushed_samples_are_counted_in_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("count.wav");

    let mut writer = WavAppender::open(FsBackend, &path, config(64)).unwrap();
    for i in 0..1000u32 {
        writer.write_sample((i % 256) as u8).unwrap();
    }
    writer.flush().unwrap();

    let header = header_on_disk(&path);
    assert_eq!(header.chunk_size, 36 + 1000);
    assert_eq!(header.sub_chunk2_size, 1000);
    assert_eq!(fs::metadata(&path).unwrap().len(), 1044);
}

#[test]
fn filling_the_buffer_flushes_without_being_asked() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("auto.wav");

    let mut writer = WavAppender::open(FsBackend, &path, config(4096)).unwrap();
    writer.write_samples(&vec![0x80; 4095]).unwrap();
    assert_eq!(fs::metadata(&path).unwrap().len(), 44);

    writer.write_sample(0x80).unwrap();
    assert_eq!(writer.pending(), 0);
    assert_eq!(fs::metadata(&path).unwrap().len(), 44 + 4096);
    assert_eq!(header_on_disk(&path).sub_chunk2_size, 4096);
}

#[test]
fn reopening_resumes_the_data_chunk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("resume.wav");

    let mut first = WavAppender::open(FsBackend, &path, config(100)).unwrap();
    first.write_samples(&[1; 250]).unwrap();
    let summary = first.close().unwrap();
    assert_eq!(summary.origin, HeaderOrigin::Created);

    let mut second = WavAppender::open(FsBackend, &path, config(100)).unwrap();
    assert_eq!(second.origin(), HeaderOrigin::Loaded);
    assert_eq!(second.data_len(), 250);
    second.write_samples(&[2; 130]).unwrap();
    let summary = second.close().unwrap();
    assert_eq!(summary.origin, HeaderOrigin::Loaded);
    assert_eq!(summary.data_bytes, 380);

    let data = fs::read(&path).unwrap();
    assert_eq!(data.len(), 44 + 250 + 130);
    assert!(data[44..294].iter().all(|&b| b == 1));
    assert!(data[294..].iter().all(|&b| b == 2));

    let header = header_on_disk(&path);
    assert_eq!(header.sub_chunk2_size, 380);
    assert_eq!(header.chunk_size, 416);
}

#[test]
fn read_header_reports_length() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("len.wav");

    let mut writer = WavAppender::open(FsBackend, &path, config(8)).unwrap();
    writer.write_samples(&[0; 20]).unwrap();
    drop(writer);

    let (header, len) = read_header(&FsBackend, &path).unwrap();
    assert_eq!(len, 64);
    assert_eq!(header.sub_chunk2_size, 20);
}

#[test]
fn foreign_file_is_left_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("notes.txt");
    let text = b"these are not the samples you are looking for, not even close".to_vec();
    fs::write(&path, &text).unwrap();

    let err = WavAppender::open(FsBackend, &path, config(8)).err().unwrap();
    assert!(matches!(err, WavError::InvalidHeader(_)));
    assert_eq!(fs::read(&path).unwrap(), text);
}

#[test]
fn failed_flush_keeps_samples_for_a_later_attempt() {
    let backend = MemoryBackend::new();
    let path = Path::new("card/rec.wav");
    let mut writer = WavAppender::open(backend.clone(), path, config(512)).unwrap();
    writer.write_samples(&[0x42; 300]).unwrap();

    backend.set_faults(FaultPlan::full_after(0));
    let before = *writer.header();
    assert!(matches!(writer.flush(), Err(WavError::DataWrite(_))));
    assert_eq!(writer.pending(), 300);
    assert_eq!(*writer.header(), before);

    backend.set_faults(FaultPlan::default());
    drop(writer);
    let data = backend.contents(path).unwrap();
    assert_eq!(data.len(), 344);
}

#[test]
fn irregular_medium_still_receives_every_sample_in_order() {
    let backend = MemoryBackend::with_faults(FaultPlan {
        max_write_chunk: Some(7),
        max_read_chunk: Some(5),
        ..Default::default()
    });
    let path = Path::new("rec.wav");
    let samples: Vec<u8> = (0..5000u32).map(|i| (i * 31 % 251) as u8).collect();

    let mut writer = WavAppender::open(backend.clone(), path, config(333)).unwrap();
    writer.write_samples(&samples).unwrap();
    writer.close().unwrap();

    // Resume through short reads as well.
    let mut writer = WavAppender::open(backend.clone(), path, config(333)).unwrap();
    writer.write_samples(&samples[..10]).unwrap();
    drop(writer);

    let data = backend.contents(path).unwrap();
    assert_eq!(&data[44..5044], samples.as_slice());
    assert_eq!(&data[5044..], &samples[..10]);
}
