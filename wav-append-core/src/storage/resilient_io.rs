use std::io::ErrorKind;

use crate::models::error::WavError;
use crate::traits::storage::StorageFile;

/// Write all of `data` at the current cursor, tolerating short writes.
///
/// Each call advances by however many bytes the handle accepted. A call that
/// accepts zero bytes ends the loop with `ShortWrite`: a full medium, a
/// detached device and a closed handle all look like that. Any other error
/// except `Interrupted` ends it with `WriteFailed`. Both report how many bytes
/// went out first. There is no retry count and no backoff.
pub fn write_fully<F: StorageFile + ?Sized>(file: &mut F, data: &[u8]) -> Result<(), WavError> {
    let mut offset = 0;
    while offset < data.len() {
        match file.write(&data[offset..]) {
            Ok(0) => {
                return Err(WavError::ShortWrite {
                    written: offset,
                    expected: data.len(),
                })
            }
            Ok(n) => offset += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => {
                return Err(WavError::WriteFailed {
                    written: offset,
                    expected: data.len(),
                    reason: e.to_string(),
                })
            }
        }
    }
    Ok(())
}

/// Fill `buf` from the current cursor, tolerating short reads.
///
/// Same policy as [`write_fully`]: a read that returns zero bytes ends the
/// loop with `ShortRead`.
pub fn read_fully<F: StorageFile + ?Sized>(file: &mut F, buf: &mut [u8]) -> Result<(), WavError> {
    let mut offset = 0;
    while offset < buf.len() {
        match file.read(&mut buf[offset..]) {
            Ok(0) => {
                return Err(WavError::ShortRead {
                    read: offset,
                    expected: buf.len(),
                })
            }
            Ok(n) => offset += n,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(WavError::Storage(format!("read failed: {}", e))),
        }
    }
    Ok(())
}

/// Seek, then [`write_fully`].
pub fn write_at<F: StorageFile + ?Sized>(file: &mut F, offset: u64, data: &[u8]) -> Result<(), WavError> {
    file.seek(offset)
        .map_err(|e| WavError::Storage(format!("seek to {} failed: {}", offset, e)))?;
    write_fully(file, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /// Accepts writes in a repeating pattern of chunk sizes and stops
    /// accepting once `limit` bytes are in.
    struct ChunkedSink {
        data: Vec<u8>,
        pattern: Vec<usize>,
        calls: usize,
        limit: usize,
        interrupt_first: bool,
        fail_when_full: bool,
    }

    impl ChunkedSink {
        fn new(pattern: &[usize], limit: usize) -> Self {
            Self {
                data: Vec::new(),
                pattern: pattern.to_vec(),
                calls: 0,
                limit,
                interrupt_first: false,
                fail_when_full: false,
            }
        }
    }

    impl StorageFile for ChunkedSink {
        fn size(&mut self) -> io::Result<u64> {
            Ok(self.data.len() as u64)
        }

        fn seek(&mut self, _offset: u64) -> io::Result<()> {
            Ok(())
        }

        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.interrupt_first {
                self.interrupt_first = false;
                return Err(io::Error::from(io::ErrorKind::Interrupted));
            }
            let chunk = self.pattern[self.calls % self.pattern.len()];
            self.calls += 1;
            let room = self.limit - self.data.len();
            if room == 0 && self.fail_when_full {
                return Err(io::Error::new(io::ErrorKind::StorageFull, "no space left on device"));
            }
            let n = chunk.min(buf.len()).min(room);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let chunk = self.pattern[self.calls % self.pattern.len()];
            self.calls += 1;
            let n = chunk.min(buf.len()).min(self.data.len());
            buf[..n].copy_from_slice(&self.data[..n]);
            self.data.drain(..n);
            Ok(n)
        }

        fn sync(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn irregular_short_writes_deliver_everything_in_order() {
        let payload: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let mut sink = ChunkedSink::new(&[1, 7, 3, 64, 2, 13], usize::MAX);

        write_fully(&mut sink, &payload).unwrap();

        assert_eq!(sink.data, payload);
        assert!(sink.calls > 1);
    }

    #[test]
    fn zero_byte_write_fails_with_progress() {
        let mut sink = ChunkedSink::new(&[5], 12);
        let err = write_fully(&mut sink, &[0xAB; 20]).unwrap_err();

        assert_eq!(err, WavError::ShortWrite { written: 12, expected: 20 });
        assert_eq!(sink.data.len(), 12);
    }

    #[test]
    fn write_error_reports_progress() {
        let mut sink = ChunkedSink::new(&[5], 12);
        sink.fail_when_full = true;
        let err = write_fully(&mut sink, &[0xAB; 20]).unwrap_err();

        assert_eq!(err.bytes_written(), 12);
        assert!(matches!(err, WavError::WriteFailed { written: 12, expected: 20, .. }));
        assert_eq!(sink.data.len(), 12);
    }

    #[test]
    fn interrupted_write_is_retried() {
        let mut sink = ChunkedSink::new(&[4], usize::MAX);
        sink.interrupt_first = true;

        write_fully(&mut sink, &[1, 2, 3, 4, 5, 6]).unwrap();
        assert_eq!(sink.data, vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn empty_write_touches_nothing() {
        let mut sink = ChunkedSink::new(&[0], 0);
        write_fully(&mut sink, &[]).unwrap();
        assert_eq!(sink.calls, 0);
    }

    #[test]
    fn short_reads_are_accumulated() {
        let mut sink = ChunkedSink::new(&[3, 1, 5], usize::MAX);
        sink.data = (0..44).collect();

        let mut buf = [0u8; 44];
        read_fully(&mut sink, &mut buf).unwrap();
        assert_eq!(buf.to_vec(), (0..44).collect::<Vec<u8>>());
    }

    #[test]
    fn read_past_end_fails() {
        let mut sink = ChunkedSink::new(&[8], usize::MAX);
        sink.data = vec![1; 10];

        let mut buf = [0u8; 44];
        let err = read_fully(&mut sink, &mut buf).unwrap_err();
        assert_eq!(err, WavError::ShortRead { read: 10, expected: 44 });
    }
}
