use std::io;
use std::path::Path;

/// Access to the volume a recording lives on.
///
/// Injected into [`WavAppender`](crate::WavAppender) at construction.
/// Implemented by:
/// - `FsBackend` (any `std::fs` filesystem)
/// - `MemoryBackend` (in-memory files with fault injection)
pub trait StorageBackend {
    type File: StorageFile;

    /// Whether `path` names an existing file.
    fn exists(&self, path: &Path) -> bool;

    /// Open an existing file for reading, positioned at offset 0.
    fn open_read(&self, path: &Path) -> io::Result<Self::File>;

    /// Open for reading and writing at arbitrary offsets.
    ///
    /// Creates the file if absent. Existing content is preserved, and writes
    /// land at the current seek position (no append mode).
    fn open_read_write(&self, path: &Path) -> io::Result<Self::File>;
}

/// An open, random-access file handle. Dropping it closes the file.
pub trait StorageFile {
    /// Current length of the file in bytes.
    fn size(&mut self) -> io::Result<u64>;

    /// Move the cursor to an absolute offset.
    fn seek(&mut self, offset: u64) -> io::Result<()>;

    /// Write up to `buf.len()` bytes at the cursor.
    ///
    /// May transfer fewer bytes than requested, never more. `Ok(0)` means the
    /// medium accepted nothing.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize>;

    /// Read up to `buf.len()` bytes at the cursor. `Ok(0)` means end of file.
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize>;

    /// Force buffered writes through to the physical medium.
    fn sync(&mut self) -> io::Result<()>;
}
