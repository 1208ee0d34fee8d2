use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::traits::storage::{StorageBackend, StorageFile};

/// Faults a [`MemoryBackend`] injects into the handles it opens.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FaultPlan {
    /// Largest number of bytes one `write` call accepts.
    pub max_write_chunk: Option<usize>,

    /// Largest number of bytes one `read` call returns.
    pub max_read_chunk: Option<usize>,

    /// Bytes the medium accepts, counted from when the plan was installed.
    /// Once spent, every `write` returns `Ok(0)`.
    pub write_budget: Option<usize>,

    /// Report a spent budget as a `StorageFull` error instead of `Ok(0)`,
    /// the way a real disk does.
    pub fail_when_full: bool,

    /// Make `sync` return an error.
    pub fail_sync: bool,
}

impl FaultPlan {
    /// Writes accepted in chunks of at most `chunk` bytes.
    pub fn short_writes(chunk: usize) -> Self {
        Self {
            max_write_chunk: Some(chunk),
            ..Default::default()
        }
    }

    /// Medium that fills up after `bytes` more bytes.
    pub fn full_after(bytes: usize) -> Self {
        Self {
            write_budget: Some(bytes),
            ..Default::default()
        }
    }

    /// Like [`full_after`](Self::full_after), but the full medium answers
    /// with an out-of-space error.
    pub fn out_of_space_after(bytes: usize) -> Self {
        Self {
            write_budget: Some(bytes),
            fail_when_full: true,
            ..Default::default()
        }
    }
}

#[derive(Debug, Default)]
struct Volume {
    files: HashMap<PathBuf, Vec<u8>>,
    faults: FaultPlan,
    written_under_plan: usize,
    syncs: usize,
}

/// In-memory [`StorageBackend`] for tests and simulation.
///
/// Clones share the same volume, so a test can keep one clone to inspect
/// files while the writer owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    volume: Arc<Mutex<Volume>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_faults(faults: FaultPlan) -> Self {
        let backend = Self::new();
        backend.set_faults(faults);
        backend
    }

    /// Replace the active fault plan and reset its write budget.
    pub fn set_faults(&self, faults: FaultPlan) {
        let mut volume = self.volume.lock();
        volume.faults = faults;
        volume.written_under_plan = 0;
    }

    pub fn insert(&self, path: impl Into<PathBuf>, contents: Vec<u8>) {
        self.volume.lock().files.insert(path.into(), contents);
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.volume.lock().files.get(path).cloned()
    }

    /// Number of successful `sync` calls across all handles.
    pub fn sync_count(&self) -> usize {
        self.volume.lock().syncs
    }
}

impl StorageBackend for MemoryBackend {
    type File = MemoryFile;

    fn exists(&self, path: &Path) -> bool {
        self.volume.lock().files.contains_key(path)
    }

    fn open_read(&self, path: &Path) -> io::Result<MemoryFile> {
        if !self.exists(path) {
            return Err(io::Error::new(io::ErrorKind::NotFound, format!("{} not found", path.display())));
        }
        Ok(MemoryFile {
            volume: Arc::clone(&self.volume),
            path: path.to_path_buf(),
            cursor: 0,
            writable: false,
        })
    }

    fn open_read_write(&self, path: &Path) -> io::Result<MemoryFile> {
        self.volume.lock().files.entry(path.to_path_buf()).or_default();
        Ok(MemoryFile {
            volume: Arc::clone(&self.volume),
            path: path.to_path_buf(),
            cursor: 0,
            writable: true,
        })
    }
}

/// Handle returned by [`MemoryBackend`].
#[derive(Debug)]
pub struct MemoryFile {
    volume: Arc<Mutex<Volume>>,
    path: PathBuf,
    cursor: u64,
    writable: bool,
}

impl MemoryFile {
    fn missing(&self) -> io::Error {
        io::Error::new(io::ErrorKind::NotFound, format!("{} was removed", self.path.display()))
    }
}

impl StorageFile for MemoryFile {
    fn size(&mut self) -> io::Result<u64> {
        let volume = self.volume.lock();
        let data = volume.files.get(&self.path).ok_or_else(|| self.missing())?;
        Ok(data.len() as u64)
    }

    fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.cursor = offset;
        Ok(())
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if !self.writable {
            return Err(io::Error::new(io::ErrorKind::PermissionDenied, "handle is read-only"));
        }

        let mut volume = self.volume.lock();
        let mut n = buf.len();
        if let Some(chunk) = volume.faults.max_write_chunk {
            n = n.min(chunk);
        }
        if let Some(budget) = volume.faults.write_budget {
            n = n.min(budget.saturating_sub(volume.written_under_plan));
        }
        if n == 0 {
            if volume.faults.fail_when_full && !buf.is_empty() {
                return Err(io::Error::new(io::ErrorKind::StorageFull, "no space left on device"));
            }
            return Ok(0);
        }

        let start = self.cursor as usize;
        let data = volume.files.get_mut(&self.path).ok_or_else(|| self.missing())?;
        if data.len() < start + n {
            data.resize(start + n, 0);
        }
        data[start..start + n].copy_from_slice(&buf[..n]);

        volume.written_under_plan += n;
        self.cursor += n as u64;
        Ok(n)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let volume = self.volume.lock();
        let data = volume.files.get(&self.path).ok_or_else(|| self.missing())?;

        let start = (self.cursor as usize).min(data.len());
        let mut n = buf.len().min(data.len() - start);
        if let Some(chunk) = volume.faults.max_read_chunk {
            n = n.min(chunk);
        }
        buf[..n].copy_from_slice(&data[start..start + n]);

        self.cursor += n as u64;
        Ok(n)
    }

    fn sync(&mut self) -> io::Result<()> {
        let mut volume = self.volume.lock();
        if volume.faults.fail_sync {
            return Err(io::Error::other("sync rejected by fault plan"));
        }
        volume.syncs += 1;
        Ok(())
    }
}
