use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::traits::storage::{StorageBackend, StorageFile};

/// [`StorageBackend`] over the host filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsBackend;

impl StorageBackend for FsBackend {
    type File = FsFile;

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }

    fn open_read(&self, path: &Path) -> io::Result<FsFile> {
        File::open(path).map(FsFile)
    }

    fn open_read_write(&self, path: &Path) -> io::Result<FsFile> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        // Not `append(true)`: appends would ignore the seeks used to patch the header.
        OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)
            .map(FsFile)
    }
}

/// Handle returned by [`FsBackend`].
#[derive(Debug)]
pub struct FsFile(File);

impl StorageFile for FsFile {
    fn size(&mut self) -> io::Result<u64> {
        Ok(self.0.metadata()?.len())
    }

    fn seek(&mut self, offset: u64) -> io::Result<()> {
        self.0.seek(SeekFrom::Start(offset)).map(|_| ())
    }

    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.write(buf)
    }

    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }

    fn sync(&mut self) -> io::Result<()> {
        self.0.flush()?;
        self.0.sync_all()
    }
}
