use std::sync::Arc;

use parking_lot::Mutex;

use crate::models::error::WavError;
use crate::processing::wav_format::WavHeader;
use crate::storage::wav_writer::WavAppender;
use crate::traits::storage::StorageBackend;

/// Cloneable handle that serializes access to one [`WavAppender`].
///
/// The writer itself has no internal locking. Producers on different threads
/// share it through this handle, each call holding the lock for the whole
/// operation, flush included.
pub struct SharedAppender<B: StorageBackend> {
    inner: Arc<Mutex<WavAppender<B>>>,
}

impl<B: StorageBackend> Clone for SharedAppender<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: StorageBackend> SharedAppender<B> {
    pub fn new(writer: WavAppender<B>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn write_sample(&self, sample: u8) -> Result<(), WavError> {
        self.inner.lock().write_sample(sample)
    }

    /// The run is written under one lock, so runs from different threads never interleave.
    pub fn write_samples(&self, samples: &[u8]) -> Result<(), WavError> {
        self.inner.lock().write_samples(samples)
    }

    pub fn flush(&self) -> Result<(), WavError> {
        self.inner.lock().flush()
    }

    pub fn pending(&self) -> usize {
        self.inner.lock().pending()
    }

    pub fn header(&self) -> WavHeader {
        *self.inner.lock().header()
    }

    /// Run `f` with exclusive access to the writer.
    pub fn with<R>(&self, f: impl FnOnce(&mut WavAppender<B>) -> R) -> R {
        f(&mut self.inner.lock())
    }

    /// Recover the writer once every other handle is gone.
    ///
    /// Returns `self` back while clones are still alive.
    pub fn try_unwrap(self) -> Result<WavAppender<B>, Self> {
        Arc::try_unwrap(self.inner)
            .map(Mutex::into_inner)
            .map_err(|inner| Self { inner })
    }
}
