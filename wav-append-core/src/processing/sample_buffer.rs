/// Fixed-capacity staging buffer for 8-bit samples.
///
/// Allocated once at construction and never grown. Samples leave it only
/// through [`SampleBuffer::as_slice`] followed by [`SampleBuffer::clear`], so
/// a flush that fails can leave the contents in place for a later attempt.
#[derive(Debug)]
pub struct SampleBuffer {
    buffer: Box<[u8]>,
    len: usize,
}

impl SampleBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Append one sample.
    ///
    /// Returns `false` without storing anything if the buffer is already full.
    pub fn push(&mut self, sample: u8) -> bool {
        if self.is_full() {
            return false;
        }
        self.buffer[self.len] = sample;
        self.len += 1;
        true
    }

    /// Copy as many of `samples` as fit and return how many were taken.
    pub fn extend_from_slice(&mut self, samples: &[u8]) -> usize {
        let take = samples.len().min(self.remaining());
        self.buffer[self.len..self.len + take].copy_from_slice(&samples[..take]);
        self.len += take;
        take
    }

    /// Buffered samples in arrival order.
    pub fn as_slice(&self) -> &[u8] {
        &self.buffer[..self.len]
    }

    /// Number of samples waiting to be flushed.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.buffer.len()
    }

    pub fn remaining(&self) -> usize {
        self.buffer.len() - self.len
    }

    /// Drop the buffered samples once they are on the medium.
    pub fn clear(&mut self) {
        self.len = 0;
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_until_full() {
        let mut buf = SampleBuffer::new(3);
        assert!(buf.push(1));
        assert!(buf.push(2));
        assert!(!buf.is_full());
        assert!(buf.push(3));

        assert!(buf.is_full());
        assert!(!buf.push(4));
        assert_eq!(buf.as_slice(), &[1, 2, 3]);
    }

    #[test]
    fn extend_takes_what_fits() {
        let mut buf = SampleBuffer::new(4);
        buf.push(9);

        let taken = buf.extend_from_slice(&[1, 2, 3, 4, 5]);
        assert_eq!(taken, 3);
        assert_eq!(buf.as_slice(), &[9, 1, 2, 3]);
        assert_eq!(buf.remaining(), 0);
    }

    #[test]
    fn clear_resets_length_only() {
        let mut buf = SampleBuffer::new(2);
        buf.extend_from_slice(&[7, 8]);
        buf.clear();

        assert!(buf.is_empty());
        assert_eq!(buf.capacity(), 2);
        assert!(buf.as_slice().is_empty());
    }

    #[test]
    fn empty_operations() {
        let mut buf = SampleBuffer::new(8);
        assert!(buf.is_empty());
        assert_eq!(buf.extend_from_slice(&[]), 0);
        assert_eq!(buf.len(), 0);
    }
}
