//! Bounded float sample buffer retaining only the most recent window.

use std::collections::VecDeque;

/// A bounded, append-only sequence of `f32` samples.
///
/// Appending past `capacity` silently drops the oldest samples. Owned
/// exclusively by the pipeline worker in the streaming pipeline — no
/// synchronization is built in here, since a single thread ever touches it.
#[derive(Debug)]
pub struct RingBuffer {
    data: VecDeque<f32>,
    capacity: usize,
}

impl RingBuffer {
    /// Create a ring buffer that retains at most `capacity` samples.
    ///
    /// A `capacity` of 0 is coerced to 1 so the buffer always has room for at
    /// least one sample.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            data: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Number of samples currently retained.
    #[must_use]
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// True if no samples are retained.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Drop all retained samples.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Append `samples`, truncating the oldest samples if `size()` would
    /// exceed `capacity`.
    pub fn append(&mut self, samples: &[f32]) {
        if samples.is_empty() {
            return;
        }
        self.data.extend(samples.iter().copied());
        let excess = self.data.len().saturating_sub(self.capacity);
        if excess > 0 {
            self.data.drain(..excess);
        }
    }

    /// Return a copy of the last `min(count, size())` samples, oldest first.
    #[must_use]
    pub fn get_last(&self, count: usize) -> Vec<f32> {
        let count = count.min(self.data.len());
        let skip = self.data.len() - count;
        self.data.iter().skip(skip).copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_buffer_is_empty() {
        let buf = RingBuffer::new(10);
        assert_eq!(buf.size(), 0);
        assert!(buf.is_empty());
        assert!(buf.get_last(5).is_empty());
    }

    #[test]
    fn append_under_capacity() {
        let mut buf = RingBuffer::new(10);
        buf.append(&[1.0, 2.0, 3.0]);
        assert_eq!(buf.size(), 3);
        assert_eq!(buf.get_last(10), vec![1.0, 2.0, 3.0]);
        assert_eq!(buf.get_last(2), vec![2.0, 3.0]);
    }

    #[test]
    fn append_truncates_to_capacity() {
        let mut buf = RingBuffer::new(4);
        buf.append(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        assert_eq!(buf.size(), 4);
        assert_eq!(buf.get_last(4), vec![3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn repeated_appends_stay_within_capacity() {
        let mut buf = RingBuffer::new(5);
        for chunk in [vec![1.0, 2.0], vec![3.0], vec![4.0, 5.0, 6.0], vec![7.0]] {
            buf.append(&chunk);
        }
        // Total appended: 1..=7 => last 5 are 3..=7
        assert_eq!(buf.size(), 5);
        assert_eq!(buf.get_last(5), vec![3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn clear_resets_size() {
        let mut buf = RingBuffer::new(10);
        buf.append(&[1.0, 2.0]);
        buf.clear();
        assert_eq!(buf.size(), 0);
        assert!(buf.get_last(10).is_empty());
    }

    #[test]
    fn get_last_never_exceeds_size() {
        let mut buf = RingBuffer::new(100);
        buf.append(&[1.0, 2.0, 3.0]);
        assert_eq!(buf.get_last(1000).len(), 3);
    }
}
