//! Bounded queue with backpressure for session inbound/outbound buffers.
//!
//! Uses `crossbeam-queue::ArrayQueue` for a lock-free, bounded queue. When
//! the queue is full, `try_push` returns the item back to the caller to
//! signal backpressure rather than growing unboundedly.

use crossbeam_queue::ArrayQueue;

/// Result of attempting to push to a full queue.
#[derive(Debug)]
pub enum PushResult<T> {
    Ok,
    Backpressure(T),
}

/// A bounded, lock-free queue with backpressure signaling.
#[derive(Debug)]
pub struct BoundedQueue<T> {
    inner: ArrayQueue<T>,
}

impl<T> BoundedQueue<T> {
    /// # Panics
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "queue capacity must be positive");
        Self { inner: ArrayQueue::new(capacity) }
    }

    pub fn try_push(&self, item: T) -> PushResult<T> {
        match self.inner.push(item) {
            Ok(()) => PushResult::Ok,
            Err(item) => PushResult::Backpressure(item),
        }
    }

    pub fn try_pop(&self) -> Option<T> {
        self.inner.pop()
    }

    /// Pops up to `max` items into a `Vec`, preserving FIFO order.
    pub fn pop_batch(&self, max: usize) -> Vec<T> {
        let mut batch = Vec::with_capacity(max.min(self.inner.len()));
        for _ in 0..max {
            match self.inner.pop() {
                Some(item) => batch.push(item),
                None => break,
            }
        }
        batch
    }

    /// Pops every item currently queued.
    pub fn drain(&self) -> Vec<T> {
        self.pop_batch(self.inner.capacity())
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.inner.is_full()
    }

    pub fn capacity(&self) -> usize {
        self.inner.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_push_pop() {
        let q = BoundedQueue::new(3);
        assert!(matches!(q.try_push(1), PushResult::Ok));
        assert!(matches!(q.try_push(2), PushResult::Ok));
        assert_eq!(q.try_pop(), Some(1));
        assert_eq!(q.try_pop(), Some(2));
        assert_eq!(q.try_pop(), None);
    }

    #[test]
    fn backpressure_when_full() {
        let q = BoundedQueue::new(1);
        assert!(matches!(q.try_push(1), PushResult::Ok));
        match q.try_push(2) {
            PushResult::Backpressure(v) => assert_eq!(v, 2),
            PushResult::Ok => panic!("expected backpressure"),
        }
    }

    #[test]
    fn drain_empties_the_queue() {
        let q = BoundedQueue::new(10);
        for i in 0..4 {
            let _ = q.try_push(i);
        }
        assert_eq!(q.drain(), vec![0, 1, 2, 3]);
        assert!(q.is_empty());
    }

    #[test]
    #[should_panic(expected = "queue capacity must be positive")]
    fn zero_capacity_panics() {
        let _q: BoundedQueue<i32> = BoundedQueue::new(0);
    }
}
