//! Sub-task FIFO: a strictly-ordered queue of pool slot indices.
//!
//! The FIFO stores indices into a [`crate::pool::SubTaskPool`], not
//! sub-task data itself — it orders references into the pool rather than
//! duplicating the task nodes the pool already owns.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Deque;

struct FifoInner<const N: usize> {
    queue: Deque<u8, N>,
}

/// Safe for multiple producers because every operation runs inside
/// `critical_section`; in the common case it's single-producer /
/// single-consumer (one façade caller, one worker draining `pump`).
pub struct SubTaskFifo<const N: usize> {
    inner: Mutex<RefCell<FifoInner<N>>>,
}

impl<const N: usize> SubTaskFifo<N> {
    pub fn new() -> Self {
        SubTaskFifo {
            inner: Mutex::new(RefCell::new(FifoInner {
                queue: Deque::new(),
            })),
        }
    }

    /// Appends `idx` to the tail. Returns `true` if the queue was empty
    /// before this call — the caller (the façade/engine layer) uses that
    /// to decide whether to fire the arrival-notification hook, since only
    /// a transition from empty can wake a worker blocked on it.
    ///
    /// Returns `false` (and drops `idx`) if the FIFO is at capacity; this
    /// should not happen in practice since the pool never hands out more
    /// slots than `N`.
    pub fn enqueue(&self, idx: u8) -> bool {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow(cs).borrow_mut();
            let was_empty = inner.queue.is_empty();
            inner.queue.push_back(idx).ok();
            was_empty
        })
    }

    pub fn dequeue(&self) -> Option<u8> {
        critical_section::with(|cs| self.inner.borrow(cs).borrow_mut().queue.pop_front())
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().queue.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<const N: usize> Default for SubTaskFifo<N> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dequeue_order_matches_enqueue_order() {
        let fifo: SubTaskFifo<4> = SubTaskFifo::new();
        fifo.enqueue(1);
        fifo.enqueue(2);
        fifo.enqueue(3);
        assert_eq!(fifo.dequeue(), Some(1));
        assert_eq!(fifo.dequeue(), Some(2));
        assert_eq!(fifo.dequeue(), Some(3));
        assert_eq!(fifo.dequeue(), None);
    }

    #[test]
    fn enqueue_reports_empty_to_non_empty_transition_once() {
        let fifo: SubTaskFifo<4> = SubTaskFifo::new();
        assert!(fifo.enqueue(1), "first enqueue transitions from empty");
        assert!(!fifo.enqueue(2), "queue was already non-empty");
        fifo.dequeue();
        assert!(
            fifo.enqueue(3),
            "draining back to empty re-arms the transition"
        );
    }

    #[test]
    fn len_tracks_task_count() {
        let fifo: SubTaskFifo<4> = SubTaskFifo::new();
        assert!(fifo.is_empty());
        fifo.enqueue(1);
        fifo.enqueue(2);
        assert_eq!(fifo.len(), 2);
        fifo.dequeue();
        assert_eq!(fifo.len(), 1);
    }
}
