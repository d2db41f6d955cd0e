//! Fixed-capacity sub-task pool: a free-list of pre-allocated
//! [`SubTask`] slots plus a booking counter, so an operation can reserve
//! every slot it will need before it commits to emitting any sub-task.
//!
//! `N` is chosen by the integrator at the call site (`SubTaskPool<8>`,
//! etc.) — there is no dynamic allocation here.

use core::cell::RefCell;

use critical_section::Mutex;
use heapless::Vec as HVec;

use crate::op::SubTask;

struct PoolInner<const N: usize> {
    slots: [SubTask; N],
    /// Stack of free slot indices. Popping from the end is O(1); order
    /// among free slots is otherwise unspecified.
    free: HVec<u8, N>,
    book_count: u8,
}

/// Sub-task storage shared by every operation issued against one
/// [`crate::facade::Engine`]. All mutation happens inside a
/// `critical_section` so pool state stays safe against an
/// interrupt-context `notify_sub_task_complete` call racing a normal one.
pub struct SubTaskPool<const N: usize> {
    inner: Mutex<RefCell<PoolInner<N>>>,
}

impl<const N: usize> SubTaskPool<N> {
    pub fn new() -> Self {
        assert!(N <= u8::MAX as usize, "pool capacity must fit a u8 index");
        let slots = core::array::from_fn(|_| SubTask::zeroed());
        let mut free = HVec::new();
        for i in (0..N as u8).rev() {
            // unwrap: `free` has capacity N and we push at most N times.
            free.push(i).ok().unwrap();
        }
        SubTaskPool {
            inner: Mutex::new(RefCell::new(PoolInner {
                slots,
                free,
                book_count: 0,
            })),
        }
    }

    /// Number of slots neither free-listed-and-booked nor in flight.
    pub fn free_count(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().free.len())
    }

    pub fn book_count(&self) -> usize {
        critical_section::with(|cs| self.inner.borrow(cs).borrow().book_count as usize)
    }

    /// Atomically checks `free_count - book_count >= n` and, if so, adds
    /// `n` to `book_count`. No side effect on failure.
    pub fn reserve(&self, n: usize) -> bool {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow(cs).borrow_mut();
            let available = inner.free.len().saturating_sub(inner.book_count as usize);
            if available < n {
                return false;
            }
            inner.book_count += n as u8;
            true
        })
    }

    /// Pops one free slot, zero-initializing it, and decrements
    /// `book_count` (never below zero). Returns the slot index, or `None`
    /// if the pool is empty. A caller that previously reserved a slot must
    /// successfully acquire it — `reserve` only checks availability, it
    /// does not hold slots aside.
    pub fn acquire(&self) -> Option<u8> {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow(cs).borrow_mut();
            let idx = inner.free.pop()?;
            inner.slots[idx as usize] = SubTask::zeroed();
            inner.book_count = inner.book_count.saturating_sub(1);
            Some(idx)
        })
    }

    /// Returns a slot to the free list. Slot content is left as-is —
    /// zeroing happens on the next `acquire`, not here, so stale content
    /// never leaks into a booking that hasn't claimed it yet.
    pub fn release(&self, idx: u8) {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow(cs).borrow_mut();
            // `push` only fails past capacity N, which can't happen: every
            // index released was previously popped from this same list.
            inner.free.push(idx).ok();
        });
    }

    /// Resets `book_count` to zero, dropping any reservations the caller
    /// never consumed (used by `on_leave` once every issued sub-task has
    /// been emitted).
    pub fn cancel_bookings(&self) {
        critical_section::with(|cs| {
            self.inner.borrow(cs).borrow_mut().book_count = 0;
        });
    }

    /// Runs `f` against the slot at `idx` inside the pool's critical
    /// section. `idx` must have come from a prior `acquire` on this same
    /// pool that has not yet been `release`d.
    pub fn with_slot<R>(&self, idx: u8, f: impl FnOnce(&mut SubTask) -> R) -> R {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow(cs).borrow_mut();
            f(&mut inner.slots[idx as usize])
        })
    }
}

impl<const N: usize> Default for SubTaskPool<N> {
    fn default() -> Self {
        Self::new()
    }
}
