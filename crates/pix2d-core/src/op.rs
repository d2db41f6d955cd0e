//! Operation lifecycle: the persistent per-call record, the
//! sub-task unit of work it spawns, and the two transition points
//! (`issue_sub_task_*`, `notify_sub_task_complete`) that move an
//! operation from `Busy` to `Complete`.

use core::ptr::NonNull;

use pix2d_hal::{ColorFormat, CopyKind, CopyParams, FillParams, PixelPlane, Size, TileProcessParams};

use crate::dispatch::Preference;
use crate::fifo::SubTaskFifo;
use crate::pool::SubTaskPool;

/// Which low-level interface a sub-task's parameters belong to. Kept as an
/// explicit tag alongside [`SubTaskParams`]'s own variant so a dispatcher
/// bug that hands a sub-task to the wrong backend trait is caught as
/// `InvalidOp` rather than silently misinterpreting the union.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoType {
    Copy,
    Fill,
    TileProcess,
}

/// The discriminated parameter union carried by a sub-task.
#[derive(Clone, Copy)]
pub enum SubTaskParams {
    Copy(CopyParams),
    Fill(FillParams),
    TileProcess(TileProcessParams),
}

impl SubTaskParams {
    pub fn io_type(&self) -> IoType {
        match self {
            SubTaskParams::Copy(_) => IoType::Copy,
            SubTaskParams::Fill(_) => IoType::Fill,
            SubTaskParams::TileProcess(_) => IoType::TileProcess,
        }
    }
}

/// One quantum of work drawn from the pool, filled in by the façade and
/// enqueued to the FIFO. `op` is the only raw pointer in the whole crate:
/// the completion callback it will eventually drive may fire long after
/// the call that created this sub-task has returned — including from a
/// hardware completion interrupt — while the operation record itself
/// remains owned by the original caller. No lifetime can span that gap
/// without forcing every façade call to block until completion, which
/// would defeat the point of an asynchronous engine.
#[derive(Clone, Copy)]
pub struct SubTask {
    pub op: Option<NonNull<OperationCore>>,
    pub params: SubTaskParams,
}

// SAFETY obligation carried by every producer of a `SubTask`: the
// `OperationCore` pointed to by `op` must stay alive and at a fixed
// address until `notify_sub_task_complete` has observed its outstanding
// count reach zero. The façade upholds this by requiring `&mut
// OperationCore` for the lifetime of the call and documenting that the
// caller must not move or drop the record before `complete` reads true.
impl SubTask {
    pub(crate) fn zeroed() -> Self {
        let plane = PixelPlane {
            base: core::ptr::null_mut(),
            stride: 0,
            format: ColorFormat::Rgb565,
        };
        SubTask {
            op: None,
            params: SubTaskParams::Copy(CopyParams {
                source: plane,
                background: None,
                target: plane,
                size: Size::new(0, 0),
                kind: CopyKind::Blit,
            }),
        }
    }
}

/// Function-pointer half of an operation's nullable completion callback;
/// called with the operation record, its final result code, and the
/// opaque user-data pointer supplied at construction. Its return value
/// becomes the record's `complete` flag, so a callback that wants to
/// defer `Complete` across a chain of operations can return `false` and
/// arm the next leg itself.
pub type CompletionFn = fn(op: &OperationCore, result: i32, user_data: *mut u8) -> bool;

/// The persistent state of one user call. Caller-owned: the engine never
/// allocates or frees one, it only ever borrows it for the duration of a
/// façade call and stashes a raw pointer to it in each sub-task it
/// spawns.
pub struct OperationCore {
    pub io_type: IoType,
    pub preference: Preference,
    busy: bool,
    complete: bool,
    io_error: bool,
    outstanding: u8,
    result: i32,
    callback: Option<CompletionFn>,
    user_data: *mut u8,
}

impl OperationCore {
    pub fn new(io_type: IoType, preference: Preference) -> Self {
        OperationCore {
            io_type,
            preference,
            busy: false,
            complete: false,
            io_error: false,
            outstanding: 0,
            result: 0,
            callback: None,
            user_data: core::ptr::null_mut(),
        }
    }

    pub fn with_callback(mut self, callback: CompletionFn, user_data: *mut u8) -> Self {
        self.callback = Some(callback);
        self.user_data = user_data;
        self
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn is_error(&self) -> bool {
        self.io_error
    }

    pub fn result(&self) -> i32 {
        self.result
    }

    /// Marks the record `Complete`/not-`Busy` immediately, for the
    /// synchronous terminal cases the façade's `on_leave` hook resolves
    /// without ever emitting a sub-task (`OUT_OF_REGION`, pool
    /// exhaustion). Must not be called while any sub-task is outstanding.
    pub fn force_terminal(&mut self, result: i32) {
        debug_assert_eq!(self.outstanding, 0);
        self.result = result;
        if result < 0 {
            self.io_error = true;
        }
        self.complete = true;
        self.busy = false;
    }

    /// Front-end entry point: refuses to start a second call on a record
    /// that is still `Busy` from a prior one. On success, resets the
    /// status bits and arms `Busy` — the descriptor-specific preparation
    /// (geometry resolution, sub-task emission) happens in the façade
    /// right after this returns `true`.
    pub fn invoke(&mut self) -> bool {
        if self.busy {
            return false;
        }
        self.busy = true;
        self.complete = false;
        self.io_error = false;
        self.outstanding = 0;
        self.result = 0;
        true
    }
}

/// Draws a sub-task from `pool`, stamps it with a back-pointer to `op` and
/// `params`, increments `op`'s outstanding count, and enqueues it on
/// `fifo`. Returns `false` (and leaves `op` untouched) if the pool has no
/// free slot — the façade must have reserved one via
/// [`SubTaskPool::reserve`] before calling this, so a `false` here
/// indicates a reservation/emission bug rather than ordinary exhaustion.
pub fn issue_sub_task<const N: usize>(
    op: &mut OperationCore,
    pool: &SubTaskPool<N>,
    fifo: &SubTaskFifo<N>,
    params: SubTaskParams,
) -> bool {
    let Some(idx) = pool.acquire() else {
        return false;
    };

    pool.with_slot(idx, |slot| {
        slot.op = Some(NonNull::from(&*op));
        slot.params = params;
    });

    op.outstanding = op.outstanding.saturating_add(1);
    op.busy = true;

    let was_empty = fifo.enqueue(idx);
    #[cfg(feature = "defmt")]
    if was_empty {
        defmt::trace!("pix2d: fifo arrival notification");
    }
    let _ = was_empty;
    true
}

/// Reports that the sub-task at pool slot `idx` finished with `result`
/// (negative = error). `from_hw` records whether this arrived from a
/// hardware completion interrupt rather than the software pump loop — it
/// does not change the logic below, only what gets logged.
///
/// Ordering: `io_error`/the stored result are updated
/// first; if this was the last outstanding sub-task, the completion
/// callback fires *before* `complete` is set, and `complete` is set
/// *before* `busy` is cleared, so a callback that inspects the record
/// never observes `complete == true` prematurely and an observer that
/// polls `busy` never sees it go false before `complete` goes true.
/// `complete` is set to the callback's return value, defaulting to
/// `true` only when the operation has no callback.
///
/// # Safety
/// The slot at `idx` must have been filled by [`issue_sub_task`] on this
/// same pool and not yet notified. The `OperationCore` it points to must
/// still be alive — this is the caller's (the engine's) obligation to
/// uphold, since the callback may run from an interrupt context with no
/// way to check it.
pub fn notify_sub_task_complete<const N: usize>(
    idx: u8,
    result: i32,
    from_hw: bool,
    pool: &SubTaskPool<N>,
) {
    let op_ptr = pool.with_slot(idx, |slot| slot.op);
    pool.release(idx);

    let Some(mut op_ptr) = op_ptr else {
        return;
    };
    // SAFETY: see function doc.
    let op = unsafe { op_ptr.as_mut() };

    if result < 0 {
        op.io_error = true;
        op.result = result;
    } else if !op.io_error {
        op.result = result;
    }

    op.outstanding = op.outstanding.saturating_sub(1);

    #[cfg(feature = "defmt")]
    if from_hw {
        defmt::trace!("pix2d: sub-task completed from hardware interrupt");
    }
    let _ = from_hw;

    if op.outstanding == 0 {
        op.complete = match op.callback {
            Some(cb) => cb(op, op.result, op.user_data),
            None => true,
        };
        op.busy = false;
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use pix2d_hal::{ColorFormat, CopyKind, CopyParams, PixelPlane, Size};

    use super::*;
    use crate::dispatch::Preference;

    fn blit_params() -> SubTaskParams {
        let plane = PixelPlane {
            base: core::ptr::null_mut(),
            stride: 0,
            format: ColorFormat::Rgb565,
        };
        SubTaskParams::Copy(CopyParams {
            source: plane,
            background: None,
            target: plane,
            size: Size::new(0, 0),
            kind: CopyKind::Blit,
        })
    }

    fn record_result(op: &OperationCore, result: i32, user_data: *mut u8) -> bool {
        // SAFETY: the tests below always pass a pointer to a live `Cell<i32>`.
        let cell = unsafe { &*user_data.cast::<Cell<i32>>() };
        cell.set(cell.get() + 1);
        let _ = (op, result);
        true
    }

    fn defer_completion(op: &OperationCore, result: i32, user_data: *mut u8) -> bool {
        // SAFETY: the test below always passes a pointer to a live `Cell<i32>`.
        let cell = unsafe { &*user_data.cast::<Cell<i32>>() };
        cell.set(cell.get() + 1);
        let _ = (op, result);
        false
    }

    #[test]
    fn single_sub_task_reaches_complete_exactly_once() {
        let pool: SubTaskPool<4> = SubTaskPool::new();
        let fifo: SubTaskFifo<4> = SubTaskFifo::new();
        let calls = Cell::new(0i32);

        let mut op = OperationCore::new(IoType::Copy, Preference::SwOnly)
            .with_callback(record_result, (&calls as *const Cell<i32>) as *mut u8);

        assert!(op.invoke());
        assert!(op.is_busy());
        assert!(!op.is_complete());

        assert!(issue_sub_task(&mut op, &pool, &fifo, blit_params()));
        let idx = fifo.dequeue().expect("one sub-task queued");

        notify_sub_task_complete(idx, 0, false, &pool);

        assert_eq!(calls.get(), 1);
        assert!(op.is_complete());
        assert!(!op.is_busy());
        assert_eq!(op.result(), 0);
    }

    /// A callback returning `false` holds the record open past its last
    /// outstanding sub-task, so the caller can chain another leg before
    /// observing `Complete`.
    #[test]
    fn callback_returning_false_defers_complete() {
        let pool: SubTaskPool<4> = SubTaskPool::new();
        let fifo: SubTaskFifo<4> = SubTaskFifo::new();
        let calls = Cell::new(0i32);

        let mut op = OperationCore::new(IoType::Copy, Preference::SwOnly)
            .with_callback(defer_completion, (&calls as *const Cell<i32>) as *mut u8);

        assert!(op.invoke());
        assert!(issue_sub_task(&mut op, &pool, &fifo, blit_params()));
        let idx = fifo.dequeue().expect("one sub-task queued");

        notify_sub_task_complete(idx, 0, false, &pool);

        assert_eq!(calls.get(), 1, "callback still ran exactly once");
        assert!(!op.is_complete(), "callback returned false");
        assert!(!op.is_busy(), "busy clears regardless of complete");
    }

    #[test]
    fn outstanding_count_gates_completion_until_every_sub_task_reports() {
        let pool: SubTaskPool<4> = SubTaskPool::new();
        let fifo: SubTaskFifo<4> = SubTaskFifo::new();
        let mut op = OperationCore::new(IoType::Copy, Preference::SwOnly);

        assert!(op.invoke());
        assert!(issue_sub_task(&mut op, &pool, &fifo, blit_params()));
        assert!(issue_sub_task(&mut op, &pool, &fifo, blit_params()));

        let first = fifo.dequeue().unwrap();
        let second = fifo.dequeue().unwrap();

        notify_sub_task_complete(first, 0, false, &pool);
        assert!(!op.is_complete(), "one sub-task still outstanding");

        notify_sub_task_complete(second, 0, false, &pool);
        assert!(op.is_complete());
    }

    /// "Last error wins" — the final stored result is the most recent
    /// negative code, not the first.
    #[test]
    fn last_negative_result_wins() {
        let pool: SubTaskPool<4> = SubTaskPool::new();
        let fifo: SubTaskFifo<4> = SubTaskFifo::new();
        let mut op = OperationCore::new(IoType::Copy, Preference::SwOnly);

        assert!(op.invoke());
        assert!(issue_sub_task(&mut op, &pool, &fifo, blit_params()));
        assert!(issue_sub_task(&mut op, &pool, &fifo, blit_params()));

        let first = fifo.dequeue().unwrap();
        let second = fifo.dequeue().unwrap();

        notify_sub_task_complete(first, -1, false, &pool);
        notify_sub_task_complete(second, -2, false, &pool);

        assert!(op.is_error());
        assert_eq!(op.result(), -2);
    }

    #[test]
    fn a_busy_record_refuses_a_second_invoke() {
        let mut op = OperationCore::new(IoType::Copy, Preference::SwOnly);
        assert!(op.invoke());
        assert!(!op.invoke(), "already busy");
    }

    #[test]
    fn force_terminal_sets_error_flag_for_negative_results() {
        let mut op = OperationCore::new(IoType::Fill, Preference::SwOnly);
        op.invoke();
        op.force_terminal(-1);
        assert!(op.is_error());
        assert!(op.is_complete());
        assert!(!op.is_busy());
    }
}
