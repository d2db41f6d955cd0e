//! Dispatch policy: routes each sub-task to a hardware backend or a
//! software kernel per the operation's preference, and the `pump` loop
//! that drains the FIFO.

use pix2d_hal::{Backend, IoError, IoOutcome, IoResult, SubTaskHandle};

use crate::fifo::SubTaskFifo;
use crate::kernel;
use crate::op::{notify_sub_task_complete, SubTaskParams};
use crate::pool::SubTaskPool;
use crate::status::StatusCode;

/// Per-operation acceleration preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preference {
    /// Hardware only; `NotSupport` or busy is a hard failure.
    HwOnly,
    /// Never consult the hardware backend.
    SwOnly,
    /// Try hardware; fall back to software on `NotSupport` *or* on a busy
    /// backend (`OnGoing`/`WaitForObj`).
    HwPreferred,
    /// Hardware required; treated identically to `HwOnly` for fallback
    /// purposes — see DESIGN.md.
    HwRequired,
}

impl Preference {
    fn tries_hw(self) -> bool {
        !matches!(self, Preference::SwOnly)
    }

    fn forbids_sw_fallback(self) -> bool {
        matches!(self, Preference::HwOnly | Preference::HwRequired)
    }
}

fn call_hw<B: Backend>(backend: &mut B, handle: SubTaskHandle, params: &SubTaskParams) -> IoResult {
    match params {
        SubTaskParams::Copy(p) => backend.copy(handle, p),
        SubTaskParams::Fill(p) => backend.fill(handle, p),
        SubTaskParams::TileProcess(p) => backend.process(handle, p),
    }
}

fn call_sw(params: &SubTaskParams) -> IoResult {
    match params {
        SubTaskParams::Copy(p) => kernel::run_copy(p),
        SubTaskParams::Fill(p) => kernel::run_fill(p),
        SubTaskParams::TileProcess(p) => kernel::run_tile_process(p),
    }
}

/// The three-step dispatch algorithm for one sub-task: try hardware,
/// apply the fallback policy, fall back to a software kernel. Never
/// returns `Ok(OnGoing)`/`Ok(WaitForObj)` — those are internal
/// hardware-polling states the software kernel never produces and this
/// function resolves (to a fallback or `IoBusy`) before returning.
pub fn dispatch_sub_task<B: Backend>(
    backend: &mut B,
    handle: SubTaskHandle,
    preference: Preference,
    params: &SubTaskParams,
) -> IoResult {
    if preference.tries_hw() {
        match call_hw(backend, handle, params) {
            Ok(IoOutcome::Cpl) => return Ok(IoOutcome::Cpl),
            Ok(IoOutcome::Async) => return Ok(IoOutcome::Async),
            Ok(IoOutcome::OnGoing) | Ok(IoOutcome::WaitForObj) => {
                if preference != Preference::HwPreferred {
                    return Err(IoError::IoBusy);
                }
                // HwPreferred: fall through to the software kernel below.
            }
            Err(IoError::NotSupport) => {
                if preference.forbids_sw_fallback() {
                    return Err(IoError::NotSupport);
                }
                // Fall through to the software kernel below.
            }
            Err(other) => return Err(other),
        }
    }

    call_sw(params)
}

/// Drains the FIFO: dequeue a sub-task, dispatch it, and — unless the
/// result was `Async` — notify completion synchronously (`from_hw =
/// false`). Exits and returns `Cpl` once the FIFO is empty. Never blocks;
/// a caller that wants to wait for work supplies the arrival-notification
/// hook instead (see [`crate::facade::Engine`]).
pub fn pump<B: Backend, const N: usize>(
    backend: &mut B,
    pool: &SubTaskPool<N>,
    fifo: &SubTaskFifo<N>,
) -> StatusCode {
    loop {
        let Some(idx) = fifo.dequeue() else {
            return StatusCode::Cpl;
        };

        let (preference, params) = pool.with_slot(idx, |slot| {
            let preference = slot
                .op
                // SAFETY: the slot's `op` pointer is only cleared by
                // releasing the slot, which hasn't happened yet — we hold
                // the only reference to it until `notify_sub_task_complete`
                // below.
                .map(|mut p| unsafe { p.as_mut().preference })
                .unwrap_or(Preference::SwOnly);
            (preference, slot.params)
        });

        let result = dispatch_sub_task(backend, SubTaskHandle(idx), preference, &params);

        if matches!(result, Ok(IoOutcome::Async)) {
            // The slot stays booked: the backend holds `idx` via the
            // handle it was just given and will report completion later,
            // possibly from an interrupt, via `notify_sub_task_complete`
            // with `from_hw = true`.
            continue;
        }

        let code: StatusCode = result.into();
        notify_sub_task_complete(idx, code.as_i32(), false, pool);
    }
}
