//! Public façade: the entry points an application actually calls.
//!
//! [`Engine`] owns the sub-task pool, the FIFO and the backend together —
//! there is no separate "attach a backend" step. Each entry point builds
//! an operation's sub-task(s) (clipping the target region, and for
//! two-operand ops the matching source rectangle), reserves and emits
//! them, then runs the `on_leave` exit hook: eagerly terminal results are
//! marked `Complete` immediately, the FIFO is drained inline unless a
//! dedicated worker thread owns pumping, and any unconsumed booking is
//! cancelled.

use pix2d_hal::{Backend, CopyKind, CopyParams, FillParams};

use crate::config::RuntimeConfig;
use crate::dispatch;
use crate::fifo::SubTaskFifo;
use crate::geometry::{Location, Region, Tile};
use crate::op::{issue_sub_task, OperationCore, SubTaskParams};
use crate::pool::SubTaskPool;
use crate::status::StatusCode;

/// The asynchronous 2D pixel-processing engine. Generic over the backend
/// `B` it dispatches to and the sub-task pool capacity `N`.
pub struct Engine<B, const N: usize> {
    backend: B,
    pool: SubTaskPool<N>,
    fifo: SubTaskFifo<N>,
    config: RuntimeConfig,
    /// Fired at most once per FIFO empty-to-non-empty transition. A plain
    /// function pointer rather than a boxed closure — this crate is
    /// `no_std` with no allocator assumed.
    on_arrival: Option<fn()>,
}

impl<B: Backend, const N: usize> Engine<B, N> {
    pub fn new(backend: B, config: RuntimeConfig) -> Self {
        Engine {
            backend,
            pool: SubTaskPool::new(),
            fifo: SubTaskFifo::new(),
            config,
            on_arrival: None,
        }
    }

    /// Injects the arrival-notification hook (default: no-op).
    pub fn with_arrival_notify(mut self, f: fn()) -> Self {
        self.on_arrival = Some(f);
        self
    }

    pub fn config(&self) -> RuntimeConfig {
        self.config
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn free_count(&self) -> usize {
        self.pool.free_count()
    }

    pub fn pending_count(&self) -> usize {
        self.fifo.len()
    }

    /// Drains the FIFO: the public entry point for a bare polling loop or
    /// a dedicated worker thread. Never blocks.
    pub fn pump(&mut self) -> StatusCode {
        dispatch::pump(&mut self.backend, &self.pool, &self.fifo)
    }

    /// Reports completion of a sub-task that a hardware backend returned
    /// `Async` for earlier. `result` is the backend's result code
    /// (negative = error). Safe to call from an interrupt handler.
    pub fn notify_sub_task_complete(&mut self, handle: pix2d_hal::SubTaskHandle, result: i32) {
        crate::op::notify_sub_task_complete(handle.0, result, true, &self.pool);
    }

    /// Alpha blend `source` into `target`'s `region` (or the whole target
    /// when `None`), RGB565, at 8-bit `ratio`.
    pub fn alpha_blend_rgb565(
        &mut self,
        op: &mut OperationCore,
        source: &Tile<'_>,
        target: &Tile<'_>,
        region: Option<Region>,
        ratio: u8,
    ) -> StatusCode {
        self.blend(op, source, target, region, CopyKind::AlphaBlend { ratio })
    }

    /// As [`Engine::alpha_blend_rgb565`], skipping any source pixel equal
    /// to `key`.
    pub fn alpha_blend_rgb565_color_key(
        &mut self,
        op: &mut OperationCore,
        source: &Tile<'_>,
        target: &Tile<'_>,
        region: Option<Region>,
        ratio: u8,
        key: u16,
    ) -> StatusCode {
        self.blend(
            op,
            source,
            target,
            region,
            CopyKind::AlphaBlendColorKey {
                ratio,
                key: key as u32,
            },
        )
    }

    /// Alpha blend `source` into `target`'s `region` (or the whole target
    /// when `None`), RGB888, at 8-bit `ratio`.
    pub fn alpha_blend_rgb888(
        &mut self,
        op: &mut OperationCore,
        source: &Tile<'_>,
        target: &Tile<'_>,
        region: Option<Region>,
        ratio: u8,
    ) -> StatusCode {
        self.blend(op, source, target, region, CopyKind::AlphaBlend { ratio })
    }

    /// As [`Engine::alpha_blend_rgb888`], skipping any source pixel equal
    /// to `key`.
    pub fn alpha_blend_rgb888_color_key(
        &mut self,
        op: &mut OperationCore,
        source: &Tile<'_>,
        target: &Tile<'_>,
        region: Option<Region>,
        ratio: u8,
        key: u32,
    ) -> StatusCode {
        self.blend(
            op,
            source,
            target,
            region,
            CopyKind::AlphaBlendColorKey { ratio, key },
        )
    }

    /// Plain (non-blending) blit of `source` into `target`'s `region`,
    /// RGB565. Exercises the direct-vs-strided fast path independent of
    /// blending.
    pub fn copy_rgb565(
        &mut self,
        op: &mut OperationCore,
        source: &Tile<'_>,
        target: &Tile<'_>,
        region: Option<Region>,
    ) -> StatusCode {
        self.blend(op, source, target, region, CopyKind::Blit)
    }

    /// As [`Engine::copy_rgb565`], RGB888.
    pub fn copy_rgb888(
        &mut self,
        op: &mut OperationCore,
        source: &Tile<'_>,
        target: &Tile<'_>,
        region: Option<Region>,
    ) -> StatusCode {
        self.blend(op, source, target, region, CopyKind::Blit)
    }

    /// Solid-color fill of `target`'s `region` (or the whole target when
    /// `None`), RGB565.
    pub fn fill_rgb565(
        &mut self,
        op: &mut OperationCore,
        target: &Tile<'_>,
        region: Option<Region>,
        color: u16,
    ) -> StatusCode {
        self.fill(op, target, region, color as u32)
    }

    /// As [`Engine::fill_rgb565`], RGB888.
    pub fn fill_rgb888(
        &mut self,
        op: &mut OperationCore,
        target: &Tile<'_>,
        region: Option<Region>,
        color: u32,
    ) -> StatusCode {
        self.fill(op, target, region, color)
    }

    /// Shared implementation behind every `CopyLike` entry (blit and both
    /// blend variants, both color formats): clips `target`'s region,
    /// clips `source`'s origin-aligned window of the same size, and
    /// emits one sub-task for the resulting rectangle.
    ///
    /// When `source` is smaller than the clipped target rectangle, the
    /// source clip shrinks further and the dispatched rectangle follows
    /// the smaller of the two — a too-small source is treated as a second
    /// clip rather than an error. See DESIGN.md.
    fn blend(
        &mut self,
        op: &mut OperationCore,
        source: &Tile<'_>,
        target: &Tile<'_>,
        region: Option<Region>,
        kind: CopyKind,
    ) -> StatusCode {
        if !op.invoke() {
            return StatusCode::IoBusy;
        }

        let target_region = region.unwrap_or(Region::new(Location::new(0, 0), target.size));
        let Some(target_work) = target.clip(target_region) else {
            let sync = self.out_of_region_status();
            return self.on_leave(op, sync);
        };

        let source_region = Region::new(Location::new(0, 0), target_work.size);
        let Some(source_work) = source.clip(source_region) else {
            let sync = self.out_of_region_status();
            return self.on_leave(op, sync);
        };

        let size = size_min(source_work.size, target_work.size);
        let params = SubTaskParams::Copy(CopyParams {
            source: source_work.plane,
            background: None,
            target: target_work.plane,
            size,
            kind,
        });

        let sync = self.emit(op, params);
        self.on_leave(op, sync)
    }

    fn fill(
        &mut self,
        op: &mut OperationCore,
        target: &Tile<'_>,
        region: Option<Region>,
        color: u32,
    ) -> StatusCode {
        if !op.invoke() {
            return StatusCode::IoBusy;
        }

        let target_region = region.unwrap_or(Region::new(Location::new(0, 0), target.size));
        let Some(target_work) = target.clip(target_region) else {
            let sync = self.out_of_region_status();
            return self.on_leave(op, sync);
        };

        let params = SubTaskParams::Fill(FillParams {
            target: target_work.plane,
            size: target_work.size,
            color,
        });

        let sync = self.emit(op, params);
        self.on_leave(op, sync)
    }

    fn out_of_region_status(&self) -> StatusCode {
        if self.config.treat_out_of_region_as_complete {
            StatusCode::Cpl
        } else {
            StatusCode::OutOfRegion
        }
    }

    /// Reserves one sub-task slot, emits it, and fires the arrival
    /// notification on the FIFO's empty-to-non-empty transition.
    /// Reservation always precedes emission: partial emission would leave
    /// an operation waiting on a sub-task that was never actually queued.
    /// Returns `Async` on success, `NotSupport` on pool exhaustion — the
    /// façade never dispatches a sub-task it did not first reserve a slot
    /// for.
    fn emit(&mut self, op: &mut OperationCore, params: SubTaskParams) -> StatusCode {
        if op.io_type != params.io_type() {
            return StatusCode::InvalidOp;
        }

        if !self.pool.reserve(1) {
            return StatusCode::NotSupport;
        }

        let was_empty = self.fifo.is_empty();
        if !issue_sub_task(op, &self.pool, &self.fifo, params) {
            self.pool.cancel_bookings();
            return StatusCode::NotSupport;
        }

        if was_empty {
            if let Some(notify) = self.on_arrival {
                notify();
            }
        }

        StatusCode::Async
    }

    /// Front-end exit hook: eagerly resolves a
    /// synchronously-terminal result, inline-drains the FIFO unless a
    /// dedicated worker thread owns pumping, and always cancels any
    /// booking the call didn't consume.
    fn on_leave(&mut self, op: &mut OperationCore, sync_result: StatusCode) -> StatusCode {
        let terminal_code = match sync_result {
            StatusCode::OutOfRegion if self.config.treat_out_of_region_as_complete => {
                Some(StatusCode::Cpl)
            }
            StatusCode::OutOfRegion | StatusCode::Cpl => Some(sync_result),
            other if other.is_error() => Some(other),
            _ => None,
        };

        if let Some(code) = terminal_code {
            op.force_terminal(code.as_i32());
        }

        if !self.config.has_dedicated_thread_for_2d_task {
            self.pump();
        }

        self.pool.cancel_bookings();

        if op.is_complete() {
            StatusCode::from_result_code(op.result())
        } else {
            StatusCode::Async
        }
    }
}

/// Componentwise minimum, used to reconcile a source clip that came out
/// smaller than the target clip it was sized against.
fn size_min(a: pix2d_hal::Size, b: pix2d_hal::Size) -> pix2d_hal::Size {
    pix2d_hal::Size::new(a.width.min(b.width), a.height.min(b.height))
}
