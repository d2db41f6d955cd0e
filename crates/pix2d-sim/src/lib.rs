//! Host-side debug harness for the `pix2d` engine.
//!
//! A `std`-side stand-in for the hardware the engine targets, so the
//! engine itself can be exercised (and demoed) without a real 2D
//! accelerator attached. Two backends are provided:
//!
//! - [`NullBackend`] always reports [`IoError::NotSupport`], forcing
//!   every sub-task through `pix2d-core`'s software kernels. This is the
//!   "no hardware present" case.
//! - [`DeferredBackend`] accepts every sub-task and reports [`IoOutcome::Async`]
//!   immediately, queuing the handle for the caller to resolve later via
//!   [`DeferredBackend::complete_next`] — a stand-in for a hardware
//!   completion interrupt firing well after the dispatch call returned.

use std::collections::VecDeque;

use pix2d_hal::{
    CopyBackend, CopyParams, FillBackend, FillParams, IoError, IoOutcome, IoResult,
    SubTaskHandle, TileProcessBackend, TileProcessParams,
};

/// Always defers to the software kernels. The common case for a host
/// build with no accelerator attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullBackend;

impl CopyBackend for NullBackend {
    fn copy(&mut self, _handle: SubTaskHandle, _params: &CopyParams) -> IoResult {
        Err(IoError::NotSupport)
    }
}

impl FillBackend for NullBackend {
    fn fill(&mut self, _handle: SubTaskHandle, _params: &FillParams) -> IoResult {
        Err(IoError::NotSupport)
    }
}

impl TileProcessBackend for NullBackend {
    fn process(&mut self, _handle: SubTaskHandle, _params: &TileProcessParams) -> IoResult {
        Err(IoError::NotSupport)
    }
}

/// Simulates a hardware accelerator that never completes synchronously:
/// every sub-task is accepted and reported `Async`, with its handle
/// pushed onto an internal queue. A test (or demo loop) drains that
/// queue on its own schedule via [`DeferredBackend::complete_next`] to
/// model the completion interrupt arriving after some delay.
#[derive(Debug, Default)]
pub struct DeferredBackend {
    pending: VecDeque<SubTaskHandle>,
}

impl DeferredBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sub-tasks accepted but not yet resolved.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Pops the oldest pending handle, if any — the caller is expected to
    /// report it back to the engine via
    /// [`pix2d_core::Engine::notify_sub_task_complete`].
    pub fn complete_next(&mut self) -> Option<SubTaskHandle> {
        self.pending.pop_front()
    }
}

impl CopyBackend for DeferredBackend {
    fn copy(&mut self, handle: SubTaskHandle, _params: &CopyParams) -> IoResult {
        self.pending.push_back(handle);
        Ok(IoOutcome::Async)
    }
}

impl FillBackend for DeferredBackend {
    fn fill(&mut self, handle: SubTaskHandle, _params: &FillParams) -> IoResult {
        self.pending.push_back(handle);
        Ok(IoOutcome::Async)
    }
}

impl TileProcessBackend for DeferredBackend {
    fn process(&mut self, handle: SubTaskHandle, _params: &TileProcessParams) -> IoResult {
        self.pending.push_back(handle);
        Ok(IoOutcome::Async)
    }
}

/// A `std`-backed root tile buffer: owns its pixel storage so a demo or
/// test can build a [`pix2d_core::Tile`] over it without juggling
/// lifetimes at the call site.
pub struct Framebuffer {
    pub pixels: Vec<u8>,
    pub stride: i32,
    pub size: pix2d_hal::Size,
    pub format: pix2d_hal::ColorFormat,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32, format: pix2d_hal::ColorFormat) -> Self {
        let stride = width as i32;
        let len = width as usize * height as usize * format.pixel_bytes();
        Framebuffer {
            pixels: vec![0u8; len],
            stride,
            size: pix2d_hal::Size::new(width, height),
            format,
        }
    }

    pub fn tile(&mut self) -> pix2d_core::Tile<'_> {
        pix2d_core::Tile::from_buffer(&mut self.pixels, self.stride, self.size, self.format)
    }
}
