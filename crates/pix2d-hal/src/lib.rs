#![no_std]
//! Platform abstraction traits for pix2d hardware-accelerator backends.
//!
//! A backend implements some or all of [`CopyBackend`], [`FillBackend`] and
//! [`TileProcessBackend`] against its own 2D accelerator IP. The engine in
//! `pix2d-core` never talks to an accelerator directly — it only ever calls
//! through these traits, falling back to its own software kernels whenever a
//! backend reports [`IoError::NotSupport`].

use core::fmt;

/// Pixel color format carried by every tile and every pixel plane handed to
/// a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorFormat {
    /// 16 bits per pixel, 5:6:5 channel split.
    Rgb565,
    /// 32 bits per pixel, 8:8:8:8 (the fourth byte is not interpreted).
    Rgb888,
}

impl ColorFormat {
    /// Size of one pixel in bytes.
    pub const fn pixel_bytes(self) -> usize {
        match self {
            ColorFormat::Rgb565 => 2,
            ColorFormat::Rgb888 => 4,
        }
    }
}

/// Unsigned 2D extent. `width * height == 0` denotes an empty rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl Size {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// A rectangular run of pixel memory: a base address, a stride (in pixels,
/// not bytes) and the color format the stride/base should be interpreted
/// with. Strides may exceed the region width when the plane is a window
/// into a larger tile.
///
/// `base` is a raw pointer rather than a slice because a `PixelPlane` is
/// handed across the sub-task boundary: it may be read (or written) later,
/// from a hardware completion ISR, well after the call that produced it has
/// returned. See [`pix2d_core`]'s `geometry` module for the safe
/// construction path.
#[derive(Clone, Copy)]
pub struct PixelPlane {
    pub base: *mut u8,
    pub stride: i32,
    pub format: ColorFormat,
}

impl fmt::Debug for PixelPlane {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PixelPlane")
            .field("base", &self.base)
            .field("stride", &self.stride)
            .field("format", &self.format)
            .finish()
    }
}

/// Which alpha-compositing rule a [`CopyBackend`] call should apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyKind {
    /// Plain pixel copy, no blending.
    Blit,
    /// Alpha blend with the given 8-bit ratio (0 = target only, 255 = near
    /// source; see the kernel documentation for the exact fixed-point rule).
    AlphaBlend { ratio: u8 },
    /// Alpha blend, skipping any source pixel equal to `key`.
    AlphaBlendColorKey { ratio: u8, key: u32 },
}

/// Parameters for one `CopyLike` sub-task.
#[derive(Debug, Clone, Copy)]
pub struct CopyParams {
    pub source: PixelPlane,
    /// Used only by the direct (non-strided) fast path; ignored otherwise.
    /// Lets a caller compose two read-only operands into a third,
    /// write-only destination plane.
    pub background: Option<PixelPlane>,
    pub target: PixelPlane,
    pub size: Size,
    pub kind: CopyKind,
}

/// Parameters for one `FillLike` sub-task.
#[derive(Debug, Clone, Copy)]
pub struct FillParams {
    pub target: PixelPlane,
    pub size: Size,
    /// Packed pixel value in the target's color format.
    pub color: u32,
}

/// Parameters for one `TileProcessLike` sub-task: an in-place operation over
/// a single plane (no distinct source).
#[derive(Debug, Clone, Copy)]
pub struct TileProcessParams {
    pub target: PixelPlane,
    pub size: Size,
}

/// Opaque handle identifying one in-flight sub-task, passed to a backend
/// alongside its parameters. A backend that returns [`IoOutcome::Async`]
/// must hold on to this handle (e.g. in a completion queue keyed by DMA
/// channel or register) so that whatever drives its completion interrupt
/// can later report it back to the engine — the backend itself never
/// calls back into `pix2d-core` directly, since this crate has no
/// dependency on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubTaskHandle(pub u8);

/// Non-error outcomes a backend may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoOutcome {
    /// Completed synchronously.
    Cpl,
    /// Queued; `notify_sub_task_complete` will be called later, possibly
    /// from an interrupt.
    Async,
    /// Transient — internal use, never returned by a real backend.
    OnGoing,
    /// Waiting on an external event — internal use, never returned by a
    /// real backend.
    WaitForObj,
}

/// Error outcomes a backend (or the software fallback) may report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoError {
    /// This backend does not handle this op-kind/color-depth combination.
    NotSupport,
    /// The sub-task's IO type did not match what the descriptor expected.
    InvalidOp,
    /// Backend is busy and the dispatch policy forbids falling back to
    /// software.
    IoBusy,
    /// Any other backend-reported negative error code.
    Backend(i32),
}

/// Result vocabulary shared between hardware backends and the dispatcher.
pub type IoResult = Result<IoOutcome, IoError>;

/// Implemented by a hardware accelerator (or the engine's own software
/// fallback) for the `CopyLike` low-level interface: blits and alpha
/// blends. `handle` identifies this sub-task for a later asynchronous
/// completion report; a synchronous backend can ignore it.
pub trait CopyBackend {
    fn copy(&mut self, handle: SubTaskHandle, params: &CopyParams) -> IoResult;
}

/// Implemented for the `FillLike` low-level interface: solid-color fills.
pub trait FillBackend {
    fn fill(&mut self, handle: SubTaskHandle, params: &FillParams) -> IoResult;
}

/// Implemented for the `TileProcessLike` low-level interface: single-plane,
/// in-place operations (e.g. format conversion in place).
pub trait TileProcessBackend {
    fn process(&mut self, handle: SubTaskHandle, params: &TileProcessParams) -> IoResult;
}

/// A backend that handles all three low-level interfaces. Anything that
/// implements the three traits individually gets this for free.
pub trait Backend: CopyBackend + FillBackend + TileProcessBackend {}

impl<T> Backend for T where T: CopyBackend + FillBackend + TileProcessBackend {}
