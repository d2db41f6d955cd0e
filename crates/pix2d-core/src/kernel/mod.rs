//! Software pixel kernels: alpha blending, plain copy and solid fill
//! over RGB565/RGB888, strided and direct variants, with and without
//! color-key masking.
//!
//! Every kernel here returns immediately (doing nothing) when `width == 0`
//! or `height == 0`. Exceeding the backing tile is undefined behavior for
//! these functions — clipping against the tile is the geometry layer's
//! job (`crate::geometry::Tile::clip`), not this module's.

pub mod rgb565;
pub mod rgb888;

use pix2d_hal::{
    ColorFormat, CopyParams, FillParams, IoError, IoOutcome, IoResult, PixelPlane,
    TileProcessParams,
};

/// Default software implementation of the `CopyLike` low-level interface:
/// blit, alpha blend, and alpha blend with color-key masking, for both
/// supported color depths. Never returns `Async`/`OnGoing`/`WaitForObj` —
/// a software fallback always resolves synchronously.
pub fn run_copy(params: &CopyParams) -> IoResult {
    if params.size.is_empty() {
        return Ok(IoOutcome::Cpl);
    }

    match (params.source.format, params.target.format) {
        (ColorFormat::Rgb565, ColorFormat::Rgb565) => {
            rgb565::dispatch_copy(params);
            Ok(IoOutcome::Cpl)
        }
        (ColorFormat::Rgb888, ColorFormat::Rgb888) => {
            rgb888::dispatch_copy(params);
            Ok(IoOutcome::Cpl)
        }
        _ => Err(IoError::NotSupport),
    }
}

/// Default software implementation of the `FillLike` low-level interface:
/// solid-color fill for both supported color depths.
pub fn run_fill(params: &FillParams) -> IoResult {
    if params.size.is_empty() {
        return Ok(IoOutcome::Cpl);
    }

    match params.target.format {
        ColorFormat::Rgb565 => {
            rgb565::fill(params.target, params.size, params.color as u16);
            Ok(IoOutcome::Cpl)
        }
        ColorFormat::Rgb888 => {
            rgb888::fill(params.target, params.size, params.color);
            Ok(IoOutcome::Cpl)
        }
    }
}

/// Default software implementation of the `TileProcessLike` low-level
/// interface. No concrete single-plane operation is named among the
/// canonical entries (every named operation needs at least two operands:
/// a source/target pair or a fill color/target pair) — this stays an
/// explicit, addressable identity pass rather than being omitted.
pub fn run_tile_process(params: &TileProcessParams) -> IoResult {
    if params.size.is_empty() {
        return Ok(IoOutcome::Cpl);
    }
    Ok(IoOutcome::Cpl)
}

/// Row-stepping helper shared by the strided kernels: given a base pointer,
/// a stride in pixels and a row index, returns the pointer to the start of
/// that row. `T` is the pixel type (`u16` for RGB565, `u32` for RGB888).
#[inline]
pub(crate) unsafe fn row_ptr<T>(base: *mut u8, stride: i32, row: u32) -> *mut T {
    base.cast::<T>().offset(stride as isize * row as isize)
}

#[inline]
pub(crate) unsafe fn row_ptr_const<T>(base: *const u8, stride: i32, row: u32) -> *const T {
    base.cast::<T>().offset(stride as isize * row as isize)
}

/// `true` when `source`, `background` and `target` are all contiguous
/// over the requested region (stride equals width), so the row loop can
/// be collapsed into one linear run of `width * height` pixels. The three
/// planes need not be the same buffer — the direct variant takes a
/// distinct "background" operand precisely so source and target can stay
/// read-only while composing into a third, write-only destination. Each
/// plane's stride is checked independently against `width` rather than
/// chained pairwise, so the check holds regardless of which planes (if
/// any) alias each other.
#[inline]
pub(crate) fn is_direct(
    source: &PixelPlane,
    background: &PixelPlane,
    target: &PixelPlane,
    width: u32,
) -> bool {
    let w = width as i32;
    source.stride == w && background.stride == w && target.stride == w
}
