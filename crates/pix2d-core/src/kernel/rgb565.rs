//! RGB565 pixel kernels: 5:6:5 channel pack/unpack, blit, alpha blend
//! (plain and color-keyed) and solid fill.

use pix2d_hal::{CopyKind, CopyParams, PixelPlane, Size};

use super::{is_direct, row_ptr, row_ptr_const};

#[inline]
fn unpack(pixel: u16) -> (u32, u32, u32) {
    let r = ((pixel >> 11) & 0x1F) as u32;
    let g = ((pixel >> 5) & 0x3F) as u32;
    let b = (pixel & 0x1F) as u32;
    (r, g, b)
}

#[inline]
fn pack(r: u32, g: u32, b: u32) -> u16 {
    (((r & 0x1F) << 11) | ((g & 0x3F) << 5) | (b & 0x1F)) as u16
}

/// `out_c = (s_c * ratio + t_c * (256 - ratio)) >> 8`, applied per channel.
/// Deliberately not a pass-through at `ratio == 255`.
#[inline]
fn blend_pixel(source: u16, background: u16, ratio: u8) -> u16 {
    let (sr, sg, sb) = unpack(source);
    let (br, bg, bb) = unpack(background);
    let hi = ratio as u32;
    let lo = 256 - hi;
    let r = (sr * hi + br * lo) >> 8;
    let g = (sg * hi + bg * lo) >> 8;
    let b = (sb * hi + bb * lo) >> 8;
    pack(r, g, b)
}

/// One row of a `CopyLike` sub-task: `source` and `background` are
/// read-only, `dst` is write-only. `background` and `dst` may alias (the
/// in-place case every façade entry in this crate actually uses).
unsafe fn copy_row(
    source: *const u16,
    background: *const u16,
    dst: *mut u16,
    width: u32,
    kind: CopyKind,
) {
    for x in 0..width as isize {
        let s = *source.offset(x);
        match kind {
            CopyKind::Blit => {
                *dst.offset(x) = s;
            }
            CopyKind::AlphaBlend { ratio } => {
                let bg = *background.offset(x);
                *dst.offset(x) = blend_pixel(s, bg, ratio);
            }
            CopyKind::AlphaBlendColorKey { ratio, key } => {
                let bg = *background.offset(x);
                if s == key as u16 {
                    *dst.offset(x) = bg;
                } else {
                    *dst.offset(x) = blend_pixel(s, bg, ratio);
                }
            }
        }
    }
}

/// Dispatch a `CopyLike` sub-task over two RGB565 planes. `params.background`
/// is consulted only to pick the read operand for blending; when absent,
/// `params.target` doubles as the background (in-place composition), which
/// is how every façade entry in this crate issues blend sub-tasks.
pub(crate) fn dispatch_copy(params: &CopyParams) {
    let width = params.size.width;
    let height = params.size.height;
    if width == 0 || height == 0 {
        return;
    }

    let background = params.background.unwrap_or(params.target);

    if is_direct(&params.source, &background, &params.target, width) {
        // SAFETY: `is_direct` guarantees every plane's stride equals the
        // row width, so each is one contiguous run of `width * height`
        // pixels, whether or not `background` aliases `params.target`.
        unsafe {
            let count = width as isize * height as isize;
            copy_row(
                params.source.base.cast::<u16>(),
                background.base.cast::<u16>(),
                params.target.base.cast::<u16>(),
                count as u32,
                params.kind,
            );
        }
        return;
    }

    for row in 0..height {
        // SAFETY: each pointer is advanced by its own plane's stride; the
        // caller (the geometry layer) guarantees `width`/`height` stay
        // within every plane's backing buffer.
        unsafe {
            let s = row_ptr_const::<u16>(params.source.base, params.source.stride, row);
            let bg = row_ptr_const::<u16>(background.base, background.stride, row);
            let d = row_ptr::<u16>(params.target.base, params.target.stride, row);
            copy_row(s, bg, d, width, params.kind);
        }
    }
}

pub(crate) fn fill(target: PixelPlane, size: Size, color: u16) {
    if size.width == 0 || size.height == 0 {
        return;
    }
    for row in 0..size.height {
        // SAFETY: caller guarantees the region lies within `target`'s tile.
        unsafe {
            let d = row_ptr::<u16>(target.base, target.stride, row);
            for x in 0..size.width as isize {
                *d.offset(x) = color;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pix2d_hal::{ColorFormat, CopyKind};

    fn plane(buf: &mut [u16]) -> PixelPlane {
        PixelPlane {
            base: buf.as_mut_ptr().cast(),
            stride: buf.len() as i32,
            format: ColorFormat::Rgb565,
        }
    }

    /// Ratio=128 blend of red/green over black.
    #[test]
    fn blend_ratio_128_matches_scenario_1() {
        let mut source = [0xF800u16, 0x07E0];
        let mut target = [0x0000u16, 0x0000];
        let size = Size::new(2, 1);
        let params = CopyParams {
            source: plane(&mut source),
            background: None,
            target: plane(&mut target),
            size,
            kind: CopyKind::AlphaBlend { ratio: 128 },
        };
        dispatch_copy(&params);
        assert_eq!(target[0], 0x7800);
        assert_eq!(target[1], 0x03E0);
    }

    #[test]
    fn blend_ratio_zero_is_target_only() {
        let mut source = [0xFFFFu16];
        let mut target = [0x1234u16];
        let before = target[0];
        let params = CopyParams {
            source: plane(&mut source),
            background: None,
            target: plane(&mut target),
            size: Size::new(1, 1),
            kind: CopyKind::AlphaBlend { ratio: 0 },
        };
        dispatch_copy(&params);
        assert_eq!(target[0], before);
    }

    #[test]
    fn blend_is_idempotent_for_uniform_color() {
        let mut source = [0x4321u16; 3];
        let mut target = [0x4321u16; 3];
        let params = CopyParams {
            source: plane(&mut source),
            background: None,
            target: plane(&mut target),
            size: Size::new(3, 1),
            kind: CopyKind::AlphaBlend { ratio: 200 },
        };
        dispatch_copy(&params);
        assert_eq!(target, [0x4321; 3]);
    }

    /// Color-masked blend at ratio=255: a source pixel matching the key
    /// passes the background through untouched.
    #[test]
    fn color_key_skips_matching_source_pixel() {
        let mut source = [0x07E0u16, 0xF800];
        let mut target = [0xFFFFu16, 0x0000];
        let params = CopyParams {
            source: plane(&mut source),
            background: None,
            target: plane(&mut target),
            size: Size::new(2, 1),
            kind: CopyKind::AlphaBlendColorKey {
                ratio: 255,
                key: 0x07E0,
            },
        };
        dispatch_copy(&params);
        assert_eq!(target[0], 0xFFFF, "masked pixel left untouched");
        assert_eq!(target[1], blend_pixel(0xF800, 0x0000, 255));
    }

    #[test]
    fn fill_writes_every_pixel_in_region() {
        let mut target = [0u16; 6];
        let plane = plane(&mut target);
        fill(plane, Size::new(3, 2), 0xABCD);
        assert_eq!(target, [0xABCD; 6]);
    }

    #[test]
    fn zero_area_region_is_a_no_op() {
        let mut source = [0x1234u16];
        let mut target = [0x5678u16];
        let params = CopyParams {
            source: plane(&mut source),
            background: None,
            target: plane(&mut target),
            size: Size::new(0, 4),
            kind: CopyKind::Blit,
        };
        dispatch_copy(&params);
        assert_eq!(target[0], 0x5678);
    }

    #[test]
    fn pack_unpack_roundtrip() {
        for pixel in [0x0000u16, 0xFFFF, 0xF800, 0x07E0, 0x001F, 0x4321] {
            let (r, g, b) = unpack(pixel);
            assert_eq!(pack(r, g, b), pixel);
        }
    }
}
