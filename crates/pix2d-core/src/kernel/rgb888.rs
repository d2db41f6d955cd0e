//! RGB888 pixel kernels: 8:8:8(:8) channel pack/unpack, blit, alpha blend
//! (plain and color-keyed) and solid fill. The fourth byte is carried
//! through the blend like any other channel — the kernel does not
//! special-case it.

use pix2d_hal::{CopyKind, CopyParams, PixelPlane, Size};

use super::{is_direct, row_ptr, row_ptr_const};

#[inline]
fn unpack(pixel: u32) -> (u32, u32, u32, u32) {
    let r = (pixel >> 24) & 0xFF;
    let g = (pixel >> 16) & 0xFF;
    let b = (pixel >> 8) & 0xFF;
    let a = pixel & 0xFF;
    (r, g, b, a)
}

#[inline]
fn pack(r: u32, g: u32, b: u32, a: u32) -> u32 {
    ((r & 0xFF) << 24) | ((g & 0xFF) << 16) | ((b & 0xFF) << 8) | (a & 0xFF)
}

/// `out_c = (s_c * ratio + t_c * (256 - ratio)) >> 8`, applied to all four
/// bytes. Deliberately not a pass-through at `ratio == 255`.
#[inline]
fn blend_pixel(source: u32, background: u32, ratio: u8) -> u32 {
    let (sr, sg, sb, sa) = unpack(source);
    let (br, bg, bb, ba) = unpack(background);
    let hi = ratio as u32;
    let lo = 256 - hi;
    let r = (sr * hi + br * lo) >> 8;
    let g = (sg * hi + bg * lo) >> 8;
    let b = (sb * hi + bb * lo) >> 8;
    let a = (sa * hi + ba * lo) >> 8;
    pack(r, g, b, a)
}

unsafe fn copy_row(
    source: *const u32,
    background: *const u32,
    dst: *mut u32,
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
                if s == key {
                    *dst.offset(x) = bg;
                } else {
                    *dst.offset(x) = blend_pixel(s, bg, ratio);
                }
            }
        }
    }
}

/// Dispatch a `CopyLike` sub-task over two RGB888 planes. See
/// [`super::rgb565::dispatch_copy`] for the `background` aliasing contract.
pub(crate) fn dispatch_copy(params: &CopyParams) {
    let width = params.size.width;
    let height = params.size.height;
    if width == 0 || height == 0 {
        return;
    }

    let background = params.background.unwrap_or(params.target);

    if is_direct(&params.source, &background, &params.target, width) {
        // SAFETY: contiguous strides collapse the region into one run,
        // whether or not `background` aliases `params.target`.
        unsafe {
            let count = width as isize * height as isize;
            copy_row(
                params.source.base.cast::<u32>(),
                background.base.cast::<u32>(),
                params.target.base.cast::<u32>(),
                count as u32,
                params.kind,
            );
        }
        return;
    }

    for row in 0..height {
        // SAFETY: each pointer advances by its own plane's stride; the
        // caller guarantees the region stays within every plane's tile.
        unsafe {
            let s = row_ptr_const::<u32>(params.source.base, params.source.stride, row);
            let bg = row_ptr_const::<u32>(background.base, background.stride, row);
            let d = row_ptr::<u32>(params.target.base, params.target.stride, row);
            copy_row(s, bg, d, width, params.kind);
        }
    }
}

pub(crate) fn fill(target: PixelPlane, size: Size, color: u32) {
    if size.width == 0 || size.height == 0 {
        return;
    }
    for row in 0..size.height {
        // SAFETY: caller guarantees the region lies within `target`'s tile.
        unsafe {
            let d = row_ptr::<u32>(target.base, target.stride, row);
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

    fn plane(buf: &mut [u32]) -> PixelPlane {
        PixelPlane {
            base: buf.as_mut_ptr().cast(),
            stride: buf.len() as i32,
            format: ColorFormat::Rgb888,
        }
    }

    /// Direct blend, ratio=0: destination tracks the background operand
    /// exactly (non-pass-through rounding).
    #[test]
    fn direct_blend_ratio_zero_tracks_background() {
        let mut source = [0x10203040u32; 4];
        let background = [0x01020304u32; 4];
        let mut destination = [0xAAAAAAAAu32; 4];

        let source_plane = plane(&mut source);
        let bg_plane = PixelPlane {
            base: background.as_ptr() as *mut u8,
            stride: background.len() as i32,
            format: ColorFormat::Rgb888,
        };
        let dst_plane = plane(&mut destination);

        let params = CopyParams {
            source: source_plane,
            background: Some(bg_plane),
            target: dst_plane,
            size: Size::new(4, 1),
            kind: CopyKind::AlphaBlend { ratio: 0 },
        };
        dispatch_copy(&params);

        let expected = blend_pixel(0x10203040, 0x01020304, 0);
        for px in destination {
            assert_eq!(px, expected);
        }
        // ratio=0 means `(bg * 256) >> 8`, exactly `bg` with no rounding loss.
        assert_eq!(expected, 0x01020304);
    }

    #[test]
    fn fourth_byte_is_blended_like_any_other_channel() {
        let mut source = [0x000000FFu32];
        let mut target = [0x00000000u32];
        let params = CopyParams {
            source: plane(&mut source),
            background: None,
            target: plane(&mut target),
            size: Size::new(1, 1),
            kind: CopyKind::AlphaBlend { ratio: 255 },
        };
        dispatch_copy(&params);
        assert_eq!(target[0] & 0xFF, blend_pixel(0xFF, 0, 255) & 0xFF);
    }

    #[test]
    fn pack_unpack_roundtrip() {
        for pixel in [0u32, 0xFFFFFFFF, 0x01020304, 0x10203040] {
            let (r, g, b, a) = unpack(pixel);
            assert_eq!(pack(r, g, b, a), pixel);
        }
    }

    #[test]
    fn fill_writes_every_pixel_in_region() {
        let mut target = [0u32; 4];
        let plane = plane(&mut target);
        fill(plane, Size::new(2, 2), 0x11223344);
        assert_eq!(target, [0x11223344; 4]);
    }
}
