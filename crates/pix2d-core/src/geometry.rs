//! Tile/region geometry: nested sub-tile resolution and intersection.
//!
//! All arithmetic is signed 32-bit; strides are in pixels, not bytes.

use pix2d_hal::{ColorFormat, PixelPlane, Size};

/// Signed 2D integer coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Location {
    pub x: i32,
    pub y: i32,
}

impl Location {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in the coordinate frame of its containing tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Region {
    pub location: Location,
    pub size: Size,
}

impl Region {
    pub const fn new(location: Location, size: Size) -> Self {
        Self { location, size }
    }

    /// Axis-aligned intersection. `None` means "nothing to draw" — the
    /// caller surfaces this as `OUT_OF_REGION`, not a dispatched sub-task.
    pub fn intersect(&self, other: &Region) -> Option<Region> {
        let ax0 = self.location.x;
        let ay0 = self.location.y;
        let ax1 = ax0 + self.size.width as i32;
        let ay1 = ay0 + self.size.height as i32;

        let bx0 = other.location.x;
        let by0 = other.location.y;
        let bx1 = bx0 + other.size.width as i32;
        let by1 = by0 + other.size.height as i32;

        let x0 = ax0.max(bx0);
        let y0 = ay0.max(by0);
        let x1 = ax1.min(bx1);
        let y1 = ay1.min(by1);

        if x1 <= x0 || y1 <= y0 {
            return None;
        }

        Some(Region {
            location: Location::new(x0, y0),
            size: Size::new((x1 - x0) as u32, (y1 - y0) as u32),
        })
    }
}

/// Result of resolving a tile + region pair to an absolute pixel
/// rectangle: a ready-to-touch plane and the size actually covered.
#[derive(Debug, Clone, Copy)]
pub struct WorkRect {
    pub plane: PixelPlane,
    pub size: Size,
}

enum TileParent<'a> {
    /// Owns its backing pixel memory: `base` + `stride` (in pixels).
    Root { base: *mut u8, stride: i32 },
    /// A window into a parent tile's coordinate frame.
    Child {
        parent: &'a Tile<'a>,
        region: Region,
    },
}

/// A rectangular pixel buffer descriptor: either a root tile owning its
/// backing memory, or a child tile that is a window into a parent.
///
/// A child borrows its parent (`&'a Tile<'a>`), so the borrow checker
/// forbids constructing a cycle: a tile cannot be its own (in)direct
/// ancestor, because that would require it to outlive itself.
pub struct Tile<'a> {
    pub format: ColorFormat,
    pub size: Size,
    parent: TileParent<'a>,
}

impl<'a> Tile<'a> {
    /// Build a root tile directly over a pixel-memory buffer. The
    /// returned tile borrows `buf` for `'a`, so the buffer cannot be
    /// reused (e.g. handed to another root tile, or read directly) while
    /// this tile is alive.
    ///
    /// `stride` is in pixels. `buf` must contain at least
    /// `stride * size.height * format.pixel_bytes()` bytes when `stride
    /// >= size.width`; the caller is responsible for that invariant (the
    /// spec notes that an out-of-bounds region is undefined behavior for
    /// the kernels — clipping against the tile's own `size` is the
    /// geometry layer's job, not a buffer-length check here).
    pub fn from_buffer(buf: &'a mut [u8], stride: i32, size: Size, format: ColorFormat) -> Self {
        Tile {
            format,
            size,
            parent: TileParent::Root {
                base: buf.as_mut_ptr(),
                stride,
            },
        }
    }

    /// Build a child tile as a window into `parent`'s coordinate frame.
    /// `region.size` becomes this tile's `size`; the parent's own bounds
    /// are not checked here — intersection happens in [`Tile::clip`].
    pub fn child(parent: &'a Tile<'a>, region: Region) -> Self {
        Tile {
            format: parent.format,
            size: region.size,
            parent: TileParent::Child { parent, region },
        }
    }

    /// Walk the parent chain to the owning root tile, accumulating the
    /// (x, y) offset of this tile's origin in the root's coordinate
    /// frame. Returns the root's plane (not yet offset) and the
    /// accumulated offset.
    pub fn root(&self) -> (PixelPlane, Location) {
        match &self.parent {
            TileParent::Root { base, stride } => (
                PixelPlane {
                    base: *base,
                    stride: *stride,
                    format: self.format,
                },
                Location::new(0, 0),
            ),
            TileParent::Child { parent, region } => {
                let (plane, offset) = parent.root();
                (
                    plane,
                    Location::new(
                        offset.x + region.location.x,
                        offset.y + region.location.y,
                    ),
                )
            }
        }
    }

    /// Intersect `region` with this tile's own bounds, then resolve to an
    /// absolute pixel pointer and stride. `None` encodes `OUT_OF_REGION`
    /// (an empty intersection, or a zero-area region).
    pub fn clip(&self, region: Region) -> Option<WorkRect> {
        let bounds = Region::new(Location::new(0, 0), self.size);
        let clipped = bounds.intersect(&region)?;
        if clipped.size.is_empty() {
            return None;
        }

        let (root_plane, offset) = self.root();
        let x = offset.x + clipped.location.x;
        let y = offset.y + clipped.location.y;

        // SAFETY: advancing within the root buffer by `y * stride + x`
        // pixels, scaled to bytes by the format's pixel size. The caller
        // of `from_buffer` is responsible for the buffer being large
        // enough for every tile/region combination it constructs; this
        // function only performs the pointer arithmetic, it does not
        // dereference.
        let pixel_bytes = root_plane.format.pixel_bytes() as isize;
        let byte_offset = (y as isize * root_plane.stride as isize + x as isize) * pixel_bytes;
        let base = unsafe { root_plane.base.offset(byte_offset) };

        Some(WorkRect {
            plane: PixelPlane {
                base,
                stride: root_plane.stride,
                format: root_plane.format,
            },
            size: clipped.size,
        })
    }
}
