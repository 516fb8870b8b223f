//! Pixel-rectangle geometry for atlas packing
//!
//! [`region`] finds the non-blank parts of a sprite bitmap, [`packer`] places
//! sprite blocks into a power-of-two atlas.

pub mod packer;
pub mod region;

use serde::{Deserialize, Serialize};

pub use packer::{AtlasPacker, Block, PackLayout, PackedAtlas};
pub use region::{Coverage, Regions, analyze, classify};

/// Axis-aligned pixel rectangle; `x`/`y` is the top-left corner
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    pub const fn right(&self) -> u32 {
        self.x + self.w
    }

    pub const fn bottom(&self) -> u32 {
        self.y + self.h
    }

    pub const fn area(&self) -> u64 {
        self.w as u64 * self.h as u64
    }

    pub const fn is_empty(&self) -> bool {
        self.w == 0 || self.h == 0
    }

    /// Strict overlap: rectangles that only touch along an edge do not
    /// intersect, and an empty rectangle intersects nothing
    pub const fn intersects(&self, other: &Rect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub const fn contains(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Smallest rectangle covering both
    pub fn union(&self, other: &Rect) -> Rect {
        let x = self.x.min(other.x);
        let y = self.y.min(other.y);
        Rect::new(
            x,
            y,
            self.right().max(other.right()) - x,
            self.bottom().max(other.bottom()) - y,
        )
    }

    /// Same rectangle shifted so `origin` becomes (0, 0)
    pub fn relative_to(&self, origin: &Rect) -> Rect {
        Rect::new(self.x - origin.x, self.y - origin.y, self.w, self.h)
    }

    /// Merge two rectangles that share a full edge
    fn merge_adjacent(&self, other: &Rect) -> Option<Rect> {
        let stacked = self.x == other.x
            && self.w == other.w
            && (self.bottom() == other.y || other.bottom() == self.y);
        let side_by_side = self.y == other.y
            && self.h == other.h
            && (self.right() == other.x || other.right() == self.x);
        (stacked || side_by_side).then(|| self.union(other))
    }
}
