//! Greedy growing bin packer
//!
//! Blocks are placed largest-first into a power-of-two bin. Each block scans
//! rows top to bottom and positions left to right on an alignment grid; when a
//! candidate overlaps a placed block the scan jumps past that block's right
//! edge, and the next row starts below the highest bottom edge that was hit.
//! If any block fails to fit, the bin's smaller side doubles and the whole
//! layout starts over.

use image::{RgbaImage, imageops};
use tracing::debug;

use super::Rect;
use crate::config::DEFAULT_ALIGNMENT;

/// A bitmap to place into the atlas
#[derive(Debug, Clone)]
pub struct Block {
    pub name: Option<String>,
    pub image: RgbaImage,
}

impl Block {
    pub fn new(image: RgbaImage) -> Self {
        Self { name: None, image }
    }

    pub fn named(name: impl Into<String>, image: RgbaImage) -> Self {
        Self {
            name: Some(name.into()),
            image,
        }
    }
}

/// Bin size plus one placement per input block, in input order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackLayout {
    pub width: u32,
    pub height: u32,
    pub placements: Vec<Rect>,
}

/// Composed atlas bitmap plus one placement per input block, in input order
#[derive(Debug, Clone)]
pub struct PackedAtlas {
    pub image: RgbaImage,
    pub placements: Vec<Rect>,
}

#[derive(Debug, Clone, Copy)]
pub struct AtlasPacker {
    alignment: u32,
}

impl Default for AtlasPacker {
    fn default() -> Self {
        Self::new(DEFAULT_ALIGNMENT)
    }
}

impl AtlasPacker {
    /// `alignment` is the placement grid step in pixels (clamped to at least 1)
    pub fn new(alignment: u32) -> Self {
        Self {
            alignment: alignment.max(1),
        }
    }

    /// Compute placements for blocks of the given `(width, height)` sizes
    pub fn layout(&self, sizes: &[(u32, u32)]) -> PackLayout {
        let mut order: Vec<usize> = (0..sizes.len()).collect();
        order.sort_by_key(|&i| std::cmp::Reverse(sizes[i].0 as u64 * sizes[i].1 as u64));

        let total: u64 = sizes.iter().map(|&(w, h)| w as u64 * h as u64).sum();
        let side = ((total as f64).sqrt().ceil() as u32).max(1);
        let mut width = side.next_power_of_two();
        let mut height = width;

        loop {
            if let Some(placements) = self.try_layout(sizes, &order, width, height) {
                debug!(
                    blocks = sizes.len(),
                    width, height, "Packed atlas layout"
                );
                return PackLayout {
                    width,
                    height,
                    placements,
                };
            }
            if width <= height {
                width *= 2;
            } else {
                height *= 2;
            }
        }
    }

    /// Lay out and compose `blocks` into one atlas bitmap
    pub fn pack(&self, blocks: &[Block]) -> PackedAtlas {
        let sizes: Vec<(u32, u32)> = blocks.iter().map(|b| b.image.dimensions()).collect();
        let layout = self.layout(&sizes);

        let mut image = RgbaImage::new(layout.width, layout.height);
        for (block, rect) in blocks.iter().zip(&layout.placements) {
            if !rect.is_empty() {
                imageops::replace(&mut image, &block.image, rect.x as i64, rect.y as i64);
            }
        }
        PackedAtlas {
            image,
            placements: layout.placements,
        }
    }

    fn try_layout(
        &self,
        sizes: &[(u32, u32)],
        order: &[usize],
        bin_w: u32,
        bin_h: u32,
    ) -> Option<Vec<Rect>> {
        let mut placements = vec![Rect::default(); sizes.len()];
        let mut placed: Vec<Rect> = Vec::with_capacity(sizes.len());

        for &index in order {
            let (w, h) = sizes[index];
            if w == 0 || h == 0 {
                placements[index] = Rect::new(0, 0, w, h);
                continue;
            }
            let rect = self.place(&placed, w, h, bin_w, bin_h)?;
            placed.push(rect);
            placements[index] = rect;
        }
        Some(placements)
    }

    fn place(&self, placed: &[Rect], w: u32, h: u32, bin_w: u32, bin_h: u32) -> Option<Rect> {
        let mut y = 0;
        while y + h <= bin_h {
            let mut x = 0;
            let mut next_row: Option<u32> = None;
            while x + w <= bin_w {
                let candidate = Rect::new(x, y, w, h);
                match placed.iter().find(|r| r.intersects(&candidate)) {
                    None => return Some(candidate),
                    Some(hit) => {
                        next_row = Some(next_row.map_or(hit.bottom(), |b| b.min(hit.bottom())));
                        x = align_up(hit.right(), self.alignment);
                    }
                }
            }
            // Nothing was hit on this row, so the block is wider than the bin
            y = align_up(next_row?, self.alignment);
        }
        None
    }
}

fn align_up(value: u32, alignment: u32) -> u32 {
    value.div_ceil(alignment) * alignment
}
