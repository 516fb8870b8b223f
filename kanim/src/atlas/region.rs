//! Quad-tree alpha coverage analysis
//!
//! A sprite bitmap usually carries transparent padding. [`analyze`] splits it
//! into rectangles that are fully opaque or partially transparent, drops the
//! fully transparent ones, then merges same-class neighbours that share a full
//! edge.

use image::RgbaImage;

use super::Rect;

/// Alpha classification of a pixel rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Coverage {
    /// Every pixel has alpha 0
    Empty,
    /// Every pixel has alpha 255
    Opaque,
    /// Anything else, including a mix of only opaque and only blank pixels
    Alpha,
}

/// Non-blank regions of a bitmap
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Regions {
    pub opaque: Vec<Rect>,
    pub alpha: Vec<Rect>,
}

impl Regions {
    pub fn is_empty(&self) -> bool {
        self.opaque.is_empty() && self.alpha.is_empty()
    }

    pub fn len(&self) -> usize {
        self.opaque.len() + self.alpha.len()
    }

    /// Opaque regions first, then alpha regions
    pub fn iter(&self) -> impl Iterator<Item = &Rect> {
        self.opaque.iter().chain(self.alpha.iter())
    }

    /// Union of every region, or `None` when the bitmap is blank
    pub fn bounds(&self) -> Option<Rect> {
        self.iter().copied().reduce(|acc, rect| acc.union(&rect))
    }
}

/// Classify the pixels of `rect`, which must lie inside `image`
pub fn classify(image: &RgbaImage, rect: Rect) -> Coverage {
    let mut any_opaque = false;
    let mut any_empty = false;
    for y in rect.y..rect.bottom() {
        for x in rect.x..rect.right() {
            match image.get_pixel(x, y)[3] {
                0 => any_empty = true,
                255 => any_opaque = true,
                _ => return Coverage::Alpha,
            }
            if any_empty && any_opaque {
                return Coverage::Alpha;
            }
        }
    }
    match (any_opaque, any_empty) {
        (true, false) => Coverage::Opaque,
        _ => Coverage::Empty,
    }
}

/// Find the opaque and alpha regions of `image`.
///
/// Rectangles are not split below `min_block_size` pixels per side.
pub fn analyze(image: &RgbaImage, min_block_size: u32) -> Regions {
    let min = min_block_size.max(1);
    let mut leaves = Vec::new();
    let root = Rect::new(0, 0, image.width(), image.height());
    if let Some(coverage) = walk(image, root, min, &mut leaves) {
        leaves.push((coverage, root));
    }

    let mut regions = Regions::default();
    for (coverage, rect) in leaves {
        match coverage {
            Coverage::Opaque => regions.opaque.push(rect),
            Coverage::Alpha => regions.alpha.push(rect),
            Coverage::Empty => {}
        }
    }
    merge_all(&mut regions.opaque);
    merge_all(&mut regions.alpha);
    regions
}

/// Classify `rect` bottom-up. Returns the coverage when the whole rectangle
/// is reported as one unit; otherwise its parts have been pushed to `out`.
fn walk(
    image: &RgbaImage,
    rect: Rect,
    min: u32,
    out: &mut Vec<(Coverage, Rect)>,
) -> Option<Coverage> {
    let coverage = classify(image, rect);
    let at_min = rect.w <= min && rect.h <= min;
    if coverage != Coverage::Alpha || at_min {
        return Some(coverage);
    }

    let (left_w, right_w) = halves(rect.w, min);
    let (top_h, bottom_h) = halves(rect.h, min);
    let mut children = Vec::with_capacity(4);
    for (dy, h) in [(0, top_h), (top_h, bottom_h)] {
        for (dx, w) in [(0, left_w), (left_w, right_w)] {
            let child = Rect::new(rect.x + dx, rect.y + dy, w, h);
            if !child.is_empty() {
                let result = walk(image, child, min, out);
                children.push((child, result));
            }
        }
    }

    // Quadrants that are all min-size alpha cells collapse into their parent
    let all_min_alpha = children.iter().all(|(child, result)| {
        *result == Some(Coverage::Alpha) && child.w <= min && child.h <= min
    });
    if all_min_alpha {
        return Some(Coverage::Alpha);
    }
    for (child, result) in children {
        if let Some(coverage) = result {
            out.push((coverage, child));
        }
    }
    None
}

/// Split a side in two unless it is already at the minimum size
fn halves(len: u32, min: u32) -> (u32, u32) {
    if len > min {
        (len / 2, len - len / 2)
    } else {
        (len, 0)
    }
}

fn merge_all(rects: &mut Vec<Rect>) {
    loop {
        let mut merged = false;
        'scan: for i in 0..rects.len() {
            for j in (i + 1)..rects.len() {
                if let Some(union) = rects[i].merge_adjacent(&rects[j]) {
                    rects[i] = union;
                    rects.remove(j);
                    merged = true;
                    break 'scan;
                }
            }
        }
        if !merged {
            break;
        }
    }
}
