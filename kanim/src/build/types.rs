//! BUILD model types

use image::RgbaImage;
use ktex::Ktex;
use serde::{Deserialize, Serialize};

use super::VERTS_PER_QUAD;
use crate::error::{FormatError, Result};
use crate::hash::strhash;

/// Symbols plus the atlas geometry that locates each symbol frame's pixels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Build {
    pub name: String,
    /// Atlas resolution relative to the frame sizes; set by atlas split
    pub scale: f32,
    pub symbols: Vec<BuildSymbol>,
    pub atlases: Vec<Atlas>,
    pub verts: Vec<Vert>,
}

impl Build {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            scale: 1.0,
            symbols: Vec::new(),
            atlases: Vec::new(),
            verts: Vec::new(),
        }
    }

    pub fn symbol(&self, name: &str) -> Option<&BuildSymbol> {
        self.symbols.iter().find(|s| s.name == name)
    }

    pub fn symbol_mut(&mut self, name: &str) -> Option<&mut BuildSymbol> {
        self.symbols.iter_mut().find(|s| s.name == name)
    }

    /// Put symbols in wire order: ascending name hash
    pub fn sort_symbols(&mut self) {
        self.symbols.sort_by_key(|s| strhash(&s.name));
    }

    /// Total frame count across all symbols
    pub fn frame_count(&self) -> usize {
        self.symbols.iter().map(|s| s.frames.len()).sum()
    }

    /// Check every frame's vert slice: a whole number of quads, in range
    pub fn validate(&self) -> Result<()> {
        for symbol in &self.symbols {
            for frame in &symbol.frames {
                frame_verts(&self.verts, symbol, frame)?;
            }
        }
        Ok(())
    }
}

/// The vert slice of `frame`, or the format error describing why it is invalid
pub(crate) fn frame_verts<'a>(
    verts: &'a [Vert],
    symbol: &BuildSymbol,
    frame: &BuildFrame,
) -> Result<&'a [Vert]> {
    if frame.vert_num % VERTS_PER_QUAD != 0 {
        return Err(FormatError::VertCount {
            symbol: symbol.name.clone(),
            frame_num: frame.frame_num,
            vert_num: frame.vert_num,
        });
    }
    let start = frame.vert_idx as usize;
    let end = start + frame.vert_num as usize;
    verts.get(start..end).ok_or_else(|| FormatError::VertRange {
        symbol: symbol.name.clone(),
        frame_num: frame.frame_num,
        vert_idx: frame.vert_idx,
        vert_num: frame.vert_num,
        total: verts.len(),
    })
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildSymbol {
    pub name: String,
    /// Sorted by [`BuildFrame::frame_num`]
    pub frames: Vec<BuildFrame>,
}

impl BuildSymbol {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: Vec::new(),
        }
    }

    /// Add a frame and restore frame order
    pub fn push_frame(&mut self, frame: BuildFrame) {
        self.frames.push(frame);
        self.sort_frames();
    }

    pub fn sort_frames(&mut self) {
        self.frames.sort_by_key(|f| f.frame_num);
    }

    /// Find the frame shown at `frame_num`.
    ///
    /// With `use_duration` a frame covers `frame_num..frame_num + duration`;
    /// otherwise only an exact frame number matches.
    pub fn frame_at(&self, frame_num: u32, use_duration: bool) -> Option<&BuildFrame> {
        if use_duration {
            self.frames.iter().find(|f| {
                frame_num >= f.frame_num && frame_num - f.frame_num < f.duration
            })
        } else {
            self.frames.iter().find(|f| f.frame_num == frame_num)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildFrame {
    pub frame_num: u32,
    pub duration: u32,
    /// Pivot-relative centre of the frame box
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub vert_idx: u32,
    pub vert_num: u32,
    /// Sprite pixels, once split out of the atlas
    #[serde(skip)]
    pub image: Option<RgbaImage>,
}

impl BuildFrame {
    /// Declared size in whole pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (to_pixels(self.w), to_pixels(self.h))
    }

    /// Top-left corner of the frame box in symbol space
    pub fn origin(&self) -> (f32, f32) {
        (self.x - self.w / 2.0, self.y - self.h / 2.0)
    }
}

fn to_pixels(value: f32) -> u32 {
    value.round().max(0.0) as u32
}

/// One corner of a sprite quad triangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vert {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub u: f32,
    /// Bottom-up: 1.0 is the top row of the atlas
    pub v: f32,
    /// Atlas index, stored as a float
    pub w: f32,
}

impl Vert {
    pub fn atlas_index(&self) -> usize {
        self.w.max(0.0) as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Atlas {
    pub name: String,
    #[serde(skip)]
    pub ktex: Option<Ktex>,
}

impl Atlas {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ktex: None,
        }
    }
}
