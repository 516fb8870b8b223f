//! ANIM model types

use serde::{Deserialize, Serialize};

use super::facing;

/// Named group of animations
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bank {
    pub name: String,
    pub animations: Vec<Animation>,
}

impl Bank {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            animations: Vec::new(),
        }
    }

    pub fn animation(&self, name: &str) -> Option<&Animation> {
        self.animations.iter().find(|a| a.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    /// Full name including any facing suffix, e.g. `run_side`
    pub name: String,
    pub frame_rate: f32,
    /// Sorted by [`AnimFrame::idx`]
    pub frames: Vec<AnimFrame>,
}

impl Animation {
    pub fn new(name: impl Into<String>, frame_rate: f32) -> Self {
        Self {
            name: name.into(),
            frame_rate,
            frames: Vec::new(),
        }
    }

    /// Name as stored on the wire, without the facing suffix
    pub fn base_name(&self) -> &str {
        facing::split_name(&self.name).0
    }

    /// Facing mask implied by the name's suffix
    pub fn facing(&self) -> u8 {
        facing::split_name(&self.name).1
    }

    /// Add a frame and restore frame order
    pub fn push_frame(&mut self, frame: AnimFrame) {
        self.frames.push(frame);
        self.sort_frames();
    }

    pub fn sort_frames(&mut self) {
        self.frames.sort_by_key(|f| f.idx);
    }
}

/// One keyframe: hit box, fired events and the symbol instances drawn
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnimFrame {
    pub idx: u32,
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub events: Vec<String>,
    /// Sorted by [`AnimElement::z_index`]
    pub elements: Vec<AnimElement>,
}

impl AnimFrame {
    pub fn new(idx: u32) -> Self {
        Self {
            idx,
            ..Default::default()
        }
    }

    /// Add an element and restore draw order
    pub fn push_element(&mut self, element: AnimElement) {
        self.elements.push(element);
        self.sort_elements();
    }

    pub fn sort_elements(&mut self) {
        self.elements.sort_by_key(|e| e.z_index);
    }
}

/// A transformed instance of one build symbol frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnimElement {
    /// Draw order; higher values are drawn in front
    pub z_index: u32,
    pub symbol: String,
    /// Build frame number within `symbol`
    pub frame: u32,
    pub layer_name: String,
    pub matrix: Affine,
}

/// 2x3 affine transform: `x' = a*x + c*y + tx`, `y' = b*x + d*y + ty`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Affine {
    pub a: f32,
    pub b: f32,
    pub c: f32,
    pub d: f32,
    pub tx: f32,
    pub ty: f32,
}

impl Affine {
    pub const IDENTITY: Self = Self {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    pub const fn translation(tx: f32, ty: f32) -> Self {
        Self {
            tx,
            ty,
            ..Self::IDENTITY
        }
    }
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}
