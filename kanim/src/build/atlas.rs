//! Moving sprite pixels between a packed atlas and per-frame bitmaps
//!
//! Verts carry frame-local positions (pixels, relative to the frame box) and
//! atlas UVs with `v` running bottom-up. A frame's quads cover the part of
//! its box that has visible pixels; the rest of the box is transparent.

use image::imageops::{self, FilterType};
use image::RgbaImage;
use ktex::Ktex;
use tracing::{debug, warn};

use super::types::{Atlas, Build, BuildFrame, Vert};
use super::{MAX_ATLASES, VERTS_PER_QUAD};
use crate::atlas::{AtlasPacker, Block, Rect, Regions, analyze};
use crate::config::{AtlasOptions, CodecConfig};
use crate::error::{DataWarning, Result};

/// Bounding boxes of a vert slice
struct QuadBounds {
    u_min: f32,
    u_max: f32,
    v_min: f32,
    v_max: f32,
    x_min: f32,
    x_max: f32,
    y_min: f32,
    y_max: f32,
}

impl QuadBounds {
    fn of(verts: &[Vert]) -> Option<Self> {
        let first = verts.first()?;
        let mut b = QuadBounds {
            u_min: first.u,
            u_max: first.u,
            v_min: first.v,
            v_max: first.v,
            x_min: first.x,
            x_max: first.x,
            y_min: first.y,
            y_max: first.y,
        };
        for vert in &verts[1..] {
            b.u_min = b.u_min.min(vert.u);
            b.u_max = b.u_max.max(vert.u);
            b.v_min = b.v_min.min(vert.v);
            b.v_max = b.v_max.max(vert.v);
            b.x_min = b.x_min.min(vert.x);
            b.x_max = b.x_max.max(vert.x);
            b.y_min = b.y_min.min(vert.y);
            b.y_max = b.y_max.max(vert.y);
        }
        Some(b)
    }

    /// UV box in atlas pixels, clamped to the atlas
    fn atlas_rect(&self, width: u32, height: u32) -> Rect {
        let to_px = |t: f32, size: u32| (t.clamp(0.0, 1.0) * size as f32).round() as u32;
        let x0 = to_px(self.u_min, width);
        let x1 = to_px(self.u_max, width);
        let y0 = to_px(1.0 - self.v_max, height);
        let y1 = to_px(1.0 - self.v_min, height);
        Rect::new(x0, y0, x1 - x0, y1 - y0)
    }
}

fn round_px(value: f32) -> u32 {
    value.round().max(0.0) as u32
}

enum Extracted {
    Image(RgbaImage),
    Resized { image: RgbaImage, cropped: u64, region: u64 },
    Warning(DataWarning),
}

impl Build {
    /// Cut every frame's bitmap out of `atlases` (indexed like [`Build::atlases`])
    pub fn split_atlas(&mut self, atlases: &[RgbaImage]) -> Result<Vec<DataWarning>> {
        self.split_atlas_with(atlases, &AtlasOptions::default())
    }

    /// Cut every frame's bitmap out of `atlases`.
    ///
    /// Sets each frame's `image` and recomputes [`Build::scale`] from the
    /// regions that needed resizing. Frames whose region cannot be placed
    /// are left without an image and reported as warnings.
    pub fn split_atlas_with(
        &mut self,
        atlases: &[RgbaImage],
        options: &AtlasOptions,
    ) -> Result<Vec<DataWarning>> {
        self.validate()?;
        let filter: FilterType = options.resize_filter.into();

        let mut warnings = Vec::new();
        if self.atlases.len() > MAX_ATLASES {
            warnings.push(DataWarning::TooManyAtlases {
                build: self.name.clone(),
                count: self.atlases.len(),
                max: MAX_ATLASES,
            });
        }

        let mut cropped_area = 0u64;
        let mut region_area = 0u64;
        let verts = &self.verts;
        for symbol in &mut self.symbols {
            let symbol_name = symbol.name.clone();
            for frame in &mut symbol.frames {
                let start = frame.vert_idx as usize;
                let slice = verts
                    .get(start..start + frame.vert_num as usize)
                    .unwrap_or_default();
                frame.image = match extract(&symbol_name, frame, slice, atlases, filter) {
                    Extracted::Image(image) => Some(image),
                    Extracted::Resized {
                        image,
                        cropped,
                        region,
                    } => {
                        cropped_area += cropped;
                        region_area += region;
                        Some(image)
                    }
                    Extracted::Warning(warning) => {
                        let blank = matches!(warning, DataWarning::DegenerateRegion { .. });
                        warnings.push(warning);
                        blank.then(|| {
                            let (w, h) = frame.pixel_size();
                            RgbaImage::new(w, h)
                        })
                    }
                };
            }
        }

        self.scale = if region_area > 0 {
            (cropped_area as f64 / region_area as f64).sqrt() as f32
        } else {
            1.0
        };

        for warning in &warnings {
            warn!(build = %self.name, "{warning}");
        }
        debug!(
            build = %self.name,
            scale = self.scale,
            warnings = warnings.len(),
            "Split atlas"
        );
        Ok(warnings)
    }

    /// Decode every loaded [`Atlas::ktex`] and split with the default options
    pub fn split_loaded_atlases(&mut self) -> Result<Vec<DataWarning>> {
        self.split_loaded_atlases_with(&CodecConfig::default())
    }

    /// Decode every loaded [`Atlas::ktex`] and split.
    ///
    /// Atlases without a texture become empty bitmaps, so frames that use
    /// them are reported as [`DataWarning::MissingAtlas`].
    pub fn split_loaded_atlases_with(&mut self, config: &CodecConfig) -> Result<Vec<DataWarning>> {
        let images = self
            .atlases
            .iter()
            .map(|atlas| match &atlas.ktex {
                Some(ktex) => ktex.to_image_with(&config.texture),
                None => Ok(RgbaImage::new(0, 0)),
            })
            .collect::<ktex::Result<Vec<_>>>()?;
        self.split_atlas_with(&images, &config.atlas)
    }

    /// Pack every frame bitmap into one atlas with the default configuration
    pub fn pack_atlas(&mut self) -> Result<Vec<DataWarning>> {
        self.pack_atlas_with(&CodecConfig::default())
    }

    /// Pack every frame bitmap into a single new atlas.
    ///
    /// A frame whose bitmap no longer matches its declared `w`/`h` takes the
    /// bitmap's size, centred on the same `x`/`y`. Replaces [`Build::verts`] and [`Build::atlases`] and rewrites each
    /// frame's vert slice. The atlas is resized by [`Build::scale`] before it
    /// is encoded with `config.texture`.
    pub fn pack_atlas_with(&mut self, config: &CodecConfig) -> Result<Vec<DataWarning>> {
        let options = &config.atlas;
        let mut warnings = Vec::new();

        // Frame boxes follow the bitmaps they hold, keeping their centre
        for symbol in &mut self.symbols {
            for frame in &mut symbol.frames {
                let Some((w, h)) = frame.image.as_ref().map(RgbaImage::dimensions) else {
                    continue;
                };
                if (w, h) != frame.pixel_size() {
                    debug!(
                        symbol = %symbol.name,
                        frame_num = frame.frame_num,
                        w,
                        h,
                        "Frame box resized to its bitmap"
                    );
                    frame.w = w as f32;
                    frame.h = h as f32;
                }
            }
        }

        // One block per frame with visible pixels: the union of its regions
        let mut blocks = Vec::new();
        let mut owners: Vec<(usize, usize, Rect, Regions)> = Vec::new();
        for (s, symbol) in self.symbols.iter().enumerate() {
            for (f, frame) in symbol.frames.iter().enumerate() {
                let Some(image) = &frame.image else {
                    warnings.push(DataWarning::MissingBitmap {
                        symbol: symbol.name.clone(),
                        frame_num: frame.frame_num,
                    });
                    continue;
                };
                let regions = analyze(image, options.min_block_size);
                let Some(bounds) = regions.bounds() else {
                    continue;
                };
                let pixels = imageops::crop_imm(image, bounds.x, bounds.y, bounds.w, bounds.h);
                blocks.push(Block::named(
                    format!("{}-{}", symbol.name, frame.frame_num),
                    pixels.to_image(),
                ));
                owners.push((s, f, bounds, regions));
            }
        }

        let packed = AtlasPacker::new(options.alignment).pack(&blocks);
        let (atlas_w, atlas_h) = packed.image.dimensions();

        for symbol in &mut self.symbols {
            for frame in &mut symbol.frames {
                frame.vert_idx = 0;
                frame.vert_num = 0;
            }
        }

        let mut verts = Vec::new();
        for ((s, f, bounds, regions), placement) in owners.iter().zip(&packed.placements) {
            let frame = &mut self.symbols[*s].frames[*f];
            let start = verts.len();
            for region in regions.iter() {
                let local = region.relative_to(bounds);
                let in_atlas = Rect::new(
                    placement.x + local.x,
                    placement.y + local.y,
                    local.w,
                    local.h,
                );
                push_quad(&mut verts, frame, region, &in_atlas, atlas_w, atlas_h);
            }
            frame.vert_idx = start as u32;
            frame.vert_num = (verts.len() - start) as u32;
        }
        // Frames with nothing to draw point at the end of the vert array
        let end = verts.len() as u32;
        for symbol in &mut self.symbols {
            for frame in &mut symbol.frames {
                if frame.vert_num == 0 {
                    frame.vert_idx = end;
                }
            }
        }

        let mut image = packed.image;
        if self.scale != 1.0 {
            let w = round_px(atlas_w as f32 * self.scale).max(1);
            let h = round_px(atlas_h as f32 * self.scale).max(1);
            image = imageops::resize(&image, w, h, options.resize_filter.into());
        }

        let ktex = Ktex::from_image_with(&image, &config.texture)?;
        self.atlases = vec![Atlas {
            name: options.atlas_name.clone(),
            ktex: Some(ktex),
        }];
        self.verts = verts;

        for warning in &warnings {
            warn!(build = %self.name, "{warning}");
        }
        debug!(
            build = %self.name,
            blocks = blocks.len(),
            width = image.width(),
            height = image.height(),
            verts = self.verts.len(),
            "Packed atlas"
        );
        Ok(warnings)
    }
}

/// Crop one frame's pixels out of its atlas
fn extract(
    symbol: &str,
    frame: &BuildFrame,
    verts: &[Vert],
    atlases: &[RgbaImage],
    filter: FilterType,
) -> Extracted {
    let (frame_w, frame_h) = frame.pixel_size();
    let Some(bounds) = QuadBounds::of(verts) else {
        return Extracted::Image(RgbaImage::new(frame_w, frame_h));
    };

    let atlas_index = verts[0].atlas_index();
    let Some(atlas) = atlases
        .get(atlas_index)
        .filter(|a| a.width() > 0 && a.height() > 0)
    else {
        return Extracted::Warning(DataWarning::MissingAtlas {
            symbol: symbol.to_string(),
            frame_num: frame.frame_num,
            atlas: atlas_index,
        });
    };

    let source = bounds.atlas_rect(atlas.width(), atlas.height());
    if source.is_empty() {
        return Extracted::Warning(DataWarning::DegenerateRegion {
            symbol: symbol.to_string(),
            frame_num: frame.frame_num,
        });
    }

    let region_w = round_px(bounds.x_max - bounds.x_min);
    let region_h = round_px(bounds.y_max - bounds.y_min);
    if region_w == 0 || region_h == 0 {
        return Extracted::Warning(DataWarning::DegenerateRegion {
            symbol: symbol.to_string(),
            frame_num: frame.frame_num,
        });
    }

    let crop = imageops::crop_imm(atlas, source.x, source.y, source.w, source.h).to_image();
    let resized = (source.w, source.h) != (region_w, region_h);
    let sprite = if resized {
        imageops::resize(&crop, region_w, region_h, filter)
    } else {
        crop
    };

    let image = if (region_w, region_h) == (frame_w, frame_h) {
        sprite
    } else {
        let (origin_x, origin_y) = frame.origin();
        let offset_x = (bounds.x_min - origin_x).round() as i64;
        let offset_y = (bounds.y_min - origin_y).round() as i64;
        let fits = offset_x >= 0
            && offset_y >= 0
            && offset_x + region_w as i64 <= frame_w as i64
            && offset_y + region_h as i64 <= frame_h as i64;
        if !fits {
            return Extracted::Warning(DataWarning::RegionOutOfBounds {
                symbol: symbol.to_string(),
                frame_num: frame.frame_num,
                offset_x,
                offset_y,
                region_w,
                region_h,
                frame_w,
                frame_h,
            });
        }
        let mut canvas = RgbaImage::new(frame_w, frame_h);
        imageops::replace(&mut canvas, &sprite, offset_x, offset_y);
        canvas
    };

    if resized {
        Extracted::Resized {
            image,
            cropped: source.area(),
            region: region_w as u64 * region_h as u64,
        }
    } else {
        Extracted::Image(image)
    }
}

/// Append two triangles covering `region` (frame pixels) mapped to `in_atlas`
fn push_quad(
    verts: &mut Vec<Vert>,
    frame: &BuildFrame,
    region: &Rect,
    in_atlas: &Rect,
    atlas_w: u32,
    atlas_h: u32,
) {
    let (origin_x, origin_y) = frame.origin();
    let x0 = origin_x + region.x as f32;
    let x1 = x0 + region.w as f32;
    let y0 = origin_y + region.y as f32;
    let y1 = y0 + region.h as f32;

    let u0 = (in_atlas.x as f32 / atlas_w as f32).clamp(0.0, 1.0);
    let u1 = (in_atlas.right() as f32 / atlas_w as f32).clamp(0.0, 1.0);
    let v0 = (1.0 - in_atlas.y as f32 / atlas_h as f32).clamp(0.0, 1.0);
    let v1 = (1.0 - in_atlas.bottom() as f32 / atlas_h as f32).clamp(0.0, 1.0);

    let corner = |x: f32, y: f32, u: f32, v: f32| Vert {
        x,
        y,
        z: 0.0,
        u,
        v,
        w: 0.0,
    };
    let quad: [Vert; VERTS_PER_QUAD as usize] = [
        corner(x0, y0, u0, v0),
        corner(x1, y0, u1, v0),
        corner(x0, y1, u0, v1),
        corner(x1, y0, u1, v0),
        corner(x1, y1, u1, v1),
        corner(x0, y1, u0, v1),
    ];
    verts.extend_from_slice(&quad);
}
