//! BUILD encoding

use tracing::{debug, warn};

use super::types::{Build, BuildFrame, BuildSymbol};
use super::{BUILD_MAGIC, BUILD_VERSION, MAX_ATLASES};
use crate::cursor::ByteWriter;
use crate::error::Result;
use crate::hash::HashTable;

/// Encode a build.
///
/// Symbols are written in ascending name-hash order and frames in frame
/// number order, whatever order the model holds them in. Fails before
/// writing anything if a frame's vert slice is invalid.
pub fn encode_build(build: &Build) -> Result<Vec<u8>> {
    build.validate()?;
    if build.atlases.len() > MAX_ATLASES {
        warn!(
            build = %build.name,
            count = build.atlases.len(),
            max = MAX_ATLASES,
            "Build references more atlases than the renderer supports"
        );
    }

    // Dictionary entries follow model order; records follow hash order
    let mut table = HashTable::new();
    let mut symbols: Vec<(u32, &BuildSymbol)> = build
        .symbols
        .iter()
        .map(|s| (table.insert(&s.name.to_ascii_lowercase()), s))
        .collect();
    symbols.sort_by_key(|(hash, _)| *hash);

    let mut out = ByteWriter::new();
    out.write_bytes(BUILD_MAGIC);
    out.write_i32(BUILD_VERSION);
    out.write_count("symbol", symbols.len())?;
    out.write_count("frame", build.frame_count())?;
    out.write_string(&build.name.to_ascii_lowercase())?;

    out.write_count("atlas", build.atlases.len())?;
    for atlas in &build.atlases {
        out.write_string(&atlas.name)?;
    }

    for (hash, symbol) in &symbols {
        out.write_u32(*hash);
        out.write_count("frame", symbol.frames.len())?;
        let mut frames: Vec<&BuildFrame> = symbol.frames.iter().collect();
        frames.sort_by_key(|f| f.frame_num);
        for frame in frames {
            out.write_u32(frame.frame_num);
            out.write_u32(frame.duration);
            out.write_f32(frame.x);
            out.write_f32(frame.y);
            out.write_f32(frame.w);
            out.write_f32(frame.h);
            out.write_u32(frame.vert_idx);
            out.write_u32(frame.vert_num);
        }
    }

    out.write_count("vert", build.verts.len())?;
    for vert in &build.verts {
        for value in [vert.x, vert.y, vert.z, vert.u, vert.v, vert.w] {
            out.write_f32(value);
        }
    }

    table.write(&mut out)?;

    debug!(
        build = %build.name,
        symbols = symbols.len(),
        verts = build.verts.len(),
        "Encoded BUILD"
    );
    Ok(out.into_inner())
}
