//! BUILD decoding

use tracing::{debug, warn};

use super::types::{Atlas, Build, BuildFrame, BuildSymbol, Vert};
use super::{BUILD_MAGIC, BUILD_VERSION, FRAME_RECORD_SIZE, MAX_ATLASES, VERT_RECORD_SIZE};
use crate::cursor::ByteCursor;
use crate::error::{FormatError, Result};
use crate::hash::HashTable;

/// Decode a BUILD buffer.
///
/// Symbols come back in file order (ascending name hash) with their frames
/// sorted. Every frame's vert slice is checked; atlas textures are left
/// unloaded.
pub fn decode_build(data: &[u8]) -> Result<Build> {
    let mut cursor = ByteCursor::new(data);
    cursor.expect_magic(BUILD_MAGIC)?;
    let version = cursor.read_i32()?;
    if version != BUILD_VERSION {
        warn!(version, expected = BUILD_VERSION, "Unexpected BUILD version");
    }
    let symbol_count = cursor.read_u32()?;
    let _frame_count = cursor.read_u32()?;
    let name = cursor.read_string()?.to_ascii_lowercase();

    let atlas_count = cursor.read_u32()?;
    if atlas_count as usize > MAX_ATLASES {
        warn!(
            build = %name,
            count = atlas_count,
            max = MAX_ATLASES,
            "Build references more atlases than the renderer supports"
        );
    }
    let mut atlases = Vec::new();
    for _ in 0..atlas_count {
        atlases.push(Atlas::new(cursor.read_string()?));
    }

    let symbols_start = cursor.position();
    for _ in 0..symbol_count {
        cursor.skip(4)?;
        let frame_count = cursor.read_u32()? as usize;
        cursor.skip(frame_count.saturating_mul(FRAME_RECORD_SIZE))?;
    }

    let vert_count = cursor.read_u32()? as usize;
    if cursor.remaining() / VERT_RECORD_SIZE < vert_count {
        return Err(FormatError::UnexpectedEof {
            offset: cursor.position(),
            needed: vert_count.saturating_mul(VERT_RECORD_SIZE),
        });
    }
    let mut verts = Vec::with_capacity(vert_count);
    for _ in 0..vert_count {
        verts.push(Vert {
            x: cursor.read_f32()?,
            y: cursor.read_f32()?,
            z: cursor.read_f32()?,
            u: cursor.read_f32()?,
            v: cursor.read_f32()?,
            w: cursor.read_f32()?,
        });
    }

    let table = HashTable::read(&mut cursor)?;

    cursor.set_position(symbols_start);
    let mut symbols = Vec::new();
    for _ in 0..symbol_count {
        let symbol_name = table.resolve(cursor.read_u32()?)?.to_ascii_lowercase();
        let mut symbol = BuildSymbol::new(symbol_name);
        let frame_count = cursor.read_u32()?;
        for _ in 0..frame_count {
            symbol.frames.push(read_frame(&mut cursor)?);
        }
        symbol.sort_frames();
        symbols.push(symbol);
    }

    let build = Build {
        name,
        scale: 1.0,
        symbols,
        atlases,
        verts,
    };
    build.validate()?;

    debug!(
        build = %build.name,
        symbols = build.symbols.len(),
        verts = build.verts.len(),
        atlases = build.atlases.len(),
        "Decoded BUILD"
    );
    Ok(build)
}

fn read_frame(cursor: &mut ByteCursor<'_>) -> Result<BuildFrame> {
    Ok(BuildFrame {
        frame_num: cursor.read_u32()?,
        duration: cursor.read_u32()?,
        x: cursor.read_f32()?,
        y: cursor.read_f32()?,
        w: cursor.read_f32()?,
        h: cursor.read_f32()?,
        vert_idx: cursor.read_u32()?,
        vert_num: cursor.read_u32()?,
        image: None,
    })
}
