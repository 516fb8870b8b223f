//! ANIM encoding

use std::cmp::Reverse;

use tracing::debug;

use super::types::{AnimFrame, Bank};
use super::{ANIM_MAGIC, ANIM_VERSION, facing};
use crate::config::AnimOptions;
use crate::cursor::ByteWriter;
use crate::error::Result;
use crate::hash::HashTable;

#[derive(Default)]
struct Totals {
    animations: usize,
    frames: usize,
    events: usize,
    elements: usize,
}

/// Encode banks with the default export depth
pub fn encode_anim(banks: &[Bank]) -> Result<Vec<u8>> {
    encode_anim_with(banks, &AnimOptions::default())
}

/// Encode banks into an ANIM buffer.
///
/// Frames are written in `idx` order and elements frontmost first; the
/// models are not required to be sorted.
pub fn encode_anim_with(banks: &[Bank], options: &AnimOptions) -> Result<Vec<u8>> {
    let mut table = HashTable::new();
    let mut body = ByteWriter::new();
    let mut totals = Totals::default();

    for bank in banks {
        let bank_hash = table.insert(&bank.name);
        for animation in &bank.animations {
            let (base_name, mask) = facing::split_name(&animation.name);
            body.write_string(base_name)?;
            body.write_u8(mask);
            body.write_u32(bank_hash);
            body.write_f32(animation.frame_rate);
            body.write_count("frame", animation.frames.len())?;

            let mut frames: Vec<&AnimFrame> = animation.frames.iter().collect();
            frames.sort_by_key(|f| f.idx);
            for frame in frames {
                write_frame(&mut body, &mut table, frame, options.export_depth, &mut totals)?;
            }
            totals.animations += 1;
        }
    }

    let mut out = ByteWriter::with_capacity(body.position() + 24);
    out.write_bytes(ANIM_MAGIC);
    out.write_i32(ANIM_VERSION);
    out.write_count("element", totals.elements)?;
    out.write_count("frame", totals.frames)?;
    out.write_count("event", totals.events)?;
    out.write_count("animation", totals.animations)?;
    out.write_bytes(&body.into_inner());
    table.write(&mut out)?;

    debug!(
        banks = banks.len(),
        animations = totals.animations,
        strings = table.len(),
        "Encoded ANIM"
    );
    Ok(out.into_inner())
}

fn write_frame(
    body: &mut ByteWriter,
    table: &mut HashTable,
    frame: &AnimFrame,
    depth: f32,
    totals: &mut Totals,
) -> Result<()> {
    body.write_f32(frame.x);
    body.write_f32(frame.y);
    body.write_f32(frame.w);
    body.write_f32(frame.h);

    body.write_count("event", frame.events.len())?;
    for event in &frame.events {
        body.write_u32(table.insert(event));
    }

    let mut elements: Vec<_> = frame.elements.iter().collect();
    elements.sort_by_key(|e| Reverse(e.z_index));
    let count = elements.len();
    body.write_count("element", count)?;
    for (k, element) in elements.into_iter().enumerate() {
        // Dense rank from the back: the frontmost element gets the largest z
        let rank = count - 1 - k;
        let z = rank as f32 / count as f32 * depth - depth * 10.0;

        body.write_u32(table.insert(&element.symbol.to_ascii_lowercase()));
        body.write_u32(element.frame);
        body.write_u32(table.insert(&element.layer_name.to_ascii_lowercase()));
        let m = &element.matrix;
        for value in [m.a, m.b, m.c, m.d, m.tx, m.ty, z] {
            body.write_f32(value);
        }
    }

    totals.frames += 1;
    totals.events += frame.events.len();
    totals.elements += count;
    Ok(())
}
