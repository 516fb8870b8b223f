//! ANIM decoding

use hashbrown::HashMap;
use tracing::{debug, warn};

use super::types::{Affine, AnimElement, AnimFrame, Animation, Bank};
use super::{ANIM_MAGIC, ANIM_VERSION, ELEMENT_RECORD_SIZE, facing};
use crate::cursor::ByteCursor;
use crate::error::Result;
use crate::hash::HashTable;

/// Decode an ANIM buffer into banks.
///
/// Animations are grouped by bank in first-seen order. Element `z_index`
/// values are dense, with the first element in the file frontmost.
pub fn decode_anim(data: &[u8]) -> Result<Vec<Bank>> {
    let mut cursor = ByteCursor::new(data);
    cursor.expect_magic(ANIM_MAGIC)?;
    let version = cursor.read_i32()?;
    if version != ANIM_VERSION {
        warn!(version, expected = ANIM_VERSION, "Unexpected ANIM version");
    }
    let _element_count = cursor.read_u32()?;
    let _frame_count = cursor.read_u32()?;
    let _event_count = cursor.read_u32()?;
    let animation_count = cursor.read_u32()?;
    let records_start = cursor.position();

    skip_animations(&mut cursor, animation_count)?;
    let table = HashTable::read(&mut cursor)?;

    cursor.set_position(records_start);
    let mut banks: Vec<Bank> = Vec::new();
    let mut bank_slots: HashMap<u32, usize> = HashMap::new();
    for _ in 0..animation_count {
        let (bank_hash, animation) = read_animation(&mut cursor, &table)?;
        let slot = match bank_slots.get(&bank_hash) {
            Some(&slot) => slot,
            None => {
                banks.push(Bank::new(table.resolve(bank_hash)?));
                bank_slots.insert(bank_hash, banks.len() - 1);
                banks.len() - 1
            }
        };
        banks[slot].animations.push(animation);
    }

    debug!(
        banks = banks.len(),
        animations = animation_count,
        strings = table.len(),
        "Decoded ANIM"
    );
    Ok(banks)
}

/// Walk the animation records using only their length fields
fn skip_animations(cursor: &mut ByteCursor<'_>, count: u32) -> Result<()> {
    for _ in 0..count {
        cursor.skip_string()?;
        // facing, bank hash, frame rate
        cursor.skip(1 + 4 + 4)?;
        let frame_count = cursor.read_u32()?;
        for _ in 0..frame_count {
            cursor.skip(16)?;
            let event_count = cursor.read_u32()? as usize;
            cursor.skip(event_count.saturating_mul(4))?;
            let element_count = cursor.read_u32()? as usize;
            cursor.skip(element_count.saturating_mul(ELEMENT_RECORD_SIZE))?;
        }
    }
    Ok(())
}

fn read_animation(cursor: &mut ByteCursor<'_>, table: &HashTable) -> Result<(u32, Animation)> {
    let base_name = cursor.read_string()?;
    let mask = cursor.read_u8()?;
    let bank_hash = cursor.read_u32()?;
    let frame_rate = cursor.read_f32()?;
    let frame_count = cursor.read_u32()?;

    let suffix = facing::suffix_for(mask).unwrap_or_else(|| {
        warn!(animation = %base_name, mask, "Facing mask has no name suffix");
        ""
    });

    let mut animation = Animation::new(format!("{base_name}{suffix}"), frame_rate);
    for idx in 0..frame_count {
        animation.frames.push(read_frame(cursor, table, idx)?);
    }
    Ok((bank_hash, animation))
}

fn read_frame(cursor: &mut ByteCursor<'_>, table: &HashTable, idx: u32) -> Result<AnimFrame> {
    let x = cursor.read_f32()?;
    let y = cursor.read_f32()?;
    let w = cursor.read_f32()?;
    let h = cursor.read_f32()?;

    let event_count = cursor.read_u32()?;
    let mut events = Vec::new();
    for _ in 0..event_count {
        events.push(table.resolve(cursor.read_u32()?)?.to_string());
    }

    let element_count = cursor.read_u32()?;
    let mut elements = Vec::new();
    for i in 0..element_count {
        let symbol = table.resolve(cursor.read_u32()?)?.to_ascii_lowercase();
        let frame = cursor.read_u32()?;
        let layer_name = table.resolve(cursor.read_u32()?)?.to_ascii_lowercase();
        let matrix = Affine {
            a: cursor.read_f32()?,
            b: cursor.read_f32()?,
            c: cursor.read_f32()?,
            d: cursor.read_f32()?,
            tx: cursor.read_f32()?,
            ty: cursor.read_f32()?,
        };
        // Draw order comes from record order; the stored z is not needed
        let _z = cursor.read_f32()?;
        elements.push(AnimElement {
            z_index: element_count - 1 - i,
            symbol,
            frame,
            layer_name,
            matrix,
        });
    }
    elements.reverse();

    Ok(AnimFrame {
        idx,
        x,
        y,
        w,
        h,
        events,
        elements,
    })
}
