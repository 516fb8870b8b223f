//! Facing-direction masks and their animation-name suffixes
//!
//! Each ANIM record carries one byte of direction flags. Only the
//! combinations in [`FACINGS`] have a name suffix; decode appends it to the
//! animation name and encode strips it back off.

pub const RIGHT: u8 = 1 << 0;
pub const UP: u8 = 1 << 1;
pub const LEFT: u8 = 1 << 2;
pub const DOWN: u8 = 1 << 3;
pub const UP_RIGHT: u8 = 1 << 4;
pub const UP_LEFT: u8 = 1 << 5;
pub const DOWN_RIGHT: u8 = 1 << 6;
pub const DOWN_LEFT: u8 = 1 << 7;

/// Every direction; also the mask for names without a suffix
pub const ALL: u8 = 0xFF;

/// Suffix table, longest suffixes first so matching can stop at the first hit
pub const FACINGS: [(&str, u8); 14] = [
    ("_downright", DOWN_RIGHT),
    ("_downside", DOWN_LEFT | DOWN_RIGHT),
    ("_downleft", DOWN_LEFT),
    ("_upright", UP_RIGHT),
    ("_upside", UP_LEFT | UP_RIGHT),
    ("_upleft", UP_LEFT),
    ("_right", RIGHT),
    ("_down", DOWN),
    ("_side", LEFT | RIGHT),
    ("_left", LEFT),
    ("_45s", UP_LEFT | UP_RIGHT | DOWN_LEFT | DOWN_RIGHT),
    ("_90s", UP | DOWN | LEFT | RIGHT),
    ("_up", UP),
    ("", ALL),
];

/// Name suffix for a facing mask, or `None` if the mask has no table entry
pub fn suffix_for(mask: u8) -> Option<&'static str> {
    FACINGS
        .iter()
        .find(|(_, m)| *m == mask)
        .map(|(suffix, _)| *suffix)
}

/// Split an animation name into its base name and facing mask.
///
/// Names without a recognised suffix face every direction.
pub fn split_name(name: &str) -> (&str, u8) {
    FACINGS
        .iter()
        .filter(|(suffix, _)| !suffix.is_empty())
        .find_map(|(suffix, mask)| name.strip_suffix(suffix).map(|base| (base, *mask)))
        .unwrap_or((name, ALL))
}
