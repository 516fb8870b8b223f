//! String hashing and the trailing hash dictionary shared by ANIM and BUILD
//!
//! Repeated identifiers (symbol, layer, bank and event names) are stored on
//! the wire as 32-bit hashes; the file ends with a dictionary mapping each
//! hash back to its string:
//!
//! ```text
//! u32 count
//! count x (u32 hash, i32 len, len bytes)
//! ```

use hashbrown::HashMap;

use crate::cursor::{ByteCursor, ByteWriter};
use crate::error::{FormatError, Result};

/// Case-insensitive 32-bit string hash used as the dictionary key.
///
/// Each ASCII-lowercased byte `c` updates `h = c + (h << 6) + (h << 16) - h`
/// with wrapping arithmetic.
pub fn strhash(value: &str) -> u32 {
    value.bytes().fold(0u32, |h, byte| {
        u32::from(byte.to_ascii_lowercase())
            .wrapping_add(h << 6)
            .wrapping_add(h << 16)
            .wrapping_sub(h)
    })
}

/// Ordered `hash -> string` dictionary.
///
/// Entries keep first-insertion order, which is the order they are written.
/// Collisions are not detected: a later string with the same hash is ignored
/// on insert and overrides on read.
#[derive(Debug, Clone, Default)]
pub struct HashTable {
    entries: Vec<(u32, String)>,
    index: HashMap<u32, usize>,
}

impl HashTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `value` if its hash is new and return the hash
    pub fn insert(&mut self, value: &str) -> u32 {
        let hash = strhash(value);
        if !self.index.contains_key(&hash) {
            self.index.insert(hash, self.entries.len());
            self.entries.push((hash, value.to_string()));
        }
        hash
    }

    pub fn get(&self, hash: u32) -> Option<&str> {
        self.index
            .get(&hash)
            .map(|&slot| self.entries[slot].1.as_str())
    }

    /// Look up a hash, failing with [`FormatError::UnknownHash`]
    pub fn resolve(&self, hash: u32) -> Result<&str> {
        self.get(hash).ok_or(FormatError::UnknownHash(hash))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in write order
    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.entries.iter().map(|(hash, value)| (*hash, value.as_str()))
    }

    /// Read a dictionary at the cursor position
    pub fn read(cursor: &mut ByteCursor<'_>) -> Result<Self> {
        let count = cursor.read_u32()?;
        let mut table = Self::new();
        for _ in 0..count {
            let hash = cursor.read_u32()?;
            let value = cursor.read_string()?;
            match table.index.get(&hash) {
                Some(&slot) => table.entries[slot].1 = value,
                None => {
                    table.index.insert(hash, table.entries.len());
                    table.entries.push((hash, value));
                }
            }
        }
        Ok(table)
    }

    /// Append the dictionary to `writer`
    pub fn write(&self, writer: &mut ByteWriter) -> Result<()> {
        writer.write_count("hash dictionary entry", self.entries.len())?;
        for (hash, value) in &self.entries {
            writer.write_u32(*hash);
            writer.write_string(value)?;
        }
        Ok(())
    }
}
