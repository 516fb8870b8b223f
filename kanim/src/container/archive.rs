//! DYN archives: a zip of atlas textures, optionally obfuscated

use std::io::{Cursor, Read, Write};

use ktex::Ktex;
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

use super::cipher::{dyn_decode, dyn_encode};
use crate::error::Result;

/// Decoded contents of one archive entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EntryData {
    /// A `.tex` entry
    Texture(Ktex),
    /// Anything else, kept as stored
    Raw(Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub data: EntryData,
}

/// Entries of a DYN container, in archive order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynArchive {
    pub entries: Vec<ArchiveEntry>,
}

impl DynArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_texture(&mut self, name: impl Into<String>, texture: Ktex) {
        self.entries.push(ArchiveEntry {
            name: name.into(),
            data: EntryData::Texture(texture),
        });
    }

    pub fn push_raw(&mut self, name: impl Into<String>, bytes: Vec<u8>) {
        self.entries.push(ArchiveEntry {
            name: name.into(),
            data: EntryData::Raw(bytes),
        });
    }

    pub fn get(&self, name: &str) -> Option<&EntryData> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.data)
    }

    /// Texture entries with their names
    pub fn textures(&self) -> impl Iterator<Item = (&str, &Ktex)> {
        self.entries.iter().filter_map(|e| match &e.data {
            EntryData::Texture(tex) => Some((e.name.as_str(), tex)),
            EntryData::Raw(_) => None,
        })
    }

    /// Read a DYN buffer, obfuscated or plain zip
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        let plain = dyn_decode(data);
        let mut archive = ZipArchive::new(Cursor::new(plain.as_slice()))?;

        let mut entries = Vec::with_capacity(archive.len());
        for i in 0..archive.len() {
            let mut file = archive.by_index(i)?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut bytes = Vec::new();
            file.read_to_end(&mut bytes)?;

            let data = if is_texture_name(&name) {
                EntryData::Texture(Ktex::decode(&bytes)?)
            } else {
                EntryData::Raw(bytes)
            };
            entries.push(ArchiveEntry { name, data });
        }

        debug!(entries = entries.len(), "Read DYN archive");
        Ok(Self { entries })
    }

    /// Write the entries as a deflated zip, obfuscated when `obfuscate` is set
    pub fn to_bytes(&self, obfuscate: bool) -> Result<Vec<u8>> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            zip.start_file(entry.name.as_str(), options)?;
            match &entry.data {
                EntryData::Texture(tex) => zip.write_all(&tex.encode()?)?,
                EntryData::Raw(bytes) => zip.write_all(bytes)?,
            }
        }
        let plain = zip.finish()?.into_inner();

        debug!(entries = self.entries.len(), obfuscate, "Wrote DYN archive");
        Ok(if obfuscate { dyn_encode(&plain) } else { plain })
    }
}

fn is_texture_name(name: &str) -> bool {
    name.to_ascii_lowercase().ends_with(".tex")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FormatError;

    #[test]
    fn test_texture_name() {
        assert!(is_texture_name("atlas-0.tex"));
        assert!(is_texture_name("ANIM/ATLAS-1.TEX"));
        assert!(!is_texture_name("build.bin"));
        assert!(!is_texture_name("tex"));
    }

    #[test]
    fn test_raw_entries_round_trip() {
        let mut archive = DynArchive::new();
        archive.push_raw("build.bin", b"BILD....".to_vec());
        archive.push_raw("notes.txt", Vec::new());

        for obfuscate in [false, true] {
            let bytes = archive.to_bytes(obfuscate).unwrap();
            assert_eq!(bytes.starts_with(b"PK"), !obfuscate);
            assert_eq!(DynArchive::from_bytes(&bytes).unwrap(), archive);
        }
    }

    #[test]
    fn test_garbage_is_an_archive_error() {
        assert!(matches!(
            DynArchive::from_bytes(b"PK not really a zip"),
            Err(FormatError::Archive(_))
        ));
    }
}
