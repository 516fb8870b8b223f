mod common;

use image::{Rgba, RgbaImage};
use kanim::container::EntryData;
use kanim::ktex::{Ktex, PixelFormat};
use kanim::{DynArchive, TextureOptions, dyn_decode, dyn_encode};

fn raw_texture(seed: u8) -> Ktex {
    let image = RgbaImage::from_fn(16, 8, |x, y| {
        Rgba([seed, (x * 16) as u8, (y * 32) as u8, 255])
    });
    let options = TextureOptions {
        pixel_format: PixelFormat::Rgba,
        premultiply: false,
        ..Default::default()
    };
    Ktex::from_image_with(&image, &options).expect("encode texture")
}

#[test]
fn test_textures_survive_obfuscated_archive() {
    common::init_tracing();
    let mut archive = DynArchive::new();
    archive.push_texture("atlas-0.tex", raw_texture(10));
    archive.push_texture("atlas-1.tex", raw_texture(20));
    archive.push_raw("build.bin", b"BILD".to_vec());

    let bytes = archive.to_bytes(true).expect("write");
    let read = DynArchive::from_bytes(&bytes).expect("read");
    assert_eq!(read, archive);

    let names: Vec<&str> = read.textures().map(|(name, _)| name).collect();
    assert_eq!(names, ["atlas-0.tex", "atlas-1.tex"]);
    assert!(matches!(read.get("build.bin"), Some(EntryData::Raw(b)) if b == b"BILD"));
}

#[test]
fn test_plain_zip_is_accepted() {
    let mut archive = DynArchive::new();
    archive.push_texture("atlas-0.tex", raw_texture(99));

    let plain = archive.to_bytes(false).expect("write");
    assert!(plain.starts_with(b"PK"));
    assert_eq!(dyn_decode(&plain), plain);
    assert_eq!(DynArchive::from_bytes(&plain).expect("read"), archive);

    // Obfuscating by hand is the same as asking the writer to
    let obfuscated = dyn_encode(&plain);
    assert_eq!(obfuscated, archive.to_bytes(true).expect("write"));
    assert_eq!(DynArchive::from_bytes(&obfuscated).expect("read"), archive);
}
