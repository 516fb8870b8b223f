//! Shared helpers for integration tests

use image::{Rgba, RgbaImage};

/// Route `tracing` output to the test harness. Safe to call from every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Sprite with transparent padding around a solid core and a soft edge
#[allow(dead_code)]
pub fn padded_sprite(size: u32, color: [u8; 3]) -> RgbaImage {
    let inset = size / 4;
    RgbaImage::from_fn(size, size, |x, y| {
        let inside = |v: u32| v >= inset && v < size - inset;
        if inside(x) && inside(y) {
            Rgba([color[0], color[1], color[2], 255])
        } else if inside(x) && y == size - inset {
            Rgba([color[0], color[1], color[2], 128])
        } else {
            Rgba([0, 0, 0, 0])
        }
    })
}
