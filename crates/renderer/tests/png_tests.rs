//! Tests for PNG encoding functionality.
//!
//! Tests the indexed and truecolor PNG encoders, including format selection
//! for land-cover-like images.

use renderer::png::{create_png, create_png_auto, PixelFormat};

// ============================================================================
// Helper functions
// ============================================================================

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Color type byte from the IHDR chunk.
fn color_type(png: &[u8]) -> u8 {
    // signature (8) + length (4) + "IHDR" (4) + width (4) + height (4) + depth (1)
    png[25]
}

/// Generate land-cover-like RGB pixels using the nine class colors.
fn generate_landcover_pixels(width: usize, height: usize) -> Vec<u8> {
    let colors = geo_common::LANDCOVER_CLASSES
        .iter()
        .map(|c| geo_common::landcover::hex_to_rgb(c.color).unwrap())
        .collect::<Vec<_>>();

    let mut pixels = Vec::with_capacity(width * height * 3);
    for y in 0..height {
        for x in 0..width {
            let (r, g, b) = colors[(x / 4 + y / 4) % colors.len()];
            pixels.extend_from_slice(&[r, g, b]);
        }
    }
    pixels
}

// ============================================================================
// Basic PNG creation tests
// ============================================================================

#[test]
fn test_create_png_rgb() {
    let pixels = [
        255, 0, 0, // red
        0, 255, 0, // green
        0, 0, 255, // blue
        255, 255, 0, // yellow
    ];

    let png = create_png(&pixels, 2, 2, PixelFormat::Rgb).unwrap();
    assert_eq!(&png[0..8], &PNG_SIGNATURE);
    assert_eq!(color_type(&png), 2);
}

#[test]
fn test_create_png_rgba() {
    let pixels = [
        255, 0, 0, 255, // red, opaque
        0, 0, 0, 0, // transparent
        0, 255, 0, 128, // green, semi-transparent
        0, 0, 255, 255, // blue, opaque
    ];

    let png = create_png(&pixels, 2, 2, PixelFormat::Rgba).unwrap();
    assert_eq!(&png[0..8], &PNG_SIGNATURE);
    assert_eq!(color_type(&png), 6);
}

#[test]
fn test_ihdr_dimensions() {
    let pixels = vec![0u8; 7 * 3 * 3];
    let png = create_png(&pixels, 7, 3, PixelFormat::Rgb).unwrap();

    let width = u32::from_be_bytes([png[16], png[17], png[18], png[19]]);
    let height = u32::from_be_bytes([png[20], png[21], png[22], png[23]]);
    assert_eq!((width, height), (7, 3));
}

// ============================================================================
// Auto format selection
// ============================================================================

#[test]
fn test_auto_selects_indexed_for_landcover() {
    let pixels = generate_landcover_pixels(64, 64);
    let png = create_png_auto(&pixels, 64, 64, PixelFormat::Rgb).unwrap();
    assert_eq!(color_type(&png), 3);

    let truecolor = create_png(&pixels, 64, 64, PixelFormat::Rgb).unwrap();
    assert!(png.len() <= truecolor.len());
}

#[test]
fn test_auto_falls_back_to_truecolor() {
    let mut pixels = Vec::with_capacity(300 * 3);
    for i in 0..300u32 {
        pixels.extend_from_slice(&[(i % 256) as u8, (i / 256) as u8, 7]);
    }

    let png = create_png_auto(&pixels, 300, 1, PixelFormat::Rgb).unwrap();
    assert_eq!(color_type(&png), 2);
}

#[test]
fn test_auto_rejects_short_buffer() {
    assert!(create_png_auto(&[0u8; 10], 2, 2, PixelFormat::Rgb).is_err());
}
