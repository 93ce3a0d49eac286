//! Raster-to-image conversion.
//!
//! Bands are rescaled linearly into `0..=255` against the largest value
//! observed across all bands of the input, not a fixed data range. Two
//! exports of different regions can therefore map the same raw value to
//! different output intensities.

use std::path::Path;

use rayon::prelude::*;

use crate::error::{RenderError, RenderResult};
use crate::geotiff::{read_bands, BandStack};
use crate::png::{create_png_auto, PixelFormat};

/// Largest finite value across all bands.
pub fn observed_max(stack: &BandStack) -> f64 {
    stack
        .bands
        .iter()
        .flatten()
        .copied()
        .filter(|v| v.is_finite())
        .fold(0.0, f64::max)
}

/// Rescale a band-major stack into pixel-major 8-bit samples.
///
/// Output sample `[pixel * bands + band]` is `round(value / max * 255)`,
/// clamped to `0..=255`. A stack whose maximum is not positive encodes as
/// all zeros.
pub fn rescale_to_pixel_major(stack: &BandStack) -> RenderResult<Vec<u8>> {
    stack.check_shape()?;

    let max = observed_max(stack);
    let band_count = stack.bands.len();
    let mut out = vec![0u8; stack.width * stack.height * band_count];

    if max <= 0.0 {
        return Ok(out);
    }

    out.par_chunks_mut(band_count)
        .enumerate()
        .for_each(|(pixel, samples)| {
            for (band, sample) in samples.iter_mut().enumerate() {
                *sample = scale_sample(stack.bands[band][pixel], max);
            }
        });

    Ok(out)
}

#[inline]
fn scale_sample(value: f64, max: f64) -> u8 {
    if !value.is_finite() {
        return 0;
    }
    (value / max * 255.0).round().clamp(0.0, 255.0) as u8
}

/// Encode a 3- or 4-band stack as PNG after rescaling.
pub fn stack_to_png(stack: &BandStack) -> RenderResult<Vec<u8>> {
    let format = match stack.bands.len() {
        3 => PixelFormat::Rgb,
        4 => PixelFormat::Rgba,
        n => {
            return Err(RenderError::ShapeMismatch(format!(
                "expected 3 or 4 bands for a color image, found {}",
                n
            )));
        }
    };

    let pixels = rescale_to_pixel_major(stack)?;
    create_png_auto(&pixels, stack.width, stack.height, format)
}

/// Read a GeoTIFF from `src` and write the rescaled PNG to `dst`.
pub fn convert_geotiff_to_png(src: &Path, dst: &Path) -> RenderResult<()> {
    let stack = read_bands(src)?;
    let png = stack_to_png(&stack)?;
    std::fs::write(dst, png)?;

    tracing::debug!(src = %src.display(), dst = %dst.display(), "Converted raster to PNG");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stack(bands: Vec<Vec<f64>>, width: usize, height: usize) -> BandStack {
        BandStack {
            width,
            height,
            bands,
        }
    }

    #[test]
    fn test_rescale_uses_observed_max() {
        // 3 bands, 2 pixels, M = 200
        let s = stack(
            vec![vec![0.0, 200.0], vec![100.0, 50.0], vec![10.0, 199.0]],
            2,
            1,
        );
        let out = rescale_to_pixel_major(&s).unwrap();
        let expected: Vec<u8> = [0.0, 100.0, 10.0, 200.0, 50.0, 199.0]
            .iter()
            .map(|v: &f64| (v / 200.0 * 255.0).round() as u8)
            .collect();
        assert_eq!(out, expected);
        assert_eq!(out[3], 255);
    }

    #[test]
    fn test_rescale_all_zero() {
        let s = stack(vec![vec![0.0; 4]; 3], 2, 2);
        assert_eq!(rescale_to_pixel_major(&s).unwrap(), vec![0u8; 12]);
    }

    #[test]
    fn test_rescale_shape_mismatch() {
        let s = stack(vec![vec![1.0; 4], vec![1.0; 3], vec![1.0; 4]], 2, 2);
        assert!(matches!(
            rescale_to_pixel_major(&s),
            Err(RenderError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_stack_to_png_requires_color_bands() {
        let s = stack(vec![vec![1.0; 4]; 2], 2, 2);
        assert!(stack_to_png(&s).is_err());
    }

    #[test]
    fn test_stack_to_png_signature() {
        let s = stack(vec![vec![1.0, 2.0, 3.0, 4.0]; 3], 2, 2);
        let png = stack_to_png(&s).unwrap();
        assert_eq!(&png[0..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
    }
}
