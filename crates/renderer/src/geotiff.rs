//! GeoTIFF reading and writing.
//!
//! Written files are 8-bit RGB, georeferenced in EPSG:4326 through the
//! ModelPixelScale / ModelTiepoint / GeoKeyDirectory tags. Reading accepts
//! any integer or float sample type and returns the bands de-interleaved.

use std::fs::File;
use std::io::{BufReader, Cursor, Read, Seek};
use std::path::Path;

use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::{colortype, TiffEncoder};
use tiff::tags::Tag;
use tiff::ColorType;

use geo_common::BoundingBox;

use crate::error::{RenderError, RenderResult};

/// GeoKey directory: header + GTModelType=Geographic, GTRasterType=PixelIsArea,
/// GeographicType=EPSG:4326.
const GEO_KEYS_WGS84: [u16; 16] = [
    1, 1, 0, 3, // version, revision, minor, key count
    1024, 0, 1, 2, // GTModelTypeGeoKey = ModelTypeGeographic
    1025, 0, 1, 1, // GTRasterTypeGeoKey = RasterPixelIsArea
    2048, 0, 1, 4326, // GeographicTypeGeoKey = WGS 84
];

/// A multi-band raster held band-major: `bands[b][row * width + col]`.
#[derive(Debug, Clone, PartialEq)]
pub struct BandStack {
    pub width: usize,
    pub height: usize,
    pub bands: Vec<Vec<f64>>,
}

impl BandStack {
    pub fn check_shape(&self) -> RenderResult<()> {
        if self.bands.is_empty() {
            return Err(RenderError::EmptyRaster("no bands".to_string()));
        }
        let expected = self.width * self.height;
        if expected == 0 {
            return Err(RenderError::EmptyRaster(format!(
                "{}x{} raster",
                self.width, self.height
            )));
        }
        for (i, band) in self.bands.iter().enumerate() {
            if band.len() != expected {
                return Err(RenderError::ShapeMismatch(format!(
                    "band {} has {} values, expected {}",
                    i,
                    band.len(),
                    expected
                )));
            }
        }
        Ok(())
    }
}

/// Write interleaved RGB pixels as a georeferenced TIFF covering `bbox`.
pub fn write_rgb_geotiff(
    path: &Path,
    rgb: &[u8],
    width: usize,
    height: usize,
    bbox: &BoundingBox,
) -> RenderResult<()> {
    if rgb.len() != width * height * 3 {
        return Err(RenderError::ShapeMismatch(format!(
            "{} bytes for a {}x{} RGB raster",
            rgb.len(),
            width,
            height
        )));
    }

    let pixel_scale = [
        bbox.width() / width as f64,
        bbox.height() / height as f64,
        0.0,
    ];
    // Raster (0, 0) anchored at the north-west corner.
    let tiepoint = [0.0, 0.0, 0.0, bbox.west, bbox.north, 0.0];

    let mut file = File::create(path)?;
    let mut tiff = TiffEncoder::new(&mut file)?;
    let mut image = tiff.new_image::<colortype::RGB8>(width as u32, height as u32)?;
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &pixel_scale[..])?;
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &tiepoint[..])?;
    image
        .encoder()
        .write_tag(Tag::GeoKeyDirectoryTag, &GEO_KEYS_WGS84[..])?;
    image.write_data(rgb)?;

    tracing::debug!(path = %path.display(), width, height, "Wrote GeoTIFF");
    Ok(())
}

/// Read every band of a TIFF file.
pub fn read_bands(path: &Path) -> RenderResult<BandStack> {
    let file = File::open(path)?;
    read_bands_from(BufReader::new(file))
}

/// Read every band of an in-memory TIFF (e.g. a service response body).
pub fn read_bands_from_bytes(bytes: &[u8]) -> RenderResult<BandStack> {
    read_bands_from(Cursor::new(bytes))
}

fn read_bands_from<R: Read + Seek>(reader: R) -> RenderResult<BandStack> {
    let mut decoder = Decoder::new(reader)?;
    let (width, height) = decoder.dimensions()?;
    let (width, height) = (width as usize, height as usize);

    let samples = match decoder.colortype()? {
        ColorType::Gray(_) => 1,
        ColorType::GrayA(_) => 2,
        ColorType::RGB(_) => 3,
        ColorType::RGBA(_) => 4,
        ColorType::Multiband { num_samples, .. } => num_samples as usize,
        other => {
            return Err(RenderError::UnsupportedSampleFormat(format!("{:?}", other)));
        }
    };

    let interleaved: Vec<f64> = match decoder.read_image()? {
        DecodingResult::U8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::U32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I8(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I16(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::I32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F32(buf) => buf.into_iter().map(f64::from).collect(),
        DecodingResult::F64(buf) => buf,
        _ => {
            return Err(RenderError::UnsupportedSampleFormat(
                "64-bit integer or half-float samples".to_string(),
            ));
        }
    };

    deinterleave(&interleaved, width, height, samples)
}

/// Split pixel-major samples into one vector per band.
pub fn deinterleave(
    interleaved: &[f64],
    width: usize,
    height: usize,
    samples: usize,
) -> RenderResult<BandStack> {
    if samples == 0 || interleaved.len() != width * height * samples {
        return Err(RenderError::ShapeMismatch(format!(
            "{} samples for {}x{} pixels with {} bands",
            interleaved.len(),
            width,
            height,
            samples
        )));
    }

    let mut bands = vec![Vec::with_capacity(width * height); samples];
    for pixel in interleaved.chunks_exact(samples) {
        for (band, &value) in bands.iter_mut().zip(pixel) {
            band.push(value);
        }
    }

    Ok(BandStack {
        width,
        height,
        bands,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deinterleave() {
        let stack = deinterleave(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 1, 3).unwrap();
        assert_eq!(stack.bands, vec![vec![1.0, 4.0], vec![2.0, 5.0], vec![3.0, 6.0]]);
    }

    #[test]
    fn test_deinterleave_shape_mismatch() {
        assert!(matches!(
            deinterleave(&[1.0, 2.0], 2, 1, 3),
            Err(RenderError::ShapeMismatch(_))
        ));
    }

    #[test]
    fn test_geotiff_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lc.tif");
        let rgb = vec![10, 20, 30, 40, 50, 60, 70, 80, 90, 100, 110, 120];
        let bbox = BoundingBox::new(-1.0, -1.0, 1.0, 1.0);

        write_rgb_geotiff(&path, &rgb, 2, 2, &bbox).unwrap();
        let stack = read_bands(&path).unwrap();

        assert_eq!((stack.width, stack.height), (2, 2));
        assert_eq!(stack.bands.len(), 3);
        assert_eq!(stack.bands[0], vec![10.0, 40.0, 70.0, 100.0]);
        assert_eq!(stack.bands[2], vec![30.0, 60.0, 90.0, 120.0]);
    }

    #[test]
    fn test_read_garbage_fails() {
        assert!(read_bands_from_bytes(b"definitely not a tiff").is_err());
    }
}
