//! Common test fixtures.

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use geo_common::{BoundingBox, RegionOfInterest};

/// Common bounding box definitions for testing, as `[west, south, east, north]`.
pub mod bbox {
    /// Small box straddling the equator and prime meridian.
    pub const ORIGIN: [f64; 4] = [-1.0, -1.0, 1.0, 1.0];

    /// Central Nairobi.
    pub const NAIROBI: [f64; 4] = [36.70, -1.35, 36.95, -1.20];

    /// A few city blocks in Lisbon.
    pub const LISBON_BLOCKS: [f64; 4] = [-9.145, 38.705, -9.135, 38.715];

    /// West greater than east.
    pub const REVERSED: [f64; 4] = [10.0, 0.0, 5.0, 5.0];

    /// Zero-area box.
    pub const POINT: [f64; 4] = [0.0, 0.0, 0.0, 0.0];

    /// Latitude beyond the pole.
    pub const OUT_OF_RANGE: [f64; 4] = [0.0, 0.0, 1.0, 95.0];
}

/// Build a validated region from a fixture array.
///
/// Panics if the fixture is invalid, which only makes sense in tests.
pub fn roi(values: [f64; 4]) -> RegionOfInterest {
    let bbox = BoundingBox::from_slice(&values).expect("fixture has four values");
    RegionOfInterest::from_bbox(bbox).expect("fixture is a valid region")
}

/// A temporary static directory with an empty `exports/` subdirectory.
///
/// The directory is removed when the returned guard is dropped.
pub struct StaticDir {
    dir: TempDir,
}

impl StaticDir {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().expect("create temp static dir");
        fs::create_dir_all(dir.path().join("exports")).expect("create exports dir");
        Self { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    pub fn exports(&self) -> PathBuf {
        self.dir.path().join("exports")
    }

    /// Names of the files currently in `exports/`, sorted.
    pub fn exported_files(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.exports())
            .expect("read exports dir")
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

impl Default for StaticDir {
    fn default() -> Self {
        Self::new()
    }
}
