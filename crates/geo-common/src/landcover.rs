//! Land-cover class table.
//!
//! The source dataset (ESRI 10m annual LULC) uses sparse class codes. They are
//! remapped onto a dense `1..=9` range before export and each dense class has
//! a fixed display color.

/// Sparse class codes in the source dataset.
pub const SOURCE_CLASSES: [u8; 9] = [1, 2, 4, 5, 7, 8, 9, 10, 11];

/// Dense class codes, positionally paired with [`SOURCE_CLASSES`].
pub const DENSE_CLASSES: [u8; 9] = [1, 2, 3, 4, 5, 6, 7, 8, 9];

/// A dense land-cover class and its display color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandCoverClass {
    pub value: u8,
    pub name: &'static str,
    pub color: &'static str,
}

pub const LANDCOVER_CLASSES: [LandCoverClass; 9] = [
    LandCoverClass { value: 1, name: "Water", color: "#1A5BAB" },
    LandCoverClass { value: 2, name: "Trees", color: "#358221" },
    LandCoverClass { value: 3, name: "Flooded Vegetation", color: "#87D19E" },
    LandCoverClass { value: 4, name: "Crops", color: "#FFDB5C" },
    LandCoverClass { value: 5, name: "Built Area", color: "#ED022A" },
    LandCoverClass { value: 6, name: "Bare Ground", color: "#EDE9E4" },
    LandCoverClass { value: 7, name: "Snow/Ice", color: "#F2FAFF" },
    LandCoverClass { value: 8, name: "Clouds", color: "#C8C8C8" },
    LandCoverClass { value: 9, name: "Rangeland", color: "#C6AD8D" },
];

/// Map a source class code to its dense class. Unknown codes have no mapping.
pub fn remap_class(source: u8) -> Option<u8> {
    SOURCE_CLASSES
        .iter()
        .position(|&c| c == source)
        .map(|i| DENSE_CLASSES[i])
}

/// RGB color for a dense class value.
pub fn class_color(value: u8) -> Option<(u8, u8, u8)> {
    LANDCOVER_CLASSES
        .iter()
        .find(|c| c.value == value)
        .and_then(|c| hex_to_rgb(c.color))
}

/// Parse `#RRGGBB` (leading `#` optional).
pub fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 {
        return None;
    }

    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}
