//! Earth Engine expression graphs.
//!
//! Computations are described as a tree of function invocations and
//! serialized into the REST API's `Expression` format:
//!
//! ```json
//! {"result": "0", "values": {"0": {"functionInvocationValue": {...}}}}
//! ```

use std::collections::BTreeMap;

use serde_json::{json, Map, Value};

use geo_common::RegionOfInterest;

/// Pixel reducer applied by `Image.reduceRegion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reducer {
    Mean,
}

impl Reducer {
    pub fn function_name(self) -> &'static str {
        match self {
            Reducer::Mean => "Reducer.mean",
        }
    }
}

/// Options for a region reduction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReduceOptions {
    pub reducer: Reducer,
    /// Nominal scale in meters.
    pub scale: f64,
    pub max_pixels: f64,
    /// Approximate instead of failing when `max_pixels` would be exceeded.
    pub best_effort: bool,
}

/// A node in an expression graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Constant(Value),
    Invocation {
        function: String,
        args: BTreeMap<String, Expr>,
    },
}

impl Expr {
    pub fn constant(value: impl Into<Value>) -> Self {
        Expr::Constant(value.into())
    }

    pub fn call<'a>(function: &str, args: impl IntoIterator<Item = (&'a str, Expr)>) -> Self {
        Expr::Invocation {
            function: function.to_string(),
            args: args
                .into_iter()
                .map(|(name, expr)| (name.to_string(), expr))
                .collect(),
        }
    }

    // === Constructors ===

    pub fn image_collection(id: &str) -> Self {
        Self::call("ImageCollection.load", [("id", Self::constant(id))])
    }

    pub fn image(id: &str) -> Self {
        Self::call("Image.load", [("id", Self::constant(id))])
    }

    /// Planar polygon for a region of interest.
    pub fn geometry(roi: &RegionOfInterest) -> Self {
        let ring: Vec<Value> = roi.ring().iter().map(|p| json!(p)).collect();
        Self::call(
            "GeometryConstructors.Polygon",
            [
                ("coordinates", Self::constant(json!([ring]))),
                ("geodesic", Self::constant(false)),
            ],
        )
    }

    // === Collection operations ===

    /// Keep images whose `system:time_start` lies in `[start, end)`.
    pub fn filter_date(self, start: &str, end: &str) -> Self {
        let range = Self::call(
            "DateRange",
            [("start", Self::constant(start)), ("end", Self::constant(end))],
        );
        let filter = Self::call(
            "Filter.dateRangeContains",
            [
                ("leftValue", range),
                ("rightField", Self::constant("system:time_start")),
            ],
        );
        Self::call("Collection.filter", [("collection", self), ("filter", filter)])
    }

    pub fn mosaic(self) -> Self {
        Self::call("ImageCollection.mosaic", [("collection", self)])
    }

    // === Image operations ===

    pub fn select(self, band: &str) -> Self {
        Self::call(
            "Image.select",
            [
                ("input", self),
                ("bandSelectors", Self::constant(json!([band]))),
            ],
        )
    }

    pub fn remap(self, from: &[u8], to: &[u8]) -> Self {
        Self::call(
            "Image.remap",
            [
                ("image", self),
                ("from", Self::constant(json!(from))),
                ("to", Self::constant(json!(to))),
            ],
        )
    }

    pub fn rename(self, name: &str) -> Self {
        Self::call(
            "Image.rename",
            [("input", self), ("names", Self::constant(json!([name])))],
        )
    }

    pub fn clip(self, roi: &RegionOfInterest) -> Self {
        Self::call(
            "Image.clip",
            [("input", self), ("geometry", Self::geometry(roi))],
        )
    }

    pub fn reduce_region(self, roi: &RegionOfInterest, options: &ReduceOptions) -> Self {
        Self::call(
            "Image.reduceRegion",
            [
                ("image", self),
                (
                    "reducer",
                    Self::call(
                        options.reducer.function_name(),
                        std::iter::empty::<(&str, Expr)>(),
                    ),
                ),
                ("geometry", Self::geometry(roi)),
                ("scale", Self::constant(options.scale)),
                ("maxPixels", Self::constant(options.max_pixels)),
                ("bestEffort", Self::constant(options.best_effort)),
            ],
        )
    }

    // === Serialization ===

    /// Serialize this node as a `ValueNode`.
    pub fn to_node(&self) -> Value {
        match self {
            Expr::Constant(value) => json!({ "constantValue": value }),
            Expr::Invocation { function, args } => {
                let arguments: Map<String, Value> = args
                    .iter()
                    .map(|(name, expr)| (name.clone(), expr.to_node()))
                    .collect();
                json!({
                    "functionInvocationValue": {
                        "functionName": function,
                        "arguments": arguments,
                    }
                })
            }
        }
    }

    /// Serialize as a complete `Expression` with this node as the result.
    pub fn to_graph(&self) -> Value {
        json!({
            "result": "0",
            "values": { "0": self.to_node() },
        })
    }
}
