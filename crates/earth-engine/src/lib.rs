//! Earth Engine access for the urban insight service.
//!
//! Expressions are built with [`expr::Expr`] and evaluated through the REST
//! API by [`client::EarthEngineClient`]. The request pipeline only sees the
//! [`GeoDataService`] trait so it can run against a mock in tests.

pub mod client;
pub mod config;
pub mod error;
pub mod expr;
pub mod grid;
pub mod service;

pub use client::{EarthEngineClient, ImageAsset};
pub use config::{DatasetConfig, EarthEngineConfig};
pub use error::{EeError, EeResult};
pub use expr::{Expr, ReduceOptions, Reducer};
pub use grid::PixelGrid;
pub use service::{
    require_values, EarthEngineService, GeoDataService, SnapshotStats, StatLayer, STAT_REDUCER,
};
