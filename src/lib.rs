//! Procedural city generation library
//!
//! Grows a highway network over a terrain sampler, scatters towers over a
//! validity grid, and emits per-instance transforms for a renderer.

pub mod buildings;
pub mod city;
pub mod config;
pub mod error;
pub mod export;
pub mod geometry;
pub mod grid;
pub mod instances;
pub mod roads;
pub mod terrain;
pub mod tilemap;

pub use city::{generate_city, CityScene};
pub use config::CityConfig;
pub use error::CityError;
pub use terrain::{SampleConvention, TerrainSample, TerrainSampler};
