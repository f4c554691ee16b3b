//! County choropleth of U.S. educational attainment.
//!
//! Loads education records and a county topology, joins them by FIPS code
//! and renders a coloured map with a hover tooltip and a threshold legend.

pub mod config;
pub mod data;
pub mod error;
pub mod export;
pub mod processing;
pub mod raster;
pub mod render;
pub mod scale;
pub mod server;
pub mod svg;
pub mod topology;
pub mod types;

pub use error::{FetchError, TopologyError};
