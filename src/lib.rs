//! # mapgrid
//!
//! The core of an interactive slippy map, inspired by Leaflet.
//!
//! This library converts geographic coordinates into screen pixels, keeps a
//! grid of rectangular image tiles synchronized with a panning/zooming
//! viewport, and simplifies/clips vector geometry for on-screen drawing.
//! Rendering surfaces, input handling and tile fetching live behind the
//! [`render::RenderBackend`] trait and the [`grid::events::GridEvent`]
//! channel.

pub mod core;
pub mod crs;
pub mod geometry;
pub mod grid;
pub mod prelude;
pub mod render;

// Re-export public API
pub use crate::core::{
    bounds::Bounds,
    geo::{LatLng, LatLngBounds},
    point::Point,
    viewport::Viewport,
};

pub use crate::crs::{
    projection::{Equirectangular, Projection, SphericalMercator},
    transformation::Transformation,
    Crs,
};

pub use crate::grid::{
    coords::TileCoord,
    events::GridEvent,
    manager::TileGrid,
    options::GridOptions,
    tile::{Level, Tile, TileLoadState},
};

pub use crate::render::{RenderBackend, RenderHandle};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, MapError>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum MapError {
    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("unbounded tile range: {0}")]
    UnboundedTileRange(String),

    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("parse error: {0}")]
    ParseError(String),
}

/// Error type alias for convenience
pub type Error = MapError;
