//! Prelude module for common mapgrid types and traits
//!
//! Re-exports the most commonly used types, traits, and functions for easy
//! importing with `use mapgrid::prelude::*;`

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

pub use crate::geometry::{clip_polygon, clip_segment, simplify};

pub use crate::render::{RenderBackend, RenderHandle};

pub use crate::{Error as MapError, Result};

pub use std::time::{Duration, Instant};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
