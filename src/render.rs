//! The seam between the tile grid and whatever actually draws pixels.
//!
//! The grid never touches a rendering surface directly: it asks the
//! backend to create, move, fade and remove tile elements, and the
//! backend reports load completion back through
//! [`TileGrid::tile_ready`](crate::grid::manager::TileGrid::tile_ready)
//! exactly once per created tile. Clipped and simplified point sequences
//! from [`geometry`](crate::geometry) are handed to the same backend for
//! vector drawing; styling is entirely its business.

use crate::core::point::Point;
use crate::grid::coords::TileCoord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handle to a render-backend-owned tile element.
///
/// Assigned by the backend when the element is created and never reused
/// while the tile is alive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RenderHandle(pub u64);

impl fmt::Display for RenderHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Rendering-surface operations the tile grid drives.
///
/// `create_tile` kicks off the (typically asynchronous) fetch for the
/// tile's image data; the backend must eventually invoke the completion
/// contract once, successfully or not, using the tile's canonical key to
/// correlate. Completions arriving after the tile was discarded are
/// ignored by the grid.
pub trait RenderBackend {
    /// Creates a tile element at a pixel position relative to its
    /// level's origin and starts loading its content.
    ///
    /// `coord` is the tracked coordinate, the canonical identity for
    /// positioning and completion correlation; `request` is the same
    /// coordinate reduced onto the CRS's wrapped axes, the one tile
    /// data actually exists for. They differ only near the
    /// antimeridian. Completions must be reported for `coord`.
    fn create_tile(
        &mut self,
        coord: TileCoord,
        request: TileCoord,
        position: Point,
        size: f64,
    ) -> RenderHandle;

    /// Moves an existing tile element
    fn position_tile(&mut self, handle: RenderHandle, position: Point);

    /// Sets the element's opacity, used for load fades
    fn set_opacity(&mut self, handle: RenderHandle, opacity: f32);

    /// Removes the element and releases its resources
    fn remove_tile(&mut self, handle: RenderHandle);
}
