//! Tile grid lifecycle: decides on every pan and zoom which tiles to
//! request, which to keep for visual continuity, and which to discard,
//! without ever requesting an unbounded number of tiles.

pub mod coords;
pub mod events;
pub mod manager;
pub mod options;
pub mod tile;

pub use coords::TileCoord;
pub use events::GridEvent;
pub use manager::TileGrid;
pub use options::GridOptions;
pub use tile::{Level, Tile, TileLoadState};
