//! Pixel-space geometry: line simplification and rectangle clipping.
//!
//! These operate on ordered point sequences already projected through a
//! [`Crs`](crate::crs::Crs), keeping vector rendering proportional to
//! visible complexity rather than raw point count. They are independent
//! of the tile grid.

pub mod clip;
pub mod simplify;

pub use clip::{clip_polygon, clip_segment};
pub use simplify::simplify;
