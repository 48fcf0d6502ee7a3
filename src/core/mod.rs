//! Core value types: planar points and bounds, geographic coordinates,
//! and the viewport driving every grid update.

pub mod bounds;
pub mod geo;
pub mod point;
pub mod viewport;

pub use bounds::Bounds;
pub use geo::{LatLng, LatLngBounds};
pub use point::Point;
pub use viewport::Viewport;
