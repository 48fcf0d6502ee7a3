use crate::core::geo::{LatLng, LatLngBounds};
use crate::core::point::Point;
use crate::crs::Crs;
use serde::{Deserialize, Serialize};

/// The current view of the map: center, zoom, and pixel size.
///
/// A viewport is pure input produced by the hosting application's input
/// and animation collaborators; the tile grid recomputes its state from
/// it on every change. Zoom may be fractional during pinches and
/// animated transitions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// The center of the map view in geographical coordinates
    pub center: LatLng,
    /// The current zoom level, possibly fractional
    pub zoom: f64,
    /// The size of the viewport in pixels
    pub size: Point,
}

impl Viewport {
    pub fn new(center: LatLng, zoom: f64, size: Point) -> Self {
        Self { center, zoom, size }
    }

    /// Compares against another viewport using epsilon coordinate
    /// equality, the check update coalescing relies on
    pub fn equals(&self, other: &Viewport) -> bool {
        self.center.equals(&other.center, None)
            && (self.zoom - other.zoom).abs() < 1.0e-9
            && self.size == other.size
    }

    /// Half the pixel size, the offset from center to any corner
    pub fn half_size(&self) -> Point {
        self.size.multiply(0.5)
    }

    /// The geographic bounds of the visible area under the given CRS
    pub fn bounds(&self, crs: &Crs) -> LatLngBounds {
        let center_px = crs.latlng_to_point(&self.center, self.zoom);
        let min = center_px.subtract(&self.half_size());
        let max = center_px.add(&self.half_size());

        // Pixel y grows southward, so min/max swap latitude roles
        let nw = crs.point_to_latlng(&min, self.zoom);
        let se = crs.point_to_latlng(&max, self.zoom);

        let mut bounds = LatLngBounds::new(self.center, self.center);
        bounds.extend(&nw);
        bounds.extend(&se);
        bounds
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            center: LatLng {
                lat: 0.0,
                lng: 0.0,
                alt: None,
            },
            zoom: 0.0,
            size: Point::new(800.0, 600.0),
        }
    }
}
