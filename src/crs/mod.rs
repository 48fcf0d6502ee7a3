//! Coordinate reference systems: the single source of truth for
//! "geographic point → pixel" conversions.
//!
//! A [`Crs`] composes a [`Projection`] with an affine [`Transformation`]
//! and a zoom ↔ scale law, plus optional axis wrap-around for CRSs that
//! tile the antimeridian.

pub mod projection;
pub mod transformation;

use crate::core::{bounds::Bounds, geo::wrap_num, geo::LatLng, point::Point};
use projection::{Equirectangular, Projection, SphericalMercator, EARTH_RADIUS};
use std::f64::consts::PI;
use std::fmt;
use std::sync::Arc;

/// Composition of a projection, an affine transform and a zoom/scale law
#[derive(Clone)]
pub struct Crs {
    projection: Arc<dyn Projection>,
    transformation: Transformation,
    tile_size: f64,
    wrap_lng: Option<(f64, f64)>,
    wrap_lat: Option<(f64, f64)>,
}

pub use transformation::Transformation;

impl Crs {
    /// Builds a CRS from its parts. `tile_size` drives the zoom/scale law:
    /// `scale(zoom) = tile_size * 2^zoom`.
    pub fn new(
        projection: Arc<dyn Projection>,
        transformation: Transformation,
        tile_size: f64,
    ) -> Self {
        Self {
            projection,
            transformation,
            tile_size,
            wrap_lng: None,
            wrap_lat: None,
        }
    }

    /// Enables longitude wrap-around over the given span
    pub fn with_wrap_lng(mut self, min: f64, max: f64) -> Self {
        self.wrap_lng = Some((min, max));
        self
    }

    /// Enables latitude wrap-around over the given span
    pub fn with_wrap_lat(mut self, min: f64, max: f64) -> Self {
        self.wrap_lat = Some((min, max));
        self
    }

    /// Web Mercator (EPSG:3857), the CRS of most raster tile services
    pub fn epsg3857() -> Self {
        let scale = 0.5 / (PI * EARTH_RADIUS);
        Self::new(
            Arc::new(SphericalMercator),
            Transformation::new(scale, 0.5, -scale, 0.5),
            256.0,
        )
        .with_wrap_lng(-180.0, 180.0)
    }

    /// Equirectangular lat/lng (EPSG:4326)
    pub fn epsg4326() -> Self {
        Self::new(
            Arc::new(Equirectangular),
            Transformation::new(1.0 / 180.0, 1.0, -1.0 / 180.0, 0.5),
            256.0,
        )
        .with_wrap_lng(-180.0, 180.0)
    }

    /// The scale law: world pixels per projected-world span at a zoom level
    pub fn scale(&self, zoom: f64) -> f64 {
        self.tile_size * 2f64.powf(zoom)
    }

    /// Inverse of [`Crs::scale`]
    pub fn zoom(&self, scale: f64) -> f64 {
        (scale / self.tile_size).log2()
    }

    /// The square tile edge length in pixels
    pub fn tile_size(&self) -> f64 {
        self.tile_size
    }

    /// Projects a geographic coordinate straight to world coordinates
    pub fn project(&self, latlng: &LatLng) -> Point {
        self.projection.project(latlng)
    }

    /// Unprojects world coordinates back to a geographic coordinate
    pub fn unproject(&self, point: &Point) -> LatLng {
        self.projection.unproject(point)
    }

    /// Converts a geographic coordinate to absolute pixel coordinates at
    /// the given (possibly fractional) zoom
    pub fn latlng_to_point(&self, latlng: &LatLng, zoom: f64) -> Point {
        let projected = self.projection.project(latlng);
        self.transformation.transform(&projected, self.scale(zoom))
    }

    /// Converts absolute pixel coordinates back to a geographic coordinate
    pub fn point_to_latlng(&self, point: &Point, zoom: f64) -> LatLng {
        let untransformed = self.transformation.untransform(point, self.scale(zoom));
        self.projection.unproject(&untransformed)
    }

    /// The pixel extent of the projected world at the given zoom
    pub fn projected_bounds(&self, zoom: f64) -> Bounds {
        let world = self.projection.bounds();
        let scale = self.scale(zoom);

        let a = self.transformation.transform(&world.min, scale);
        let b = self.transformation.transform(&world.max, scale);

        let mut bounds = Bounds::empty();
        bounds.extend(&a);
        bounds.extend(&b);
        bounds
    }

    /// Whether this CRS wraps around the longitude axis
    pub fn wraps_lng(&self) -> bool {
        self.wrap_lng.is_some()
    }

    /// Whether this CRS wraps around the latitude axis
    pub fn wraps_lat(&self) -> bool {
        self.wrap_lat.is_some()
    }

    /// Normalizes a coordinate onto the wrapped axis spans, leaving axes
    /// without wrap-around untouched
    pub fn wrap_latlng(&self, latlng: &LatLng) -> LatLng {
        let lng = match self.wrap_lng {
            Some((min, max)) => wrap_num(latlng.lng, min, max),
            None => latlng.lng,
        };
        let lat = match self.wrap_lat {
            Some((min, max)) => wrap_num(latlng.lat, min, max),
            None => latlng.lat,
        };
        LatLng {
            lat,
            lng,
            alt: latlng.alt,
        }
    }
}

impl fmt::Debug for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Crs")
            .field("transformation", &self.transformation)
            .field("tile_size", &self.tile_size)
            .field("wrap_lng", &self.wrap_lng)
            .field("wrap_lat", &self.wrap_lat)
            .finish()
    }
}
