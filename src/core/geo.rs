use crate::{MapError, Result};
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters, used for great-circle distances
const EARTH_RADIUS: f64 = 6371000.0;

/// Default margin for epsilon-based coordinate equality
pub const DEFAULT_MARGIN: f64 = 1.0e-9;

/// Represents a geographical coordinate with latitude, longitude and an
/// optional altitude in meters.
///
/// Construction fails for non-finite latitude or longitude; everything
/// downstream may therefore assume finite coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
    pub alt: Option<f64>,
}

impl LatLng {
    /// Creates a new LatLng coordinate, rejecting non-finite values
    pub fn new(lat: f64, lng: f64) -> Result<Self> {
        if !lat.is_finite() || !lng.is_finite() {
            return Err(MapError::InvalidCoordinate(format!(
                "({lat}, {lng})"
            )));
        }
        Ok(Self {
            lat,
            lng,
            alt: None,
        })
    }

    /// Creates a new LatLng coordinate with an altitude
    pub fn with_alt(lat: f64, lng: f64, alt: f64) -> Result<Self> {
        let mut latlng = Self::new(lat, lng)?;
        latlng.alt = Some(alt);
        Ok(latlng)
    }

    /// Compares two coordinates within an epsilon margin, never by exact
    /// float equality. `margin` defaults to [`DEFAULT_MARGIN`].
    pub fn equals(&self, other: &LatLng, margin: Option<f64>) -> bool {
        let margin = margin.unwrap_or(DEFAULT_MARGIN);
        let delta = (self.lat - other.lat)
            .abs()
            .max((self.lng - other.lng).abs());
        delta <= margin
    }

    /// Returns a copy with longitude normalized into `[-180, 180)`
    pub fn wrap(&self) -> LatLng {
        LatLng {
            lat: self.lat,
            lng: wrap_num(self.lng, -180.0, 180.0),
            alt: self.alt,
        }
    }

    /// Calculates the distance to another LatLng using the Haversine formula
    pub fn distance_to(&self, other: &LatLng) -> f64 {
        let lat1_rad = self.lat.to_radians();
        let lat2_rad = other.lat.to_radians();
        let delta_lat = (other.lat - self.lat).to_radians();
        let delta_lng = (other.lng - self.lng).to_radians();

        let a = (delta_lat / 2.0).sin().powi(2)
            + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

        EARTH_RADIUS * c
    }
}

/// Normalizes `value` into the half-open range `[min, max)` via modular
/// arithmetic.
pub fn wrap_num(value: f64, min: f64, max: f64) -> f64 {
    let span = max - min;
    ((value - min) % span + span) % span + min
}

/// Represents a bounding box of geographical coordinates.
///
/// Extension grows latitude and longitude independently; it does not
/// handle antimeridian crossing. Callers needing wrap-aware bounds must
/// normalize coordinates first (see `Crs::wrap_latlng`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLngBounds {
    pub south_west: LatLng,
    pub north_east: LatLng,
}

impl LatLngBounds {
    pub fn new(south_west: LatLng, north_east: LatLng) -> Self {
        Self {
            south_west,
            north_east,
        }
    }

    /// Creates bounds from individual coordinates
    pub fn from_coords(south: f64, west: f64, north: f64, east: f64) -> Result<Self> {
        Ok(Self::new(
            LatLng::new(south, west)?,
            LatLng::new(north, east)?,
        ))
    }

    /// Checks if the bounds contain a point
    pub fn contains(&self, point: &LatLng) -> bool {
        point.lat >= self.south_west.lat
            && point.lat <= self.north_east.lat
            && point.lng >= self.south_west.lng
            && point.lng <= self.north_east.lng
    }

    /// Checks if the bounds intersect with another bounds
    pub fn intersects(&self, other: &LatLngBounds) -> bool {
        !(other.north_east.lat < self.south_west.lat
            || other.south_west.lat > self.north_east.lat
            || other.north_east.lng < self.south_west.lng
            || other.south_west.lng > self.north_east.lng)
    }

    /// Extends the bounds to include a point
    pub fn extend(&mut self, point: &LatLng) {
        self.south_west.lat = self.south_west.lat.min(point.lat);
        self.south_west.lng = self.south_west.lng.min(point.lng);
        self.north_east.lat = self.north_east.lat.max(point.lat);
        self.north_east.lng = self.north_east.lng.max(point.lng);
    }

    /// Gets the center point of the bounds
    pub fn center(&self) -> LatLng {
        LatLng {
            lat: (self.south_west.lat + self.north_east.lat) / 2.0,
            lng: (self.south_west.lng + self.north_east.lng) / 2.0,
            alt: None,
        }
    }

    /// Returns the union of this bounds with another bounds
    pub fn union(&self, other: &LatLngBounds) -> LatLngBounds {
        let mut result = self.clone();
        result.extend(&other.south_west);
        result.extend(&other.north_east);
        result
    }
}
