use crate::core::{bounds::Bounds, geo::LatLng, point::Point};
use std::f64::consts::PI;

/// Equatorial Earth radius in meters (WGS84), used by Web Mercator
pub const EARTH_RADIUS: f64 = 6378137.0;

/// Latitude at which the Mercator y extent matches its x extent, keeping
/// the projected world square
pub const MAX_LATITUDE: f64 = 85.0511287798;

/// Stateless forward/inverse mapping between geographic coordinates and a
/// planar "world" coordinate.
///
/// Implementations must be pure: no per-call state, and
/// `unproject(project(ll))` round-trips within floating point error for
/// every coordinate inside [`Projection::bounds`].
pub trait Projection: Send + Sync {
    /// Projects a geographic coordinate to world coordinates
    fn project(&self, latlng: &LatLng) -> Point;

    /// Unprojects world coordinates back to a geographic coordinate
    fn unproject(&self, point: &Point) -> LatLng;

    /// The projection's valid world extent
    fn bounds(&self) -> Bounds;
}

/// Spherical Mercator projection (the core of EPSG:3857).
///
/// Latitude is clamped to ±[`MAX_LATITUDE`] before projecting so the
/// world stays square.
#[derive(Debug, Clone, Copy, Default)]
pub struct SphericalMercator;

impl Projection for SphericalMercator {
    fn project(&self, latlng: &LatLng) -> Point {
        let lat = latlng.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE);
        let sin = (lat * PI / 180.0).sin();

        Point::new(
            EARTH_RADIUS * latlng.lng * PI / 180.0,
            EARTH_RADIUS * ((1.0 + sin) / (1.0 - sin)).ln() / 2.0,
        )
    }

    fn unproject(&self, point: &Point) -> LatLng {
        let d = 180.0 / PI;
        LatLng {
            lat: (2.0 * (point.y / EARTH_RADIUS).exp().atan() - PI / 2.0) * d,
            lng: point.x * d / EARTH_RADIUS,
            alt: None,
        }
    }

    fn bounds(&self) -> Bounds {
        let d = EARTH_RADIUS * PI;
        Bounds::from_coords(-d, -d, d, d)
    }
}

/// Equirectangular ("plate carrée") projection: longitude and latitude map
/// directly to x and y, with no clamping. Used by non-Mercator CRSs such
/// as EPSG:4326.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equirectangular;

impl Projection for Equirectangular {
    fn project(&self, latlng: &LatLng) -> Point {
        Point::new(latlng.lng, latlng.lat)
    }

    fn unproject(&self, point: &Point) -> LatLng {
        LatLng {
            lat: point.y,
            lng: point.x,
            alt: None,
        }
    }

    fn bounds(&self) -> Bounds {
        Bounds::from_coords(-180.0, -90.0, 180.0, 90.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mercator_roundtrip() {
        let projection = SphericalMercator;

        for &lat in &[-85.0511, -60.0, -1.5, 0.0, 33.33, 85.0511] {
            for &lng in &[-180.0, -90.0, 0.0, 45.5, 180.0] {
                let latlng = LatLng::new(lat, lng).unwrap();
                let back = projection.unproject(&projection.project(&latlng));

                assert!(
                    (back.lat - lat).abs() < 1.0e-6,
                    "lat {lat} came back as {}",
                    back.lat
                );
                assert!(
                    (back.lng - lng).abs() < 1.0e-6,
                    "lng {lng} came back as {}",
                    back.lng
                );
            }
        }
    }

    #[test]
    fn test_mercator_clamps_latitude() {
        let projection = SphericalMercator;
        let pole = LatLng::new(90.0, 0.0).unwrap();
        let clamped = LatLng::new(MAX_LATITUDE, 0.0).unwrap();

        assert_eq!(projection.project(&pole), projection.project(&clamped));
    }

    #[test]
    fn test_mercator_world_is_square() {
        let bounds = SphericalMercator.bounds();
        assert!((bounds.width() - bounds.height()).abs() < 1.0e-6);

        // The projected max-latitude corner lands on the bounds corner
        let corner = SphericalMercator.project(&LatLng::new(MAX_LATITUDE, 180.0).unwrap());
        assert!((corner.x - bounds.max.x).abs() < 1.0e-3);
        assert!((corner.y - bounds.max.y).abs() < 1.0e-3);
    }

    #[test]
    fn test_equirectangular_identity() {
        let projection = Equirectangular;
        let latlng = LatLng::new(12.5, -34.25).unwrap();

        let projected = projection.project(&latlng);
        assert_eq!(projected, Point::new(-34.25, 12.5));

        let back = projection.unproject(&projected);
        assert_eq!(back.lat, 12.5);
        assert_eq!(back.lng, -34.25);
    }
}
