use crate::core::point::Point;
use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A tile coordinate in the slippy map tile pyramid.
///
/// `z` is the tile zoom: the integer level at which tile data is actually
/// requested, snapped from the possibly fractional viewport zoom. `x` and
/// `y` are signed so ranges computed near the antimeridian can go
/// negative before wrap-around reduces them.
///
/// The canonical key is the `"x:y:z"` string produced by `Display` and
/// accepted by `FromStr`; it is stable for the lifetime of a tile and is
/// what render backends use to correlate load completions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileCoord {
    pub x: i64,
    pub y: i64,
    pub z: u8,
}

impl TileCoord {
    pub fn new(x: i64, y: i64, z: u8) -> Self {
        Self { x, y, z }
    }

    /// The canonical key string
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Gets the parent tile one zoom level up
    pub fn parent(&self) -> Option<TileCoord> {
        if self.z == 0 {
            None
        } else {
            Some(TileCoord::new(
                self.x.div_euclid(2),
                self.y.div_euclid(2),
                self.z - 1,
            ))
        }
    }

    /// Gets the four child tiles one zoom level down
    pub fn children(&self) -> [TileCoord; 4] {
        let (x, y, z) = (self.x * 2, self.y * 2, self.z + 1);
        [
            TileCoord::new(x, y, z),
            TileCoord::new(x + 1, y, z),
            TileCoord::new(x, y + 1, z),
            TileCoord::new(x + 1, y + 1, z),
        ]
    }

    /// Reduces the x coordinate modulo the wrap span
    pub fn wrap_x(&self, span: i64) -> TileCoord {
        TileCoord::new(self.x.rem_euclid(span), self.y, self.z)
    }

    /// Reduces the y coordinate modulo the wrap span
    pub fn wrap_y(&self, span: i64) -> TileCoord {
        TileCoord::new(self.x, self.y.rem_euclid(span), self.z)
    }

    /// Picks a stable subdomain index for this tile among `count`
    /// mirrors; URL templating itself is the host's concern
    pub fn subdomain_index(&self, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        (self.x + self.y).rem_euclid(count as i64) as usize
    }

    /// The tile's center in fractional tile units, used for
    /// center-outward request ordering
    pub fn center(&self) -> Point {
        Point::new(self.x as f64 + 0.5, self.y as f64 + 0.5)
    }
}

impl fmt::Display for TileCoord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.x, self.y, self.z)
    }
}

impl FromStr for TileCoord {
    type Err = MapError;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.split(':');
        let mut next = || {
            parts
                .next()
                .ok_or_else(|| MapError::ParseError(format!("bad tile key: {s}")))
        };

        let x = next()?
            .parse()
            .map_err(|_| MapError::ParseError(format!("bad tile key: {s}")))?;
        let y = next()?
            .parse()
            .map_err(|_| MapError::ParseError(format!("bad tile key: {s}")))?;
        let z = next()?
            .parse()
            .map_err(|_| MapError::ParseError(format!("bad tile key: {s}")))?;

        if parts.next().is_some() {
            return Err(MapError::ParseError(format!("bad tile key: {s}")));
        }
        Ok(TileCoord::new(x, y, z))
    }
}
