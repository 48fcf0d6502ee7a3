use crate::{MapError, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the tile grid lifecycle manager.
///
/// Everything the grid needs is passed explicitly at construction; there
/// is no option merging at runtime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridOptions {
    /// Lowest tile zoom the grid will snap to
    pub min_zoom: u8,
    /// Highest tile zoom the grid will snap to
    pub max_zoom: u8,
    /// Tiles only exist natively down to this zoom; below it the nearest
    /// native level is requested and scaled visually
    pub min_native_zoom: Option<u8>,
    /// Tiles only exist natively up to this zoom
    pub max_native_zoom: Option<u8>,
    /// Extra ring of tiles (in tile widths) kept around the visible
    /// range to avoid flicker at the viewport edge
    pub keep_buffer: i64,
    /// Opacity fade applied to freshly loaded tiles before they become
    /// active; zero disables fading
    pub fade_duration: Duration,
    /// Minimum spacing between update passes; zero disables throttling.
    /// Resource protection only, host-side coalescing is still expected
    pub update_interval: Duration,
    /// How many zoom levels up the retention search walks
    pub retain_parent_depth: u8,
    /// How many zoom levels down the retention search walks
    pub retain_child_depth: u8,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            min_zoom: 0,
            max_zoom: 18,
            min_native_zoom: None,
            max_native_zoom: None,
            keep_buffer: 2,
            fade_duration: Duration::from_millis(200),
            update_interval: Duration::ZERO,
            retain_parent_depth: 5,
            retain_child_depth: 2,
        }
    }
}

impl GridOptions {
    /// Checks the zoom ranges are coherent
    pub fn validate(&self) -> Result<()> {
        if self.min_zoom > self.max_zoom {
            return Err(MapError::InvalidConfiguration(format!(
                "min_zoom {} exceeds max_zoom {}",
                self.min_zoom, self.max_zoom
            )));
        }
        if let (Some(min), Some(max)) = (self.min_native_zoom, self.max_native_zoom) {
            if min > max {
                return Err(MapError::InvalidConfiguration(format!(
                    "min_native_zoom {min} exceeds max_native_zoom {max}"
                )));
            }
        }
        if self.keep_buffer < 0 {
            return Err(MapError::InvalidConfiguration(
                "keep_buffer must be non-negative".to_string(),
            ));
        }
        Ok(())
    }

    /// Clamps a snapped tile zoom to the native range for request
    /// purposes; the visual scale stays continuous via the level
    /// transform
    pub fn clamp_native(&self, zoom: u8) -> u8 {
        let mut zoom = zoom;
        if let Some(min) = self.min_native_zoom {
            zoom = zoom.max(min);
        }
        if let Some(max) = self.max_native_zoom {
            zoom = zoom.min(max);
        }
        zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_validate() {
        assert!(GridOptions::default().validate().is_ok());
    }

    #[test]
    fn test_inverted_zoom_range_rejected() {
        let options = GridOptions {
            min_zoom: 10,
            max_zoom: 5,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_native_zoom_clamping() {
        let options = GridOptions {
            min_native_zoom: Some(3),
            max_native_zoom: Some(15),
            ..Default::default()
        };

        assert_eq!(options.clamp_native(1), 3);
        assert_eq!(options.clamp_native(9), 9);
        assert_eq!(options.clamp_native(18), 15);
    }

    #[test]
    fn test_options_serde_roundtrip() {
        let options = GridOptions {
            keep_buffer: 4,
            ..Default::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        let back: GridOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
