use crate::core::point::Point;
use crate::core::viewport::Viewport;
use crate::crs::Crs;
use crate::grid::coords::TileCoord;
use crate::render::RenderHandle;
use std::time::Instant;

/// Lifecycle state of a tracked tile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileLoadState {
    /// Created, waiting for the backend's completion
    Pending,
    /// Content arrived, fading in
    Loaded,
    /// Fully faded in and usable as a retention placeholder
    Active,
    /// The backend reported a fetch/decode failure; not retried
    Error,
}

/// A tracked tile: exactly one exists per coordinate key at any time.
///
/// `coord` is the tracked, possibly unwrapped coordinate tiles are keyed
/// and positioned by; `request` is `coord` reduced onto the CRS's wrapped
/// axes, which is what the backend fetches data for.
#[derive(Debug, Clone)]
pub struct Tile {
    pub coord: TileCoord,
    pub request: TileCoord,
    pub state: TileLoadState,
    /// Inside the buffered range at the current tile zoom
    pub current: bool,
    /// Kept this pass as a placeholder for unfinished replacements;
    /// recomputed on every update
    pub retain: bool,
    /// The render element owned by the backend
    pub handle: RenderHandle,
    pub opacity: f32,
    pub loaded_at: Option<Instant>,
}

impl Tile {
    pub fn new(coord: TileCoord, request: TileCoord, handle: RenderHandle) -> Self {
        Self {
            coord,
            request,
            state: TileLoadState::Pending,
            current: true,
            retain: false,
            handle,
            opacity: 0.0,
            loaded_at: None,
        }
    }

    /// Loaded or already active
    pub fn is_loaded(&self) -> bool {
        matches!(self.state, TileLoadState::Loaded | TileLoadState::Active)
    }

    pub fn is_active(&self) -> bool {
        self.state == TileLoadState::Active
    }

    pub fn mark_loaded(&mut self, now: Instant) {
        self.state = TileLoadState::Loaded;
        self.loaded_at = Some(now);
    }

    pub fn mark_active(&mut self) {
        self.state = TileLoadState::Active;
        self.opacity = 1.0;
    }

    pub fn mark_error(&mut self) {
        self.state = TileLoadState::Error;
    }
}

/// Positioning state for all tiles of one integer tile zoom.
///
/// The level is what makes fractional zoom cheap: instead of requesting
/// new tiles while a pinch or animation is mid-flight, the whole level is
/// rescaled and translated from its own integer zoom to the viewport's
/// current zoom. Created lazily, discarded once it holds no tiles and is
/// not the current tile zoom.
#[derive(Debug, Clone)]
pub struct Level {
    pub zoom: u8,
    /// Pixel origin tiles of this level are positioned against
    pub origin: Point,
    /// Scale from this level's zoom to the viewport zoom
    pub scale: f64,
    /// Screen translation accompanying `scale`
    pub translation: Point,
}

impl Level {
    pub fn new(zoom: u8, origin: Point) -> Self {
        Self {
            zoom,
            origin,
            scale: 1.0,
            translation: Point::new(0.0, 0.0),
        }
    }

    /// Repositions/rescales this level for the viewport's possibly
    /// fractional zoom. The scale doubles per zoom level; the
    /// translation maps the level origin into the viewport's pixel
    /// frame at the current zoom.
    pub fn update_transform(&mut self, crs: &Crs, viewport: &Viewport) {
        self.scale = crs.scale(viewport.zoom) / crs.scale(self.zoom as f64);

        let viewport_origin = crs
            .latlng_to_point(&viewport.center, viewport.zoom)
            .subtract(&viewport.half_size());

        self.translation = self
            .origin
            .multiply(self.scale)
            .subtract(&viewport_origin);
    }
}
