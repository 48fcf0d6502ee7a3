use crate::core::{bounds::Bounds, point::Point, viewport::Viewport};
use crate::crs::Crs;
use crate::grid::coords::TileCoord;
use crate::grid::events::{channel, GridEvent};
use crate::grid::options::GridOptions;
use crate::grid::tile::{Level, Tile, TileLoadState};
use crate::prelude::HashMap;
use crate::render::{RenderBackend, RenderHandle};
use crate::{MapError, Result};
use crossbeam_channel::{Receiver, Sender};
use std::time::Instant;

#[cfg(feature = "debug")]
use log;

/// Hard ceiling on the number of tiles one update pass may enumerate.
/// A finite but absurd range (extreme zoom mismatch, corrupted viewport)
/// is treated the same as a non-finite one.
const MAX_TILE_RANGE: i128 = 1 << 22;

/// Inclusive tile-index rectangle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TileRange {
    min_x: i64,
    min_y: i64,
    max_x: i64,
    max_y: i64,
}

impl TileRange {
    /// Converts pixel bounds to the tile indices covering them
    fn from_pixel_bounds(bounds: &Bounds, tile_size: f64) -> Self {
        Self {
            min_x: (bounds.min.x / tile_size).floor() as i64,
            min_y: (bounds.min.y / tile_size).floor() as i64,
            max_x: (bounds.max.x / tile_size).floor() as i64,
            max_y: (bounds.max.y / tile_size).floor() as i64,
        }
    }

    fn expanded(&self, buffer: i64) -> Self {
        Self {
            min_x: self.min_x - buffer,
            min_y: self.min_y - buffer,
            max_x: self.max_x + buffer,
            max_y: self.max_y + buffer,
        }
    }

    fn contains(&self, x: i64, y: i64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    fn center(&self) -> Point {
        Point::new(
            (self.min_x + self.max_x) as f64 / 2.0 + 0.5,
            (self.min_y + self.max_y) as f64 / 2.0 + 0.5,
        )
    }

    fn count(&self) -> i128 {
        // Widen first: saturated casts from absurd pixel values can sit
        // at the i64 extremes
        let w = self.max_x as i128 - self.min_x as i128 + 1;
        let h = self.max_y as i128 - self.min_y as i128 + 1;
        w.saturating_mul(h)
    }

    fn cells(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        let range = *self;
        (range.min_y..=range.max_y)
            .flat_map(move |y| (range.min_x..=range.max_x).map(move |x| (x, y)))
    }
}

/// State machine over the tile collection, driven by viewport changes
/// and tile load completions.
///
/// All state transitions happen synchronously inside one update pass;
/// completions are messages revalidated against the live set before they
/// are applied, so they may arrive in any order and arbitrarily late.
pub struct TileGrid {
    crs: Crs,
    options: GridOptions,
    backend: Box<dyn RenderBackend>,
    tiles: HashMap<TileCoord, Tile>,
    levels: HashMap<u8, Level>,
    tile_zoom: Option<u8>,
    last_update: Option<Instant>,
    events_tx: Sender<GridEvent>,
    events_rx: Receiver<GridEvent>,
}

impl TileGrid {
    pub fn new(crs: Crs, options: GridOptions, backend: Box<dyn RenderBackend>) -> Result<Self> {
        options.validate()?;
        let (events_tx, events_rx) = channel();
        Ok(Self {
            crs,
            options,
            backend,
            tiles: HashMap::default(),
            levels: HashMap::default(),
            tile_zoom: None,
            last_update: None,
            events_tx,
            events_rx,
        })
    }

    /// A receiver for grid notifications; may be cloned and polled
    /// freely. The backlog is bounded: if nothing drains the channel,
    /// the oldest pending notifications are discarded first.
    pub fn events(&self) -> Receiver<GridEvent> {
        self.events_rx.clone()
    }

    /// The integer zoom tiles are currently requested at
    pub fn tile_zoom(&self) -> Option<u8> {
        self.tile_zoom
    }

    /// Looks up a tracked tile
    pub fn tile(&self, coord: &TileCoord) -> Option<&Tile> {
        self.tiles.get(coord)
    }

    /// Iterates over all tracked tiles
    pub fn tiles(&self) -> impl Iterator<Item = &Tile> {
        self.tiles.values()
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    /// Iterates over the live levels with their continuous transforms
    pub fn levels(&self) -> impl Iterator<Item = &Level> {
        self.levels.values()
    }

    /// Number of tiles still waiting on their completion
    pub fn loading_count(&self) -> usize {
        self.tiles
            .values()
            .filter(|tile| tile.state == TileLoadState::Pending)
            .count()
    }

    pub fn is_loading(&self) -> bool {
        self.loading_count() > 0
    }

    /// The main update pass, run on every viewport change.
    ///
    /// Snaps the zoom, recomputes the visible tile range, creates missing
    /// tiles center-outward, retains stale placeholders, and prunes
    /// everything else. Idempotent for an unchanged viewport: no new
    /// creations, no removals.
    pub fn update(&mut self, viewport: &Viewport) -> Result<()> {
        let now = Instant::now();
        self.advance_fades_at(now);

        // Resource protection against high-frequency notifications; the
        // host is still expected to coalesce
        if !self.options.update_interval.is_zero() {
            if let Some(last) = self.last_update {
                if now.duration_since(last) < self.options.update_interval {
                    return Ok(());
                }
            }
        }
        self.last_update = Some(now);

        let snapped = viewport
            .zoom
            .round()
            .clamp(self.options.min_zoom as f64, self.options.max_zoom as f64)
            as u8;
        let tile_zoom = self.options.clamp_native(snapped);

        // Abort before creating anything if the range cannot be trusted
        let pixel_bounds = self.tiled_pixel_bounds(viewport, tile_zoom);
        if !pixel_bounds.is_finite() {
            return Err(MapError::UnboundedTileRange(format!(
                "non-finite pixel bounds at zoom {} (viewport zoom {})",
                tile_zoom, viewport.zoom
            )));
        }

        let tile_size = self.crs.tile_size();
        let tile_range = TileRange::from_pixel_bounds(&pixel_bounds, tile_size);
        if tile_range.count() > MAX_TILE_RANGE {
            return Err(MapError::UnboundedTileRange(format!(
                "{} tiles in range at zoom {}",
                tile_range.count(),
                tile_zoom
            )));
        }

        let origin = pixel_bounds.min;
        self.ensure_level(tile_zoom, origin);
        self.tile_zoom = Some(tile_zoom);

        // Mark current over the buffered range so edge tiles survive
        // small pans without churn
        let buffered = tile_range.expanded(self.options.keep_buffer);
        for tile in self.tiles.values_mut() {
            tile.current =
                tile.coord.z == tile_zoom && buffered.contains(tile.coord.x, tile.coord.y);
        }

        self.create_missing_tiles(&tile_range, tile_zoom, origin);
        self.prune_tiles();

        for level in self.levels.values_mut() {
            level.update_transform(&self.crs, viewport);
        }

        Ok(())
    }

    /// Completion callback, invoked by the render backend exactly once
    /// per created tile. Unknown coordinates (evicted before the
    /// response arrived) are silently ignored.
    pub fn tile_ready(&mut self, coord: TileCoord, error: Option<String>) {
        let now = Instant::now();
        let Some(tile) = self.tiles.get_mut(&coord) else {
            #[cfg(feature = "debug")]
            log::debug!("ignoring stale completion for {coord}");
            return;
        };
        if tile.state != TileLoadState::Pending {
            #[cfg(feature = "debug")]
            log::debug!("ignoring duplicate completion for {coord}");
            return;
        }

        if let Some(message) = error {
            tile.mark_error();
            #[cfg(feature = "debug")]
            log::warn!("tile {coord} failed to load: {message}");
            self.emit(GridEvent::TileError { coord, message });
            return;
        }

        tile.mark_loaded(now);
        let handle = tile.handle;
        if self.options.fade_duration.is_zero() {
            // No fade: straight to active, which may release placeholders
            if let Some(tile) = self.tiles.get_mut(&coord) {
                tile.mark_active();
            }
            self.backend.set_opacity(handle, 1.0);
            self.emit(GridEvent::TileLoaded(coord));
            self.prune_tiles();
        } else {
            self.backend.set_opacity(handle, 0.0);
            self.emit(GridEvent::TileLoaded(coord));
        }
    }

    /// Advances load fades; loaded tiles whose fade has finished become
    /// active, which re-runs the prune pass. Called from `update`, and
    /// by hosts once per frame while fades are in flight.
    pub fn advance_fades(&mut self) {
        self.advance_fades_at(Instant::now());
    }

    fn advance_fades_at(&mut self, now: Instant) {
        let fade = self.options.fade_duration;
        let mut updates: Vec<(RenderHandle, f32)> = Vec::new();
        let mut any_activated = false;

        for tile in self.tiles.values_mut() {
            if tile.state != TileLoadState::Loaded {
                continue;
            }
            let progress = match (fade.is_zero(), tile.loaded_at) {
                (true, _) | (false, None) => 1.0,
                (false, Some(at)) => {
                    now.saturating_duration_since(at).as_secs_f64() / fade.as_secs_f64()
                }
            };
            if progress >= 1.0 {
                tile.mark_active();
                any_activated = true;
            } else {
                tile.opacity = progress as f32;
            }
            updates.push((tile.handle, tile.opacity));
        }

        for (handle, opacity) in updates {
            self.backend.set_opacity(handle, opacity);
        }
        if any_activated {
            self.prune_tiles();
        }
    }

    /// Pixel bounds of the viewport at the tile zoom. The half size is
    /// scaled by the fractional zoom offset so a mid-gesture viewport
    /// still maps onto the snapped level.
    fn tiled_pixel_bounds(&self, viewport: &Viewport, tile_zoom: u8) -> Bounds {
        let scale = 2f64.powf(viewport.zoom - tile_zoom as f64);
        let center = self.crs.latlng_to_point(&viewport.center, tile_zoom as f64);
        let half = viewport.size.divide(scale * 2.0);

        Bounds::new(center.subtract(&half), center.add(&half))
    }

    /// The CRS's global tile index range at a zoom level
    fn global_tile_range(&self, zoom: u8) -> TileRange {
        let bounds = self.crs.projected_bounds(zoom as f64);
        let tile_size = self.crs.tile_size();
        TileRange {
            min_x: (bounds.min.x / tile_size).floor() as i64,
            min_y: (bounds.min.y / tile_size).floor() as i64,
            max_x: (bounds.max.x / tile_size).ceil() as i64 - 1,
            max_y: (bounds.max.y / tile_size).ceil() as i64 - 1,
        }
    }

    /// Derives the request coordinate for a tracked coordinate: reduced
    /// modulo the wrap span on wrapped axes, rejected when outside the
    /// global range on an axis without wrap-around
    fn wrap_coord(&self, coord: TileCoord, global: &TileRange) -> Option<TileCoord> {
        let mut coord = coord;

        if self.crs.wraps_lng() {
            let span = global.max_x - global.min_x + 1;
            coord.x = global.min_x + (coord.x - global.min_x).rem_euclid(span);
        } else if coord.x < global.min_x || coord.x > global.max_x {
            return None;
        }

        if self.crs.wraps_lat() {
            let span = global.max_y - global.min_y + 1;
            coord.y = global.min_y + (coord.y - global.min_y).rem_euclid(span);
        } else if coord.y < global.min_y || coord.y > global.max_y {
            return None;
        }

        Some(coord)
    }

    fn ensure_level(&mut self, zoom: u8, origin: Point) {
        if let Some(level) = self.levels.get_mut(&zoom) {
            if level.origin != origin {
                // The origin follows the view so tile positions stay
                // small; every element of the level moves with it
                level.origin = origin;
                let tile_size = self.crs.tile_size();
                let mut moves: Vec<(RenderHandle, Point)> = Vec::new();
                for tile in self.tiles.values() {
                    if tile.coord.z == zoom {
                        moves.push((tile.handle, Self::tile_position(&tile.coord, tile_size, &origin)));
                    }
                }
                for (handle, position) in moves {
                    self.backend.position_tile(handle, position);
                }
            }
            return;
        }

        self.levels.insert(zoom, Level::new(zoom, origin));
        #[cfg(feature = "debug")]
        log::debug!("created level {zoom}");
        self.emit(GridEvent::LevelCreated(zoom));
    }

    fn tile_position(coord: &TileCoord, tile_size: f64, origin: &Point) -> Point {
        Point::new(coord.x as f64 * tile_size, coord.y as f64 * tile_size).subtract(origin)
    }

    /// Creates tiles missing from the unbuffered range, center-outward.
    ///
    /// Tiles are keyed and positioned by the enumerated (unwrapped)
    /// coordinate so the grid stays pixel-continuous across the
    /// antimeridian; wrapping only produces the request coordinate the
    /// backend fetches data for.
    fn create_missing_tiles(&mut self, range: &TileRange, tile_zoom: u8, origin: Point) {
        let global = self.global_tile_range(tile_zoom);
        let range_center = range.center();

        let mut queue: Vec<(TileCoord, TileCoord, f64)> = Vec::new();
        for (x, y) in range.cells() {
            let coord = TileCoord::new(x, y, tile_zoom);
            let Some(request) = self.wrap_coord(coord, &global) else {
                continue;
            };
            if self.tiles.contains_key(&coord) {
                continue;
            }
            queue.push((coord, request, coord.center().distance_to(&range_center)));
        }
        queue.sort_by(|a, b| a.2.total_cmp(&b.2));

        let tile_size = self.crs.tile_size();
        for (coord, request, _) in queue {
            let position = Self::tile_position(&coord, tile_size, &origin);
            let handle = self.backend.create_tile(coord, request, position, tile_size);
            self.tiles.insert(coord, Tile::new(coord, request, handle));
            self.emit(GridEvent::TileRequested(coord));
        }
    }

    /// Retention and removal. Current tiles always stay; a current tile
    /// whose content is not yet active keeps the nearest loaded ancestor
    /// (up to `retain_parent_depth` levels up) or loaded descendants
    /// (down to `retain_child_depth` levels) visible as placeholders.
    /// Everything neither current nor retained is removed.
    fn prune_tiles(&mut self) {
        for tile in self.tiles.values_mut() {
            tile.retain = tile.current;
        }

        let waiting: Vec<TileCoord> = self
            .tiles
            .values()
            .filter(|tile| tile.current && !tile.is_active())
            .map(|tile| tile.coord)
            .collect();

        for coord in waiting {
            let min_zoom = coord.z.saturating_sub(self.options.retain_parent_depth);
            if !self.retain_parent(coord, min_zoom) {
                let max_zoom = coord.z.saturating_add(self.options.retain_child_depth);
                self.retain_children(coord, max_zoom);
            }
        }

        let stale: Vec<TileCoord> = self
            .tiles
            .values()
            .filter(|tile| !tile.retain)
            .map(|tile| tile.coord)
            .collect();
        for coord in stale {
            self.remove_tile(coord);
        }

        self.prune_levels();
    }

    /// Walks up the ancestor chain looking for a usable placeholder.
    /// Returns true once an active ancestor is found; loaded-but-fading
    /// ancestors are retained along the way without ending the search.
    fn retain_parent(&mut self, coord: TileCoord, min_zoom: u8) -> bool {
        let Some(parent) = coord.parent() else {
            return false;
        };

        if let Some(tile) = self.tiles.get_mut(&parent) {
            if tile.is_active() {
                tile.retain = true;
                return true;
            }
            if tile.is_loaded() {
                tile.retain = true;
            }
        }

        if parent.z > min_zoom {
            self.retain_parent(parent, min_zoom)
        } else {
            false
        }
    }

    /// Walks down the descendant tree, retaining loaded tiles that can
    /// stand in for the missing coordinate
    fn retain_children(&mut self, coord: TileCoord, max_zoom: u8) {
        for child in coord.children() {
            let mut found_active = false;
            if let Some(tile) = self.tiles.get_mut(&child) {
                if tile.is_active() {
                    tile.retain = true;
                    found_active = true;
                } else if tile.is_loaded() {
                    tile.retain = true;
                }
            }
            if !found_active && child.z < max_zoom {
                self.retain_children(child, max_zoom);
            }
        }
    }

    fn remove_tile(&mut self, coord: TileCoord) {
        if let Some(tile) = self.tiles.remove(&coord) {
            self.backend.remove_tile(tile.handle);
            #[cfg(feature = "debug")]
            log::debug!("removed tile {coord}");
            self.emit(GridEvent::TileUnloaded(coord));
        }
    }

    /// Discards levels that hold no tiles and are not the current zoom
    fn prune_levels(&mut self) {
        let current = self.tile_zoom;
        let mut empty: Vec<u8> = Vec::new();
        for &zoom in self.levels.keys() {
            if Some(zoom) != current && !self.tiles.values().any(|t| t.coord.z == zoom) {
                empty.push(zoom);
            }
        }
        for zoom in empty {
            self.levels.remove(&zoom);
            #[cfg(feature = "debug")]
            log::debug!("removed level {zoom}");
            self.emit(GridEvent::LevelRemoved(zoom));
        }
    }

    fn emit(&self, event: GridEvent) {
        // Events are best-effort notifications. The backlog is bounded:
        // when no consumer drains the channel, the oldest pending
        // notifications are discarded to make room.
        while self.events_tx.is_full() {
            if self.events_rx.try_recv().is_err() {
                break;
            }
        }
        let _ = self.events_tx.try_send(event);
    }
}
