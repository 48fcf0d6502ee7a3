//! Integration tests for the tile grid lifecycle: creation, retention
//! across zoom changes, pruning, fades and stale completions, observed
//! through a recording render backend.

use mapgrid::{
    Crs, GridEvent, GridOptions, LatLng, Point, RenderBackend, RenderHandle, TileCoord, TileGrid,
    TileLoadState, Viewport,
};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::time::Duration;

/// Everything the grid asked the backend to do
#[derive(Default)]
struct Recorder {
    next_handle: u64,
    created: Vec<(TileCoord, TileCoord, Point, f64)>,
    removed: Vec<RenderHandle>,
    opacity: Vec<(RenderHandle, f32)>,
    positioned: Vec<(RenderHandle, Point)>,
    live: HashMap<RenderHandle, TileCoord>,
}

#[derive(Clone)]
struct MockBackend(Rc<RefCell<Recorder>>);

impl MockBackend {
    fn new() -> (Self, Rc<RefCell<Recorder>>) {
        let recorder = Rc::new(RefCell::new(Recorder::default()));
        (Self(recorder.clone()), recorder)
    }
}

impl RenderBackend for MockBackend {
    fn create_tile(
        &mut self,
        coord: TileCoord,
        request: TileCoord,
        position: Point,
        size: f64,
    ) -> RenderHandle {
        let mut rec = self.0.borrow_mut();
        rec.next_handle += 1;
        let handle = RenderHandle(rec.next_handle);
        rec.created.push((coord, request, position, size));
        rec.live.insert(handle, coord);
        handle
    }

    fn position_tile(&mut self, handle: RenderHandle, position: Point) {
        self.0.borrow_mut().positioned.push((handle, position));
    }

    fn set_opacity(&mut self, handle: RenderHandle, opacity: f32) {
        self.0.borrow_mut().opacity.push((handle, opacity));
    }

    fn remove_tile(&mut self, handle: RenderHandle) {
        let mut rec = self.0.borrow_mut();
        rec.removed.push(handle);
        rec.live.remove(&handle);
    }
}

fn grid_with(options: GridOptions) -> (TileGrid, Rc<RefCell<Recorder>>) {
    let (backend, recorder) = MockBackend::new();
    let grid = TileGrid::new(Crs::epsg3857(), options, Box::new(backend)).unwrap();
    (grid, recorder)
}

fn instant_grid() -> (TileGrid, Rc<RefCell<Recorder>>) {
    grid_with(GridOptions {
        fade_duration: Duration::ZERO,
        ..Default::default()
    })
}

fn world_view(zoom: f64) -> Viewport {
    Viewport::new(LatLng::new(0.0, 0.0).unwrap(), zoom, Point::new(512.0, 512.0))
}

fn complete_all(grid: &mut TileGrid) {
    let pending: Vec<TileCoord> = grid
        .tiles()
        .filter(|t| t.state == TileLoadState::Pending)
        .map(|t| t.coord)
        .collect();
    for coord in pending {
        grid.tile_ready(coord, None);
    }
}

#[test]
fn requests_are_ordered_center_outward() {
    let (mut grid, recorder) = instant_grid();
    grid.update(&world_view(3.0)).unwrap();

    let created = &recorder.borrow().created;
    assert!(created.len() > 1);

    // Distances from the range center in tile units must be
    // non-decreasing; a 512px world view at zoom 3 covers tiles 3..=5,
    // centered on 4.5
    let center = Point::new(4.5, 4.5);
    let mut last = 0.0f64;
    for (coord, _, _, _) in created {
        let d = Point::new(coord.x as f64 + 0.5, coord.y as f64 + 0.5).distance_to(&center);
        assert!(d >= last - 1.0e-9, "tile {coord} requested out of order");
        last = d;
    }
}

#[test]
fn repeated_update_creates_and_removes_nothing() {
    let (mut grid, recorder) = instant_grid();
    let viewport = world_view(5.0);

    grid.update(&viewport).unwrap();
    complete_all(&mut grid);

    let created_before = recorder.borrow().created.len();
    let removed_before = recorder.borrow().removed.len();

    grid.update(&viewport).unwrap();
    grid.update(&viewport).unwrap();

    assert_eq!(recorder.borrow().created.len(), created_before);
    assert_eq!(recorder.borrow().removed.len(), removed_before);
}

#[test]
fn small_pan_keeps_buffered_tiles() {
    let (mut grid, recorder) = instant_grid();
    grid.update(&world_view(8.0)).unwrap();
    complete_all(&mut grid);

    let before: Vec<TileCoord> = grid.tiles().map(|t| t.coord).collect();

    // Nudge the center by a fraction of a tile; everything stays
    let nudged = Viewport::new(
        LatLng::new(0.01, 0.01).unwrap(),
        8.0,
        Point::new(512.0, 512.0),
    );
    grid.update(&nudged).unwrap();

    for coord in &before {
        assert!(grid.tile(coord).is_some(), "tile {coord} was dropped on a small pan");
    }
    assert!(recorder.borrow().removed.is_empty());
}

#[test]
fn stale_tiles_are_retained_until_replacement_is_active() {
    let (mut grid, _recorder) = instant_grid();

    // Fully load zoom 3
    grid.update(&world_view(3.0)).unwrap();
    complete_all(&mut grid);
    let z3_tiles: Vec<TileCoord> = grid.tiles().map(|t| t.coord).collect();
    assert!(z3_tiles.iter().all(|c| c.z == 3));

    // Zoom out; the zoom 2 replacements are only pending, so the loaded
    // zoom 3 tiles must survive this pass as placeholders
    grid.update(&world_view(2.0)).unwrap();
    assert_eq!(grid.tile_zoom(), Some(2));
    for coord in &z3_tiles {
        assert!(
            grid.tile(coord).is_some(),
            "loaded tile {coord} was pruned while its replacement was pending"
        );
    }

    // Once the zoom 2 tiles are active the placeholders go away
    complete_all(&mut grid);
    assert!(grid.tiles().all(|t| t.coord.z == 2));
}

#[test]
fn zoom_in_keeps_loaded_parent_until_children_load() {
    let (mut grid, _recorder) = instant_grid();

    // Fully load zoom 2, then zoom in; the zoom 3 children are pending,
    // so each keeps its loaded zoom 2 parent on screen
    grid.update(&world_view(2.0)).unwrap();
    complete_all(&mut grid);

    grid.update(&world_view(3.0)).unwrap();
    assert_eq!(grid.tile_zoom(), Some(3));

    let pending: Vec<TileCoord> = grid
        .tiles()
        .filter(|t| t.coord.z == 3)
        .map(|t| t.coord)
        .collect();
    assert!(!pending.is_empty());
    for coord in &pending {
        let parent = coord.parent().unwrap();
        assert!(
            grid.tile(&parent).is_some_and(|t| t.is_loaded()),
            "loaded parent {parent} of pending {coord} was pruned"
        );
    }

    // The parents go away once the children are active
    complete_all(&mut grid);
    assert!(grid.tiles().all(|t| t.coord.z == 3));
}

#[test]
fn antimeridian_view_is_covered_and_stable() {
    let (mut grid, recorder) = instant_grid();
    let view = Viewport::new(
        LatLng::new(0.0, 180.0).unwrap(),
        4.0,
        Point::new(512.0, 512.0),
    );
    grid.update(&view).unwrap();

    {
        let rec = recorder.borrow();
        // Every 256px column and row of the view gets an element; the
        // columns past the wrap request data for the wrapped coordinate
        for col in [0.0, 256.0, 512.0] {
            for row in [0.0, 256.0, 512.0] {
                assert!(
                    rec.created
                        .iter()
                        .any(|(_, _, p, _)| (p.x - col).abs() < 1.0e-9
                            && (p.y - row).abs() < 1.0e-9),
                    "no tile element at viewport position ({col}, {row})"
                );
            }
        }
        for (coord, request, _, _) in rec.created.iter() {
            assert!(request.x >= 0 && request.x < 16);
            assert_eq!(request.x, coord.x.rem_euclid(16));
        }
    }

    // A second identical pass must not churn the wrapped columns
    grid.update(&view).unwrap();
    assert!(recorder.borrow().removed.is_empty());
}

#[test]
fn empty_levels_are_discarded() {
    let (mut grid, _recorder) = instant_grid();
    let events = grid.events();

    grid.update(&world_view(3.0)).unwrap();
    complete_all(&mut grid);
    grid.update(&world_view(2.0)).unwrap();
    complete_all(&mut grid);

    let seen: Vec<GridEvent> = events.try_iter().collect();
    assert!(seen.contains(&GridEvent::LevelCreated(3)));
    assert!(seen.contains(&GridEvent::LevelCreated(2)));
    assert!(seen.contains(&GridEvent::LevelRemoved(3)));
    assert_eq!(grid.levels().count(), 1);
}

#[test]
fn completion_after_eviction_has_no_effect() {
    let (mut grid, recorder) = instant_grid();

    grid.update(&world_view(3.0)).unwrap();
    let evicted: Vec<TileCoord> = grid.tiles().map(|t| t.coord).collect();

    // Jump several zoom levels before anything completed; pending zoom 3
    // tiles are neither current nor loaded placeholders, so they are
    // dropped in this pass
    grid.update(&world_view(6.0)).unwrap();
    for coord in &evicted {
        assert!(grid.tile(coord).is_none());
    }

    let events = grid.events();
    while events.try_recv().is_ok() {}
    let before = grid.tile_count();
    let removed_before = recorder.borrow().removed.len();

    // The fetches finish anyway; the grid must shrug them off
    for coord in &evicted {
        grid.tile_ready(*coord, None);
        grid.tile_ready(*coord, Some("connection reset".to_string()));
    }

    assert_eq!(grid.tile_count(), before);
    assert_eq!(recorder.borrow().removed.len(), removed_before);
    assert!(events.try_recv().is_err(), "stale completions emitted events");
}

#[test]
fn load_fade_reaches_active_and_reports_opacity() {
    let (mut grid, recorder) = grid_with(GridOptions {
        fade_duration: Duration::from_millis(1),
        ..Default::default()
    });

    grid.update(&world_view(1.0)).unwrap();
    let coord = grid.tiles().next().unwrap().coord;
    grid.tile_ready(coord, None);

    assert_eq!(grid.tile(&coord).unwrap().state, TileLoadState::Loaded);

    std::thread::sleep(Duration::from_millis(5));
    grid.advance_fades();

    let tile = grid.tile(&coord).unwrap();
    assert_eq!(tile.state, TileLoadState::Active);
    assert_eq!(tile.opacity, 1.0);

    let opacity = &recorder.borrow().opacity;
    assert!(opacity.iter().any(|&(h, o)| h == tile.handle && o == 0.0));
    assert!(opacity.iter().any(|&(h, o)| h == tile.handle && o == 1.0));
}

#[test]
fn load_error_reports_upward_and_keeps_map_running() {
    let (mut grid, _recorder) = instant_grid();
    let events = grid.events();

    grid.update(&world_view(2.0)).unwrap();
    let coords: Vec<TileCoord> = grid.tiles().map(|t| t.coord).collect();

    // First tile errors, the rest load fine
    grid.tile_ready(coords[0], Some("404".to_string()));
    for coord in &coords[1..] {
        grid.tile_ready(*coord, None);
    }

    assert_eq!(grid.tile(&coords[0]).unwrap().state, TileLoadState::Error);
    assert!(!grid.is_loading());

    let errors: Vec<GridEvent> = events
        .try_iter()
        .filter(|e| matches!(e, GridEvent::TileError { .. }))
        .collect();
    assert_eq!(
        errors,
        vec![GridEvent::TileError {
            coord: coords[0],
            message: "404".to_string()
        }]
    );

    // A further pan still works
    let moved = Viewport::new(
        LatLng::new(5.0, 5.0).unwrap(),
        2.0,
        Point::new(512.0, 512.0),
    );
    grid.update(&moved).unwrap();
}

#[test]
fn every_created_element_is_eventually_removed_or_live() {
    let (mut grid, recorder) = instant_grid();

    for zoom in [2.0, 4.0, 3.0, 6.0] {
        grid.update(&world_view(zoom)).unwrap();
        complete_all(&mut grid);
    }

    let rec = recorder.borrow();
    assert_eq!(
        rec.created.len(),
        rec.removed.len() + rec.live.len(),
        "backend element accounting is off"
    );
    // What the backend believes is live matches the grid's view
    assert_eq!(rec.live.len(), grid.tile_count());
    for coord in rec.live.values() {
        assert!(grid.tile(coord).is_some());
    }
}

#[test]
fn tile_positions_follow_the_level_origin() {
    let (mut grid, recorder) = instant_grid();
    grid.update(&world_view(4.0)).unwrap();

    // Tiles are positioned relative to the level origin: adjacent tile
    // columns are exactly one tile size apart
    let created = recorder.borrow();
    let mut by_coord: HashMap<(i64, i64), Point> = HashMap::new();
    for (coord, _, position, size) in created.created.iter() {
        assert_eq!(*size, 256.0);
        by_coord.insert((coord.x, coord.y), *position);
    }

    // The top-left tile of the range always has a right neighbor
    let (&(x, y), base) = by_coord.iter().min_by_key(|(k, _)| **k).unwrap();
    let right = by_coord.get(&(x + 1, y)).expect("missing neighbor tile");
    assert!((right.x - base.x - 256.0).abs() < 1.0e-9);
    assert!((right.y - base.y).abs() < 1.0e-9);
}
