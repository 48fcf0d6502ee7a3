use crate::grid::coords::TileCoord;
use crossbeam_channel::{bounded, Receiver, Sender};

/// Most notifications kept pending when nothing drains the channel;
/// beyond this the grid discards the oldest first
pub(crate) const EVENT_BACKLOG: usize = 1024;

/// Notifications the grid reports upward while it works.
///
/// Consumers poll the receiver returned by
/// [`TileGrid::events`](crate::grid::manager::TileGrid::events); the grid
/// itself never blocks on the channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// A tile element was created and its load kicked off
    TileRequested(TileCoord),
    /// The backend reported a successful load
    TileLoaded(TileCoord),
    /// The backend reported a failure; the tile stays tracked in the
    /// error state and is not retried
    TileError { coord: TileCoord, message: String },
    /// A tile was pruned and its element removed
    TileUnloaded(TileCoord),
    /// A new integer-zoom level was created
    LevelCreated(u8),
    /// An empty, non-current level was discarded
    LevelRemoved(u8),
}

/// Sender/receiver pair used inside the grid
pub(crate) fn channel() -> (Sender<GridEvent>, Receiver<GridEvent>) {
    bounded(EVENT_BACKLOG)
}
