#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative board state for Colored Trails.
//!
//! The world owns the grid bounds, the tile-color map and the shared goal.
//! It is fixed once constructed; systems read it exclusively through the
//! [`query`] functions.

use colored_trails_core::{
    Color, GridBounds, Position, SimulationError, TileMap, WorldConfig,
};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::debug;

/// Reasons a world cannot be built from its configuration.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The grid has no cells.
    #[error("grid must have at least one column and one row, got {columns}x{rows}")]
    EmptyGrid {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Random generation was requested without any colors to draw from.
    #[error("tile palette is empty")]
    EmptyPalette,
    /// The goal lies outside the grid.
    #[error("goal {0} lies outside the grid")]
    GoalOutOfBounds(Position),
    /// The explicit layout is ragged or absent cells.
    #[error(transparent)]
    Layout(#[from] SimulationError),
}

/// Represents the immutable Colored Trails board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct World {
    tiles: TileMap,
    goal: Position,
}

impl World {
    /// Wraps an existing tile map with a goal.
    pub fn new(tiles: TileMap, goal: Position) -> Result<Self, WorldError> {
        let bounds = tiles.bounds();
        if bounds.cell_count() == 0 {
            return Err(WorldError::EmptyGrid {
                columns: bounds.columns(),
                rows: bounds.rows(),
            });
        }
        if !bounds.contains(goal) {
            return Err(WorldError::GoalOutOfBounds(goal));
        }

        Ok(Self { tiles, goal })
    }

    /// Builds a board where every tile has the same color.
    pub fn uniform(bounds: GridBounds, color: Color, goal: Position) -> Result<Self, WorldError> {
        Self::new(TileMap::from_fn(bounds, |_| color), goal)
    }

    /// Builds a board with tile colors drawn uniformly from `palette`.
    ///
    /// The same seed, bounds and palette always produce the same board.
    pub fn generate(
        bounds: GridBounds,
        palette: &[Color],
        seed: u64,
        goal: Position,
    ) -> Result<Self, WorldError> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut failed = false;
        let tiles = TileMap::from_fn(bounds, |_| match palette.choose(&mut rng) {
            Some(&color) => color,
            None => {
                failed = true;
                Color::Red
            }
        });
        if failed {
            return Err(WorldError::EmptyPalette);
        }

        debug!(
            columns = bounds.columns(),
            rows = bounds.rows(),
            seed,
            "generated random tile colors"
        );
        Self::new(tiles, goal)
    }

    /// Builds the board described by a run configuration.
    pub fn from_config(config: &WorldConfig) -> Result<Self, WorldError> {
        match &config.layout {
            Some(rows) => {
                let tiles = TileMap::from_rows(rows)?;
                Self::new(tiles, config.goal)
            }
            None => Self::generate(
                GridBounds::new(config.columns, config.rows),
                &config.palette,
                config.seed,
                config.goal,
            ),
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use colored_trails_core::{Color, GridBounds, Neighbors, Position, TileMap};

    use super::World;

    /// Provides read-only access to the tile-color map.
    #[must_use]
    pub fn tile_map(world: &World) -> &TileMap {
        &world.tiles
    }

    /// Grid dimensions of the board.
    #[must_use]
    pub fn bounds(world: &World) -> GridBounds {
        world.tiles.bounds()
    }

    /// Goal shared by agents without their own.
    #[must_use]
    pub fn goal(world: &World) -> Position {
        world.goal
    }

    /// Color of the tile at `position`, if it lies on the board.
    #[must_use]
    pub fn tile_color_at(world: &World, position: Position) -> Option<Color> {
        world.tiles.color_at(position).ok()
    }

    /// Four-connected neighbours of `position` in lexicographic order.
    #[must_use]
    pub fn neighbors(world: &World, position: Position) -> Neighbors {
        world.tiles.bounds().neighbors(position)
    }
}
