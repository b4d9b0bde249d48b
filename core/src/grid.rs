//! Grid geometry and the fixed tile-color map.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::SimulationError;

/// Tile and token colors recognised by the simulation.
///
/// Colors carry identity only. The derived ordering exists so bundles iterate
/// deterministically and has no gameplay meaning.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Color {
    /// Red tiles and tokens.
    Red,
    /// Green tiles and tokens.
    Green,
    /// Blue tiles and tokens.
    Blue,
    /// Yellow tiles and tokens.
    Yellow,
    /// Purple tiles and tokens.
    Purple,
    /// Grey tiles and tokens.
    Grey,
    /// Orange tiles and tokens.
    Orange,
}

impl Color {
    /// Every color the simulation knows about.
    pub const ALL: [Color; 7] = [
        Color::Red,
        Color::Green,
        Color::Blue,
        Color::Yellow,
        Color::Purple,
        Color::Grey,
        Color::Orange,
    ];

    /// Lowercase name used in configuration files and logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Red => "red",
            Self::Green => "green",
            Self::Blue => "blue",
            Self::Yellow => "yellow",
            Self::Purple => "purple",
            Self::Grey => "grey",
            Self::Orange => "orange",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// The derived ordering is lexicographic over `(column, row)` and doubles as
/// the deterministic tie-break used by the path planner.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    column: u32,
    row: u32,
}

impl Position {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: Position) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }

    /// Reports whether the two positions share an edge.
    #[must_use]
    pub fn is_adjacent_to(self, other: Position) -> bool {
        self.manhattan_distance(other) == 1
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.column, self.row)
    }
}

/// Bounded, non-wrapping grid dimensions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridBounds {
    columns: u32,
    rows: u32,
}

impl GridBounds {
    /// Creates grid bounds with the provided dimensions.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns contained in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows contained in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let columns = usize::try_from(self.columns).unwrap_or(0);
        let rows = usize::try_from(self.rows).unwrap_or(0);
        columns.checked_mul(rows).unwrap_or(0)
    }

    /// Reports whether the position lies inside the grid.
    #[must_use]
    pub const fn contains(&self, position: Position) -> bool {
        position.column < self.columns && position.row < self.rows
    }

    /// Row-major offset of the position, if it lies inside the grid.
    #[must_use]
    pub fn index(&self, position: Position) -> Option<usize> {
        if !self.contains(position) {
            return None;
        }

        let width = usize::try_from(self.columns).ok()?;
        let column = usize::try_from(position.column).ok()?;
        let row = usize::try_from(position.row).ok()?;
        row.checked_mul(width)?.checked_add(column)
    }

    /// Position stored at the provided row-major offset.
    #[must_use]
    pub fn position_at(&self, index: usize) -> Option<Position> {
        if index >= self.cell_count() {
            return None;
        }

        let width = usize::try_from(self.columns).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(Position::new(column, row))
    }

    /// Iterates every position in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = Position> + '_ {
        (0..self.rows).flat_map(move |row| (0..self.columns).map(move |column| Position::new(column, row)))
    }

    /// Four-connected neighbours of the position in lexicographic order.
    #[must_use]
    pub fn neighbors(&self, position: Position) -> Neighbors {
        let mut neighbors = Neighbors::default();
        if !self.contains(position) {
            return neighbors;
        }

        if let Some(column) = position.column.checked_sub(1) {
            neighbors.push(Position::new(column, position.row));
        }
        if let Some(row) = position.row.checked_sub(1) {
            neighbors.push(Position::new(position.column, row));
        }
        if position.row + 1 < self.rows {
            neighbors.push(Position::new(position.column, position.row + 1));
        }
        if position.column + 1 < self.columns {
            neighbors.push(Position::new(position.column + 1, position.row));
        }

        neighbors
    }
}

/// Allocation-free iterator over at most four neighbouring positions.
#[derive(Clone, Debug, Default)]
pub struct Neighbors {
    buffer: [Option<Position>; 4],
    len: usize,
    cursor: usize,
}

impl Neighbors {
    fn push(&mut self, position: Position) {
        if let Some(slot) = self.buffer.get_mut(self.len) {
            *slot = Some(position);
            self.len += 1;
        }
    }
}

impl Iterator for Neighbors {
    type Item = Position;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer.get(self.cursor).copied().flatten();
        self.cursor += 1;
        value
    }
}

/// Fixed mapping from every grid position to its tile color.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TileMap {
    bounds: GridBounds,
    colors: Vec<Color>,
}

impl TileMap {
    /// Builds a tile map by evaluating `color_of` for every position.
    #[must_use]
    pub fn from_fn<F>(bounds: GridBounds, mut color_of: F) -> Self
    where
        F: FnMut(Position) -> Color,
    {
        let colors = bounds.positions().map(&mut color_of).collect();
        Self { bounds, colors }
    }

    /// Builds a tile map from row-major rows of colors.
    ///
    /// Every row must have the same length as the first; a ragged layout is
    /// reported as a malformed tile map at the first missing cell.
    pub fn from_rows(rows: &[Vec<Color>]) -> Result<Self, SimulationError> {
        let width = rows.first().map_or(0, Vec::len);
        let columns = u32::try_from(width).unwrap_or(u32::MAX);
        let row_count = u32::try_from(rows.len()).unwrap_or(u32::MAX);
        let mut colors = Vec::with_capacity(width.saturating_mul(rows.len()));

        for (row_index, row) in rows.iter().enumerate() {
            if row.len() != width {
                let column = u32::try_from(row.len().min(width)).unwrap_or(u32::MAX);
                let row = u32::try_from(row_index).unwrap_or(u32::MAX);
                return Err(SimulationError::MalformedTileMap(Position::new(column, row)));
            }
            colors.extend_from_slice(row);
        }

        Ok(Self {
            bounds: GridBounds::new(columns, row_count),
            colors,
        })
    }

    /// Dimensions covered by the map.
    #[must_use]
    pub const fn bounds(&self) -> GridBounds {
        self.bounds
    }

    /// Color of the tile at `position`.
    ///
    /// A position outside the map signals a corrupted world and is fatal.
    pub fn color_at(&self, position: Position) -> Result<Color, SimulationError> {
        self.bounds
            .index(position)
            .and_then(|index| self.colors.get(index).copied())
            .ok_or(SimulationError::MalformedTileMap(position))
    }

    /// Iterates `(position, color)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Position, Color)> + '_ {
        self.bounds.positions().zip(self.colors.iter().copied())
    }
}
