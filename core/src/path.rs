//! Planned routes from an agent's position toward its goal.

use crate::{Position, SimulationError, TileMap, TokenBundle};

/// Ordered sequence of positions whose first element is the owner's position
/// at planning time.
///
/// An empty path means no route was found. A single-element path means the
/// owner already stands on its goal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Path {
    cells: Vec<Position>,
}

impl Path {
    /// Wraps an ordered list of positions.
    #[must_use]
    pub fn new(cells: Vec<Position>) -> Self {
        Self { cells }
    }

    /// Path representing "no route available".
    #[must_use]
    pub fn unreachable() -> Self {
        Self::default()
    }

    /// Reports whether the path holds no positions at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Every position of the path, including the starting cell.
    #[must_use]
    pub fn cells(&self) -> &[Position] {
        &self.cells
    }

    /// Cell the path was planned from.
    #[must_use]
    pub fn origin(&self) -> Option<Position> {
        self.cells.first().copied()
    }

    /// Final cell of the path.
    #[must_use]
    pub fn destination(&self) -> Option<Position> {
        self.cells.last().copied()
    }

    /// Positions that still need to be stepped onto.
    #[must_use]
    pub fn steps(&self) -> &[Position] {
        self.cells.get(1..).unwrap_or(&[])
    }

    /// Number of moves the path still requires.
    #[must_use]
    pub fn step_count(&self) -> usize {
        self.steps().len()
    }

    /// Next cell to step onto, if any.
    #[must_use]
    pub fn next_step(&self) -> Option<Position> {
        self.steps().first().copied()
    }

    /// Drops the starting cell after the owner moved onto the next step.
    pub fn advance(&mut self) {
        if !self.cells.is_empty() {
            let _ = self.cells.remove(0);
        }
    }

    /// Tokens needed to walk every remaining step.
    pub fn requirement(&self, tiles: &TileMap) -> Result<TokenBundle, SimulationError> {
        tally(self.steps(), tiles)
    }

    /// Tokens needed to walk the next `horizon` steps.
    pub fn requirement_within(
        &self,
        tiles: &TileMap,
        horizon: usize,
    ) -> Result<TokenBundle, SimulationError> {
        let steps = self.steps();
        tally(steps.get(..horizon.min(steps.len())).unwrap_or(&[]), tiles)
    }
}

fn tally(cells: &[Position], tiles: &TileMap) -> Result<TokenBundle, SimulationError> {
    let mut bundle = TokenBundle::new();
    for &cell in cells {
        bundle.tally(tiles.color_at(cell)?, 1);
    }
    Ok(bundle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, GridBounds};

    fn striped() -> TileMap {
        TileMap::from_fn(GridBounds::new(4, 1), |cell| {
            if cell.column() % 2 == 0 {
                Color::Red
            } else {
                Color::Blue
            }
        })
    }

    fn corridor() -> Path {
        Path::new((0..4).map(|column| Position::new(column, 0)).collect())
    }

    #[test]
    fn requirement_skips_the_starting_cell() {
        let requirement = corridor().requirement(&striped()).expect("tiles exist");
        assert_eq!(requirement.count(Color::Red), 1);
        assert_eq!(requirement.count(Color::Blue), 2);
    }

    #[test]
    fn requirement_within_horizon_is_truncated() {
        let tiles = striped();
        let path = corridor();
        let near = path.requirement_within(&tiles, 1).expect("tiles exist");
        assert_eq!(near.iter().collect::<Vec<_>>(), vec![(Color::Blue, 1)]);

        let beyond = path.requirement_within(&tiles, 10).expect("tiles exist");
        assert_eq!(beyond, path.requirement(&tiles).expect("tiles exist"));
    }

    #[test]
    fn advance_consumes_the_origin() {
        let mut path = corridor();
        path.advance();
        assert_eq!(path.origin(), Some(Position::new(1, 0)));
        assert_eq!(path.next_step(), Some(Position::new(2, 0)));
        assert_eq!(path.step_count(), 2);
    }

    #[test]
    fn empty_path_has_no_steps() {
        let path = Path::unreachable();
        assert!(path.is_empty());
        assert_eq!(path.next_step(), None);
        assert!(path.requirement(&striped()).expect("nothing to look up").is_empty());
    }
}
