//! Unweighted distance field used for plain shortest paths.

use std::collections::VecDeque;

use colored_trails_core::{GridBounds, Path, Position};

/// Dense Manhattan-step distances to a single goal cell.
///
/// Distances are produced by a reverse breadth-first search from the goal.
/// Every tile is traversable, so only a goal outside the bounds leaves cells at
/// the `u32::MAX` sentinel.
#[derive(Clone, Debug)]
pub(crate) struct DistanceField {
    bounds: GridBounds,
    distances: Vec<u32>,
}

impl DistanceField {
    /// Builds the field toward `goal`.
    pub(crate) fn toward(bounds: GridBounds, goal: Position) -> Self {
        let mut distances = vec![u32::MAX; bounds.cell_count()];
        let mut queue = VecDeque::new();

        if let Some(index) = bounds.index(goal) {
            distances[index] = 0;
            queue.push_back(goal);
        }

        while let Some(cell) = queue.pop_front() {
            let Some(current_index) = bounds.index(cell) else {
                continue;
            };
            let next_distance = distances[current_index].saturating_add(1);

            for neighbor in bounds.neighbors(cell) {
                let Some(neighbor_index) = bounds.index(neighbor) else {
                    continue;
                };

                if distances[neighbor_index] <= next_distance {
                    continue;
                }

                distances[neighbor_index] = next_distance;
                queue.push_back(neighbor);
            }
        }

        Self { bounds, distances }
    }

    /// Distance captured for the provided cell, if it lies within the field.
    pub(crate) fn distance(&self, cell: Position) -> Option<u32> {
        self.bounds
            .index(cell)
            .and_then(|index| self.distances.get(index).copied())
    }

    /// Follows the distance gradient from `from` down to the goal.
    ///
    /// Among equally close neighbours the lexicographically smallest cell is
    /// taken. Returns `None` when `from` cannot reach the goal.
    pub(crate) fn descend(&self, from: Position) -> Option<Path> {
        let mut distance = self.distance(from).filter(|&value| value != u32::MAX)?;
        let mut cells = Vec::with_capacity(usize::try_from(distance).unwrap_or(0) + 1);
        let mut cell = from;
        cells.push(cell);

        while distance > 0 {
            let next = self
                .bounds
                .neighbors(cell)
                .filter(|&neighbor| self.distance(neighbor) == Some(distance - 1))
                .min()?;
            cell = next;
            distance -= 1;
            cells.push(cell);
        }

        Some(Path::new(cells))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corridor_distances_count_down_to_the_east_end() {
        let goal = Position::new(4, 0);
        let field = DistanceField::toward(GridBounds::new(5, 1), goal);

        for column in 0..5 {
            assert_eq!(field.distance(Position::new(column, 0)), Some(4 - column));
        }
        assert_eq!(field.distance(Position::new(5, 0)), None);

        let path = field.descend(Position::new(1, 0)).expect("reachable");
        assert_eq!(path.cells().len(), 4);
        assert_eq!(path.cells().last(), Some(&goal));
    }

    #[test]
    fn descend_prefers_lexicographically_smaller_cells() {
        let goal = Position::new(2, 2);
        let field = DistanceField::toward(GridBounds::new(3, 3), goal);
        let path = field.descend(Position::new(0, 0)).expect("reachable");

        assert_eq!(
            path.cells(),
            &[
                Position::new(0, 0),
                Position::new(0, 1),
                Position::new(0, 2),
                Position::new(1, 2),
                Position::new(2, 2),
            ]
        );
    }

    #[test]
    fn goal_off_the_board_reaches_nothing() {
        let field = DistanceField::toward(GridBounds::new(2, 2), Position::new(6, 6));

        assert_eq!(field.distance(Position::new(1, 1)), Some(u32::MAX));
        assert!(field.descend(Position::new(0, 0)).is_none());
        assert!(field.descend(Position::new(3, 0)).is_none());
    }
}
