//! Weighted shortest-path search over the four-connected tile grid.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use colored_trails_core::{
    Color, Path, PlannerTuning, Position, SimulationError, TileMap, TokenBundle, TokenSnapshot,
};

use crate::field::DistanceField;

/// Unweighted shortest path from `from` to `goal`.
///
/// Ties between equally short routes are broken by preferring the
/// lexicographically smaller cell at every step.
pub fn shortest_path(
    from: Position,
    goal: Position,
    tiles: &TileMap,
) -> Result<Option<Path>, SimulationError> {
    let _ = tiles.color_at(from)?;
    let _ = tiles.color_at(goal)?;
    let field = DistanceField::toward(tiles.bounds(), goal);
    Ok(field.descend(from))
}

/// Cheapest path from `from` to `goal` under `edge_weight`.
///
/// `edge_weight` receives the cell being entered and its color and returns
/// the cost of entering it, or `None` to remove the cell from the graph.
/// Equal-cost frontier entries are expanded in lexicographic cell order, so
/// identical inputs always yield the identical path.
pub fn compute_path<W>(
    from: Position,
    goal: Position,
    tiles: &TileMap,
    mut edge_weight: W,
) -> Result<Option<Path>, SimulationError>
where
    W: FnMut(Position, Color) -> Option<f64>,
{
    let _ = tiles.color_at(from)?;
    let _ = tiles.color_at(goal)?;
    if from == goal {
        return Ok(Some(Path::new(vec![from])));
    }

    let bounds = tiles.bounds();
    let cell_count = bounds.cell_count();
    let mut cost = vec![f64::INFINITY; cell_count];
    let mut previous: Vec<Option<Position>> = vec![None; cell_count];
    let mut settled = vec![false; cell_count];
    let mut frontier = BinaryHeap::new();

    let Some(start_index) = bounds.index(from) else {
        return Err(SimulationError::MalformedTileMap(from));
    };
    cost[start_index] = 0.0;
    frontier.push(Reverse(Frontier {
        cost: Cost(0.0),
        cell: from,
    }));

    while let Some(Reverse(entry)) = frontier.pop() {
        let Some(index) = bounds.index(entry.cell) else {
            continue;
        };
        if settled[index] {
            continue;
        }
        settled[index] = true;

        if entry.cell == goal {
            break;
        }

        for neighbor in bounds.neighbors(entry.cell) {
            let Some(neighbor_index) = bounds.index(neighbor) else {
                continue;
            };
            if settled[neighbor_index] {
                continue;
            }

            let color = tiles.color_at(neighbor)?;
            let Some(weight) = edge_weight(neighbor, color) else {
                continue;
            };

            let candidate = entry.cost.0 + weight;
            if candidate < cost[neighbor_index] {
                cost[neighbor_index] = candidate;
                previous[neighbor_index] = Some(entry.cell);
                frontier.push(Reverse(Frontier {
                    cost: Cost(candidate),
                    cell: neighbor,
                }));
            }
        }
    }

    let Some(goal_index) = bounds.index(goal) else {
        return Err(SimulationError::MalformedTileMap(goal));
    };
    if !settled[goal_index] {
        return Ok(None);
    }

    let mut cells = vec![goal];
    let mut cursor = goal;
    while cursor != from {
        let Some(step) = bounds.index(cursor).and_then(|index| previous[index]) else {
            return Ok(None);
        };
        cells.push(step);
        cursor = step;
    }
    cells.reverse();

    Ok(Some(Path::new(cells)))
}

/// Up to `limit` distinct paths, each discouraged from reusing the interior
/// cells of the ones found before it.
///
/// After every successful search the interior cells of the new path have
/// their entry cost multiplied by `penalty`. The search stops once `limit`
/// paths are known, no path exists, or the search returns a path already
/// found.
pub fn compute_k_paths<W>(
    from: Position,
    goal: Position,
    tiles: &TileMap,
    limit: usize,
    penalty: f64,
    mut edge_weight: W,
) -> Result<Vec<Path>, SimulationError>
where
    W: FnMut(Position, Color) -> Option<f64>,
{
    let bounds = tiles.bounds();
    let mut penalized = vec![false; bounds.cell_count()];
    let mut paths: Vec<Path> = Vec::new();

    while paths.len() < limit {
        let found = compute_path(from, goal, tiles, |cell, color| {
            let weight = edge_weight(cell, color)?;
            let inflated = bounds
                .index(cell)
                .and_then(|index| penalized.get(index).copied())
                .unwrap_or(false);
            Some(if inflated { weight * penalty } else { weight })
        })?;

        let Some(path) = found else {
            break;
        };
        if paths.contains(&path) {
            break;
        }

        let cells = path.cells();
        let interior = cells.get(1..cells.len().saturating_sub(1)).unwrap_or(&[]);
        for &cell in interior {
            if let Some(flag) = bounds.index(cell).and_then(|index| penalized.get_mut(index)) {
                *flag = true;
            }
        }
        paths.push(path);
    }

    Ok(paths)
}

/// Edge weights preferring tiles the agent can already pay for, then tiles of
/// abundant colors.
///
/// Entering a tile costs `base_cost + scarcity(color) * scarcity_weight`, plus
/// `missing_token_penalty` when `held` has no token of that color. With
/// `avoid_unaffordable` set such tiles are removed instead.
pub fn scarcity_edge_weight<'a>(
    tuning: &'a PlannerTuning,
    snapshot: &'a TokenSnapshot,
    held: &'a TokenBundle,
) -> impl Fn(Position, Color) -> Option<f64> + 'a {
    move |_, color| {
        let affordable = held.has(color);
        if tuning.avoid_unaffordable && !affordable {
            return None;
        }

        let mut weight = tuning.base_cost + snapshot.scarcity_of(color) * tuning.scarcity_weight;
        if !affordable {
            weight += tuning.missing_token_penalty;
        }
        Some(weight)
    }
}

#[derive(Clone, Copy, Debug)]
struct Cost(f64);

impl PartialEq for Cost {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
struct Frontier {
    cost: Cost,
    cell: Position,
}

#[cfg(test)]
mod tests {
    use super::*;
    use colored_trails_core::GridBounds;

    fn uniform(columns: u32, rows: u32) -> TileMap {
        TileMap::from_fn(GridBounds::new(columns, rows), |_| Color::Red)
    }

    #[test]
    fn start_on_goal_yields_single_cell_path() {
        let tiles = uniform(3, 3);
        let cell = Position::new(1, 1);
        let path = compute_path(cell, cell, &tiles, |_, _| Some(1.0))
            .expect("valid tiles")
            .expect("trivially reachable");
        assert_eq!(path.cells(), &[cell]);
    }

    #[test]
    fn equal_costs_break_ties_lexicographically() {
        let tiles = uniform(2, 2);
        let path = compute_path(Position::new(0, 0), Position::new(1, 1), &tiles, |_, _| Some(1.0))
            .expect("valid tiles")
            .expect("reachable");
        assert_eq!(
            path.cells(),
            &[Position::new(0, 0), Position::new(0, 1), Position::new(1, 1)]
        );
    }

    #[test]
    fn removed_cells_can_disconnect_the_goal() {
        let tiles = uniform(3, 1);
        let wall = Position::new(1, 0);
        let path = compute_path(Position::new(0, 0), Position::new(2, 0), &tiles, |cell, _| {
            (cell != wall).then_some(1.0)
        })
        .expect("valid tiles");
        assert!(path.is_none());
    }

    #[test]
    fn endpoints_outside_the_map_are_malformed() {
        let tiles = uniform(2, 2);
        let outside = Position::new(5, 5);
        assert_eq!(
            compute_path(Position::new(0, 0), outside, &tiles, |_, _| Some(1.0)),
            Err(SimulationError::MalformedTileMap(outside))
        );
        assert_eq!(
            shortest_path(outside, Position::new(0, 0), &tiles),
            Err(SimulationError::MalformedTileMap(outside))
        );
    }

    #[test]
    fn k_paths_are_distinct_and_bounded() {
        let tiles = uniform(3, 3);
        let paths = compute_k_paths(
            Position::new(0, 0),
            Position::new(2, 2),
            &tiles,
            3,
            10.0,
            |_, _| Some(1.0),
        )
        .expect("valid tiles");

        assert!(!paths.is_empty());
        assert!(paths.len() <= 3);
        for (index, path) in paths.iter().enumerate() {
            assert_eq!(path.origin(), Some(Position::new(0, 0)));
            assert_eq!(path.destination(), Some(Position::new(2, 2)));
            assert!(!paths[..index].contains(path), "duplicate path returned");
        }
    }

    #[test]
    fn k_paths_in_a_corridor_stop_after_the_only_route() {
        let tiles = uniform(4, 1);
        let paths = compute_k_paths(
            Position::new(0, 0),
            Position::new(3, 0),
            &tiles,
            5,
            10.0,
            |_, _| Some(1.0),
        )
        .expect("valid tiles");
        assert_eq!(paths.len(), 1);
    }

    #[test]
    fn missing_tokens_raise_edge_cost() {
        let tuning = PlannerTuning::default();
        let snapshot = TokenSnapshot::default();
        let held: TokenBundle = [(Color::Red, 1)].into_iter().collect();
        let weight = scarcity_edge_weight(&tuning, &snapshot, &held);

        assert_eq!(weight(Position::new(0, 0), Color::Red), Some(1.0));
        assert_eq!(weight(Position::new(0, 0), Color::Blue), Some(4.0));
    }

    #[test]
    fn unaffordable_tiles_are_removed_on_request() {
        let tuning = PlannerTuning {
            avoid_unaffordable: true,
            ..PlannerTuning::default()
        };
        let snapshot = TokenSnapshot::default();
        let held = TokenBundle::new();
        let weight = scarcity_edge_weight(&tuning, &snapshot, &held);
        assert_eq!(weight(Position::new(0, 0), Color::Blue), None);
    }
}
