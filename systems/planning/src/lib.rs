#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic path planning and token-need computation.
//!
//! The planner turns an agent's position, goal and holdings into a [`Path`]
//! over the fixed tile map. Failure to find a route is never an error here:
//! callers receive [`Path::unreachable`] and count the round as blocked.

mod field;
mod needs;
mod planner;

use colored_trails_core::{
    Agent, Path, PlannerTuning, PlanningMode, SimulationError, TileMap, TokenBundle, TokenSnapshot,
};
use tracing::{debug, warn};

pub use needs::compute_needs;
pub use planner::{compute_k_paths, compute_path, scarcity_edge_weight, shortest_path};

/// Chooses a route for an agent according to the configured planning mode.
#[derive(Clone, Debug, Default)]
pub struct PathPlanner {
    tuning: PlannerTuning,
}

impl PathPlanner {
    /// Creates a planner using the provided tuning surface.
    #[must_use]
    pub fn new(tuning: PlannerTuning) -> Self {
        Self { tuning }
    }

    /// Tuning the planner was created with.
    #[must_use]
    pub fn tuning(&self) -> &PlannerTuning {
        &self.tuning
    }

    /// Plans a path from the agent's current position to its goal.
    ///
    /// Scarcity-aware searches that fail fall back to the unweighted shortest
    /// path; when that fails too an empty path is returned.
    pub fn plan(
        &self,
        agent: &Agent,
        tiles: &TileMap,
        snapshot: &TokenSnapshot,
    ) -> Result<Path, SimulationError> {
        let from = agent.position();
        let goal = agent.goal();

        let planned = match self.tuning.mode {
            PlanningMode::Shortest => shortest_path(from, goal, tiles)?,
            PlanningMode::ScarcityAware => {
                let weight = scarcity_edge_weight(&self.tuning, snapshot, agent.tokens());
                compute_path(from, goal, tiles, weight)?
            }
            PlanningMode::MultiPath => {
                let base_cost = self.tuning.base_cost;
                let candidates = compute_k_paths(
                    from,
                    goal,
                    tiles,
                    self.tuning.path_alternatives,
                    self.tuning.diversity_penalty,
                    |_, _| Some(base_cost),
                )?;
                debug!(agent = %agent.id(), candidates = candidates.len(), "found alternative paths");
                self.select_cheapest(candidates, agent.tokens(), tiles)?
            }
        };

        if let Some(path) = planned {
            return Ok(path);
        }

        warn!(agent = %agent.id(), %from, %goal, "preferred search failed, using plain shortest path");
        match shortest_path(from, goal, tiles)? {
            Some(path) => Ok(path),
            None => {
                warn!(agent = %agent.id(), %from, %goal, "goal unreachable");
                Ok(Path::unreachable())
            }
        }
    }

    /// Picks the path with the lowest `steps * length_weight + deficit * deficit_weight`.
    ///
    /// The first candidate wins ties.
    pub fn select_cheapest(
        &self,
        candidates: Vec<Path>,
        held: &TokenBundle,
        tiles: &TileMap,
    ) -> Result<Option<Path>, SimulationError> {
        let mut best: Option<(f64, Path)> = None;

        for path in candidates {
            let deficit = compute_needs(&path, held, tiles)?.total();
            let steps = u32::try_from(path.step_count()).unwrap_or(u32::MAX);
            let score = f64::from(steps) * self.tuning.length_weight
                + f64::from(deficit) * self.tuning.deficit_weight;

            let better = match &best {
                None => true,
                Some((best_score, _)) => score < *best_score,
            };
            if better {
                best = Some((score, path));
            }
        }

        Ok(best.map(|(_, path)| path))
    }
}
