use colored_trails_core::{Agent, SimulationError, TileMap};
use colored_trails_system_planning::shortest_path;

/// Remaining-step estimate used when no path to the goal exists.
pub const UNREACHABLE_STEPS: usize = 7;

/// End-of-run score of one agent.
///
/// Agents at their goal score `100 + 5 * tokens`. Everyone else scores
/// `5 * tokens - 10 * remaining_steps`, where the remaining steps come from
/// the unweighted shortest path to the goal.
pub fn score(agent: &Agent, tiles: &TileMap) -> Result<i64, SimulationError> {
    let tokens = i64::from(agent.tokens().total());
    if agent.goal_reached() {
        return Ok(100 + 5 * tokens);
    }

    let remaining = shortest_path(agent.position(), agent.goal(), tiles)?
        .map_or(UNREACHABLE_STEPS, |path| path.step_count());
    let remaining = i64::try_from(remaining).unwrap_or(i64::MAX / 10);
    Ok(5 * tokens - 10 * remaining)
}
