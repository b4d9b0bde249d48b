use colored_trails_core::{Agent, MoveOutcome, SimulationError, TileMap, TokenBundle};
use tracing::debug;

/// Credits `incoming` to the agent, then attempts one step along its path.
///
/// The step succeeds when the agent holds a token of the next tile's color,
/// which is consumed. Otherwise the blocked-step counter grows. An empty path
/// counts as blocked unless the agent already stands on its goal.
pub fn resolve(
    agent: &mut Agent,
    incoming: &TokenBundle,
    tiles: &TileMap,
) -> Result<MoveOutcome, SimulationError> {
    agent.receive(incoming)?;

    let Some(next) = agent.path().next_step() else {
        if agent.goal_reached() {
            return Ok(MoveOutcome::Idle);
        }
        agent.mark_blocked();
        return Ok(MoveOutcome::Blocked { missing: None });
    };

    let color = tiles.color_at(next)?;
    if !agent.tokens().has(color) {
        agent.mark_blocked();
        debug!(agent = %agent.id(), %color, blocked = agent.blocked_steps(), "missing token");
        return Ok(MoveOutcome::Blocked {
            missing: Some(color),
        });
    }

    let from = agent.position();
    agent.spend(color, next)?;
    Ok(MoveOutcome::Advanced {
        from,
        to: next,
        spent: color,
    })
}
