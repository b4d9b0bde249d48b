#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Scarcity analysis over every agent's holdings and declared needs.

use std::collections::{BTreeMap, BTreeSet};

use colored_trails_core::{
    Agent, Color, NeedsPool, SimulationError, TileMap, TokenBundle, TokenSnapshot,
    SCARCITY_SENTINEL,
};
use tracing::trace;

/// Scarcity index of a color given its total demand and supply.
///
/// Zero when nothing is needed, [`SCARCITY_SENTINEL`] when something is
/// needed but nobody holds any, otherwise `needed / available`.
#[must_use]
pub fn scarcity_index(needed: u32, available: u32) -> f64 {
    if needed == 0 {
        0.0
    } else if available == 0 {
        SCARCITY_SENTINEL
    } else {
        f64::from(needed) / f64::from(available)
    }
}

/// Builds the global token snapshot from scratch.
///
/// Available tokens are summed over every agent's bundle, needed tokens over
/// the needs pool. Per-agent surplus is what each agent holds beyond the
/// requirement of its current path.
pub fn analyze(
    agents: &[Agent],
    needs: &NeedsPool,
    tiles: &TileMap,
) -> Result<TokenSnapshot, SimulationError> {
    let mut total_available = TokenBundle::new();
    let mut progress = BTreeMap::new();
    let mut surplus = BTreeMap::new();

    for agent in agents {
        total_available
            .merge(agent.tokens())
            .map_err(|source| SimulationError::InvalidTokenState {
                agent: agent.id(),
                source,
            })?;
        let _ = progress.insert(agent.id(), agent.progress_ratio());
        let requirement = agent.path().requirement(tiles)?;
        let _ = surplus.insert(agent.id(), agent.tokens().surplus_over(&requirement));
    }

    let total_needed = needs.totals()?;
    let colors: BTreeSet<Color> = total_available
        .iter()
        .chain(total_needed.iter())
        .map(|(color, _)| color)
        .collect();
    let scarcity = colors
        .into_iter()
        .map(|color| {
            let index = scarcity_index(total_needed.count(color), total_available.count(color));
            (color, index)
        })
        .collect();

    let snapshot = TokenSnapshot {
        total_available,
        total_needed,
        scarcity,
        progress,
        surplus,
    };
    trace!(?snapshot, "token snapshot recomputed");
    Ok(snapshot)
}
