use thiserror::Error;

use crate::{AgentId, Position, TokenError};

/// Conditions that abort a simulation run.
///
/// Pathfinding and negotiation shortfalls are never reported here; they are
/// absorbed by the blocked-step counter instead.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SimulationError {
    /// A token count would have gone negative or overflowed.
    #[error("{agent} reached an invalid token state")]
    InvalidTokenState {
        /// Agent whose bundle was being changed.
        agent: AgentId,
        /// Underlying bundle failure.
        source: TokenError,
    },
    /// A position was looked up that the tile map does not cover.
    #[error("tile map has no color for position {0}")]
    MalformedTileMap(Position),
    /// A coordinator-level command referenced an agent that does not exist.
    #[error("{0} is not registered with the coordinator")]
    UnknownAgent(AgentId),
    /// Two agents were registered under the same identifier.
    #[error("{0} is registered more than once")]
    DuplicateAgent(AgentId),
}
