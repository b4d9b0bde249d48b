#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Colored Trails engine.
//!
//! This crate defines the values that flow between the world model, the pure
//! systems and the round coordinator. Agents hold [`TokenBundle`]s, plan a
//! [`Path`] across a fixed [`TileMap`], publish their deficits into a
//! [`NeedsPool`] and hand tokens to each other through an [`OffersPool`].
//! Every phase reports what happened as [`Event`] values so runs can be
//! replayed and compared deterministically.

mod agent;
mod config;
mod error;
mod grid;
mod path;
mod pools;
mod snapshot;
mod tokens;

pub use agent::{Agent, AgentId};
pub use config::{
    AgentConfig, NegotiationTuning, PlannerTuning, PlanningMode, ReciprocityRule, RoundRules,
    SimulationConfig, StrategyKind, TerminationPolicy, VisitOrder, WorldConfig,
};
pub use error::SimulationError;
pub use grid::{Color, GridBounds, Neighbors, Position, TileMap};
pub use path::Path;
pub use pools::{NeedsPool, OffersPool, Transfer};
pub use snapshot::{TokenSnapshot, SCARCITY_SENTINEL};
pub use tokens::{TokenBundle, TokenError};

/// Phases of the round state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RoundPhase {
    /// Between rounds; pools are empty.
    Idle,
    /// Agents plan paths and publish needs.
    Deciding,
    /// Agents take turns placing offers.
    Negotiating,
    /// Offers are credited and agents attempt a move.
    Resolving,
    /// The run is over; further rounds are refused.
    Terminated,
}

/// Result of a single agent's move attempt during resolution.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveOutcome {
    /// The agent paid a token and stepped onto the next cell.
    Advanced {
        /// Cell left behind.
        from: Position,
        /// Cell now occupied.
        to: Position,
        /// Color of the token spent.
        spent: Color,
    },
    /// The agent could not move this round.
    Blocked {
        /// Color the agent lacked, or `None` when it had no route at all.
        missing: Option<Color>,
    },
    /// The agent no longer takes part in movement.
    Idle,
}

/// Reason the coordinator stopped a run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TerminationReason {
    /// An agent reached its goal.
    GoalReached(AgentId),
    /// An agent stayed blocked for the configured number of rounds.
    AgentStuck(AgentId),
    /// Every agent either reached its goal or got stuck.
    AllAgentsRetired,
    /// The run hit its configured round cap.
    RoundLimit,
}

/// Events broadcast by the round coordinator while executing a round.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// A new round began.
    RoundStarted {
        /// One-based index of the round.
        round: u32,
    },
    /// Negotiation visitation order chosen for the round.
    VisitOrderChosen {
        /// Agents in the order they negotiate.
        order: Vec<AgentId>,
    },
    /// An agent finished deciding and published its needs.
    NeedsPublished {
        /// Publishing agent.
        agent: AgentId,
        /// Number of moves in the chosen path.
        path_steps: usize,
        /// Deficit declared for that path.
        needs: TokenBundle,
    },
    /// Tokens were handed from one agent to another.
    OfferPlaced {
        /// The transfer as deposited in the offers pool.
        transfer: Transfer,
    },
    /// Incoming offers were added to an agent's bundle.
    OffersCredited {
        /// Receiving agent.
        agent: AgentId,
        /// Tokens credited.
        tokens: TokenBundle,
    },
    /// An agent moved one cell.
    AgentAdvanced {
        /// Moving agent.
        agent: AgentId,
        /// Cell left behind.
        from: Position,
        /// Cell now occupied.
        to: Position,
        /// Color of the token spent.
        spent: Color,
    },
    /// An agent failed to move this round.
    AgentBlocked {
        /// Blocked agent.
        agent: AgentId,
        /// Consecutive blocked rounds including this one.
        blocked_steps: u32,
        /// Color the agent lacked, or `None` when no route existed.
        missing: Option<Color>,
    },
    /// An agent arrived on its goal.
    GoalReached {
        /// Arriving agent.
        agent: AgentId,
        /// Round in which it arrived.
        round: u32,
    },
    /// The coordinator stopped the run.
    SimulationTerminated {
        /// Why the run stopped.
        reason: TerminationReason,
        /// Number of completed rounds.
        rounds: u32,
    },
}
