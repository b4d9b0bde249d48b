#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Token negotiation between agents.
//!
//! During the negotiation phase each agent, in visitation order, runs the
//! configured [`NegotiationStrategy`] against the round's needs pool. Offers
//! are debited from the giver immediately and parked in the offers pool until
//! the resolving phase credits them to their recipients.

mod collaborative;
mod greedy;
mod reciprocity;
mod strategic;
mod turn;

use std::fmt;

use colored_trails_core::{
    Agent, NeedsPool, NegotiationTuning, OffersPool, SimulationError, StrategyKind, TileMap,
    TokenSnapshot, Transfer,
};
use tracing::debug;

pub use collaborative::Collaborative;
pub use greedy::Greedy;
pub use reciprocity::{
    reciprocity_from, DecayingReciprocity, MonotonicReciprocity, ReciprocityScoring,
};
pub use strategic::Strategic;
pub use turn::Turn;

/// Decides which peers receive a giver's tokens and how many.
pub trait NegotiationStrategy: fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Places every offer the giver makes this turn.
    fn negotiate(&self, turn: &mut Turn<'_>) -> Result<(), SimulationError>;
}

/// Builds the strategy selected by the tuning.
#[must_use]
pub fn strategy_for(tuning: &NegotiationTuning) -> Box<dyn NegotiationStrategy> {
    match tuning.strategy {
        StrategyKind::Greedy => Box::new(Greedy),
        StrategyKind::Collaborative => Box::new(Collaborative::new(tuning.clone())),
        StrategyKind::Strategic => Box::new(Strategic::new(tuning.clone())),
    }
}

/// Runs negotiation turns with one strategy and one reciprocity rule.
#[derive(Debug)]
pub struct NegotiationEngine {
    strategy: Box<dyn NegotiationStrategy>,
    reciprocity: Box<dyn ReciprocityScoring>,
}

impl NegotiationEngine {
    /// Creates an engine from explicit parts.
    #[must_use]
    pub fn new(
        strategy: Box<dyn NegotiationStrategy>,
        reciprocity: Box<dyn ReciprocityScoring>,
    ) -> Self {
        Self {
            strategy,
            reciprocity,
        }
    }

    /// Creates the engine described by the tuning.
    #[must_use]
    pub fn from_tuning(tuning: &NegotiationTuning) -> Self {
        Self::new(strategy_for(tuning), reciprocity_from(tuning.reciprocity))
    }

    /// Name of the active strategy.
    #[must_use]
    pub fn strategy_name(&self) -> &'static str {
        self.strategy.name()
    }

    /// Runs one agent's negotiation turn and returns the transfers it placed.
    pub fn negotiate(
        &self,
        giver: &mut Agent,
        tiles: &TileMap,
        needs: &NeedsPool,
        snapshot: &TokenSnapshot,
        offers: &mut OffersPool,
    ) -> Result<Vec<Transfer>, SimulationError> {
        let id = giver.id();
        let mut turn = Turn::new(
            giver,
            tiles,
            needs,
            snapshot,
            offers,
            self.reciprocity.as_ref(),
        );
        self.strategy.negotiate(&mut turn)?;
        let placed = turn.finish();
        debug!(
            agent = %id,
            strategy = self.strategy.name(),
            offers = placed.len(),
            "negotiation turn finished"
        );
        Ok(placed)
    }

    /// Applies end-of-round reciprocity updates to every agent.
    pub fn close_round(&self, agents: &mut [Agent]) {
        for agent in agents {
            agent.update_history(|score| self.reciprocity.on_round_end(score));
        }
    }
}

impl Default for NegotiationEngine {
    fn default() -> Self {
        Self::from_tuning(&NegotiationTuning::default())
    }
}
