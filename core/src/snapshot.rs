//! Derived, per-round view of the token economy.

use std::collections::BTreeMap;

use crate::{AgentId, Color, TokenBundle};

/// Scarcity reported for a color that somebody needs while nobody holds any.
pub const SCARCITY_SENTINEL: f64 = 10.0;

/// Global token snapshot recomputed from scratch before every negotiation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TokenSnapshot {
    /// Tokens held across all agents, per color.
    pub total_available: TokenBundle,
    /// Tokens declared as needed in the needs pool, per color.
    pub total_needed: TokenBundle,
    /// Scarcity index for every color that is either held or needed.
    pub scarcity: BTreeMap<Color, f64>,
    /// Progress ratio of every agent.
    pub progress: BTreeMap<AgentId, f64>,
    /// Tokens each agent holds beyond its own remaining path requirement.
    pub surplus: BTreeMap<AgentId, TokenBundle>,
}

impl TokenSnapshot {
    /// Scarcity index of `color`; colors nobody holds or needs score zero.
    #[must_use]
    pub fn scarcity_of(&self, color: Color) -> f64 {
        self.scarcity.get(&color).copied().unwrap_or(0.0)
    }

    /// Progress ratio of `agent`; unknown agents score zero.
    #[must_use]
    pub fn progress_of(&self, agent: AgentId) -> f64 {
        self.progress.get(&agent).copied().unwrap_or(0.0)
    }

    /// Estimated spare tokens of `agent`, or an empty bundle.
    #[must_use]
    pub fn surplus_of(&self, agent: AgentId) -> &TokenBundle {
        static EMPTY: TokenBundle = TokenBundle::EMPTY;
        self.surplus.get(&agent).unwrap_or(&EMPTY)
    }

    /// Scarcity-weighted size of a needs bundle: `sum(scarcity(c) * need(c))`.
    #[must_use]
    pub fn weighted_need(&self, needs: &TokenBundle) -> f64 {
        needs
            .iter()
            .map(|(color, amount)| self.scarcity_of(color) * f64::from(amount))
            .sum()
    }
}
