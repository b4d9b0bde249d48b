//! Per-agent state carried between rounds.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{Color, Path, Position, SimulationError, TokenBundle};

/// Unique identifier assigned to an agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "agent-{}", self.0)
    }
}

/// A player on the board: position, tokens, plan and progress counters.
///
/// Token mutation goes through [`Agent::spend`], [`Agent::give`] and
/// [`Agent::receive`] so a count can never be observed below zero.
#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    id: AgentId,
    origin: Position,
    position: Position,
    goal: Position,
    tokens: TokenBundle,
    path: Path,
    needs: TokenBundle,
    blocked_steps: u32,
    goal_reached: bool,
    trade_history: BTreeMap<AgentId, f64>,
}

impl Agent {
    /// Places a fresh agent at `position` holding `tokens`.
    #[must_use]
    pub fn new(id: AgentId, position: Position, goal: Position, tokens: TokenBundle) -> Self {
        Self {
            id,
            origin: position,
            position,
            goal,
            tokens,
            path: Path::unreachable(),
            needs: TokenBundle::new(),
            blocked_steps: 0,
            goal_reached: position == goal,
            trade_history: BTreeMap::new(),
        }
    }

    /// Identifier of the agent.
    #[must_use]
    pub const fn id(&self) -> AgentId {
        self.id
    }

    /// Position the agent started the run on.
    #[must_use]
    pub const fn origin(&self) -> Position {
        self.origin
    }

    /// Position the agent currently occupies.
    #[must_use]
    pub const fn position(&self) -> Position {
        self.position
    }

    /// Cell the agent is trying to reach.
    #[must_use]
    pub const fn goal(&self) -> Position {
        self.goal
    }

    /// Tokens currently held.
    #[must_use]
    pub const fn tokens(&self) -> &TokenBundle {
        &self.tokens
    }

    /// Path chosen during the latest decision phase.
    #[must_use]
    pub const fn path(&self) -> &Path {
        &self.path
    }

    /// Needs declared during the latest decision phase.
    #[must_use]
    pub const fn needs(&self) -> &TokenBundle {
        &self.needs
    }

    /// Consecutive rounds the agent failed to advance.
    #[must_use]
    pub const fn blocked_steps(&self) -> u32 {
        self.blocked_steps
    }

    /// Whether the agent stands on its goal.
    #[must_use]
    pub const fn goal_reached(&self) -> bool {
        self.goal_reached
    }

    /// Reciprocity score accumulated toward `peer`.
    #[must_use]
    pub fn history_with(&self, peer: AgentId) -> f64 {
        self.trade_history.get(&peer).copied().unwrap_or(0.0)
    }

    /// All reciprocity scores keyed by peer.
    #[must_use]
    pub const fn trade_history(&self) -> &BTreeMap<AgentId, f64> {
        &self.trade_history
    }

    /// Initial Manhattan distance closed so far, clamped to `[0, 1]`.
    #[must_use]
    pub fn progress_ratio(&self) -> f64 {
        let initial = self.origin.manhattan_distance(self.goal);
        if initial == 0 {
            return 1.0;
        }
        let current = self.position.manhattan_distance(self.goal);
        let closed = f64::from(initial) - f64::from(current);
        (closed / f64::from(initial)).clamp(0.0, 1.0)
    }

    /// Records the outcome of the decision phase.
    pub fn adopt_plan(&mut self, path: Path, needs: TokenBundle) {
        self.path = path;
        self.needs = needs;
    }

    /// Adds tokens handed over by peers.
    pub fn receive(&mut self, incoming: &TokenBundle) -> Result<(), SimulationError> {
        self.tokens
            .merge(incoming)
            .map_err(|source| SimulationError::InvalidTokenState { agent: self.id, source })
    }

    /// Removes tokens being handed to a peer.
    pub fn give(&mut self, color: Color, amount: u32) -> Result<(), SimulationError> {
        self.tokens
            .debit(color, amount)
            .map_err(|source| SimulationError::InvalidTokenState { agent: self.id, source })
    }

    /// Consumes one token of `color` and moves onto `next`.
    pub fn spend(&mut self, color: Color, next: Position) -> Result<(), SimulationError> {
        self.give(color, 1)?;
        self.position = next;
        self.path.advance();
        self.blocked_steps = 0;
        if self.position == self.goal {
            self.goal_reached = true;
        }
        Ok(())
    }

    /// Notes a round in which the agent could not move.
    pub fn mark_blocked(&mut self) {
        self.blocked_steps = self.blocked_steps.saturating_add(1);
    }

    /// Replaces the reciprocity score toward `peer`.
    pub fn set_history(&mut self, peer: AgentId, score: f64) {
        let _ = self.trade_history.insert(peer, score);
    }

    /// Rewrites every reciprocity score with `update`.
    pub fn update_history<F>(&mut self, mut update: F)
    where
        F: FnMut(f64) -> f64,
    {
        for score in self.trade_history.values_mut() {
            *score = update(*score);
        }
    }
}
