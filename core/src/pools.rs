//! Per-round message channels owned by the round coordinator.

use std::collections::BTreeMap;

use crate::{AgentId, Color, SimulationError, TokenBundle, TokenError};

/// Needs declared by each agent during the decision phase.
///
/// Each agent may publish once per round. Lookups for unknown agents yield an
/// empty bundle rather than an error.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NeedsPool {
    entries: BTreeMap<AgentId, TokenBundle>,
}

impl NeedsPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the needs of `agent`.
    ///
    /// Returns `false` and leaves the pool untouched when the agent already
    /// published this round.
    pub fn publish(&mut self, agent: AgentId, needs: TokenBundle) -> bool {
        if self.entries.contains_key(&agent) {
            return false;
        }
        let _ = self.entries.insert(agent, needs);
        true
    }

    /// Needs published by `agent`, or an empty bundle.
    #[must_use]
    pub fn needs_of(&self, agent: AgentId) -> &TokenBundle {
        static EMPTY: TokenBundle = TokenBundle::EMPTY;
        self.entries.get(&agent).unwrap_or(&EMPTY)
    }

    /// Reports whether `agent` published this round.
    #[must_use]
    pub fn contains(&self, agent: AgentId) -> bool {
        self.entries.contains_key(&agent)
    }

    /// Iterates published entries in ascending agent order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &TokenBundle)> + '_ {
        self.entries.iter().map(|(&agent, needs)| (agent, needs))
    }

    /// Per-color sum of every published need.
    ///
    /// Fails with the publishing agent's id when a sum would overflow.
    pub fn totals(&self) -> Result<TokenBundle, SimulationError> {
        let mut totals = TokenBundle::new();
        for (&agent, needs) in &self.entries {
            totals
                .merge(needs)
                .map_err(|source| SimulationError::InvalidTokenState { agent, source })?;
        }
        Ok(totals)
    }

    /// Number of agents that published.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nobody published.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Empties the pool, returning its previous contents.
    pub fn take(&mut self) -> NeedsPool {
        std::mem::take(self)
    }
}

/// Single token hand-over placed during negotiation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Transfer {
    /// Agent giving the tokens.
    pub from: AgentId,
    /// Agent receiving the tokens.
    pub to: AgentId,
    /// Color of the tokens moved.
    pub color: Color,
    /// Number of tokens moved.
    pub amount: u32,
}

/// Incoming transfers accumulated per recipient during negotiation.
///
/// Contributions from several senders are summed, never overwritten. The
/// individual transfers are retained so the totals can be audited.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OffersPool {
    incoming: BTreeMap<AgentId, TokenBundle>,
    ledger: Vec<Transfer>,
}

impl OffersPool {
    /// Creates an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transfer to the recipient's entry.
    ///
    /// A transfer that would overflow the entry is neither applied nor recorded.
    pub fn deposit(&mut self, transfer: Transfer) -> Result<(), TokenError> {
        if transfer.amount == 0 {
            return Ok(());
        }
        self.incoming
            .entry(transfer.to)
            .or_default()
            .credit(transfer.color, transfer.amount)?;
        self.ledger.push(transfer);
        Ok(())
    }

    /// Tokens waiting for `recipient`, or an empty bundle.
    #[must_use]
    pub fn incoming_for(&self, recipient: AgentId) -> &TokenBundle {
        static EMPTY: TokenBundle = TokenBundle::EMPTY;
        self.incoming.get(&recipient).unwrap_or(&EMPTY)
    }

    /// Every transfer deposited this round, in deposit order.
    #[must_use]
    pub fn transfers(&self) -> &[Transfer] {
        &self.ledger
    }

    /// Iterates recipient entries in ascending agent order.
    pub fn iter(&self) -> impl Iterator<Item = (AgentId, &TokenBundle)> + '_ {
        self.incoming.iter().map(|(&agent, bundle)| (agent, bundle))
    }

    /// Reports whether no transfer was deposited.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ledger.is_empty()
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.incoming.clear();
        self.ledger.clear();
    }
}
