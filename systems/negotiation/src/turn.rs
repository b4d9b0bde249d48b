//! A single agent's negotiation turn and the bookkeeping every strategy shares.

use colored_trails_core::{
    Agent, AgentId, Color, NeedsPool, OffersPool, SimulationError, TileMap, TokenBundle,
    TokenSnapshot, Transfer,
};
use tracing::debug;

use crate::ReciprocityScoring;

/// Mutable context handed to a strategy while one agent negotiates.
///
/// Every offer goes through [`Turn::offer`], which debits the giver, deposits
/// into the offers pool and updates the giver's reciprocity score in one step.
#[derive(Debug)]
pub struct Turn<'a> {
    giver: &'a mut Agent,
    tiles: &'a TileMap,
    needs: &'a NeedsPool,
    snapshot: &'a TokenSnapshot,
    offers: &'a mut OffersPool,
    reciprocity: &'a dyn ReciprocityScoring,
    placed: Vec<Transfer>,
}

impl<'a> Turn<'a> {
    /// Opens a turn for `giver`.
    pub fn new(
        giver: &'a mut Agent,
        tiles: &'a TileMap,
        needs: &'a NeedsPool,
        snapshot: &'a TokenSnapshot,
        offers: &'a mut OffersPool,
        reciprocity: &'a dyn ReciprocityScoring,
    ) -> Self {
        Self {
            giver,
            tiles,
            needs,
            snapshot,
            offers,
            reciprocity,
            placed: Vec::new(),
        }
    }

    /// Agent whose turn it is.
    #[must_use]
    pub fn giver(&self) -> &Agent {
        self.giver
    }

    /// Needs published this round.
    #[must_use]
    pub fn needs(&self) -> &'a NeedsPool {
        self.needs
    }

    /// Token snapshot computed before negotiation started.
    #[must_use]
    pub fn snapshot(&self) -> &'a TokenSnapshot {
        self.snapshot
    }

    /// Published needs of every agent except the giver, in ascending order.
    pub fn recipients(&self) -> impl Iterator<Item = (AgentId, &'a TokenBundle)> + 'a {
        let giver = self.giver.id();
        self.needs.iter().filter(move |(agent, _)| *agent != giver)
    }

    /// Part of the recipient's declared need not yet covered by offers this round.
    #[must_use]
    pub fn outstanding(&self, recipient: AgentId, color: Color) -> u32 {
        let declared = self.needs.needs_of(recipient).count(color);
        let incoming = self.offers.incoming_for(recipient).count(color);
        declared.saturating_sub(incoming)
    }

    /// Tokens the giver holds beyond what its own remaining path requires.
    pub fn reservable_surplus(&self) -> Result<TokenBundle, SimulationError> {
        let requirement = self.giver.path().requirement(self.tiles)?;
        Ok(self.giver.tokens().surplus_over(&requirement))
    }

    /// Tokens the giver needs for the next `horizon` steps of its path.
    pub fn critical_need(&self, horizon: usize) -> Result<TokenBundle, SimulationError> {
        self.giver.path().requirement_within(self.tiles, horizon)
    }

    /// Hands `amount` tokens of `color` to `recipient`.
    ///
    /// Fails with an invalid token state when the giver does not hold them.
    pub fn offer(
        &mut self,
        recipient: AgentId,
        color: Color,
        amount: u32,
    ) -> Result<(), SimulationError> {
        if amount == 0 {
            return Ok(());
        }

        self.giver.give(color, amount)?;
        let transfer = Transfer {
            from: self.giver.id(),
            to: recipient,
            color,
            amount,
        };
        self.offers
            .deposit(transfer)
            .map_err(|source| SimulationError::InvalidTokenState {
                agent: recipient,
                source,
            })?;

        let score = self
            .reciprocity
            .on_offer(self.giver.history_with(recipient), amount);
        self.giver.set_history(recipient, score);

        debug!(
            from = %transfer.from,
            to = %transfer.to,
            %color,
            amount,
            "offer placed"
        );
        self.placed.push(transfer);
        Ok(())
    }

    /// Transfers placed during this turn, in placement order.
    #[must_use]
    pub fn placed(&self) -> &[Transfer] {
        &self.placed
    }

    /// Closes the turn, yielding the transfers placed.
    #[must_use]
    pub fn finish(self) -> Vec<Transfer> {
        self.placed
    }
}

/// Removes `amount` from a strategy's private ledger of spare tokens.
pub(crate) fn consume(
    ledger: &mut TokenBundle,
    giver: AgentId,
    color: Color,
    amount: u32,
) -> Result<(), SimulationError> {
    ledger
        .debit(color, amount)
        .map_err(|source| SimulationError::InvalidTokenState { agent: giver, source })
}
