use colored_trails_core::{AgentId, NegotiationTuning, SimulationError, TokenBundle};
use tracing::trace;

use crate::turn::{consume, Turn};
use crate::NegotiationStrategy;

/// Favours peers that can pay back: a peer scores by what its surplus could
/// cover of the giver's own needs, less a discount on what the giver hands over.
#[derive(Clone, Debug)]
pub struct Strategic {
    tuning: NegotiationTuning,
}

impl Strategic {
    /// Creates the strategy with the provided weights.
    #[must_use]
    pub fn new(tuning: NegotiationTuning) -> Self {
        Self { tuning }
    }

    /// Expected value of trading with `recipient` given the giver's `excess`.
    #[must_use]
    pub fn expected_value(&self, turn: &Turn<'_>, recipient: AgentId, excess: &TokenBundle) -> f64 {
        let needs = turn.needs();
        let giver = turn.giver();

        let give: u32 = needs
            .needs_of(recipient)
            .iter()
            .map(|(color, _)| turn.outstanding(recipient, color).min(excess.count(color)))
            .sum();
        let peer_surplus = turn.snapshot().surplus_of(recipient);
        let receivable: u32 = needs
            .needs_of(giver.id())
            .iter()
            .map(|(color, wanted)| wanted.min(peer_surplus.count(color)))
            .sum();

        f64::from(receivable) - self.tuning.strategic_give_discount * f64::from(give)
            + self.tuning.history_weight * giver.history_with(recipient)
    }
}

impl NegotiationStrategy for Strategic {
    fn name(&self) -> &'static str {
        "strategic"
    }

    fn negotiate(&self, turn: &mut Turn<'_>) -> Result<(), SimulationError> {
        let giver = turn.giver().id();
        let mut excess = turn.reservable_surplus()?;
        let needs = turn.needs();

        let view: &Turn<'_> = turn;
        let mut ranked: Vec<(AgentId, f64)> = view
            .recipients()
            .map(|(recipient, _)| (recipient, self.expected_value(view, recipient, &excess)))
            .collect();
        ranked.sort_by(|left, right| right.1.total_cmp(&left.1).then(left.0.cmp(&right.0)));

        for (recipient, value) in ranked {
            trace!(%giver, %recipient, value, "strategic candidate");
            for (color, _) in needs.needs_of(recipient).iter() {
                let amount = turn.outstanding(recipient, color).min(excess.count(color));
                if amount == 0 {
                    continue;
                }
                turn.offer(recipient, color, amount)?;
                consume(&mut excess, giver, color, amount)?;
            }
        }

        Ok(())
    }
}
