use colored_trails_core::{AgentId, NegotiationTuning, SimulationError, TokenBundle};
use tracing::trace;

use crate::turn::{consume, Turn};
use crate::NegotiationStrategy;

/// Priority-ordered surplus sharing with scarcity dampening and an altruistic
/// second pass for peers close to their goal.
#[derive(Clone, Debug)]
pub struct Collaborative {
    tuning: NegotiationTuning,
}

impl Collaborative {
    /// Creates the strategy with the provided weights and thresholds.
    #[must_use]
    pub fn new(tuning: NegotiationTuning) -> Self {
        Self { tuning }
    }

    /// Claim of `recipient` on the giver's surplus.
    ///
    /// `progress * progress_weight + sum(scarcity * need) * scarcity_weight
    /// + history * history_weight`.
    #[must_use]
    pub fn priority(&self, turn: &Turn<'_>, recipient: AgentId, needs: &TokenBundle) -> f64 {
        let snapshot = turn.snapshot();
        snapshot.progress_of(recipient) * self.tuning.progress_weight
            + snapshot.weighted_need(needs) * self.tuning.scarcity_weight
            + turn.giver().history_with(recipient) * self.tuning.history_weight
    }

    /// Recipients sorted by descending priority, ties by ascending identifier.
    #[must_use]
    pub fn ranked_recipients(&self, turn: &Turn<'_>) -> Vec<(AgentId, f64)> {
        let mut ranked: Vec<(AgentId, f64)> = turn
            .recipients()
            .map(|(recipient, needs)| (recipient, self.priority(turn, recipient, needs)))
            .collect();
        ranked.sort_by(|left, right| right.1.total_cmp(&left.1).then(left.0.cmp(&right.0)));
        ranked
    }

    fn share_surplus(
        &self,
        turn: &mut Turn<'_>,
        ranked: &[(AgentId, f64)],
    ) -> Result<(), SimulationError> {
        let giver = turn.giver().id();
        let mut reservable = turn.reservable_surplus()?;
        let needs = turn.needs();
        let snapshot = turn.snapshot();

        for &(recipient, priority) in ranked {
            trace!(%giver, %recipient, priority, "considering recipient");
            for (color, _) in needs.needs_of(recipient).iter() {
                let spare = reservable.count(color);
                if spare == 0 {
                    continue;
                }

                let cap = if snapshot.scarcity_of(color) > self.tuning.scarcity_dampening_threshold {
                    spare / 2
                } else {
                    spare
                };
                let amount = turn.outstanding(recipient, color).min(cap);
                if amount == 0 {
                    continue;
                }

                turn.offer(recipient, color, amount)?;
                consume(&mut reservable, giver, color, amount)?;
            }
        }

        Ok(())
    }

    fn help_nearly_finished(
        &self,
        turn: &mut Turn<'_>,
        ranked: &[(AgentId, f64)],
    ) -> Result<(), SimulationError> {
        let critical = turn.critical_need(self.tuning.critical_horizon)?;
        let needs = turn.needs();
        let snapshot = turn.snapshot();

        for &(recipient, _) in ranked {
            if snapshot.progress_of(recipient) < self.tuning.altruism_progress_threshold {
                continue;
            }

            for (color, _) in needs.needs_of(recipient).iter() {
                let spare = turn
                    .giver()
                    .tokens()
                    .count(color)
                    .saturating_sub(critical.count(color));
                let amount = turn.outstanding(recipient, color).min(spare);
                if amount == 0 {
                    continue;
                }

                trace!(giver = %turn.giver().id(), %recipient, %color, amount, "altruistic offer");
                turn.offer(recipient, color, amount)?;
            }
        }

        Ok(())
    }
}

impl NegotiationStrategy for Collaborative {
    fn name(&self) -> &'static str {
        "collaborative"
    }

    fn negotiate(&self, turn: &mut Turn<'_>) -> Result<(), SimulationError> {
        let ranked = self.ranked_recipients(turn);
        self.share_surplus(turn, &ranked)?;
        self.help_nearly_finished(turn, &ranked)
    }
}
