use colored_trails_core::{AgentId, SimulationError};

use crate::turn::{consume, Turn};
use crate::NegotiationStrategy;

/// Hands surplus to peers in ascending identifier order until it runs out.
#[derive(Clone, Copy, Debug, Default)]
pub struct Greedy;

impl NegotiationStrategy for Greedy {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn negotiate(&self, turn: &mut Turn<'_>) -> Result<(), SimulationError> {
        let giver = turn.giver().id();
        let mut reservable = turn.reservable_surplus()?;
        let recipients: Vec<AgentId> = turn.recipients().map(|(recipient, _)| recipient).collect();
        let needs = turn.needs();

        for recipient in recipients {
            for (color, _) in needs.needs_of(recipient).iter() {
                let amount = turn.outstanding(recipient, color).min(reservable.count(color));
                if amount == 0 {
                    continue;
                }
                turn.offer(recipient, color, amount)?;
                consume(&mut reservable, giver, color, amount)?;
            }
        }

        Ok(())
    }
}
