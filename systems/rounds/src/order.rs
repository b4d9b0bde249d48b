use colored_trails_core::{AgentId, VisitOrder};
use rand::{seq::SliceRandom, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::warn;

/// Produces the negotiation visitation order for every round.
#[derive(Clone, Debug)]
pub(crate) struct VisitScheduler {
    policy: VisitOrder,
    rng: Option<ChaCha8Rng>,
}

impl VisitScheduler {
    pub(crate) fn new(policy: VisitOrder) -> Self {
        let rng = match policy {
            VisitOrder::Seeded { seed } => Some(ChaCha8Rng::seed_from_u64(seed)),
            VisitOrder::AscendingId | VisitOrder::Explicit { .. } => None,
        };
        Self { policy, rng }
    }

    /// Orders `agents`, which must be sorted ascending.
    pub(crate) fn order(&mut self, agents: &[AgentId]) -> Vec<AgentId> {
        match &self.policy {
            VisitOrder::AscendingId => agents.to_vec(),
            VisitOrder::Explicit { order } => {
                let mut visited = Vec::with_capacity(agents.len());
                for &id in order {
                    if agents.binary_search(&id).is_err() {
                        warn!(agent = %id, "visit order names an unknown agent");
                        continue;
                    }
                    if !visited.contains(&id) {
                        visited.push(id);
                    }
                }
                for &id in agents {
                    if !visited.contains(&id) {
                        visited.push(id);
                    }
                }
                visited
            }
            VisitOrder::Seeded { .. } => {
                let mut shuffled = agents.to_vec();
                if let Some(rng) = self.rng.as_mut() {
                    shuffled.shuffle(rng);
                }
                shuffled
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(values: &[u32]) -> Vec<AgentId> {
        values.iter().copied().map(AgentId::new).collect()
    }

    #[test]
    fn explicit_order_appends_unlisted_agents_and_skips_unknown_ones() {
        let mut scheduler = VisitScheduler::new(VisitOrder::Explicit {
            order: ids(&[3, 9, 1, 3]),
        });
        assert_eq!(scheduler.order(&ids(&[1, 2, 3])), ids(&[3, 1, 2]));
    }

    #[test]
    fn seeded_order_is_a_reproducible_permutation() {
        let agents = ids(&[0, 1, 2, 3, 4, 5]);
        let mut first = VisitScheduler::new(VisitOrder::Seeded { seed: 7 });
        let mut second = VisitScheduler::new(VisitOrder::Seeded { seed: 7 });

        for _ in 0..4 {
            let left = first.order(&agents);
            assert_eq!(left, second.order(&agents));
            let mut sorted = left.clone();
            sorted.sort();
            assert_eq!(sorted, agents);
        }
    }
}
