//! Run configuration and tuning knobs.
//!
//! Every threshold and weight the planner, negotiator and coordinator use is
//! carried here so tests and the command line can swap them per run.

use serde::{Deserialize, Serialize};

use crate::{AgentId, Color, Position, TokenBundle};

/// Complete description of a simulation run.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Board dimensions, palette and goal.
    pub world: WorldConfig,
    /// Agents placed on the board before the first round.
    pub agents: Vec<AgentConfig>,
    /// Round ordering and termination rules.
    pub rules: RoundRules,
    /// Path planner weights.
    pub planner: PlannerTuning,
    /// Negotiation strategy and weights.
    pub negotiation: NegotiationTuning,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        let agent = |id, column, row, tokens: Vec<(Color, u32)>| AgentConfig {
            id: AgentId::new(id),
            position: Position::new(column, row),
            tokens: tokens.into_iter().collect(),
            goal: None,
        };

        Self {
            world: WorldConfig::default(),
            agents: vec![
                agent(0, 0, 0, vec![(Color::Green, 1), (Color::Yellow, 1), (Color::Purple, 2)]),
                agent(1, 0, 4, vec![(Color::Green, 2), (Color::Grey, 1)]),
                agent(2, 3, 2, vec![(Color::Purple, 1), (Color::Yellow, 2), (Color::Grey, 1)]),
            ],
            rules: RoundRules::default(),
            planner: PlannerTuning::default(),
            negotiation: NegotiationTuning::default(),
        }
    }
}

/// Board description handed to the world model.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Number of tile columns.
    pub columns: u32,
    /// Number of tile rows.
    pub rows: u32,
    /// Colors random tiles are drawn from.
    pub palette: Vec<Color>,
    /// Seed for random tile colors.
    pub seed: u64,
    /// Goal shared by agents that do not declare their own.
    pub goal: Position,
    /// Explicit row-major tile colors; replaces random generation when set.
    pub layout: Option<Vec<Vec<Color>>>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            columns: 7,
            rows: 5,
            palette: vec![Color::Green, Color::Yellow, Color::Purple, Color::Grey],
            seed: 0x00c0_107e_d7a1_15u64,
            goal: Position::new(6, 4),
            layout: None,
        }
    }
}

/// Initial placement of one agent.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Identifier of the agent.
    pub id: AgentId,
    /// Starting cell.
    pub position: Position,
    /// Starting tokens.
    #[serde(default)]
    pub tokens: TokenBundle,
    /// Individual goal; the world goal applies when absent.
    #[serde(default)]
    pub goal: Option<Position>,
}

/// When the coordinator stops the whole run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TerminationPolicy {
    /// Stop as soon as any agent reaches its goal or hits the blocked-step threshold.
    #[default]
    HaltOnAny,
    /// Stop once every agent has either reached its goal or hit the threshold.
    HaltOnAll,
}

/// Order in which agents take their negotiation turn.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum VisitOrder {
    /// Ascending agent identifier every round.
    #[default]
    AscendingId,
    /// Fixed explicit order; agents missing from the list follow in ascending order.
    Explicit {
        /// Agents in the order they negotiate.
        order: Vec<AgentId>,
    },
    /// Fresh shuffle every round drawn from a generator seeded once per run.
    Seeded {
        /// Seed of the shuffle generator.
        seed: u64,
    },
}

/// Round sequencing rules.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundRules {
    /// Consecutive blocked rounds after which an agent is considered stuck.
    pub blocked_step_threshold: u32,
    /// Whole-run stopping rule.
    pub termination: TerminationPolicy,
    /// Negotiation visitation order.
    pub visit_order: VisitOrder,
    /// Upper bound on rounds a single run may execute.
    pub max_rounds: u32,
}

impl Default for RoundRules {
    fn default() -> Self {
        Self {
            blocked_step_threshold: 3,
            termination: TerminationPolicy::HaltOnAny,
            visit_order: VisitOrder::AscendingId,
            max_rounds: 100,
        }
    }
}

/// How an agent chooses its route during the decision phase.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PlanningMode {
    /// Unweighted shortest path.
    Shortest,
    /// Shortest path under scarcity-aware edge weights.
    #[default]
    ScarcityAware,
    /// Several diverse paths ranked by length and token deficit.
    MultiPath,
}

/// Path planner weights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlannerTuning {
    /// Route selection mode.
    pub mode: PlanningMode,
    /// Cost of entering any tile.
    pub base_cost: f64,
    /// Multiplier on the entered tile color's scarcity index.
    pub scarcity_weight: f64,
    /// Extra cost when the agent holds no token of the entered tile's color.
    pub missing_token_penalty: f64,
    /// Factor applied to edges entering interior cells of already found paths.
    pub diversity_penalty: f64,
    /// Maximum number of distinct paths searched in multi-path mode.
    pub path_alternatives: usize,
    /// Drop tiles the agent holds no token for before the weighted search.
    pub avoid_unaffordable: bool,
    /// Ranking weight per remaining step in multi-path mode.
    pub length_weight: f64,
    /// Ranking weight per missing token in multi-path mode.
    pub deficit_weight: f64,
}

impl Default for PlannerTuning {
    fn default() -> Self {
        Self {
            mode: PlanningMode::ScarcityAware,
            base_cost: 1.0,
            scarcity_weight: 2.0,
            missing_token_penalty: 3.0,
            diversity_penalty: 10.0,
            path_alternatives: 5,
            avoid_unaffordable: false,
            length_weight: 2.0,
            deficit_weight: 5.0,
        }
    }
}

/// Which negotiation strategy agents run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StrategyKind {
    /// Hand out surplus to peers in identifier order.
    Greedy,
    /// Priority-ordered surplus sharing with scarcity dampening and altruism.
    #[default]
    Collaborative,
    /// Score-ordered sharing that favours peers able and willing to give back.
    Strategic,
}

/// How reciprocity scores evolve.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ReciprocityRule {
    /// Scores only ever grow by `increment` per offer.
    Monotonic {
        /// Score added per offer placed.
        increment: f64,
    },
    /// Scores grow per offer and are multiplied by `retention` at round end.
    Decaying {
        /// Score added per offer placed.
        increment: f64,
        /// Fraction of the score kept after each round.
        retention: f64,
    },
}

impl Default for ReciprocityRule {
    fn default() -> Self {
        Self::Monotonic { increment: 0.5 }
    }
}

/// Negotiation weights and thresholds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NegotiationTuning {
    /// Strategy every agent runs.
    pub strategy: StrategyKind,
    /// Priority weight on a recipient's progress ratio.
    pub progress_weight: f64,
    /// Priority weight on a recipient's scarcity-weighted needs.
    pub scarcity_weight: f64,
    /// Priority weight on the reciprocity score toward a recipient.
    pub history_weight: f64,
    /// Scarcity above which offers are capped at half the remaining surplus.
    pub scarcity_dampening_threshold: f64,
    /// Progress ratio at which a recipient qualifies for altruistic offers.
    pub altruism_progress_threshold: f64,
    /// Steps of the giver's own path protected from altruistic offers.
    pub critical_horizon: usize,
    /// Weight on tokens given away when the strategic variant scores a peer.
    pub strategic_give_discount: f64,
    /// Reciprocity score update rule.
    pub reciprocity: ReciprocityRule,
}

impl Default for NegotiationTuning {
    fn default() -> Self {
        Self {
            strategy: StrategyKind::Collaborative,
            progress_weight: 5.0,
            scarcity_weight: 1.0,
            history_weight: 0.3,
            scarcity_dampening_threshold: 1.5,
            altruism_progress_threshold: 0.7,
            critical_horizon: 3,
            strategic_give_discount: 0.7,
            reciprocity: ReciprocityRule::default(),
        }
    }
}
