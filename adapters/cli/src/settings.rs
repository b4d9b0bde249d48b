//! Run configuration loading and command-line overrides.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use colored_trails_core::{
    PlanningMode, SimulationConfig, StrategyKind, TerminationPolicy, VisitOrder,
};

/// Negotiation strategy selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum StrategyArg {
    Greedy,
    Collaborative,
    Strategic,
}

/// Path planning mode selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum PlannerArg {
    Shortest,
    ScarcityAware,
    MultiPath,
}

/// Negotiation visitation order selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum OrderArg {
    Ascending,
    Seeded,
}

/// Termination policy selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum TerminationArg {
    HaltOnAny,
    HaltOnAll,
}

/// Flags layered over the loaded configuration.
#[derive(Args, Debug, Default)]
pub(crate) struct Overrides {
    /// Seed for random tile colors
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Negotiation strategy every agent runs
    #[arg(long, value_enum)]
    pub(crate) strategy: Option<StrategyArg>,

    /// Path planning mode
    #[arg(long, value_enum)]
    pub(crate) planner: Option<PlannerArg>,

    /// Negotiation visitation order
    #[arg(long, value_enum)]
    pub(crate) order: Option<OrderArg>,

    /// Seed for the shuffled visitation order; implies `--order seeded`
    #[arg(long)]
    pub(crate) order_seed: Option<u64>,

    /// Whole-run termination policy
    #[arg(long, value_enum)]
    pub(crate) termination: Option<TerminationArg>,

    /// Maximum number of rounds
    #[arg(long)]
    pub(crate) max_rounds: Option<u32>,
}

impl Overrides {
    pub(crate) fn apply(&self, config: &mut SimulationConfig) {
        if let Some(seed) = self.seed {
            config.world.seed = seed;
        }
        if let Some(strategy) = self.strategy {
            config.negotiation.strategy = match strategy {
                StrategyArg::Greedy => StrategyKind::Greedy,
                StrategyArg::Collaborative => StrategyKind::Collaborative,
                StrategyArg::Strategic => StrategyKind::Strategic,
            };
        }
        if let Some(planner) = self.planner {
            config.planner.mode = match planner {
                PlannerArg::Shortest => PlanningMode::Shortest,
                PlannerArg::ScarcityAware => PlanningMode::ScarcityAware,
                PlannerArg::MultiPath => PlanningMode::MultiPath,
            };
        }
        match (self.order, self.order_seed) {
            (Some(OrderArg::Ascending), _) => config.rules.visit_order = VisitOrder::AscendingId,
            (Some(OrderArg::Seeded), seed) | (None, seed @ Some(_)) => {
                config.rules.visit_order = VisitOrder::Seeded {
                    seed: seed.unwrap_or_default(),
                };
            }
            (None, None) => {}
        }
        if let Some(termination) = self.termination {
            config.rules.termination = match termination {
                TerminationArg::HaltOnAny => TerminationPolicy::HaltOnAny,
                TerminationArg::HaltOnAll => TerminationPolicy::HaltOnAll,
            };
        }
        if let Some(max_rounds) = self.max_rounds {
            config.rules.max_rounds = max_rounds;
        }
    }
}

/// Reads a TOML run configuration, or the built-in scenario when `path` is absent.
pub(crate) fn load(path: Option<&Path>) -> Result<SimulationConfig> {
    let Some(path) = path else {
        return Ok(SimulationConfig::default());
    };
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to read configuration from {}", path.display()))?;
    toml::from_str(&source)
        .with_context(|| format!("failed to parse configuration in {}", path.display()))
}
