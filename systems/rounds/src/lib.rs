#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Round coordinator driving decide, negotiate and resolve across all agents.
//!
//! The coordinator owns the agents, the world and both per-round pools. Each
//! call to [`Coordinator::step`] runs exactly one phase and reports what it
//! did as [`Event`] values; [`Coordinator::play_round`] and
//! [`Coordinator::run`] are conveniences layered on top.

mod order;
mod resolve;
mod score;

use colored_trails_core::{
    Agent, AgentId, Event, MoveOutcome, NeedsPool, OffersPool, Path, Position, RoundPhase,
    RoundRules, SimulationConfig, SimulationError, TerminationPolicy, TerminationReason,
    TileMap, TokenBundle, TokenSnapshot,
};
use colored_trails_system_negotiation::NegotiationEngine;
use colored_trails_system_planning::{compute_needs, PathPlanner};
use colored_trails_system_scarcity::analyze;
use colored_trails_world::{query, World, WorldError};
use thiserror::Error;
use tracing::{debug, info};

use crate::order::VisitScheduler;

pub use resolve::resolve;
pub use score::{score, UNREACHABLE_STEPS};

/// Reasons a coordinator cannot be assembled from a configuration.
#[derive(Debug, Error)]
pub enum SetupError {
    /// The board could not be built.
    #[error("invalid world: {0}")]
    World(#[from] WorldError),
    /// The agent roster is inconsistent with the board.
    #[error("invalid agents: {0}")]
    Agents(#[from] SimulationError),
}

/// Final standing of one agent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AgentScore {
    /// Agent the score belongs to.
    pub agent: AgentId,
    /// Cell the agent finished on.
    pub position: Position,
    /// Whether the agent reached its goal.
    pub goal_reached: bool,
    /// Tokens left in the agent's bundle.
    pub tokens: u32,
    /// Score as computed by [`score`].
    pub score: i64,
}

/// Owns the simulation state and sequences its phases.
#[derive(Debug)]
pub struct Coordinator {
    world: World,
    agents: Vec<Agent>,
    needs: NeedsPool,
    previous_needs: NeedsPool,
    offers: OffersPool,
    phase: RoundPhase,
    round: u32,
    rules: RoundRules,
    planner: PathPlanner,
    negotiation: NegotiationEngine,
    scheduler: VisitScheduler,
    termination: Option<TerminationReason>,
}

impl Coordinator {
    /// Creates a coordinator over an existing world and agent roster.
    ///
    /// Agents are kept in ascending identifier order. Duplicate identifiers
    /// and positions or goals outside the board are rejected.
    pub fn new(
        world: World,
        mut agents: Vec<Agent>,
        rules: RoundRules,
        planner: PathPlanner,
        negotiation: NegotiationEngine,
    ) -> Result<Self, SimulationError> {
        agents.sort_by_key(Agent::id);
        for pair in agents.windows(2) {
            if pair[0].id() == pair[1].id() {
                return Err(SimulationError::DuplicateAgent(pair[1].id()));
            }
        }
        let tiles = query::tile_map(&world);
        for agent in &agents {
            let _ = tiles.color_at(agent.position())?;
            let _ = tiles.color_at(agent.goal())?;
        }

        let scheduler = VisitScheduler::new(rules.visit_order.clone());
        Ok(Self {
            world,
            agents,
            needs: NeedsPool::new(),
            previous_needs: NeedsPool::new(),
            offers: OffersPool::new(),
            phase: RoundPhase::Idle,
            round: 0,
            rules,
            planner,
            negotiation,
            scheduler,
            termination: None,
        })
    }

    /// Builds the world and agents described by a run configuration.
    pub fn from_config(config: &SimulationConfig) -> Result<Self, SetupError> {
        let world = World::from_config(&config.world)?;
        let goal = query::goal(&world);
        let agents = config
            .agents
            .iter()
            .map(|agent| {
                Agent::new(
                    agent.id,
                    agent.position,
                    agent.goal.unwrap_or(goal),
                    agent.tokens.clone(),
                )
            })
            .collect();

        let coordinator = Self::new(
            world,
            agents,
            config.rules.clone(),
            PathPlanner::new(config.planner.clone()),
            NegotiationEngine::from_tuning(&config.negotiation),
        )?;
        info!(
            agents = coordinator.agents.len(),
            strategy = coordinator.negotiation.strategy_name(),
            planner = ?coordinator.planner.tuning().mode,
            "coordinator ready"
        );
        Ok(coordinator)
    }

    /// Board the agents move on.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Agents in ascending identifier order.
    #[must_use]
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    /// Looks up one agent.
    pub fn agent(&self, id: AgentId) -> Result<&Agent, SimulationError> {
        self.index_of(id).map(|index| &self.agents[index])
    }

    /// Phase most recently completed.
    #[must_use]
    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Number of rounds started so far.
    #[must_use]
    pub fn round(&self) -> u32 {
        self.round
    }

    /// Why the run stopped, once it has.
    #[must_use]
    pub fn termination(&self) -> Option<TerminationReason> {
        self.termination
    }

    /// Needs published during the current round.
    #[must_use]
    pub fn needs_pool(&self) -> &NeedsPool {
        &self.needs
    }

    /// Offers placed during the current round.
    #[must_use]
    pub fn offers_pool(&self) -> &OffersPool {
        &self.offers
    }

    /// Plans the agent's path and derives the tokens it still lacks.
    pub fn decide(
        &self,
        agent: &Agent,
        snapshot: &TokenSnapshot,
    ) -> Result<(Path, TokenBundle), SimulationError> {
        let tiles = self.tiles();
        let path = self.planner.plan(agent, tiles, snapshot)?;
        let needs = compute_needs(&path, agent.tokens(), tiles)?;
        debug!(
            agent = %agent.id(),
            steps = path.step_count(),
            %needs,
            "decided path"
        );
        Ok((path, needs))
    }

    /// Runs the phase that follows the current one and returns it.
    ///
    /// A terminated coordinator stays terminated and emits nothing.
    pub fn step(&mut self, out: &mut Vec<Event>) -> Result<RoundPhase, SimulationError> {
        self.phase = match self.phase {
            RoundPhase::Idle => {
                self.decide_phase(out)?;
                RoundPhase::Deciding
            }
            RoundPhase::Deciding => {
                self.negotiate_phase(out)?;
                RoundPhase::Negotiating
            }
            RoundPhase::Negotiating => {
                self.resolve_phase(out)?;
                RoundPhase::Resolving
            }
            RoundPhase::Resolving => self.finish_round(out),
            RoundPhase::Terminated => RoundPhase::Terminated,
        };
        Ok(self.phase)
    }

    /// Runs phases until the round in progress completes.
    pub fn play_round(&mut self, out: &mut Vec<Event>) -> Result<RoundPhase, SimulationError> {
        loop {
            match self.step(out)? {
                RoundPhase::Idle => return Ok(RoundPhase::Idle),
                RoundPhase::Terminated => return Ok(RoundPhase::Terminated),
                RoundPhase::Deciding | RoundPhase::Negotiating | RoundPhase::Resolving => {}
            }
        }
    }

    /// Plays rounds until the termination policy or the round cap stops the run.
    pub fn run(&mut self, out: &mut Vec<Event>) -> Result<TerminationReason, SimulationError> {
        loop {
            if let Some(reason) = self.termination {
                return Ok(reason);
            }
            if self.phase == RoundPhase::Idle && self.round >= self.rules.max_rounds {
                self.terminate(TerminationReason::RoundLimit, out);
                continue;
            }
            let _ = self.play_round(out)?;
        }
    }

    /// Scores every agent in ascending identifier order.
    pub fn scores(&self) -> Result<Vec<AgentScore>, SimulationError> {
        let tiles = self.tiles();
        self.agents
            .iter()
            .map(|agent| {
                Ok(AgentScore {
                    agent: agent.id(),
                    position: agent.position(),
                    goal_reached: agent.goal_reached(),
                    tokens: agent.tokens().total(),
                    score: score(agent, tiles)?,
                })
            })
            .collect()
    }

    fn decide_phase(&mut self, out: &mut Vec<Event>) -> Result<(), SimulationError> {
        self.round += 1;
        info!(round = self.round, "round started");
        out.push(Event::RoundStarted { round: self.round });

        // Plans only see state from before this round's negotiation.
        let snapshot = analyze(&self.agents, &self.previous_needs, self.tiles())?;
        let mut plans = Vec::with_capacity(self.agents.len());
        for agent in &self.agents {
            if self.is_retired(agent) {
                continue;
            }
            plans.push((agent.id(), self.decide(agent, &snapshot)?));
        }

        for (id, (path, needs)) in plans {
            let index = self.index_of(id)?;
            let path_steps = path.step_count();
            let _ = self.needs.publish(id, needs.clone());
            self.agents[index].adopt_plan(path, needs.clone());
            out.push(Event::NeedsPublished {
                agent: id,
                path_steps,
                needs,
            });
        }
        Ok(())
    }

    fn negotiate_phase(&mut self, out: &mut Vec<Event>) -> Result<(), SimulationError> {
        let tiles = query::tile_map(&self.world);
        let snapshot = analyze(&self.agents, &self.needs, tiles)?;
        let ids: Vec<AgentId> = self.agents.iter().map(Agent::id).collect();
        let order = self.scheduler.order(&ids);
        info!(round = self.round, ?order, "visitation order");
        out.push(Event::VisitOrderChosen {
            order: order.clone(),
        });

        for id in order {
            let index = self.index_of(id)?;
            let placed = self.negotiation.negotiate(
                &mut self.agents[index],
                tiles,
                &self.needs,
                &snapshot,
                &mut self.offers,
            )?;
            out.extend(
                placed
                    .into_iter()
                    .map(|transfer| Event::OfferPlaced { transfer }),
            );
        }
        Ok(())
    }

    fn resolve_phase(&mut self, out: &mut Vec<Event>) -> Result<(), SimulationError> {
        let tiles = query::tile_map(&self.world);
        let round = self.round;
        let threshold = self.rules.blocked_step_threshold;
        let policy = self.rules.termination;

        for agent in &mut self.agents {
            let id = agent.id();
            let incoming = self.offers.incoming_for(id);
            if !incoming.is_empty() {
                out.push(Event::OffersCredited {
                    agent: id,
                    tokens: incoming.clone(),
                });
            }

            if retired(agent, threshold, policy) {
                agent.receive(incoming)?;
                continue;
            }

            match resolve(agent, incoming, tiles)? {
                MoveOutcome::Advanced { from, to, spent } => {
                    debug!(agent = %id, %from, %to, %spent, "advanced");
                    out.push(Event::AgentAdvanced {
                        agent: id,
                        from,
                        to,
                        spent,
                    });
                    if agent.goal_reached() {
                        info!(agent = %id, round, "goal reached");
                        out.push(Event::GoalReached { agent: id, round });
                    }
                }
                MoveOutcome::Blocked { missing } => out.push(Event::AgentBlocked {
                    agent: id,
                    blocked_steps: agent.blocked_steps(),
                    missing,
                }),
                MoveOutcome::Idle => {}
            }
        }

        self.negotiation.close_round(&mut self.agents);
        Ok(())
    }

    fn finish_round(&mut self, out: &mut Vec<Event>) -> RoundPhase {
        self.previous_needs = self.needs.take();
        self.offers.clear();

        match self.evaluate_termination() {
            Some(reason) => {
                self.terminate(reason, out);
                RoundPhase::Terminated
            }
            None => RoundPhase::Idle,
        }
    }

    fn evaluate_termination(&self) -> Option<TerminationReason> {
        let threshold = self.rules.blocked_step_threshold;
        match self.rules.termination {
            TerminationPolicy::HaltOnAny => self.agents.iter().find_map(|agent| {
                if agent.goal_reached() {
                    Some(TerminationReason::GoalReached(agent.id()))
                } else if agent.blocked_steps() >= threshold {
                    Some(TerminationReason::AgentStuck(agent.id()))
                } else {
                    None
                }
            }),
            TerminationPolicy::HaltOnAll => self
                .agents
                .iter()
                .all(|agent| retired(agent, threshold, TerminationPolicy::HaltOnAll))
                .then_some(TerminationReason::AllAgentsRetired),
        }
    }

    fn terminate(&mut self, reason: TerminationReason, out: &mut Vec<Event>) {
        info!(?reason, rounds = self.round, "simulation terminated");
        self.phase = RoundPhase::Terminated;
        self.termination = Some(reason);
        out.push(Event::SimulationTerminated {
            reason,
            rounds: self.round,
        });
    }

    fn is_retired(&self, agent: &Agent) -> bool {
        retired(agent, self.rules.blocked_step_threshold, self.rules.termination)
    }

    fn index_of(&self, id: AgentId) -> Result<usize, SimulationError> {
        self.agents
            .binary_search_by_key(&id, Agent::id)
            .map_err(|_| SimulationError::UnknownAgent(id))
    }

    fn tiles(&self) -> &TileMap {
        query::tile_map(&self.world)
    }
}

/// Agents that reached their goal, or got stuck while the run keeps going,
/// no longer plan or move.
fn retired(agent: &Agent, threshold: u32, policy: TerminationPolicy) -> bool {
    agent.goal_reached()
        || (policy == TerminationPolicy::HaltOnAll && agent.blocked_steps() >= threshold)
}
