#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Colored Trails simulation.

mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use colored_trails_core::{Event, TerminationReason};
use colored_trails_system_rounds::Coordinator;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::settings::Overrides;

#[derive(Parser, Debug)]
#[command(name = "colored-trails")]
#[command(version)]
#[command(about = "Colored Trails path-selection and token-negotiation simulation")]
struct Cli {
    /// TOML run configuration; the built-in scenario runs when omitted
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Log filter, overriding RUST_LOG
    #[arg(long)]
    log_level: Option<String>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    print_config: bool,

    #[command(flatten)]
    overrides: Overrides,
}

/// Entry point for the Colored Trails command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_level.as_deref());

    let mut config = settings::load(cli.config.as_deref())?;
    cli.overrides.apply(&mut config);
    if cli.print_config {
        let rendered =
            toml::to_string_pretty(&config).context("failed to render the configuration")?;
        print!("{rendered}");
        return Ok(());
    }

    let mut coordinator =
        Coordinator::from_config(&config).context("failed to set up the simulation")?;
    let mut events = Vec::new();
    let reason = coordinator
        .run(&mut events)
        .context("simulation aborted on an invariant violation")?;
    info!(events = events.len(), "run finished");

    let transfers = events
        .iter()
        .filter(|event| matches!(event, Event::OfferPlaced { .. }))
        .count();
    println!(
        "{} after {} rounds, {transfers} transfers",
        describe(reason),
        coordinator.round()
    );
    for standing in coordinator.scores()? {
        println!(
            "{} at {}{} holding {} tokens: score {}",
            standing.agent,
            standing.position,
            if standing.goal_reached { " (goal)" } else { "" },
            standing.tokens,
            standing.score
        );
    }
    Ok(())
}

fn init_tracing(level: Option<&str>) {
    let filter = match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn describe(reason: TerminationReason) -> String {
    match reason {
        TerminationReason::GoalReached(agent) => format!("{agent} reached its goal"),
        TerminationReason::AgentStuck(agent) => format!("{agent} got stuck"),
        TerminationReason::AllAgentsRetired => "every agent finished".to_owned(),
        TerminationReason::RoundLimit => "round limit hit".to_owned(),
    }
}
