//! Headless rescue runner
//!
//! Drives the reference mansion to a terminal status and prints the result
//! with the full event log as JSON (or a short text summary).

use clap::Parser;
use mansion_rescue::mansion::BoardConfig;
use mansion_rescue::sim::{Event, Simulation};
use serde::Serialize;

/// Headless runner for the mansion rescue simulation
#[derive(Parser, Debug)]
#[command(name = "rescue_runner")]
#[command(about = "Run the mansion rescue simulation to a terminal status")]
struct Args {
    /// Number of agents in the roster (roles alternate)
    #[arg(long, default_value_t = 6)]
    agents: usize,

    /// Maximum rounds before giving up (safety ceiling)
    #[arg(long, default_value_t = 1000)]
    max_rounds: u32,

    /// Random seed for deterministic runs
    #[arg(long)]
    seed: Option<u64>,

    /// Output format: json or text
    #[arg(long, default_value = "json")]
    format: String,
}

/// JSON output structure
#[derive(Serialize)]
struct RunResult<'a> {
    status: String,
    defeat_reason: Option<String>,
    rounds: u32,
    rescued: u32,
    casualties: u32,
    damage: u32,
    seed: u64,
    agents: Vec<AgentSummary>,
    steps: &'a [Event],
}

#[derive(Serialize)]
struct AgentSummary {
    id: u32,
    role: String,
    position: (i32, i32),
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let args = Args::parse();
    let seed = args.seed.unwrap_or_else(rand::random);

    let config = BoardConfig::reference_layout();
    let mut sim = match Simulation::new(&config, args.agents, seed) {
        Ok(sim) => sim,
        Err(e) => {
            eprintln!("invalid board configuration: {e}");
            std::process::exit(1);
        }
    };

    while !sim.is_finished() && sim.round_index() < args.max_rounds {
        sim.step();
    }

    let agents = sim
        .agents()
        .iter()
        .map(|agent| AgentSummary {
            id: agent.id().0,
            role: format!("{:?}", agent.role()).to_lowercase(),
            position: (agent.position().x, agent.position().y),
        })
        .collect();

    let result = RunResult {
        status: format!("{:?}", sim.status()),
        defeat_reason: sim.defeat_reason().map(|r| format!("{r:?}")),
        rounds: sim.round_index(),
        rescued: sim.rescued_count(),
        casualties: sim.casualties_count(),
        damage: sim.damage_counter(),
        seed,
        agents,
        steps: sim.events(),
    };

    match args.format.as_str() {
        "text" => {
            println!("Simulation Result");
            println!("=================");
            println!("Status: {}", result.status);
            if let Some(reason) = &result.defeat_reason {
                println!("Defeat reason: {reason}");
            }
            println!("Rounds: {}", result.rounds);
            println!("Rescued: {}", result.rescued);
            println!("Casualties: {}", result.casualties);
            println!("Structural damage: {}", result.damage);
            println!("Events: {}", result.steps.len());
            println!("Seed: {}", result.seed);
        }
        _ => match serde_json::to_string_pretty(&result) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("failed to serialize result: {e}"),
        },
    }
}
