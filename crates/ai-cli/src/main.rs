//! `goap` - plan and simulate goal-driven agents from YAML domain files.
//!
//! - `goap check <file>` - validate a domain
//! - `goap plan <file>` - plan for the domain's goals (or `--goal` overrides)
//! - `goap run <file>` - simulate one agent tick by tick and print its trace

mod domain;
mod sim;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use ai_core::{ActionOutcome, ConditionStore, TickContext};
use ai_goap::{AgentState, GoapAgent, GoapPlanner, Plan, PlanContext};
use ai_tools::{SharedTraceLog, TraceEvent};
use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use crate::domain::{parse_condition, Domain, SimCatalog};
use crate::sim::ScriptFactory;

#[derive(Parser)]
#[command(name = "goap")]
#[command(about = "Plan and simulate goal-driven agents", version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a domain file
    Check {
        file: PathBuf,
    },

    /// Plan for the domain's goals
    Plan {
        file: PathBuf,

        /// Goal to plan for instead of the domain's (`Name`, `Name=bool`, `!Name`); repeatable
        #[arg(long = "goal")]
        goals: Vec<String>,

        /// Seed for probability resolvers
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Simulate one agent pursuing the domain's goals
    Run {
        file: PathBuf,

        /// Upper bound on simulated ticks
        #[arg(long, default_value_t = 100)]
        ticks: u64,

        /// Seed for probability resolvers
        #[arg(long, default_value_t = 0)]
        seed: u64,

        /// Seconds per tick
        #[arg(long, default_value_t = 0.1)]
        dt: f32,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check { file } => check(&file),
        Commands::Plan {
            file,
            goals,
            seed,
            json,
        } => plan(&file, &goals, seed, json),
        Commands::Run {
            file,
            ticks,
            seed,
            dt,
            json,
        } => run(&file, ticks, seed, dt, json),
    }
}

#[derive(Debug, Serialize)]
struct PlanReport {
    goal: Option<String>,
    successful: bool,
    steps: Vec<String>,
    cost: f32,
    failure: Option<String>,
}

impl PlanReport {
    fn new(plan: &Plan, catalog: &SimCatalog) -> Self {
        Self {
            goal: plan.goal().map(ToString::to_string),
            successful: plan.is_successful(),
            steps: plan.names(catalog).into_iter().map(String::from).collect(),
            cost: plan.cost(),
            failure: plan.failure().map(|f| f.to_string()),
        }
    }
}

#[derive(Serialize)]
struct RunReport<'a> {
    ticks: u64,
    state: &'a str,
    outcome: Option<&'static str>,
    plan: PlanReport,
    world: &'a ConditionStore,
    beliefs: &'a ConditionStore,
    trace: &'a [TraceEvent],
}

fn check(path: &Path) -> Result<()> {
    let domain = Domain::load(path)?;
    let catalog = domain.catalog()?;

    println!(
        "{}: ok ({} actions, {} resolvers, {} goals)",
        path.display(),
        catalog.len(),
        domain.resolvers.len(),
        domain.goals.len()
    );
    for condition in domain.dead_conditions()? {
        println!("  warning: nothing can make {condition} hold");
    }
    Ok(())
}

fn plan(path: &Path, goal_overrides: &[String], seed: u64, json: bool) -> Result<()> {
    let domain = Domain::load(path)?;
    let goals = if goal_overrides.is_empty() {
        domain.goal_conditions()?
    } else {
        goal_overrides
            .iter()
            .map(|text| parse_condition(text))
            .collect::<Result<Vec<_>>>()?
    };
    if goals.is_empty() {
        bail!("{} has no goals; pass --goal", path.display());
    }

    let catalog = domain.catalog()?;
    let planner = GoapPlanner::new(domain.planner);
    let world = domain.initial_world();
    let beliefs = domain.initial_beliefs();
    let tick = TickContext::new(0, 0.0).with_seed(seed);
    let ctx = PlanContext::new(&tick, 0, &world, &beliefs);

    let mut reports = Vec::with_capacity(goals.len());
    for goal in &goals {
        let plan = planner.plan(&catalog, goal, &ctx)?;
        info!(goal = %goal, successful = plan.is_successful(), "planned");
        if !json {
            println!("{}", plan.describe(&catalog));
        }
        reports.push(PlanReport::new(&plan, &catalog));
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }
    Ok(())
}

fn run(path: &Path, max_ticks: u64, seed: u64, dt: f32, json: bool) -> Result<()> {
    let domain = Domain::load(path)?;
    let goals = domain.goal_conditions()?;
    if goals.is_empty() {
        bail!("{} has no goals to pursue", path.display());
    }

    let catalog = Arc::new(domain.catalog()?);
    let mut world = domain.initial_world();
    let trace = SharedTraceLog::new();
    let mut agent = GoapAgent::new(0, Arc::clone(&catalog), ScriptFactory)?
        .with_planner(GoapPlanner::new(domain.planner))
        .with_config(domain.agent)
        .with_beliefs(domain.initial_beliefs())
        .with_trace_sink(trace.clone());
    agent.set_goals(goals)?;

    info!(domain = %path.display(), max_ticks, seed, "simulation started");

    let mut ctx = TickContext::new(0, dt).with_seed(seed);
    let mut ticks = 0;
    while ticks < max_ticks {
        agent.tick(&ctx, &mut world)?;
        ticks += 1;
        ctx = ctx.next();
        // the first tick always leaves Idle, so Idle afterwards means the agent settled
        if agent.state() == AgentState::Idle {
            break;
        }
    }

    let outcome = agent.last_outcome().map(|outcome| match outcome {
        ActionOutcome::Success => "success",
        ActionOutcome::Failed => "failed",
    });
    info!(ticks, state = agent.state_name(), "simulation stopped");

    let log = trace.snapshot();
    if json {
        let report = RunReport {
            ticks,
            state: agent.state_name(),
            outcome,
            plan: PlanReport::new(agent.plan(), &catalog),
            world: &world.facts,
            beliefs: agent.beliefs(),
            trace: &log.events,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    for event in &log.events {
        println!(
            "{:>5}  {:<22} {}",
            event.tick,
            event.tag,
            event.detail.as_deref().unwrap_or("")
        );
    }
    println!();
    println!(
        "stopped after {ticks} ticks in {} (last outcome: {})",
        agent.state_name(),
        outcome.unwrap_or("none")
    );
    let facts: Vec<String> = world
        .facts
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect();
    println!("world: {}", facts.join(", "));
    Ok(())
}
