//! Blocks world planner CLI
//!
//! Loads a PDDL or JSON problem and runs the constructive planner, the
//! optimal best-first solver, or both.

use anyhow::{bail, Context};
use bw_planner_core::{
    load_instance, Action, BestFirstSolver, BlocksHeuristic, ConstructiveSolver, PathCycleFilter,
    ProblemInstance, ProblemStats, SearchLimits, SearchResult, SearchStatus,
};
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "bwplanner", version)]
#[command(about = "Domain dependent planner for blocks world problems")]
#[command(after_help = "Options -n and -o can be combined to run both solvers.")]
struct Args {
    /// Look for a valid plan (the default)
    #[arg(short = 'n', long)]
    non_optimal: bool,

    /// Look for an optimal plan
    #[arg(short = 'o', long)]
    optimal: bool,

    /// Timeout in seconds, shared by both solvers
    #[arg(short = 't', long, value_name = "SECONDS")]
    timeout: Option<u64>,

    /// Write the results as JSON to this file
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,

    /// Log solver internals
    #[arg(short = 'v', long)]
    verbose: bool,

    /// Problem file (.pddl or .json)
    problem: PathBuf,
}

/// One solver run, with the plan rendered using block labels
#[derive(Serialize)]
struct RunReport {
    status: SearchStatus,
    plan: Vec<String>,
    plan_length: usize,
    states_expanded: usize,
    elapsed_ms: u64,
}

impl RunReport {
    fn new(result: &SearchResult<Action>, instance: &ProblemInstance) -> Self {
        let plan: Vec<String> = result
            .plan
            .iter()
            .map(|a| a.labeled(&instance.blocks).to_string())
            .collect();
        Self {
            status: result.status,
            plan_length: plan.len(),
            plan,
            states_expanded: result.states_expanded,
            elapsed_ms: result.elapsed_ms,
        }
    }
}

#[derive(Serialize)]
struct Report {
    id: String,
    stats: ProblemStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    valid: Option<RunReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    optimal: Option<RunReport>,
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.verbose);

    match run(&args) {
        Ok(true) => {
            info!("Done.");
            ExitCode::SUCCESS
        }
        Ok(false) => {
            warn!("Timed out.");
            ExitCode::FAILURE
        }
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when a solver ran out of time
fn run(args: &Args) -> anyhow::Result<bool> {
    let mut limits = SearchLimits::unlimited();
    if let Some(seconds) = args.timeout {
        info!(seconds, "Setting timeout");
        limits = limits.with_timeout(Duration::from_secs(seconds));
    }

    info!(path = %args.problem.display(), "Parsing problem file");
    let instance = load_instance(&args.problem)
        .with_context(|| format!("failed to load {}", args.problem.display()))?;

    let stats = instance.stats();
    info!(
        id = %instance.id,
        num_blocks = stats.num_blocks,
        initial_stacks = stats.initial_stacks,
        goal_stacks = stats.goal_stacks,
        upper_bound = stats.upper_bound,
        "Problem loaded"
    );

    let mut report = Report {
        id: instance.id.clone(),
        stats,
        valid: None,
        optimal: None,
    };

    if args.non_optimal || !args.optimal {
        info!("Looking for a valid plan...");
        let result = ConstructiveSolver::new()
            .with_limits(limits.clone())
            .solve(&instance.initial, &instance.goal)?;
        let outcome = RunReport::new(&result, &instance);
        if !finish("valid", &outcome) {
            return Ok(false);
        }
        report.valid = Some(outcome);
    }

    if args.optimal {
        info!("Looking for an optimal plan...");
        let result = BestFirstSolver::new()
            .with_heuristic(BlocksHeuristic::new(&instance.goal))
            .with_cycle_filter(PathCycleFilter)
            .with_limits(limits.clone())
            .solve(instance.initial.clone(), &instance.goal);
        let outcome = RunReport::new(&result, &instance);
        if !finish("optimal", &outcome) {
            return Ok(false);
        }
        report.optimal = Some(outcome);
    }

    if let (Some(valid), Some(optimal)) = (&report.valid, &report.optimal) {
        if optimal.plan_length > valid.plan_length {
            bail!(
                "optimal plan ({} actions) is longer than the valid plan ({} actions)",
                optimal.plan_length,
                valid.plan_length
            );
        }
    }

    if let Some(path) = &args.json {
        let json = serde_json::to_string_pretty(&report)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write {}", path.display()))?;
        info!(path = %path.display(), "Results written");
    }

    Ok(true)
}

/// Log a finished run; returns false if it timed out
fn finish(kind: &str, run: &RunReport) -> bool {
    match run.status {
        SearchStatus::Solved => {
            info!(
                kind,
                plan = %run.plan.join(" "),
                plan_length = run.plan_length,
                expanded = run.states_expanded,
                elapsed_ms = run.elapsed_ms,
                "Found a plan"
            );
            true
        }
        SearchStatus::TimedOut => false,
        status => {
            warn!(kind, ?status, "No plan found");
            true
        }
    }
}
