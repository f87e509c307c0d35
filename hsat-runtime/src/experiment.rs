use anyhow::{anyhow, Result};
use hsat_algorithms::satisfiability::hybrid_walk::{solve, Outcome};
use hsat_challenges::Formula;
use hsat_structs::{
    config::ExperimentConfig,
    core::{ExperimentReport, PSummary, RunRecord},
};
use hsat_utils::{percentage, Summary};
use log::{debug, info};
use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;
use std::time::Instant;

/// Runs the solver on every instance for every p of the grid, `trials`
/// times each. Runs are independent and execute on the rayon pool; records
/// come back ordered by instance, then p, then trial.
pub fn run_experiment(
    instances: &[(String, Formula)],
    config: &ExperimentConfig,
) -> Result<ExperimentReport> {
    config.validate()?;
    if instances.is_empty() {
        return Err(anyhow!("No instances to run"));
    }
    let p_values = config.p_values();

    let grid = &p_values;
    let trials = config.trials;
    let jobs: Vec<(usize, f64, usize)> = (0..instances.len())
        .flat_map(|idx| {
            grid.iter()
                .flat_map(move |&p| (0..trials).map(move |trial| (idx, p, trial)))
        })
        .collect();
    info!(
        "running {} instances x {} p values x {} trials",
        instances.len(),
        p_values.len(),
        config.trials
    );

    let runs = jobs
        .par_iter()
        .map(|&(idx, p, trial)| {
            let (name, formula) = &instances[idx];
            run_single(name, formula, p, trial, config)
        })
        .collect::<Result<Vec<RunRecord>>>()?;

    let summaries = summarize(&runs, &p_values);
    for summary in summaries.iter() {
        info!(
            "p = {:.2}: {}/{} solved ({:.1}%), avg flips {:.1}, avg time {:.4}s",
            summary.p,
            summary.successes,
            summary.runs,
            summary.success_rate,
            summary.avg_flips,
            summary.avg_time_secs
        );
    }

    Ok(ExperimentReport {
        config: config.clone(),
        instances: instances.iter().map(|(name, _)| name.clone()).collect(),
        summaries,
        runs,
        reference: None,
    })
}

pub fn run_single(
    instance: &str,
    formula: &Formula,
    p: f64,
    trial: usize,
    config: &ExperimentConfig,
) -> Result<RunRecord> {
    let seed = config.calc_seed(instance, p, trial)?;
    let start = Instant::now();
    let result = solve(
        formula,
        &config.solver_config(p),
        StdRng::from_seed(seed),
    )?;
    let elapsed_secs = start.elapsed().as_secs_f64();

    // Unsolved runs count as the full budget.
    let flips = match result.outcome {
        Outcome::Satisfied => result.flips,
        Outcome::Exhausted | Outcome::Inconsistent => config.max_flips,
    };
    debug!(
        "{} p = {:.2} trial {}: {:?} after {} flips",
        instance, p, trial, result.outcome, result.flips
    );

    Ok(RunRecord {
        instance: instance.to_string(),
        p,
        trial,
        outcome: result.outcome,
        flips,
        restarts: result.stats.restarts,
        elapsed_secs,
    })
}

/// One summary per entry of `p_values`, in that order. A p without runs
/// reports zeros.
pub fn summarize(runs: &[RunRecord], p_values: &[f64]) -> Vec<PSummary> {
    p_values
        .iter()
        .map(|&p| {
            let runs: Vec<&RunRecord> = runs.iter().filter(|run| run.p == p).collect();
            let successes = runs.iter().filter(|run| run.is_success()).count();
            let flips: Vec<f64> = runs.iter().map(|run| run.flips as f64).collect();
            let times: Vec<f64> = runs.iter().map(|run| run.elapsed_secs).collect();
            let flips = Summary::from_values(&flips);
            PSummary {
                p,
                runs: runs.len(),
                successes,
                success_rate: percentage(successes, runs.len()),
                avg_flips: flips.mean,
                std_flips: flips.std_dev,
                avg_time_secs: Summary::from_values(&times).mean,
            }
        })
        .collect()
}
