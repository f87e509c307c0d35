/*!
Hybrid greedy/random local search.

Each step looks at the clauses the current assignment leaves unsatisfied and
flips either the variable that occurs most often in them (greedy, with probability `p`) or a
uniformly random variable drawn from them. `p` can adapt to the number of
unsatisfied clauses and the assignment can be redrawn every
`restart_frequency` flips.

Hyperparameters accepted by [`solve_challenge`]:

| key                 | default         |
|---------------------|-----------------|
| `p`                 | `0.5`           |
| `max_flips`         | `10000`         |
| `restart_frequency` | `1000`          |
| `restarts`          | `true`          |
| `adaptive_p`        | `false`         |
| `oracle`            | `"incremental"` |
| `seed`              | `0`             |
*/
mod assignment;
mod config;
mod oracle;
mod probability;
mod restart;
mod selector;
mod solver;

pub use assignment::Assignment;
pub use config::{ConfigError, OracleKind, SolverConfig};
pub use oracle::{ClauseOracle, IncrementalOracle, ScanOracle};
pub use probability::{ProbabilityController, ADAPT_STEP};
pub use restart::RestartPolicy;
pub use selector::{Strategy, VariableSelector};
pub use solver::{solve, HybridSolver, Outcome, RunResult, SolveStats, Step};

use anyhow::{anyhow, Result};
use hsat_challenges::{Formula, Solution};
use rand::{rngs::StdRng, SeedableRng};
use serde_json::{Map, Value};

pub fn solve_challenge(
    formula: &Formula,
    hyperparameters: &Option<Map<String, Value>>,
) -> Result<Option<Solution>> {
    let (config, seed) = match hyperparameters {
        Some(hyperparameters) => parse_hyperparameters(hyperparameters)?,
        None => (SolverConfig::default(), 0),
    };

    let result = solve(formula, &config, StdRng::seed_from_u64(seed))?;
    match result.outcome {
        Outcome::Satisfied => Ok(result.assignment),
        Outcome::Exhausted => Ok(None),
        Outcome::Inconsistent => Err(anyhow!(
            "Search became inconsistent after {} flips",
            result.flips
        )),
    }
}

fn parse_hyperparameters(hyperparameters: &Map<String, Value>) -> Result<(SolverConfig, u64)> {
    let mut hyperparameters = hyperparameters.clone();
    let seed = match hyperparameters.remove("seed") {
        Some(value) => value
            .as_u64()
            .ok_or_else(|| anyhow!("Invalid seed: {}", value))?,
        None => 0,
    };
    let config: SolverConfig = serde_json::from_value(Value::Object(hyperparameters))
        .map_err(|e| anyhow!("Invalid hyperparameters: {}", e))?;
    Ok((config, seed))
}
