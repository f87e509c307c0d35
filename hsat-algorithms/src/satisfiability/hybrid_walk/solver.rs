use super::{
    assignment::Assignment,
    config::{ConfigError, OracleKind, SolverConfig},
    oracle::{ClauseOracle, IncrementalOracle, ScanOracle},
    probability::ProbabilityController,
    restart::RestartPolicy,
    selector::{Strategy, VariableSelector},
};
use hsat_challenges::{Formula, Solution};
use log::{debug, trace, warn};
use rand::Rng;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Satisfied,
    Exhausted,
    /// A selector found no candidate although clauses were unsatisfied.
    Inconsistent,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SolveStats {
    pub greedy_picks: usize,
    pub random_picks: usize,
    pub restarts: usize,
    pub final_p: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct RunResult {
    pub outcome: Outcome,
    pub flips: usize,
    pub assignment: Option<Solution>,
    pub stats: SolveStats,
}

impl RunResult {
    pub fn is_satisfied(&self) -> bool {
        self.outcome == Outcome::Satisfied
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Flipped {
        variable: usize,
        strategy: Strategy,
        restarted: bool,
    },
    Finished(Outcome),
}

/// One solve attempt over a borrowed formula.
///
/// The solver owns its assignment and random stream. Every random draw comes
/// from `rng` in a fixed order: the initial assignment, then per step the
/// gate draw, the selector draw and, on a restart, the redraw of every value.
pub struct HybridSolver<'a, O, R> {
    formula: &'a Formula,
    config: SolverConfig,
    assignment: Assignment,
    oracle: O,
    selector: VariableSelector,
    controller: ProbabilityController,
    restart: RestartPolicy,
    rng: R,
    flips: usize,
    stats: SolveStats,
    finished: Option<Outcome>,
}

impl<'a, O: ClauseOracle, R: Rng> HybridSolver<'a, O, R> {
    pub fn new(formula: &'a Formula, config: &SolverConfig, mut rng: R) -> Result<Self, ConfigError> {
        formula.validate()?;
        config.validate()?;
        let assignment = Assignment::random(formula.num_variables, &mut rng);
        Ok(Self::assemble(formula, config, assignment, rng))
    }

    pub fn from_assignment(
        formula: &'a Formula,
        config: &SolverConfig,
        rng: R,
        values: Vec<bool>,
    ) -> Result<Self, ConfigError> {
        formula.validate()?;
        config.validate()?;
        if values.len() != formula.num_variables {
            return Err(ConfigError::AssignmentLength {
                expected: formula.num_variables,
                actual: values.len(),
            });
        }
        Ok(Self::assemble(
            formula,
            config,
            Assignment::from_values(values),
            rng,
        ))
    }

    fn assemble(formula: &'a Formula, config: &SolverConfig, assignment: Assignment, rng: R) -> Self {
        let oracle = O::build(formula, &assignment);
        Self {
            formula,
            config: *config,
            oracle,
            selector: VariableSelector::new(formula.num_variables),
            controller: ProbabilityController::new(config.p, config.adaptive_p),
            restart: RestartPolicy::new(config.restart_interval()),
            assignment,
            rng,
            flips: 0,
            stats: SolveStats {
                final_p: config.p,
                ..Default::default()
            },
            finished: None,
        }
    }

    /// Runs one iteration of the search. Once finished, keeps returning the
    /// same outcome without touching the state.
    pub fn step(&mut self) -> Step {
        if let Some(outcome) = self.finished {
            return Step::Finished(outcome);
        }

        if self.oracle.is_satisfied() {
            return self.finish(Outcome::Satisfied);
        }
        let unsatisfied = self.oracle.unsatisfied();
        if unsatisfied.is_empty() {
            warn!("oracle reported an unsatisfied formula without unsatisfied clauses");
            return self.finish(Outcome::Satisfied);
        }

        self.controller
            .adjust(unsatisfied.len(), self.formula.num_variables);
        let strategy = self.controller.gate(&mut self.rng);
        let picked = self
            .selector
            .select(strategy, self.formula, unsatisfied, &mut self.rng);

        let Some(variable) = picked else {
            warn!(
                "{:?} selector found no candidate among {} unsatisfied clauses",
                strategy,
                unsatisfied.len()
            );
            return self.finish(Outcome::Inconsistent);
        };

        match strategy {
            Strategy::Greedy => self.stats.greedy_picks += 1,
            Strategy::Random => self.stats.random_picks += 1,
        }

        self.assignment.flip(variable);
        self.flips += 1;
        trace!("flip {}: variable {} ({:?})", self.flips, variable, strategy);

        let restarted = self.restart.record_flip();
        if restarted {
            self.assignment.randomize(&mut self.rng);
            self.oracle.rebuild(self.formula, &self.assignment);
            self.stats.restarts += 1;
            debug!(
                "restart {} after {} flips, p = {}",
                self.stats.restarts,
                self.flips,
                self.controller.p()
            );
        } else {
            self.oracle
                .record_flip(self.formula, &self.assignment, variable);
        }

        Step::Flipped {
            variable,
            strategy,
            restarted,
        }
    }

    /// Searches until the formula is satisfied or `max_flips` flips are spent.
    pub fn solve(mut self) -> RunResult {
        while self.flips < self.config.max_flips {
            if let Step::Finished(outcome) = self.step() {
                return self.into_result(outcome);
            }
        }

        // The last flip of the budget may have satisfied the formula.
        let outcome = if self.oracle.is_satisfied() {
            Outcome::Satisfied
        } else {
            Outcome::Exhausted
        };
        debug!("budget of {} flips spent: {:?}", self.config.max_flips, outcome);
        self.into_result(outcome)
    }

    fn finish(&mut self, outcome: Outcome) -> Step {
        debug!("{:?} after {} flips", outcome, self.flips);
        self.finished = Some(outcome);
        Step::Finished(outcome)
    }

    fn into_result(self, outcome: Outcome) -> RunResult {
        let assignment = match outcome {
            Outcome::Satisfied => Some(self.assignment.to_solution()),
            Outcome::Exhausted | Outcome::Inconsistent => None,
        };
        RunResult {
            outcome,
            flips: self.flips,
            assignment,
            stats: SolveStats {
                final_p: self.controller.p(),
                ..self.stats
            },
        }
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    pub fn oracle(&self) -> &O {
        &self.oracle
    }

    pub fn probability(&self) -> f64 {
        self.controller.p()
    }

    pub fn flips(&self) -> usize {
        self.flips
    }

    pub fn flips_since_restart(&self) -> usize {
        self.restart.flips_since_restart()
    }

    pub fn stats(&self) -> &SolveStats {
        &self.stats
    }
}

/// Runs a full solve with the oracle named in `config`.
pub fn solve<R: Rng>(formula: &Formula, config: &SolverConfig, rng: R) -> Result<RunResult, ConfigError> {
    let result = match config.oracle {
        OracleKind::Scan => HybridSolver::<ScanOracle, R>::new(formula, config, rng)?.solve(),
        OracleKind::Incremental => {
            HybridSolver::<IncrementalOracle, R>::new(formula, config, rng)?.solve()
        }
    };
    Ok(result)
}
