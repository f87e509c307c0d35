use crate::serializable_struct_with_getters;
use anyhow::{anyhow, Result};
use hsat_algorithms::satisfiability::hybrid_walk::{OracleKind, SolverConfig};
use hsat_utils::{jsonify, round_to, u8s_from_str};
use serde::{Deserialize, Serialize};

serializable_struct_with_getters! {
    #[serde(default, deny_unknown_fields)]
    ExperimentConfig {
        p_start: f64,
        p_end: f64,
        p_step: f64,
        max_flips: usize,
        restart_frequency: usize,
        restarts: bool,
        adaptive_p: bool,
        oracle: OracleKind,
        trials: usize,
        seed: String,
        reference_solver: Option<String>,
        reference_timeout_secs: Option<u64>,
    }
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        let solver = SolverConfig::default();
        Self {
            p_start: 0.0,
            p_end: 1.0,
            p_step: 0.1,
            max_flips: solver.max_flips,
            restart_frequency: solver.restart_frequency,
            restarts: solver.restarts,
            adaptive_p: solver.adaptive_p,
            oracle: solver.oracle,
            trials: 1,
            seed: String::new(),
            reference_solver: None,
            reference_timeout_secs: None,
        }
    }
}

pub const DEFAULT_REFERENCE_TIMEOUT_SECS: u64 = 300;

impl ExperimentConfig {
    pub fn validate(&self) -> Result<()> {
        if !(self.p_step > 0.0) {
            return Err(anyhow!("p_step must be positive, got {}", self.p_step));
        }
        if !(0.0..=1.0).contains(&self.p_start) || !(0.0..=1.0).contains(&self.p_end) {
            return Err(anyhow!(
                "p range [{}, {}] must lie within [0, 1]",
                self.p_start,
                self.p_end
            ));
        }
        if self.p_start > self.p_end {
            return Err(anyhow!(
                "p_start ({}) is greater than p_end ({})",
                self.p_start,
                self.p_end
            ));
        }
        if self.trials == 0 {
            return Err(anyhow!("trials must be positive"));
        }
        if self.reference_timeout_secs == Some(0) {
            return Err(anyhow!("reference_timeout_secs must be positive"));
        }
        self.solver_config(self.p_start).validate()?;
        Ok(())
    }

    /// `p_start, p_start + p_step, ...` up to `p_end` inclusive, rounded to
    /// two decimals.
    pub fn p_values(&self) -> Vec<f64> {
        if !(self.p_step > 0.0) || self.p_start > self.p_end {
            return Vec::new();
        }
        let steps = ((self.p_end - self.p_start) / self.p_step + 1e-9).floor() as usize;
        let mut values: Vec<f64> = (0..=steps)
            .map(|i| round_to(self.p_start + i as f64 * self.p_step, 2).min(1.0))
            .collect();
        values.dedup();
        values
    }

    pub fn solver_config(&self, p: f64) -> SolverConfig {
        SolverConfig {
            p,
            max_flips: self.max_flips,
            restart_frequency: self.restart_frequency,
            restarts: self.restarts,
            adaptive_p: self.adaptive_p,
            oracle: self.oracle,
        }
    }

    pub fn reference_timeout_secs_or_default(&self) -> u64 {
        self.reference_timeout_secs
            .unwrap_or(DEFAULT_REFERENCE_TIMEOUT_SECS)
    }

    /// Seed of one run, derived from the whole config so any change to it
    /// yields fresh streams.
    pub fn calc_seed(&self, instance: &str, p: f64, trial: usize) -> Result<[u8; 32]> {
        let key = format!("{}|{}|{:.2}|{}", jsonify(self)?, instance, p, trial);
        Ok(u8s_from_str(&key))
    }
}
