use hsat_challenges::FormulaError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("p must lie within [0, 1], got {0}")]
    Probability(f64),

    #[error("max_flips must be positive")]
    MaxFlips,

    #[error("restart_frequency must be positive when restarts are enabled")]
    RestartFrequency,

    #[error("initial assignment has {actual} values but the formula declares {expected} variables")]
    AssignmentLength { expected: usize, actual: usize },

    #[error("invalid formula: {0}")]
    Formula(#[from] FormulaError),
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OracleKind {
    Scan,
    #[default]
    Incremental,
}

impl FromStr for OracleKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scan" => Ok(OracleKind::Scan),
            "incremental" => Ok(OracleKind::Incremental),
            _ => Err(format!("Unknown oracle '{}'. Expected 'scan' or 'incremental'", s)),
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SolverConfig {
    /// Probability of taking a greedy step instead of a random one.
    pub p: f64,
    pub max_flips: usize,
    pub restart_frequency: usize,
    pub restarts: bool,
    pub adaptive_p: bool,
    pub oracle: OracleKind,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            p: 0.5,
            max_flips: 10_000,
            restart_frequency: 1_000,
            restarts: true,
            adaptive_p: false,
            oracle: OracleKind::default(),
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.p) {
            return Err(ConfigError::Probability(self.p));
        }
        if self.max_flips == 0 {
            return Err(ConfigError::MaxFlips);
        }
        if self.restarts && self.restart_frequency == 0 {
            return Err(ConfigError::RestartFrequency);
        }
        Ok(())
    }

    /// Flips between restarts, `None` when restarts are disabled.
    pub fn restart_interval(&self) -> Option<usize> {
        self.restarts.then_some(self.restart_frequency)
    }
}
