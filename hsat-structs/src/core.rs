use crate::{config::ExperimentConfig, serializable_struct_with_getters};
use hsat_algorithms::satisfiability::hybrid_walk::Outcome;
use serde::{Deserialize, Serialize};

// Experiment records
serializable_struct_with_getters! {
    RunRecord {
        instance: String,
        p: f64,
        trial: usize,
        outcome: Outcome,
        flips: usize,
        restarts: usize,
        elapsed_secs: f64,
    }
}
impl RunRecord {
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Satisfied
    }
}

serializable_struct_with_getters! {
    PSummary {
        p: f64,
        runs: usize,
        successes: usize,
        success_rate: f64,
        avg_flips: f64,
        std_flips: f64,
        avg_time_secs: f64,
    }
}

// Reference solver records
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceStatus {
    Satisfiable,
    Unsatisfiable,
    Unknown,
    Timeout,
}

serializable_struct_with_getters! {
    ReferenceRecord {
        instance: String,
        status: ReferenceStatus,
        elapsed_secs: f64,
    }
}

serializable_struct_with_getters! {
    ReferenceSummary {
        runs: usize,
        solved: usize,
        unsatisfiable: usize,
        timeouts: usize,
        unknown: usize,
        success_rate: f64,
        avg_time_secs: f64,
    }
}

serializable_struct_with_getters! {
    ReferenceReport {
        solver: String,
        summary: ReferenceSummary,
        runs: Vec<ReferenceRecord>,
    }
}

serializable_struct_with_getters! {
    ExperimentReport {
        config: ExperimentConfig,
        instances: Vec<String>,
        summaries: Vec<PSummary>,
        runs: Vec<RunRecord>,
        reference: Option<ReferenceReport>,
    }
}
impl ExperimentReport {
    /// Summary with the highest success rate, ties broken by fewer average flips.
    pub fn best_summary(&self) -> Option<&PSummary> {
        self.summaries.iter().max_by(|a, b| {
            a.success_rate
                .total_cmp(&b.success_rate)
                .then(b.avg_flips.total_cmp(&a.avg_flips))
        })
    }
}
