use super::selector::Strategy;
use rand::Rng;

pub const ADAPT_STEP: f64 = 0.05;

/// Gate probability `p` for choosing the greedy selector.
///
/// In adaptive mode `p` rises by [`ADAPT_STEP`] while more than 30% of
/// `num_variables` clauses are unsatisfied, falls by the same step below 10%,
/// and stays put in between.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbabilityController {
    p: f64,
    adaptive: bool,
}

impl ProbabilityController {
    pub fn new(p: f64, adaptive: bool) -> Self {
        Self { p, adaptive }
    }

    pub fn p(&self) -> f64 {
        self.p
    }

    pub fn is_adaptive(&self) -> bool {
        self.adaptive
    }

    pub fn adjust(&mut self, unsatisfied: usize, num_variables: usize) {
        if !self.adaptive {
            return;
        }
        // unsatisfied > 0.3 * n and unsatisfied < 0.1 * n, without rounding
        let scaled = unsatisfied.saturating_mul(10);
        if scaled > num_variables.saturating_mul(3) {
            self.p = (self.p + ADAPT_STEP).min(1.0);
        } else if scaled < num_variables {
            self.p = (self.p - ADAPT_STEP).max(0.0);
        }
    }

    /// Draws one value in `[0, 1)`; below `p` selects the greedy strategy.
    pub fn gate<R: Rng>(&self, rng: &mut R) -> Strategy {
        if rng.gen::<f64>() < self.p {
            Strategy::Greedy
        } else {
            Strategy::Random
        }
    }
}
