use hsat_challenges::Formula;
use rand::{seq::SliceRandom, Rng};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    Greedy,
    Random,
}

/// Picks the variable to flip from the variables of the unsatisfied clauses.
///
/// Candidate pools are always listed in ascending variable id, so the pick
/// depends only on the set of unsatisfied clauses and the random draw, never
/// on the order in which an oracle reports them.
#[derive(Debug, Clone)]
pub struct VariableSelector {
    counts: Vec<u32>,
    touched: Vec<usize>,
    candidates: Vec<usize>,
}

impl VariableSelector {
    pub fn new(num_variables: usize) -> Self {
        Self {
            counts: vec![0; num_variables + 1],
            touched: Vec::new(),
            candidates: Vec::new(),
        }
    }

    pub fn select<R: Rng>(
        &mut self,
        strategy: Strategy,
        formula: &Formula,
        unsatisfied: &[usize],
        rng: &mut R,
    ) -> Option<usize> {
        match strategy {
            Strategy::Greedy => self.greedy(formula, unsatisfied, rng),
            Strategy::Random => self.random(formula, unsatisfied, rng),
        }
    }

    /// Uniform choice among the variables occurring most often in unsatisfied clauses.
    pub fn greedy<R: Rng>(
        &mut self,
        formula: &Formula,
        unsatisfied: &[usize],
        rng: &mut R,
    ) -> Option<usize> {
        if !self.tally(formula, unsatisfied) {
            return None;
        }
        let Self {
            counts,
            touched,
            candidates,
        } = self;

        candidates.clear();
        if let Some(max) = touched.iter().map(|&var| counts[var]).max() {
            candidates.extend(touched.iter().copied().filter(|&var| counts[var] == max));
        }
        let pick = candidates.choose(rng).copied();
        self.reset();
        pick
    }

    /// Uniform choice among the distinct variables of the unsatisfied clauses.
    pub fn random<R: Rng>(
        &mut self,
        formula: &Formula,
        unsatisfied: &[usize],
        rng: &mut R,
    ) -> Option<usize> {
        if !self.tally(formula, unsatisfied) {
            return None;
        }
        let pick = self.touched.choose(rng).copied();
        self.reset();
        pick
    }

    /// Occurrence counts per variable; `touched` ends up sorted by id.
    /// Returns `false`, with the counts cleared, if any clause id is out of range.
    fn tally(&mut self, formula: &Formula, unsatisfied: &[usize]) -> bool {
        self.touched.clear();
        for &idx in unsatisfied {
            let Some(clause) = formula.clauses.get(idx) else {
                self.reset();
                return false;
            };
            for &literal in clause {
                let var = literal.unsigned_abs() as usize;
                if self.counts[var] == 0 {
                    self.touched.push(var);
                }
                self.counts[var] += 1;
            }
        }
        self.touched.sort_unstable();
        true
    }

    fn reset(&mut self) {
        for &var in self.touched.iter() {
            self.counts[var] = 0;
        }
    }
}
