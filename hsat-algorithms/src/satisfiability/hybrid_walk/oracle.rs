use super::assignment::Assignment;
use hsat_challenges::{satisfiability::clause_satisfied, Formula};

/// Tracks which clauses the current assignment leaves unsatisfied.
///
/// `is_satisfied` and an empty `unsatisfied` list must always agree. The
/// order of `unsatisfied` is unspecified; consumers that need a canonical
/// order derive it themselves.
pub trait ClauseOracle {
    fn build(formula: &Formula, assignment: &Assignment) -> Self
    where
        Self: Sized;

    /// Re-evaluates every clause, e.g. after the assignment was redrawn.
    fn rebuild(&mut self, formula: &Formula, assignment: &Assignment);

    /// Called after `variable` has been flipped in `assignment`.
    fn record_flip(&mut self, formula: &Formula, assignment: &Assignment, variable: usize);

    fn is_satisfied(&self) -> bool;

    fn unsatisfied(&self) -> &[usize];
}

/// Rescans every literal of every clause on each update.
#[derive(Debug, Clone, Default)]
pub struct ScanOracle {
    unsatisfied: Vec<usize>,
}

impl ClauseOracle for ScanOracle {
    fn build(formula: &Formula, assignment: &Assignment) -> Self {
        let mut oracle = Self::default();
        oracle.rebuild(formula, assignment);
        oracle
    }

    fn rebuild(&mut self, formula: &Formula, assignment: &Assignment) {
        self.unsatisfied.clear();
        self.unsatisfied.extend(
            formula
                .clauses
                .iter()
                .enumerate()
                .filter(|(_, clause)| !clause_satisfied(clause, assignment.values()))
                .map(|(idx, _)| idx),
        );
    }

    fn record_flip(&mut self, formula: &Formula, assignment: &Assignment, _variable: usize) {
        self.rebuild(formula, assignment);
    }

    fn is_satisfied(&self) -> bool {
        self.unsatisfied.is_empty()
    }

    fn unsatisfied(&self) -> &[usize] {
        &self.unsatisfied
    }
}

const NOT_LISTED: usize = usize::MAX;

/// Keeps a count of true literals per clause and only revisits the clauses
/// containing the flipped variable.
#[derive(Debug, Clone)]
pub struct IncrementalOracle {
    // One entry per literal occurrence, so repeated literals are counted twice.
    positive: Vec<Vec<usize>>,
    negative: Vec<Vec<usize>>,
    num_true: Vec<u32>,
    unsatisfied: Vec<usize>,
    position: Vec<usize>,
}

impl IncrementalOracle {
    fn insert(&mut self, clause: usize) {
        self.position[clause] = self.unsatisfied.len();
        self.unsatisfied.push(clause);
    }

    fn remove(&mut self, clause: usize) {
        let idx = self.position[clause];
        self.unsatisfied.swap_remove(idx);
        if let Some(&moved) = self.unsatisfied.get(idx) {
            self.position[moved] = idx;
        }
        self.position[clause] = NOT_LISTED;
    }
}

impl ClauseOracle for IncrementalOracle {
    fn build(formula: &Formula, assignment: &Assignment) -> Self {
        let mut positive = vec![Vec::new(); formula.num_variables];
        let mut negative = vec![Vec::new(); formula.num_variables];
        for (idx, clause) in formula.clauses.iter().enumerate() {
            for &literal in clause {
                let var_idx = literal.unsigned_abs() as usize - 1;
                if literal > 0 {
                    positive[var_idx].push(idx);
                } else {
                    negative[var_idx].push(idx);
                }
            }
        }

        let mut oracle = Self {
            positive,
            negative,
            num_true: vec![0; formula.num_clauses()],
            unsatisfied: Vec::new(),
            position: vec![NOT_LISTED; formula.num_clauses()],
        };
        oracle.rebuild(formula, assignment);
        oracle
    }

    fn rebuild(&mut self, formula: &Formula, assignment: &Assignment) {
        self.unsatisfied.clear();
        for (idx, clause) in formula.clauses.iter().enumerate() {
            let count = clause
                .iter()
                .filter(|&&literal| (literal > 0) == assignment.value(literal.unsigned_abs() as usize))
                .count() as u32;
            self.num_true[idx] = count;
            self.position[idx] = NOT_LISTED;
            if count == 0 {
                self.insert(idx);
            }
        }
    }

    fn record_flip(&mut self, _formula: &Formula, assignment: &Assignment, variable: usize) {
        let var_idx = variable - 1;
        let (now_true, now_false) = if assignment.value(variable) {
            (
                std::mem::take(&mut self.positive[var_idx]),
                std::mem::take(&mut self.negative[var_idx]),
            )
        } else {
            (
                std::mem::take(&mut self.negative[var_idx]),
                std::mem::take(&mut self.positive[var_idx]),
            )
        };

        // Increments first, so a clause holding both polarities never dips to zero.
        for &clause in now_true.iter() {
            self.num_true[clause] += 1;
            if self.num_true[clause] == 1 {
                self.remove(clause);
            }
        }
        for &clause in now_false.iter() {
            self.num_true[clause] -= 1;
            if self.num_true[clause] == 0 {
                self.insert(clause);
            }
        }

        if assignment.value(variable) {
            self.positive[var_idx] = now_true;
            self.negative[var_idx] = now_false;
        } else {
            self.negative[var_idx] = now_true;
            self.positive[var_idx] = now_false;
        }
    }

    fn is_satisfied(&self) -> bool {
        self.unsatisfied.is_empty()
    }

    fn unsatisfied(&self) -> &[usize] {
        &self.unsatisfied
    }
}
