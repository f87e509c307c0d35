pub mod satisfiability;
pub use satisfiability::{dimacs, Difficulty, Formula, FormulaError, Solution};
