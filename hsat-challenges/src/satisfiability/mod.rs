pub mod dimacs;

use anyhow::{anyhow, Result};
use ndarray::{Array2, Axis};
use rand::{
    distributions::{Distribution, Uniform},
    rngs::{SmallRng, StdRng},
    Rng, SeedableRng,
};
use serde::{
    de::{self, SeqAccess, Visitor},
    ser::SerializeSeq,
    Deserialize, Deserializer, Serialize, Serializer,
};
use serde_json::{from_value, Map, Value};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormulaError {
    #[error("clause {clause} is empty")]
    EmptyClause { clause: usize },

    #[error("clause {clause} contains the literal 0")]
    ZeroLiteral { clause: usize },

    #[error("clause {clause} uses literal {literal} but only {num_variables} variables are declared")]
    LiteralOutOfRange {
        clause: usize,
        literal: i32,
        num_variables: usize,
    },
}

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq)]
pub struct Difficulty {
    pub num_variables: usize,
    pub num_clauses: usize,
    #[serde(default = "default_clause_length")]
    pub clause_length: usize,
}

fn default_clause_length() -> usize {
    3
}

impl Difficulty {
    pub fn new(num_variables: usize, num_clauses: usize) -> Self {
        Self {
            num_variables,
            num_clauses,
            clause_length: default_clause_length(),
        }
    }

    fn check(&self) -> Result<()> {
        if self.num_variables == 0 || self.num_variables >= i32::MAX as usize {
            return Err(anyhow!(
                "Invalid number of variables: {}",
                self.num_variables
            ));
        }
        if self.clause_length == 0 {
            return Err(anyhow!("Clause length must be positive"));
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    #[serde(with = "bool_vec_as_u8")]
    pub variables: Vec<bool>,
}

impl TryFrom<Map<String, Value>> for Solution {
    type Error = serde_json::Error;

    fn try_from(v: Map<String, Value>) -> Result<Self, Self::Error> {
        from_value(Value::Object(v))
    }
}

/// A CNF formula. Literals are signed, 1-indexed variable ids.
///
/// Construction and deserialization both go through [`Formula::new`], so
/// every clause is non-empty and refers only to declared variables. Solvers
/// validate again before searching since the fields are public.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(try_from = "RawFormula")]
pub struct Formula {
    pub num_variables: usize,
    pub clauses: Vec<Vec<i32>>,
}

#[derive(Deserialize)]
struct RawFormula {
    num_variables: usize,
    clauses: Vec<Vec<i32>>,
}

impl TryFrom<RawFormula> for Formula {
    type Error = FormulaError;

    fn try_from(raw: RawFormula) -> Result<Self, Self::Error> {
        Formula::new(raw.num_variables, raw.clauses)
    }
}

impl Formula {
    pub fn new(num_variables: usize, clauses: Vec<Vec<i32>>) -> Result<Self, FormulaError> {
        let formula = Self {
            num_variables,
            clauses,
        };
        formula.validate()?;
        Ok(formula)
    }

    pub fn validate(&self) -> Result<(), FormulaError> {
        for (idx, clause) in self.clauses.iter().enumerate() {
            if clause.is_empty() {
                return Err(FormulaError::EmptyClause { clause: idx });
            }
            for &literal in clause {
                if literal == 0 {
                    return Err(FormulaError::ZeroLiteral { clause: idx });
                }
                if literal.unsigned_abs() as usize > self.num_variables {
                    return Err(FormulaError::LiteralOutOfRange {
                        clause: idx,
                        literal,
                        num_variables: self.num_variables,
                    });
                }
            }
        }
        Ok(())
    }

    pub fn num_clauses(&self) -> usize {
        self.clauses.len()
    }

    pub fn generate_instance(seed: &[u8; 32], difficulty: &Difficulty) -> Result<Self> {
        difficulty.check()?;
        let mut rng = SmallRng::from_seed(StdRng::from_seed(seed.clone()).gen());
        let shape = (difficulty.num_clauses, difficulty.clause_length);

        let var_distr = Uniform::new(1, difficulty.num_variables as i32 + 1);
        // Create a uniform distribution for negations.
        let neg_distr = Uniform::new(0, 2);

        let clauses_array = Array2::from_shape_fn(shape, |_| var_distr.sample(&mut rng));
        let negations = Array2::from_shape_fn(shape, |_| {
            if neg_distr.sample(&mut rng) == 0 {
                -1
            } else {
                1
            }
        });

        let clauses_array = clauses_array * negations;
        let clauses = clauses_array
            .axis_iter(Axis(0))
            .map(|row| row.to_vec())
            .collect();

        Ok(Self::new(difficulty.num_variables, clauses)?)
    }

    /// Generates a formula satisfied by a hidden model, returned alongside it.
    pub fn generate_planted(seed: &[u8; 32], difficulty: &Difficulty) -> Result<(Self, Solution)> {
        difficulty.check()?;
        let mut rng = SmallRng::from_seed(StdRng::from_seed(seed.clone()).gen());
        let num_variables = difficulty.num_variables;
        let k = difficulty.clause_length;

        let model: Vec<bool> = (0..num_variables).map(|_| rng.gen()).collect();
        let var_distr = Uniform::new_inclusive(1, num_variables as i32);
        let agree_prob = 1.0 / k as f64;

        let mut clauses = Vec::with_capacity(difficulty.num_clauses);
        for _ in 0..difficulty.num_clauses {
            let mut clause: Vec<i32> = (0..k)
                .map(|_| {
                    let var = var_distr.sample(&mut rng);
                    let value = model[var as usize - 1];
                    let agree = rng.gen_bool(agree_prob);
                    if value == agree {
                        var
                    } else {
                        -var
                    }
                })
                .collect();

            if !clause_satisfied(&clause, &model) {
                let idx = rng.gen_range(0..k);
                let var = clause[idx].abs();
                clause[idx] = if model[var as usize - 1] { var } else { -var };
            }
            clauses.push(clause);
        }

        Ok((
            Self::new(num_variables, clauses)?,
            Solution { variables: model },
        ))
    }

    /// `variables[i]` is the value of variable `i + 1`.
    pub fn is_satisfied_by(&self, variables: &[bool]) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause_satisfied(clause, variables))
    }

    pub fn verify_solution(&self, solution: &Solution) -> Result<()> {
        if solution.variables.len() != self.num_variables {
            return Err(anyhow!(
                "Invalid number of variables. Expected: {}, Actual: {}",
                self.num_variables,
                solution.variables.len()
            ));
        }

        if let Some((idx, _)) = self
            .clauses
            .iter()
            .enumerate()
            .find(|(_, clause)| !clause_satisfied(clause, &solution.variables))
        {
            Err(anyhow!("Clause '{}' not satisfied", idx))
        } else {
            Ok(())
        }
    }
}

#[inline]
pub fn literal_satisfied(literal: i32, variables: &[bool]) -> bool {
    let var_value = variables[literal.unsigned_abs() as usize - 1];
    (literal > 0 && var_value) || (literal < 0 && !var_value)
}

pub fn clause_satisfied(clause: &[i32], variables: &[bool]) -> bool {
    clause
        .iter()
        .any(|&literal| literal_satisfied(literal, variables))
}

mod bool_vec_as_u8 {
    use super::*;
    use std::fmt;

    pub fn serialize<S>(data: &Vec<bool>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut seq = serializer.serialize_seq(Some(data.len()))?;
        for &value in data {
            seq.serialize_element(&(if value { 1 } else { 0 }))?;
        }
        seq.end()
    }

    struct BoolVecVisitor;

    impl<'de> Visitor<'de> for BoolVecVisitor {
        type Value = Vec<bool>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a sequence of booleans or integers 0/1")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut vec = Vec::with_capacity(seq.size_hint().unwrap_or(0));
            while let Some(value) = seq.next_element::<Value>()? {
                match value {
                    Value::Number(n) if n.as_u64() == Some(1) => vec.push(true),
                    Value::Number(n) if n.as_u64() == Some(0) => vec.push(false),
                    Value::Bool(b) => vec.push(b),
                    _ => return Err(de::Error::custom("expected 0, 1, true, or false")),
                }
            }
            Ok(vec)
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<bool>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_seq(BoolVecVisitor)
    }
}
