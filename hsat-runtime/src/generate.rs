use anyhow::{anyhow, Result};
use hsat_challenges::{dimacs, Difficulty, Formula, Solution};
use hsat_utils::{jsonify, u8s_from_str};
use log::info;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::{
    fs,
    path::{Path, PathBuf},
};

#[derive(Debug, Clone, PartialEq)]
pub struct BatchOptions {
    pub num_instances: usize,
    pub num_variables: (usize, usize),
    pub num_clauses: (usize, usize),
    pub clause_length: usize,
    pub planted: bool,
    pub seed: String,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            num_instances: 100,
            num_variables: (50, 200),
            num_clauses: (200, 800),
            clause_length: 3,
            planted: false,
            seed: String::new(),
        }
    }
}

pub fn generate(seed: &str, difficulty: &Difficulty, planted: bool) -> Result<(Formula, Option<Solution>)> {
    let seed = u8s_from_str(seed);
    if planted {
        let (formula, model) = Formula::generate_planted(&seed, difficulty)?;
        Ok((formula, Some(model)))
    } else {
        Ok((Formula::generate_instance(&seed, difficulty)?, None))
    }
}

/// Writes `num_instances` formulas with sizes drawn uniformly from the given
/// ranges into `dir`. Planted instances get their model saved alongside as
/// `<name>.model.json`. Returns the paths of the `.cnf` files.
pub fn generate_batch(options: &BatchOptions, dir: &Path) -> Result<Vec<PathBuf>> {
    let (min_vars, max_vars) = options.num_variables;
    let (min_clauses, max_clauses) = options.num_clauses;
    if min_vars == 0 || min_vars > max_vars {
        return Err(anyhow!("Invalid variable range {}..={}", min_vars, max_vars));
    }
    if min_clauses > max_clauses {
        return Err(anyhow!(
            "Invalid clause range {}..={}",
            min_clauses,
            max_clauses
        ));
    }
    fs::create_dir_all(dir)?;

    let mut rng = StdRng::from_seed(u8s_from_str(&options.seed));
    let prefix = if options.planted { "sat" } else { "random" };
    let mut paths = Vec::with_capacity(options.num_instances);
    for idx in 0..options.num_instances {
        let difficulty = Difficulty {
            num_variables: rng.gen_range(min_vars..=max_vars),
            num_clauses: rng.gen_range(min_clauses..=max_clauses),
            clause_length: options.clause_length,
        };
        let (formula, model) = generate(&format!("{}|{}", options.seed, idx), &difficulty, options.planted)?;

        let name = format!(
            "{}_{:04}_k{}_v{}_c{}",
            prefix, idx, difficulty.clause_length, difficulty.num_variables, difficulty.num_clauses
        );
        let path = dir.join(format!("{}.cnf", name));
        fs::write(&path, dimacs::to_string(&formula))?;
        if let Some(model) = model {
            fs::write(dir.join(format!("{}.model.json", name)), jsonify(&model)?)?;
        }
        paths.push(path);
    }
    info!("generated {} instances in {}", paths.len(), dir.display());
    Ok(paths)
}
