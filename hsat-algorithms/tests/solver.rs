use hsat_algorithms::satisfiability::hybrid_walk::{
    solve, Assignment, ClauseOracle, ConfigError, HybridSolver, IncrementalOracle, OracleKind,
    Outcome, ScanOracle, SolverConfig, Step, Strategy,
};
use hsat_challenges::{Difficulty, Formula, FormulaError};
use rand::{rngs::StdRng, SeedableRng};

fn contradiction(num_variables: usize) -> Formula {
    Formula::new(num_variables, vec![vec![1], vec![-1]]).unwrap()
}

fn small_satisfiable() -> Formula {
    Formula::new(2, vec![vec![1, 2], vec![-1, 2], vec![1, -2]]).unwrap()
}

#[test]
fn test_invalid_config_is_rejected() {
    let formula = small_satisfiable();
    let rng = || StdRng::seed_from_u64(0);

    for p in [-0.1, 1.5, f64::NAN] {
        let config = SolverConfig {
            p,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Probability(_))));
        assert!(HybridSolver::<IncrementalOracle, _>::new(&formula, &config, rng()).is_err());
        assert!(solve(&formula, &config, rng()).is_err());
    }

    let config = SolverConfig {
        max_flips: 0,
        ..Default::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::MaxFlips));

    let config = SolverConfig {
        restart_frequency: 0,
        ..Default::default()
    };
    assert_eq!(config.validate(), Err(ConfigError::RestartFrequency));

    let config = SolverConfig {
        restart_frequency: 0,
        restarts: false,
        ..Default::default()
    };
    assert_eq!(config.validate(), Ok(()));
    assert_eq!(config.restart_interval(), None);

    for p in [0.0, 1.0] {
        let config = SolverConfig {
            p,
            ..Default::default()
        };
        assert_eq!(config.validate(), Ok(()));
    }

    let err = HybridSolver::<ScanOracle, _>::from_assignment(
        &formula,
        &SolverConfig::default(),
        rng(),
        vec![true],
    )
    .err();
    assert_eq!(
        err,
        Some(ConfigError::AssignmentLength {
            expected: 2,
            actual: 1
        })
    );
}

#[test]
fn test_malformed_formula_is_rejected() {
    let config = SolverConfig::default();
    let rng = || StdRng::seed_from_u64(0);

    let out_of_range = Formula {
        num_variables: 1,
        clauses: vec![vec![2]],
    };
    let err = FormulaError::LiteralOutOfRange {
        clause: 0,
        literal: 2,
        num_variables: 1,
    };
    assert_eq!(solve(&out_of_range, &config, rng()), Err(ConfigError::Formula(err)));
    assert!(matches!(
        HybridSolver::<ScanOracle, _>::from_assignment(&out_of_range, &config, rng(), vec![true]),
        Err(ConfigError::Formula(_))
    ));

    let empty_clause = Formula {
        num_variables: 1,
        clauses: vec![vec![1], vec![]],
    };
    for oracle in [OracleKind::Scan, OracleKind::Incremental] {
        let config = SolverConfig {
            oracle,
            ..Default::default()
        };
        assert_eq!(
            solve(&empty_clause, &config, rng()),
            Err(ConfigError::Formula(FormulaError::EmptyClause { clause: 1 }))
        );
    }

    assert!(serde_json::from_str::<Formula>(r#"{"num_variables":1,"clauses":[[],[3]]}"#).is_err());
    assert!(serde_json::from_str::<Formula>(r#"{"num_variables":1,"clauses":[[2]]}"#).is_err());
    assert!(serde_json::from_str::<Formula>(r#"{"num_variables":1,"clauses":[[0]]}"#).is_err());
    assert_eq!(
        serde_json::from_str::<Formula>(r#"{"num_variables":2,"clauses":[[1,-2]]}"#).unwrap(),
        Formula::new(2, vec![vec![1, -2]]).unwrap()
    );
}

#[test]
fn test_small_formula_is_solved() {
    let formula = small_satisfiable();
    for oracle in [OracleKind::Scan, OracleKind::Incremental] {
        let config = SolverConfig {
            oracle,
            ..Default::default()
        };
        for seed in 0..20 {
            let result = solve(&formula, &config, StdRng::seed_from_u64(seed)).unwrap();
            assert_eq!(result.outcome, Outcome::Satisfied);
            let solution = result.assignment.unwrap();
            assert_eq!(solution.variables, vec![true, true]);
            assert!(formula.verify_solution(&solution).is_ok());
            assert!(result.flips <= config.max_flips);
        }
    }
}

#[test]
fn test_generated_formulas_are_solved() {
    let config = SolverConfig {
        max_flips: 50_000,
        ..Default::default()
    };
    let mut solved = 0;
    for seed in 0..10u8 {
        let (formula, _) =
            Formula::generate_planted(&[seed; 32], &Difficulty::new(30, 90)).unwrap();
        let result = solve(&formula, &config, StdRng::seed_from_u64(seed as u64)).unwrap();
        if let Some(solution) = &result.assignment {
            assert!(formula.verify_solution(solution).is_ok());
            solved += 1;
        } else {
            assert_eq!(result.outcome, Outcome::Exhausted);
        }
    }
    assert!(solved > 0);
}

#[test]
fn test_unsatisfiable_formula_exhausts_budget() {
    let formula = contradiction(1);
    for p in [0.0, 0.3, 1.0] {
        for max_flips in [1, 7, 100] {
            for (restarts, adaptive_p) in [(false, false), (true, false), (true, true)] {
                let config = SolverConfig {
                    p,
                    max_flips,
                    restart_frequency: 3,
                    restarts,
                    adaptive_p,
                    ..Default::default()
                };
                let result = solve(&formula, &config, StdRng::seed_from_u64(4)).unwrap();
                assert_eq!(result.outcome, Outcome::Exhausted);
                assert_eq!(result.flips, max_flips);
                assert_eq!(result.assignment, None);
                assert_eq!(
                    result.stats.greedy_picks + result.stats.random_picks,
                    max_flips
                );
                let expected_restarts = if restarts { max_flips / 3 } else { 0 };
                assert_eq!(result.stats.restarts, expected_restarts);
            }
        }
    }
}

#[test]
fn test_greedy_flips_most_frequent_variable() {
    let formula = Formula::new(4, vec![vec![1, 2], vec![1, 3], vec![1, 4]]).unwrap();
    let config = SolverConfig {
        p: 1.0,
        ..Default::default()
    };
    for seed in 0..10 {
        let mut solver = HybridSolver::<IncrementalOracle, _>::from_assignment(
            &formula,
            &config,
            StdRng::seed_from_u64(seed),
            vec![false; 4],
        )
        .unwrap();
        assert_eq!(
            solver.step(),
            Step::Flipped {
                variable: 1,
                strategy: Strategy::Greedy,
                restarted: false
            }
        );
        assert_eq!(solver.step(), Step::Finished(Outcome::Satisfied));
        assert_eq!(solver.flips(), 1);
        assert_eq!(solver.assignment().values(), &[true, false, false, false]);
    }
}

#[test]
fn test_zero_probability_is_pure_random_walk() {
    let formula = Formula::generate_instance(&[3; 32], &Difficulty::new(30, 150)).unwrap();
    for (p, greedy) in [(0.0, false), (1.0, true)] {
        let config = SolverConfig {
            p,
            max_flips: 500,
            ..Default::default()
        };
        let result = solve(&formula, &config, StdRng::seed_from_u64(2)).unwrap();
        assert_ne!(result.outcome, Outcome::Inconsistent);
        if greedy {
            assert_eq!(result.stats.random_picks, 0);
            assert_eq!(result.stats.greedy_picks, result.flips);
        } else {
            assert_eq!(result.stats.greedy_picks, 0);
            assert_eq!(result.stats.random_picks, result.flips);
        }
    }
}

#[test]
fn test_already_satisfied_assignment() {
    let formula = small_satisfiable();
    let mut solver = HybridSolver::<ScanOracle, _>::from_assignment(
        &formula,
        &SolverConfig::default(),
        StdRng::seed_from_u64(0),
        vec![true, true],
    )
    .unwrap();
    assert_eq!(solver.step(), Step::Finished(Outcome::Satisfied));
    assert_eq!(solver.step(), Step::Finished(Outcome::Satisfied));
    let result = solver.solve();
    assert_eq!(result.outcome, Outcome::Satisfied);
    assert_eq!(result.flips, 0);
}

#[test]
fn test_last_flip_of_budget_can_satisfy() {
    let formula = Formula::new(1, vec![vec![1]]).unwrap();
    let config = SolverConfig {
        max_flips: 1,
        ..Default::default()
    };
    let result = HybridSolver::<IncrementalOracle, _>::from_assignment(
        &formula,
        &config,
        StdRng::seed_from_u64(0),
        vec![false],
    )
    .unwrap()
    .solve();
    assert_eq!(result.outcome, Outcome::Satisfied);
    assert_eq!(result.flips, 1);
    assert_eq!(result.assignment.unwrap().variables, vec![true]);
}

#[test]
fn test_restart_redraws_assignment() {
    let formula = contradiction(64);
    let config = SolverConfig {
        restart_frequency: 5,
        max_flips: 100,
        ..Default::default()
    };
    let mut solver =
        HybridSolver::<IncrementalOracle, _>::new(&formula, &config, StdRng::seed_from_u64(8))
            .unwrap();

    for expected in 1..5 {
        match solver.step() {
            Step::Flipped {
                variable,
                restarted,
                ..
            } => {
                assert_eq!(variable, 1);
                assert!(!restarted);
            }
            step => panic!("unexpected {:?}", step),
        }
        assert_eq!(solver.flips_since_restart(), expected);
    }

    let before: Assignment = solver.assignment().clone();
    let p = solver.probability();
    assert!(matches!(
        solver.step(),
        Step::Flipped {
            restarted: true,
            ..
        }
    ));
    assert_eq!(solver.flips_since_restart(), 0);
    assert_eq!(solver.flips(), 5);
    assert_eq!(solver.stats().restarts, 1);
    assert_eq!(solver.probability(), p);
    assert_eq!(solver.assignment().len(), 64);
    assert_ne!(solver.assignment(), &before);
    assert_eq!(solver.oracle().unsatisfied().len(), 1);
}

#[test]
fn test_restarts_disabled_never_redraw() {
    let formula = contradiction(16);
    let config = SolverConfig {
        restart_frequency: 2,
        restarts: false,
        max_flips: 100,
        ..Default::default()
    };
    let mut solver =
        HybridSolver::<ScanOracle, _>::new(&formula, &config, StdRng::seed_from_u64(8)).unwrap();
    let untouched: Vec<bool> = solver.assignment().values()[1..].to_vec();
    for _ in 0..50 {
        assert!(matches!(
            solver.step(),
            Step::Flipped {
                restarted: false,
                ..
            }
        ));
    }
    assert_eq!(solver.flips_since_restart(), 50);
    assert_eq!(solver.assignment().values()[1..], untouched[..]);
}

#[test]
fn test_adaptive_probability_follows_unsatisfied_count() {
    let config = SolverConfig {
        max_flips: 20,
        adaptive_p: true,
        restarts: false,
        ..Default::default()
    };

    // One unsatisfied clause out of one variable: always above 30%.
    let result = solve(&contradiction(1), &config, StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(result.stats.final_p, 1.0);

    // One unsatisfied clause out of a hundred variables: always below 10%.
    let result = solve(&contradiction(100), &config, StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(result.stats.final_p, 0.0);

    let fixed = SolverConfig {
        adaptive_p: false,
        ..config
    };
    let result = solve(&contradiction(100), &fixed, StdRng::seed_from_u64(0)).unwrap();
    assert_eq!(result.stats.final_p, 0.5);
}

#[test]
fn test_oracles_produce_identical_runs() {
    for seed in 0..5u8 {
        let formula =
            Formula::generate_instance(&[seed; 32], &Difficulty::new(40, 170)).unwrap();
        let config = SolverConfig {
            max_flips: 3000,
            restart_frequency: 250,
            adaptive_p: seed % 2 == 0,
            ..Default::default()
        };
        let scan = solve(
            &formula,
            &SolverConfig {
                oracle: OracleKind::Scan,
                ..config
            },
            StdRng::seed_from_u64(seed as u64),
        )
        .unwrap();
        let incremental = solve(
            &formula,
            &SolverConfig {
                oracle: OracleKind::Incremental,
                ..config
            },
            StdRng::seed_from_u64(seed as u64),
        )
        .unwrap();
        assert_eq!(scan, incremental);
    }
}

#[test]
fn test_seeded_runs_are_reproducible() {
    let formula = Formula::generate_instance(&[9; 32], &Difficulty::new(50, 215)).unwrap();
    let config = SolverConfig {
        max_flips: 2000,
        adaptive_p: true,
        ..Default::default()
    };
    let a = solve(&formula, &config, StdRng::seed_from_u64(77)).unwrap();
    let b = solve(&formula, &config, StdRng::seed_from_u64(77)).unwrap();
    assert_eq!(a, b);
}

/// Claims a clause is unsatisfied that no selector can draw from.
struct BrokenOracle {
    unsatisfied: Vec<usize>,
}

impl ClauseOracle for BrokenOracle {
    fn build(_formula: &Formula, _assignment: &Assignment) -> Self {
        Self {
            unsatisfied: vec![usize::MAX],
        }
    }

    fn rebuild(&mut self, _formula: &Formula, _assignment: &Assignment) {}

    fn record_flip(&mut self, _formula: &Formula, _assignment: &Assignment, _variable: usize) {}

    fn is_satisfied(&self) -> bool {
        false
    }

    fn unsatisfied(&self) -> &[usize] {
        &self.unsatisfied
    }
}

#[test]
fn test_missing_candidates_are_inconsistent() {
    let formula = small_satisfiable();
    for p in [0.0, 1.0] {
        let config = SolverConfig {
            p,
            ..Default::default()
        };
        let mut solver =
            HybridSolver::<BrokenOracle, _>::new(&formula, &config, StdRng::seed_from_u64(0))
                .unwrap();
        assert_eq!(solver.step(), Step::Finished(Outcome::Inconsistent));
        let result = solver.solve();
        assert_eq!(result.outcome, Outcome::Inconsistent);
        assert_eq!(result.flips, 0);
        assert_eq!(result.assignment, None);
    }
}
