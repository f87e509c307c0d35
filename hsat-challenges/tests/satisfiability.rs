use hsat_challenges::satisfiability::{clause_satisfied, literal_satisfied};
use hsat_challenges::{Difficulty, Formula, FormulaError, Solution};
use serde_json::json;

#[test]
fn test_formula_validation() {
    assert!(Formula::new(2, vec![vec![1, 2], vec![-1, 2], vec![1, -2]]).is_ok());
    assert!(Formula::new(0, vec![]).is_ok());
    assert_eq!(
        Formula::new(2, vec![vec![1, 2], vec![]]),
        Err(FormulaError::EmptyClause { clause: 1 })
    );
    assert_eq!(
        Formula::new(2, vec![vec![1, 0]]),
        Err(FormulaError::ZeroLiteral { clause: 0 })
    );
    assert_eq!(
        Formula::new(2, vec![vec![1, 2], vec![-3]]),
        Err(FormulaError::LiteralOutOfRange {
            clause: 1,
            literal: -3,
            num_variables: 2
        })
    );
}

#[test]
fn test_deserialization_validates() {
    let formula: Formula =
        serde_json::from_value(json!({"num_variables": 2, "clauses": [[1, -2], [2]]})).unwrap();
    assert_eq!(formula, Formula::new(2, vec![vec![1, -2], vec![2]]).unwrap());

    for bad in [
        json!({"num_variables": 1, "clauses": [[], [1]]}),
        json!({"num_variables": 1, "clauses": [[3]]}),
        json!({"num_variables": 2, "clauses": [[1, 0]]}),
    ] {
        assert!(serde_json::from_value::<Formula>(bad).is_err());
    }

    let round_trip: Formula = serde_json::from_str(&serde_json::to_string(&formula).unwrap()).unwrap();
    assert_eq!(round_trip, formula);
}

#[test]
fn test_clause_satisfaction() {
    let variables = vec![true, false];
    assert!(literal_satisfied(1, &variables));
    assert!(literal_satisfied(-2, &variables));
    assert!(!literal_satisfied(-1, &variables));
    assert!(clause_satisfied(&[-1, 2, 1], &variables));
    assert!(!clause_satisfied(&[-1, 2], &variables));
}

#[test]
fn test_verify_solution() {
    let formula = Formula::new(2, vec![vec![1, 2], vec![-1, 2], vec![1, -2]]).unwrap();
    assert!(formula
        .verify_solution(&Solution {
            variables: vec![true, true]
        })
        .is_ok());

    let err = formula
        .verify_solution(&Solution {
            variables: vec![false, true],
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "Clause '2' not satisfied");

    assert!(formula
        .verify_solution(&Solution {
            variables: vec![true]
        })
        .is_err());
}

#[test]
fn test_generate_instance_is_seeded() {
    let difficulty = Difficulty::new(50, 210);
    let a = Formula::generate_instance(&[7; 32], &difficulty).unwrap();
    let b = Formula::generate_instance(&[7; 32], &difficulty).unwrap();
    let c = Formula::generate_instance(&[8; 32], &difficulty).unwrap();

    assert_eq!(a, b);
    assert_ne!(a, c);
    assert_eq!(a.num_variables, 50);
    assert_eq!(a.num_clauses(), 210);
    assert!(a.clauses.iter().all(|clause| clause.len() == 3));
    assert!(a.validate().is_ok());
}

#[test]
fn test_generate_instance_rejects_bad_difficulty() {
    assert!(Formula::generate_instance(&[0; 32], &Difficulty::new(0, 10)).is_err());
    let difficulty = Difficulty {
        num_variables: 10,
        num_clauses: 10,
        clause_length: 0,
    };
    assert!(Formula::generate_instance(&[0; 32], &difficulty).is_err());
}

#[test]
fn test_generate_planted_is_satisfied_by_model() {
    for seed in 0..16u8 {
        let difficulty = Difficulty {
            num_variables: 40,
            num_clauses: 200,
            clause_length: 4,
        };
        let (formula, model) = Formula::generate_planted(&[seed; 32], &difficulty).unwrap();
        assert_eq!(formula.num_clauses(), 200);
        assert!(formula.clauses.iter().all(|clause| clause.len() == 4));
        assert!(formula.verify_solution(&model).is_ok());
    }
}

#[test]
fn test_solution_serde() {
    let solution = Solution {
        variables: vec![true, false, true],
    };
    assert_eq!(
        serde_json::to_value(&solution).unwrap(),
        json!({ "variables": [1, 0, 1] })
    );

    let parsed: Solution =
        serde_json::from_value(json!({ "variables": [true, 0, 1] })).unwrap();
    assert_eq!(parsed.variables, vec![true, false, true]);

    assert!(serde_json::from_value::<Solution>(json!({ "variables": [2] })).is_err());

    let map = json!({ "variables": [0, 1] }).as_object().unwrap().clone();
    assert_eq!(
        Solution::try_from(map).unwrap().variables,
        vec![false, true]
    );
}
