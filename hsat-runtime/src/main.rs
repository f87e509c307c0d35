use anyhow::{anyhow, Result};
use clap::{arg, ArgAction, ArgMatches, Command};
use hsat_algorithms::satisfiability::hybrid_walk::{solve, OracleKind, SolverConfig};
use hsat_challenges::{dimacs, Difficulty, Solution};
use hsat_runtime::{
    experiment::run_experiment,
    generate::{generate, generate_batch, BatchOptions},
    reference::run_references,
};
use hsat_structs::config::ExperimentConfig;
use hsat_utils::{compress_obj, dejsonify, jsonify, jsonify_pretty};
use log::info;
use rand::{rngs::StdRng, SeedableRng};
use std::{fs, io::Read, path::PathBuf, time::Duration};

fn cli() -> Command {
    Command::new("hsat")
        .about("Hybrid greedy/random local search for CNF satisfiability")
        .arg_required_else_help(true)
        .subcommand(
            Command::new("generate")
                .about("Generates a random k-CNF formula in DIMACS format")
                .arg(
                    arg!(<NUM_VARIABLES> "Number of variables")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(<NUM_CLAUSES> "Number of clauses")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"clause-length" [K] "Literals per clause")
                        .default_value("3")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--seed [SEED] "A string used in seed generation")
                        .default_value("0")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--planted "Hide a satisfying model in the formula")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    arg!(--output [OUTPUT_FILE] "If set, the formula is written to this path instead of stdout")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--model [MODEL_FILE] "If set with --planted, the hidden model is saved to this path as json")
                        .value_parser(clap::value_parser!(PathBuf)),
                ),
        )
        .subcommand(
            Command::new("generate-batch")
                .about("Generates a directory of formulas with randomly drawn sizes")
                .arg(
                    arg!(<OUTPUT_DIR> "Directory to write *.cnf files into")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(--"num-instances" [N] "Number of formulas")
                        .default_value("100")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"num-vars-min" [N] "Smallest number of variables")
                        .default_value("50")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"num-vars-max" [N] "Largest number of variables")
                        .default_value("200")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"num-clauses-min" [N] "Smallest number of clauses")
                        .default_value("200")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"num-clauses-max" [N] "Largest number of clauses")
                        .default_value("800")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--"clause-length" [K] "Literals per clause")
                        .default_value("3")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    arg!(--seed [SEED] "A string used in seed generation")
                        .default_value("0")
                        .value_parser(clap::value_parser!(String)),
                )
                .arg(
                    arg!(--planted "Hide a satisfying model in every formula")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            solver_args(
                Command::new("solve")
                    .about("Runs the hybrid solver on a DIMACS file and prints the result as json")
                    .arg(
                        arg!(<CNF> "Path to a DIMACS CNF file")
                            .value_parser(clap::value_parser!(PathBuf)),
                    )
                    .arg(
                        arg!(--p [P] "Probability of a greedy step")
                            .default_value("0.5")
                            .value_parser(clap::value_parser!(f64)),
                    )
                    .arg(
                        arg!(--seed [SEED] "Seed of the random stream")
                            .default_value("0")
                            .value_parser(clap::value_parser!(u64)),
                    )
                    .arg(
                        arg!(--output [OUTPUT_FILE] "If set, the result is written to this path instead of stdout")
                            .value_parser(clap::value_parser!(PathBuf)),
                    ),
            )
            .arg(
                arg!(--oracle [ORACLE] "How unsatisfied clauses are tracked: scan or incremental")
                    .default_value("incremental")
                    .value_parser(clap::value_parser!(OracleKind)),
            ),
        )
        .subcommand(
            Command::new("verify")
                .about("Verifies a solution against a DIMACS file")
                .arg(
                    arg!(<CNF> "Path to a DIMACS CNF file")
                        .value_parser(clap::value_parser!(PathBuf)),
                )
                .arg(
                    arg!(<SOLUTION> "Solution json string, path to json file, or '-' for stdin")
                        .value_parser(clap::value_parser!(String)),
                ),
        )
        .subcommand(
            solver_args(
                Command::new("experiment")
                    .about("Sweeps p over every *.cnf file in a directory")
                    .arg(
                        arg!(<CNF_DIR> "Directory containing *.cnf files")
                            .value_parser(clap::value_parser!(PathBuf)),
                    )
                    .arg(
                        arg!(--config [CONFIG] "Experiment config json string or path to json file. Replaces the other experiment flags")
                            .value_parser(clap::value_parser!(String)),
                    )
                    .arg(
                        arg!(--"p-start" [P] "First p of the sweep")
                            .default_value("0.0")
                            .value_parser(clap::value_parser!(f64)),
                    )
                    .arg(
                        arg!(--"p-end" [P] "Last p of the sweep")
                            .default_value("1.0")
                            .value_parser(clap::value_parser!(f64)),
                    )
                    .arg(
                        arg!(--"p-step" [STEP] "Step between p values")
                            .default_value("0.1")
                            .value_parser(clap::value_parser!(f64)),
                    )
                    .arg(
                        arg!(--trials [N] "Runs per instance and p")
                            .default_value("1")
                            .value_parser(clap::value_parser!(usize)),
                    )
                    .arg(
                        arg!(--seed [SEED] "A string used in seed generation")
                            .value_parser(clap::value_parser!(String)),
                    )
                    .arg(
                        arg!(--reference [SOLVER] "Complete solver executable to compare against, e.g. minisat")
                            .value_parser(clap::value_parser!(String)),
                    )
                    .arg(
                        arg!(--"reference-timeout" [SECS] "Time limit per reference solver run")
                            .default_value("300")
                            .value_parser(clap::value_parser!(u64)),
                    )
                    .arg(
                        arg!(--output [OUTPUT_FILE] "If set, the report is saved to this file path (default json)")
                            .value_parser(clap::value_parser!(PathBuf)),
                    )
                    .arg(
                        arg!(--compress "If output file is set, the report is compressed as zlib")
                            .action(ArgAction::SetTrue),
                    ),
            )
            .arg(
                arg!(--oracle [ORACLE] "How unsatisfied clauses are tracked: scan or incremental")
                    .default_value("incremental")
                    .value_parser(clap::value_parser!(OracleKind)),
            ),
        )
}

fn solver_args(command: Command) -> Command {
    command
        .arg(
            arg!(--"max-flips" [N] "Flip budget per run")
                .default_value("10000")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            arg!(--"restart-frequency" [N] "Flips between restarts")
                .default_value("1000")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(arg!(--"no-restarts" "Never redraw the assignment").action(ArgAction::SetTrue))
        .arg(
            arg!(--adaptive "Adapt p to the number of unsatisfied clauses")
                .action(ArgAction::SetTrue),
        )
}

fn main() {
    env_logger::init();
    let matches = cli().get_matches();

    if let Err(e) = match matches.subcommand() {
        Some(("generate", sub_m)) => generate_formula(sub_m),
        Some(("generate-batch", sub_m)) => generate_formulas(sub_m),
        Some(("solve", sub_m)) => solve_formula(sub_m),
        Some(("verify", sub_m)) => verify_solution(sub_m),
        Some(("experiment", sub_m)) => experiment(sub_m),
        _ => Err(anyhow!("Invalid subcommand")),
    } {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn value<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> Result<T> {
    matches
        .get_one::<T>(id)
        .cloned()
        .ok_or_else(|| anyhow!("Missing argument '{}'", id))
}

fn flag(matches: &ArgMatches, id: &str) -> bool {
    matches.get_flag(id)
}

fn generate_formula(matches: &ArgMatches) -> Result<()> {
    let difficulty = Difficulty {
        num_variables: value(matches, "NUM_VARIABLES")?,
        num_clauses: value(matches, "NUM_CLAUSES")?,
        clause_length: value(matches, "clause-length")?,
    };
    let seed: String = value(matches, "seed")?;
    let (formula, model) = generate(&seed, &difficulty, flag(matches, "planted"))?;

    let content = format!(
        "c generated by hsat, seed '{}'{}\n{}",
        seed,
        if model.is_some() { ", planted" } else { "" },
        dimacs::to_string(&formula)
    );
    match matches.get_one::<PathBuf>("output") {
        Some(path) => {
            fs::write(path, content)?;
            println!("formula written to: {:?}", path);
        }
        None => print!("{}", content),
    }
    if let (Some(model), Some(path)) = (model, matches.get_one::<PathBuf>("model")) {
        fs::write(path, jsonify(&model)?)?;
        println!("model written to: {:?}", path);
    }
    Ok(())
}

fn generate_formulas(matches: &ArgMatches) -> Result<()> {
    let options = BatchOptions {
        num_instances: value(matches, "num-instances")?,
        num_variables: (value(matches, "num-vars-min")?, value(matches, "num-vars-max")?),
        num_clauses: (
            value(matches, "num-clauses-min")?,
            value(matches, "num-clauses-max")?,
        ),
        clause_length: value(matches, "clause-length")?,
        planted: flag(matches, "planted"),
        seed: value(matches, "seed")?,
    };
    let dir: PathBuf = value(matches, "OUTPUT_DIR")?;
    let paths = generate_batch(&options, &dir)?;
    println!("{} formulas written to: {:?}", paths.len(), dir);
    Ok(())
}

fn solver_config(matches: &ArgMatches, p: f64) -> Result<SolverConfig> {
    Ok(SolverConfig {
        p,
        max_flips: value(matches, "max-flips")?,
        restart_frequency: value(matches, "restart-frequency")?,
        restarts: !flag(matches, "no-restarts"),
        adaptive_p: flag(matches, "adaptive"),
        oracle: value(matches, "oracle")?,
    })
}

fn solve_formula(matches: &ArgMatches) -> Result<()> {
    let path: PathBuf = value(matches, "CNF")?;
    let formula = dimacs::load_file(&path)?;
    let config = solver_config(matches, value(matches, "p")?)?;
    let rng = StdRng::seed_from_u64(value(matches, "seed")?);

    let result = solve(&formula, &config, rng)?;
    info!(
        "{:?} after {} flips ({} greedy, {} random, {} restarts)",
        result.outcome,
        result.flips,
        result.stats.greedy_picks,
        result.stats.random_picks,
        result.stats.restarts
    );
    match matches.get_one::<PathBuf>("output") {
        Some(path) => {
            fs::write(path, jsonify_pretty(&result)?)?;
            println!("result written to: {:?}", path);
        }
        None => println!("{}", jsonify_pretty(&result)?),
    }
    Ok(())
}

fn verify_solution(matches: &ArgMatches) -> Result<()> {
    let path: PathBuf = value(matches, "CNF")?;
    let formula = dimacs::load_file(&path)?;
    let solution = load_solution(&value::<String>(matches, "SOLUTION")?)?;
    formula
        .verify_solution(&solution)
        .map_err(|e| anyhow!("Invalid solution: {}", e))?;
    println!("Solution is valid");
    Ok(())
}

fn experiment(matches: &ArgMatches) -> Result<()> {
    let dir: PathBuf = value(matches, "CNF_DIR")?;
    let config = match matches.get_one::<String>("config") {
        Some(config) => load_config(config)?,
        None => experiment_config(matches)?,
    };

    let instances = dimacs::load_dir(&dir)?;
    if instances.is_empty() {
        return Err(anyhow!("No CNF files found in '{}'", dir.display()));
    }
    info!("loaded {} instances from {:?}", instances.len(), dir);

    let mut report = run_experiment(&instances, &config)?;
    if let Some(solver) = config.reference_solver() {
        let paths: Vec<PathBuf> = instances.iter().map(|(name, _)| dir.join(name)).collect();
        let timeout = Duration::from_secs(config.reference_timeout_secs_or_default());
        report.reference = Some(run_references(solver, &paths, timeout)?);
    }

    if let Some(best) = report.best_summary() {
        println!(
            "best p = {:.2}: {:.1}% solved, {:.1} flips on average",
            best.p, best.success_rate, best.avg_flips
        );
    }
    if let Some(reference) = &report.reference {
        println!(
            "{}: {:.1}% solved, {} unsatisfiable, {} timeouts",
            reference.solver,
            reference.summary.success_rate,
            reference.summary.unsatisfiable,
            reference.summary.timeouts
        );
    }

    match matches.get_one::<PathBuf>("output") {
        Some(path) => {
            if flag(matches, "compress") {
                fs::write(path, compress_obj(&report)?)?;
            } else {
                fs::write(path, jsonify_pretty(&report)?)?;
            }
            println!("report written to: {:?}", path);
        }
        None => println!("{}", jsonify_pretty(&report)?),
    }
    Ok(())
}

fn experiment_config(matches: &ArgMatches) -> Result<ExperimentConfig> {
    let solver = solver_config(matches, 0.0)?;
    Ok(ExperimentConfig {
        p_start: value(matches, "p-start")?,
        p_end: value(matches, "p-end")?,
        p_step: value(matches, "p-step")?,
        max_flips: solver.max_flips,
        restart_frequency: solver.restart_frequency,
        restarts: solver.restarts,
        adaptive_p: solver.adaptive_p,
        oracle: solver.oracle,
        trials: value(matches, "trials")?,
        seed: matches.get_one::<String>("seed").cloned().unwrap_or_default(),
        reference_solver: matches.get_one::<String>("reference").cloned(),
        reference_timeout_secs: matches.get_one::<u64>("reference-timeout").copied(),
    })
}

fn read_json_arg(arg: &str, what: &str) -> Result<String> {
    if arg == "-" {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| anyhow!("Failed to read {} from stdin: {}", what, e))?;
        Ok(buffer)
    } else if arg.ends_with(".json") {
        fs::read_to_string(arg).map_err(|e| anyhow!("Failed to read {} file '{}': {}", what, arg, e))
    } else {
        Ok(arg.to_string())
    }
}

fn load_config(config: &str) -> Result<ExperimentConfig> {
    let content = read_json_arg(config, "config")?;
    dejsonify::<ExperimentConfig>(&content).map_err(|e| anyhow!("Failed to parse config: {}", e))
}

fn load_solution(solution: &str) -> Result<Solution> {
    let content = read_json_arg(solution, "solution")?;
    dejsonify::<Solution>(&content).map_err(|e| anyhow!("Failed to parse solution: {}", e))
}
