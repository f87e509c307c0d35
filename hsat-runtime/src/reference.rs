use anyhow::{anyhow, Result};
use hsat_structs::core::{ReferenceRecord, ReferenceReport, ReferenceStatus, ReferenceSummary};
use hsat_utils::{percentage, Summary};
use log::{info, warn};
use std::{
    io::Read,
    path::Path,
    process::{Command, Stdio},
    thread,
    time::{Duration, Instant},
};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Reads a complete solver's verdict from its standard output.
pub fn classify(stdout: &str) -> ReferenceStatus {
    if stdout.contains("UNSAT") {
        ReferenceStatus::Unsatisfiable
    } else if stdout.contains("SATISFIABLE") {
        ReferenceStatus::Satisfiable
    } else {
        ReferenceStatus::Unknown
    }
}

/// Runs `solver <cnf_path>` and kills it once `timeout` has passed. The exit
/// code is ignored since solvers signal their verdict through it.
pub fn run_reference(solver: &str, cnf_path: &Path, timeout: Duration) -> Result<ReferenceRecord> {
    let instance = cnf_path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| cnf_path.display().to_string());

    let start = Instant::now();
    let mut child = Command::new(solver)
        .arg(cnf_path)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| anyhow!("Failed to start '{}': {}", solver, e))?;

    let mut stdout = child
        .stdout
        .take()
        .ok_or_else(|| anyhow!("Failed to capture stdout of '{}'", solver))?;
    let reader = thread::spawn(move || {
        let mut output = String::new();
        stdout.read_to_string(&mut output).map(|_| output)
    });

    let timed_out = loop {
        match child.try_wait() {
            Ok(Some(_)) => break false,
            Ok(None) if start.elapsed() >= timeout => {
                child.kill()?;
                child.wait()?;
                break true;
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(anyhow!("Failed to wait on process: {}", e)),
        }
    };
    let elapsed_secs = start.elapsed().as_secs_f64();

    let output = reader
        .join()
        .map_err(|_| anyhow!("Output reader for '{}' panicked", solver))??;
    let status = if timed_out {
        warn!("{} timed out on {} after {:?}", solver, instance, timeout);
        ReferenceStatus::Timeout
    } else {
        classify(&output)
    };

    Ok(ReferenceRecord {
        instance,
        status,
        elapsed_secs,
    })
}

/// Runs the solver on each file in turn.
pub fn run_references<P: AsRef<Path>>(
    solver: &str,
    cnf_paths: &[P],
    timeout: Duration,
) -> Result<ReferenceReport> {
    let mut runs = Vec::with_capacity(cnf_paths.len());
    for path in cnf_paths {
        let record = run_reference(solver, path.as_ref(), timeout)?;
        info!(
            "{} on {}: {:?} in {:.3}s",
            solver, record.instance, record.status, record.elapsed_secs
        );
        runs.push(record);
    }
    Ok(ReferenceReport {
        solver: solver.to_string(),
        summary: summarize_reference(&runs),
        runs,
    })
}

pub fn summarize_reference(records: &[ReferenceRecord]) -> ReferenceSummary {
    let count = |status| records.iter().filter(|r| r.status == status).count();
    let solved = count(ReferenceStatus::Satisfiable);
    let times: Vec<f64> = records.iter().map(|r| r.elapsed_secs).collect();
    ReferenceSummary {
        runs: records.len(),
        solved,
        unsatisfiable: count(ReferenceStatus::Unsatisfiable),
        timeouts: count(ReferenceStatus::Timeout),
        unknown: count(ReferenceStatus::Unknown),
        success_rate: percentage(solved, records.len()),
        avg_time_secs: Summary::from_values(&times).mean,
    }
}
