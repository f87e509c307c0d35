use super::{Formula, FormulaError};
use log::warn;
use std::{
    fs,
    io::{self, BufRead, BufReader, Write},
    path::Path,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("failed to read line {line}: {source}")]
    Read { line: usize, source: io::Error },

    #[error("malformed problem line {line}: '{content}'")]
    ProblemLine { line: usize, content: String },

    #[error("invalid literal '{token}' on line {line}")]
    Literal { line: usize, token: String },

    #[error(transparent)]
    Formula(#[from] FormulaError),

    #[error("failed to access '{path}': {source}")]
    Io { path: String, source: io::Error },
}

/// Reads a DIMACS CNF formula.
///
/// Clauses may span lines and end at `0`. Comment lines (`c`) and blank lines
/// are skipped and a `%` line ends the formula. Without a problem line the
/// variable count is the largest literal magnitude seen.
pub fn parse(mut reader: impl BufRead) -> Result<Formula, DimacsError> {
    let mut buffer = String::with_capacity(1024);
    let mut line = 0;
    let mut header: Option<(usize, usize)> = None;
    let mut clauses: Vec<Vec<i32>> = Vec::new();
    let mut clause: Vec<i32> = Vec::new();
    let mut max_variable = 0usize;

    loop {
        buffer.clear();
        match reader.read_line(&mut buffer) {
            Ok(0) => break,
            Ok(_) => line += 1,
            Err(source) => return Err(DimacsError::Read { line, source }),
        }

        let trimmed = buffer.trim();
        match trimmed.chars().next() {
            None | Some('c') => continue,
            Some('%') => break,
            Some('p') => {
                header = Some(parse_problem_line(trimmed).ok_or_else(|| {
                    DimacsError::ProblemLine {
                        line,
                        content: trimmed.to_string(),
                    }
                })?);
                continue;
            }
            _ => {}
        }

        for token in trimmed.split_whitespace() {
            let literal: i32 = token.parse().map_err(|_| DimacsError::Literal {
                line,
                token: token.to_string(),
            })?;
            if literal == 0 {
                clauses.push(std::mem::take(&mut clause));
            } else {
                max_variable = max_variable.max(literal.unsigned_abs() as usize);
                clause.push(literal);
            }
        }
    }

    if !clause.is_empty() {
        clauses.push(clause);
    }

    let num_variables = match header {
        Some((num_variables, num_clauses)) => {
            if num_clauses != clauses.len() {
                warn!(
                    "problem line declares {} clauses, found {}",
                    num_clauses,
                    clauses.len()
                );
            }
            num_variables
        }
        None => max_variable,
    };

    Ok(Formula::new(num_variables, clauses)?)
}

fn parse_problem_line(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("p"), Some("cnf")) => {}
        _ => return None,
    }
    let num_variables = parts.next()?.parse().ok()?;
    let num_clauses = parts.next()?.parse().ok()?;
    Some((num_variables, num_clauses))
}

pub fn write(formula: &Formula, mut writer: impl Write) -> io::Result<()> {
    writeln!(
        writer,
        "p cnf {} {}",
        formula.num_variables,
        formula.num_clauses()
    )?;
    for clause in formula.clauses.iter() {
        for literal in clause {
            write!(writer, "{} ", literal)?;
        }
        writeln!(writer, "0")?;
    }
    Ok(())
}

pub fn to_string(formula: &Formula) -> String {
    let mut out = Vec::new();
    // Writing into a Vec cannot fail.
    let _ = write(formula, &mut out);
    String::from_utf8_lossy(&out).into_owned()
}

pub fn load_file(path: impl AsRef<Path>) -> Result<Formula, DimacsError> {
    let path = path.as_ref();
    let file = fs::File::open(path).map_err(|source| DimacsError::Io {
        path: path.display().to_string(),
        source,
    })?;
    parse(BufReader::new(file))
}

/// Loads every `*.cnf` file in `dir`, sorted by file name.
pub fn load_dir(dir: impl AsRef<Path>) -> Result<Vec<(String, Formula)>, DimacsError> {
    let dir = dir.as_ref();
    let io_err = |source| DimacsError::Io {
        path: dir.display().to_string(),
        source,
    };

    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_err)? {
        let path = entry.map_err(io_err)?.path();
        if path.is_file() && path.extension().map_or(false, |ext| ext == "cnf") {
            paths.push(path);
        }
    }
    paths.sort();

    paths
        .into_iter()
        .map(|path| {
            let name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            load_file(&path).map(|formula| (name, formula))
        })
        .collect()
}
