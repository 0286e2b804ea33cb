//! Flat numeric dumps
//!
//! Plain text, no header: numbers separated by whitespace, one row per
//! line. The energy a file belongs to is carried only by the index in its
//! name.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::chaos::Execution;
use crate::error::{DynamicsError, DynamicsResult};
use crate::sections::PoincareSection;

pub const PHASE_SEPARATION_PREFIX: &str = "phase_separation_";
pub const POINCARE_PREFIX: &str = "poincare_sections_";
pub const DUMP_EXTENSION: &str = "csv";

/// `<dir>/phase_separation_<index>.csv`
pub fn phase_separation_path(dir: &Path, index: usize) -> PathBuf {
    dir.join(format!("{}{}.{}", PHASE_SEPARATION_PREFIX, index, DUMP_EXTENSION))
}

/// File-name prefix of the Poincaré dumps of one execution
pub fn poincare_prefix(execution: Execution) -> String {
    format!("{}{}_", POINCARE_PREFIX, execution.label())
}

/// `<dir>/poincare_sections_<linear|parallel>_<index>.csv`
pub fn poincare_path(dir: &Path, execution: Execution, index: usize) -> PathBuf {
    dir.join(format!("{}{}.{}", poincare_prefix(execution), index, DUMP_EXTENSION))
}

/// One value per line
pub fn write_values(path: &Path, values: &[f64]) -> DynamicsResult<()> {
    let mut out = create(path)?;
    for value in values {
        writeln!(out, "{:.18e}", value)?;
    }
    out.flush()?;
    Ok(())
}

/// Each row on its own line, values separated by a space
pub fn write_rows(path: &Path, rows: &[&[f64]]) -> DynamicsResult<()> {
    let mut out = create(path)?;
    for row in rows {
        let line: Vec<String> = row.iter().map(|v| format!("{:.18e}", v)).collect();
        writeln!(out, "{}", line.join(" "))?;
    }
    out.flush()?;
    Ok(())
}

/// Rows of a dump; blank lines are skipped
pub fn read_rows(path: &Path) -> DynamicsResult<Vec<Vec<f64>>> {
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = line
            .split_whitespace()
            .map(|token| {
                token.parse::<f64>().map_err(|e| DynamicsError::MalformedData {
                    path: path.display().to_string(),
                    message: format!("line {}: {:?}: {}", line_no + 1, token, e),
                })
            })
            .collect::<DynamicsResult<Vec<f64>>>()?;
        rows.push(row);
    }

    Ok(rows)
}

/// Every number of a dump in reading order
pub fn read_values(path: &Path) -> DynamicsResult<Vec<f64>> {
    Ok(read_rows(path)?.into_iter().flatten().collect())
}

pub fn write_section(path: &Path, section: &PoincareSection) -> DynamicsResult<()> {
    write_rows(path, &section.rows())
}

/// Read a two-row (y; v) dump back into a section
pub fn read_section(path: &Path) -> DynamicsResult<PoincareSection> {
    let rows = read_rows(path)?;
    let malformed = |message: String| DynamicsError::MalformedData {
        path: path.display().to_string(),
        message,
    };

    let mut section = PoincareSection::new();
    match rows.as_slice() {
        // An empty section is written as two empty lines
        [] => {}
        [y, v] if y.len() == v.len() => {
            for (&y0, &v0) in y.iter().zip(v) {
                section.push(y0, v0);
            }
        }
        [y, v] => {
            return Err(malformed(format!(
                "row lengths differ: {} y values, {} v values",
                y.len(),
                v.len()
            )))
        }
        other => return Err(malformed(format!("expected 2 rows, found {}", other.len()))),
    }
    Ok(section)
}

/// Files `<prefix><index>.<extension>` in `dir`, sorted by index
///
/// Names that do not match the pattern are ignored.
pub fn indexed_files(dir: &Path, prefix: &str, extension: &str) -> DynamicsResult<Vec<(usize, PathBuf)>> {
    let suffix = format!(".{}", extension);
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let index = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(|name| name.strip_prefix(prefix))
            .and_then(|rest| rest.strip_suffix(suffix.as_str()))
            .and_then(|digits| digits.parse::<usize>().ok());

        if let Some(index) = index {
            files.push((index, path));
        }
    }

    files.sort_by_key(|(index, _)| *index);
    Ok(files)
}

fn create(path: &Path) -> DynamicsResult<BufWriter<File>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(BufWriter::new(File::create(path)?))
}
