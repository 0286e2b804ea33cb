//! Result-set selector for the reporting layer

use std::fmt;
use std::io::{BufRead, Write};
use std::str::FromStr;

use crate::chaos::Execution;
use crate::error::{DynamicsError, DynamicsResult};

/// Which Poincaré dumps a report loads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultSet {
    Linear,
    Parallel,
    Both,
}

impl ResultSet {
    pub fn executions(&self) -> &'static [Execution] {
        match self {
            ResultSet::Linear => &[Execution::PerParticle],
            ResultSet::Parallel => &[Execution::Vectorized],
            ResultSet::Both => &Execution::ALL,
        }
    }

    /// Ask on `output` until `input` yields a valid answer
    ///
    /// Fails when the input ends first.
    pub fn prompt<R: BufRead, W: Write>(input: &mut R, output: &mut W) -> DynamicsResult<Self> {
        let mut line = String::new();
        loop {
            write!(output, "Which results should be shown? Linear (L), Parallel (P) or both (B): ")?;
            output.flush()?;

            line.clear();
            if input.read_line(&mut line)? == 0 {
                return Err(DynamicsError::InvalidParameter(
                    "input ended before a result set was chosen".to_string(),
                ));
            }
            match line.parse() {
                Ok(choice) => return Ok(choice),
                Err(e) => writeln!(output, "{}", e)?,
            }
        }
    }
}

impl FromStr for ResultSet {
    type Err = DynamicsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "l" | "linear" => Ok(ResultSet::Linear),
            "p" | "parallel" => Ok(ResultSet::Parallel),
            "b" | "both" => Ok(ResultSet::Both),
            other => Err(DynamicsError::InvalidParameter(format!(
                "unknown result set {:?} (expected L, P or B)",
                other
            ))),
        }
    }
}

impl fmt::Display for ResultSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResultSet::Linear => "linear",
            ResultSet::Parallel => "parallel",
            ResultSet::Both => "both",
        };
        f.pad(name)
    }
}
