//! Error types produced at the boundary between callers and the solver (spec §7).
use thiserror::Error;

/// Errors produced while parsing or writing a DIMACS CNF file.
#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("io error reading dimacs input: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse error at line {line}: {msg}")]
    Parse { line: usize, msg: String },
}

impl DimacsError {
    pub(crate) fn parse(line: usize, msg: impl Into<String>) -> DimacsError {
        DimacsError::Parse {
            line,
            msg: msg.into(),
        }
    }
}

/// Errors a caller can receive from [`crate::solver::Solver`] itself.
///
/// Most solver-level problems (an unsatisfiable core request before solving, an out-of-range
/// assumption) are programming errors and panic rather than living here, matching the invariant
/// violations the teacher's solver panics on; this only covers conditions callers are expected to
/// recover from.
#[derive(Debug, Error)]
pub enum SolverError {
    #[error("solver already in a failed (`Bad`) state after a prior error: {reason}")]
    FailedState { reason: String },

    #[error(transparent)]
    Dimacs(#[from] DimacsError),
}
