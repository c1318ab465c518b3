//! The crate-wide error type.

use std::fmt::{self, Debug, Display};
use std::io;

/// Everything that can go wrong while setting up or running a simulation. All of these are
/// detected before the day loop starts; once inputs are validated a day step cannot fail.
#[derive(Debug)]
pub enum ContagionError {
    /// A parameter is out of range, or a required input is missing or incomplete.
    Configuration(String),
    /// The initial-infection rejection loop gave up without infecting anyone.
    SeedingImpossible { attempts: usize },
    /// A role or centrality table disagrees with the contact graph about which people exist.
    DataAlignment(String),
    /// A line of an edge list could not be parsed.
    GraphFormat { line: usize, content: String },
    Io(io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    Logging(String),
}

impl Display for ContagionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContagionError::Configuration(msg) => write!(f, "configuration error: {msg}"),
            ContagionError::SeedingImpossible { attempts } => write!(
                f,
                "no initial infection after {attempts} seeding attempts; \
                 check p_infectious and the number of non-immune patients"
            ),
            ContagionError::DataAlignment(msg) => write!(f, "data alignment error: {msg}"),
            ContagionError::GraphFormat { line, content } => {
                write!(f, "malformed edge on line {line}: {content:?}")
            }
            ContagionError::Io(err) => write!(f, "I/O error: {err}"),
            ContagionError::Csv(err) => write!(f, "CSV error: {err}"),
            ContagionError::Json(err) => write!(f, "JSON error: {err}"),
            ContagionError::Logging(msg) => write!(f, "logging error: {msg}"),
        }
    }
}

impl std::error::Error for ContagionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ContagionError::Io(err) => Some(err),
            ContagionError::Csv(err) => Some(err),
            ContagionError::Json(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ContagionError {
    fn from(error: io::Error) -> Self {
        ContagionError::Io(error)
    }
}

impl From<csv::Error> for ContagionError {
    fn from(error: csv::Error) -> Self {
        ContagionError::Csv(error)
    }
}

impl From<serde_json::Error> for ContagionError {
    fn from(error: serde_json::Error) -> Self {
        ContagionError::Json(error)
    }
}
