//! Error types for MargaNav

use thiserror::Error;

/// Configuration error: the planner cannot be constructed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid value for {field}: {reason}")]
    Invalid {
        field: &'static str,
        reason: String,
    },
}

/// Which end of the requested plan a per-call error refers to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Endpoint {
    Start,
    Goal,
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Endpoint::Start => write!(f, "start"),
            Endpoint::Goal => write!(f, "goal"),
        }
    }
}

/// Per-call planning error.
///
/// A plan that merely fails to reach the goal is not an error; it is
/// reported through the plan result. Errors are reserved for requests the
/// planner cannot meaningfully attempt.
#[derive(Error, Debug)]
pub enum PlanError {
    #[error("{which} position ({x:.2}, {y:.2}) is off the cost grid")]
    OffGrid { which: Endpoint, x: f32, y: f32 },
}
