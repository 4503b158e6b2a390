use std::path::PathBuf;
use thiserror::Error;

/// Errors produced while collecting inputs, deriving constants or saving
/// the final plot.
///
/// Only `Validation` is recoverable: the input loop re-prompts on it.
/// The other variants abort the run.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// A user-supplied value was malformed or outside its accepted range.
    #[error("invalid {field}: {reason}")]
    Validation { field: &'static str, reason: String },

    /// A derived constant failed the defensive sanity check.
    #[error("derived constants out of range: {0}")]
    InvalidConstants(String),

    /// The plot image could not be written.
    #[error("unable to write `{}`", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl SimulatorError {
    pub fn validation(field: &'static str, reason: impl Into<String>) -> SimulatorError {
        SimulatorError::Validation {
            field,
            reason: reason.into(),
        }
    }
}
