//! Error type shared by the model, the decoder and the label layer.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HmmError {
    /// Dimension mismatch among the parameter tables, or a negative/non-finite probability.
    #[error("invalid model: {0}")]
    InvalidModel(String),

    /// An observation symbol outside the emission alphabet.
    #[error("invalid observation {symbol} at position {position} (alphabet size {n_symbols})")]
    InvalidObservation {
        position: usize,
        symbol: usize,
        n_symbols: usize,
    },

    #[error("observation sequence is empty")]
    EmptySequence,

    #[error("state {state} out of range (model has {n_states} states)")]
    InvalidState { state: usize, n_states: usize },

    #[error("path has {path} states but there are {observations} observations")]
    PathLengthMismatch { path: usize, observations: usize },

    #[error("unknown label: {0}")]
    UnknownLabel(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HmmError>;
